/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

//! Triangle setup and rasterization.
//!
//! Edge function rasterizer with the top-left fill rule and perspective
//! correct varyings. Rows of one triangle are shaded in parallel, a triangle
//! is finished before the next one starts.

use nalgebra::{point, Point2, Point3, Vector4};
use rayon::prelude::*;

use super::{
    framebuffer::Framebuffer,
    shader::{Fragment, FragmentKernel, Varyings},
};
use crate::{color::RGBA, common::ViewportBox};

/// Vertices this close to the eye plane reject the triangle
const W_EPSILON: f32 = 1e-5;
const AREA_EPSILON: f32 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    Back,
    Front,
}

/// Winding of front facing triangles on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    Ccw,
    Cw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

impl BlendFactor {
    fn weight(self, src_alpha: f32) -> f32 {
        match self {
            BlendFactor::Zero => 0.0,
            BlendFactor::One => 1.0,
            BlendFactor::SrcAlpha => src_alpha,
            BlendFactor::OneMinusSrcAlpha => 1.0 - src_alpha,
        }
    }
}

/// `result = src * src_factor + dst * dst_factor`, alpha included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blend {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl Blend {
    /// "Over" compositing of straight colors
    pub const ALPHA: Blend = Blend {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
    };

    pub fn apply(&self, src: RGBA, dst: RGBA) -> RGBA {
        src * self.src.weight(src.w) + dst * self.dst.weight(src.w)
    }
}

/// Fixed function state used by draw calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawState {
    /// Less-than test against the depth buffer, passing fragments write depth
    pub depth_test: bool,
    pub cull: CullMode,
    pub front_face: FrontFace,
    /// `None` overwrites the framebuffer
    pub blend: Option<Blend>,
}

impl Default for DrawState {
    fn default() -> Self {
        DrawState {
            depth_test: false,
            cull: CullMode::None,
            front_face: FrontFace::Ccw,
            blend: None,
        }
    }
}

/// Output of the vertex stage
#[derive(Debug, Clone, Copy)]
pub(super) struct ClipVertex {
    pub clip: Vector4<f32>,
    pub varyings: Varyings,
}

struct ScreenVertex {
    /// Window x, y and depth
    pos: Point3<f32>,
    inv_w: f32,
    /// Varyings divided by w
    varyings: Varyings,
}

fn to_screen(v: &ClipVertex, width: usize, height: usize) -> ScreenVertex {
    let inv_w = 1.0 / v.clip.w;
    let ndc = v.clip.xyz() * inv_w;
    ScreenVertex {
        pos: point![
            (ndc.x + 1.0) * 0.5 * width as f32,
            (ndc.y + 1.0) * 0.5 * height as f32,
            (ndc.z + 1.0) * 0.5
        ],
        inv_w,
        varyings: v.varyings.scaled(inv_w),
    }
}

// Positive when `p` is left of a -> b (y up)
fn edge(a: &Point3<f32>, b: &Point3<f32>, p: &Point2<f32>) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

// Edge of a counter-clockwise triangle owning the pixels lying exactly on it
fn is_top_left(a: &Point3<f32>, b: &Point3<f32>) -> bool {
    let top = a.y == b.y && b.x < a.x;
    let left = b.y < a.y;
    top || left
}

/// Rasterize and shade one triangle, returns the number of written fragments
pub(super) fn draw_triangle(
    framebuffer: &mut Framebuffer,
    state: &DrawState,
    triangle: [&ClipVertex; 3],
    kernel: &dyn FragmentKernel,
) -> usize {
    // no clipping, triangles reaching behind the eye are dropped
    if triangle.iter().any(|v| v.clip.w <= W_EPSILON) {
        return 0;
    }

    let (width, height) = (framebuffer.width(), framebuffer.height());
    if width == 0 || height == 0 {
        return 0;
    }

    let mut screen = triangle.map(|v| to_screen(v, width, height));

    let area = edge(
        &screen[0].pos,
        &screen[1].pos,
        &screen[2].pos.xy(),
    );
    if area.abs() < AREA_EPSILON {
        return 0;
    }

    let ccw = area > 0.0;
    let front = match state.front_face {
        FrontFace::Ccw => ccw,
        FrontFace::Cw => !ccw,
    };
    let culled = match state.cull {
        CullMode::None => false,
        CullMode::Back => !front,
        CullMode::Front => front,
    };
    if culled {
        return 0;
    }

    if !ccw {
        screen.swap(1, 2);
    }
    let area = area.abs();

    let mut bounds = ViewportBox::new();
    for v in &screen {
        bounds.add_point(v.pos.x, v.pos.y);
    }
    let (cols, rows) = bounds.get_pixel_range((width, height));
    if cols.is_empty() || rows.is_empty() {
        return 0;
    }

    let [v0, v1, v2] = &screen;
    let top_left = [
        is_top_left(&v1.pos, &v2.pos),
        is_top_left(&v2.pos, &v0.pos),
        is_top_left(&v0.pos, &v1.pos),
    ];

    let row_count = rows.len();
    let (color, depth) = framebuffer.buffers_mut();

    color
        .par_chunks_mut(width)
        .zip(depth.par_chunks_mut(width))
        .enumerate()
        .skip(rows.start)
        .take(row_count)
        .map(|(row, (color_row, depth_row))| {
            let y = height as f32 - row as f32 - 0.5;
            let mut written = 0usize;

            for col in cols.clone() {
                let p = point![col as f32 + 0.5, y];
                let w = [
                    edge(&v1.pos, &v2.pos, &p),
                    edge(&v2.pos, &v0.pos, &p),
                    edge(&v0.pos, &v1.pos, &p),
                ];
                let inside = w
                    .iter()
                    .zip(top_left.iter())
                    .all(|(&w, &tl)| w > 0.0 || (w == 0.0 && tl));
                if !inside {
                    continue;
                }

                let l = w.map(|w| w / area);
                let z = l[0] * v0.pos.z + l[1] * v1.pos.z + l[2] * v2.pos.z;
                if state.depth_test && z >= depth_row[col] {
                    continue;
                }

                let inv_w = l[0] * v0.inv_w + l[1] * v1.inv_w + l[2] * v2.inv_w;
                let varyings = Varyings::weighted_sum([
                    (&v0.varyings, l[0] / inv_w),
                    (&v1.varyings, l[1] / inv_w),
                    (&v2.varyings, l[2] / inv_w),
                ]);

                let fragment = Fragment {
                    coord: p,
                    depth: z,
                    varyings,
                };
                let src = match kernel.run(&fragment) {
                    Some(c) => c,
                    None => continue,
                };

                if state.depth_test {
                    depth_row[col] = z;
                }
                color_row[col] = match &state.blend {
                    Some(blend) => blend.apply(src, color_row[col]),
                    None => src,
                };
                written += 1;
            }
            written
        })
        .sum()
}

#[cfg(test)]
mod test {

    use nalgebra::vector;

    use super::*;
    use crate::color;

    struct Solid(RGBA);

    impl FragmentKernel for Solid {
        fn run(&self, _fragment: &Fragment) -> Option<RGBA> {
            Some(self.0)
        }
    }

    fn vertex(x: f32, y: f32) -> ClipVertex {
        ClipVertex {
            clip: vector![x, y, 0.0, 1.0],
            varyings: Varyings::default(),
        }
    }

    fn covered(fb: &Framebuffer) -> usize {
        fb.pixels().iter().filter(|p| p.w > 0.0).count()
    }

    #[test]
    fn shared_edge_drawn_once() {
        let mut fb = Framebuffer::new(8, 8);
        let state = DrawState {
            blend: Some(Blend {
                src: BlendFactor::One,
                dst: BlendFactor::One,
            }),
            ..DrawState::default()
        };
        let quad = [
            vertex(-1.0, -1.0),
            vertex(1.0, -1.0),
            vertex(1.0, 1.0),
            vertex(-1.0, 1.0),
        ];
        let kernel = Solid(color::new(0.1, 0.1, 0.1, 0.1));

        let a = draw_triangle(&mut fb, &state, [&quad[0], &quad[1], &quad[2]], &kernel);
        let b = draw_triangle(&mut fb, &state, [&quad[2], &quad[3], &quad[0]], &kernel);

        // diagonal pixels belong to exactly one of the triangles
        assert_eq!(a + b, 64);
        assert!(fb.pixels().iter().all(|p| (p.w - 0.1).abs() < 1e-6));
    }

    #[test]
    fn culling_by_winding() {
        let ccw = [vertex(-1.0, -1.0), vertex(1.0, -1.0), vertex(0.0, 1.0)];
        let kernel = Solid(color::new(1.0, 1.0, 1.0, 1.0));

        let mut fb = Framebuffer::new(4, 4);
        let back = DrawState {
            cull: CullMode::Back,
            ..DrawState::default()
        };
        assert!(draw_triangle(&mut fb, &back, [&ccw[0], &ccw[1], &ccw[2]], &kernel) > 0);
        fb.clear(color::zero());
        assert_eq!(draw_triangle(&mut fb, &back, [&ccw[0], &ccw[2], &ccw[1]], &kernel), 0);

        let cw_front = DrawState {
            front_face: FrontFace::Cw,
            ..back
        };
        assert_eq!(draw_triangle(&mut fb, &cw_front, [&ccw[0], &ccw[1], &ccw[2]], &kernel), 0);
        assert!(draw_triangle(&mut fb, &cw_front, [&ccw[0], &ccw[2], &ccw[1]], &kernel) > 0);
        assert!(covered(&fb) > 0);
    }

    #[test]
    fn behind_eye_rejected() {
        let mut fb = Framebuffer::new(4, 4);
        let mut v = [vertex(-1.0, -1.0), vertex(1.0, -1.0), vertex(0.0, 1.0)];
        v[2].clip.w = -1.0;

        let written = draw_triangle(
            &mut fb,
            &DrawState::default(),
            [&v[0], &v[1], &v[2]],
            &Solid(color::new(1.0, 1.0, 1.0, 1.0)),
        );
        assert_eq!(written, 0);
    }

    #[test]
    fn alpha_blend() {
        let blended = Blend::ALPHA.apply(color::new(1.0, 0.0, 0.0, 0.25), color::new(0.0, 0.0, 1.0, 1.0));

        assert_eq!(blended, color::new(0.25, 0.0, 0.75, 0.0625 + 0.75));
    }
}
