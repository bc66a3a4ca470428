use nalgebra::{point, vector, Matrix4, Vector4};

use super::{
    sampling::{slice_sampling, texture_max_dim, Sampling},
    shading::{correct_opacity, Classifier},
    RenderState, RenderStrategy, RendererKind, CUBE_EXTENT_RADIUS,
};
use crate::{
    color::{self, RGBA},
    error::ShaderError,
    gpu::{
        Blend, CullMode, Device, DrawState, Fragment, FragmentKernel, FragmentShader, FrontFace, Mesh, Program,
        Sampler, Samplers, Slot, StageInterface, Uniforms, ValueKind, Varyings, Vertex, VertexKernel, VertexShader,
    },
};

const TEX_COORD: usize = 0;

/// Texture mapping by view aligned slices.
///
/// A stack of quads perpendicular to the viewing direction spans the bounding
/// sphere of the volume cube. Every quad samples the 3D texture and the
/// slices are blended back to front.
pub struct SliceRenderer {
    plane: Mesh,
}

impl SliceRenderer {
    pub fn new() -> SliceRenderer {
        SliceRenderer { plane: Mesh::plane() }
    }
}

impl Default for SliceRenderer {
    fn default() -> Self {
        SliceRenderer::new()
    }
}

/// Texture space `<0;1>^3` to object space `<-1;1>^3`
pub fn texture_matrix() -> Matrix4<f32> {
    Matrix4::new_translation(&vector![-1.0, -1.0, -1.0]) * Matrix4::new_scaling(2.0)
}

/// Model matrices of the slab quads in view space, farthest first
pub fn slab_models(model_view: &Matrix4<f32>, sampling: &Sampling) -> Vec<Matrix4<f32>> {
    let centre = model_view.transform_point(&point![0.0, 0.0, 0.0]);
    let scale = Matrix4::new_nonuniform_scaling(&vector![CUBE_EXTENT_RADIUS, CUBE_EXTENT_RADIUS, 1.0]);

    (0..=sampling.num_steps)
        .map(|i| {
            let z = centre.z - CUBE_EXTENT_RADIUS + i as f32 * sampling.step;
            Matrix4::new_translation(&vector![centre.x, centre.y, z]) * scale
        })
        .collect()
}

impl RenderStrategy for SliceRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Slices
    }

    fn init(&mut self, _device: &mut Device) -> Result<Program, ShaderError> {
        Program::link("slices", Box::new(SliceVertexShader), Box::new(SliceFragmentShader))
    }

    fn draw(&mut self, device: &mut Device, program: &mut Program, state: &RenderState) {
        let max_dim = match state.data.and_then(|h| texture_max_dim(device, h)) {
            Some(d) => d,
            None => return,
        };
        let multiplier = state.step_multiplier.max(1);
        let sampling = slice_sampling(max_dim, multiplier);

        let model_view = state.model_view();
        let texture_inv = match (model_view * texture_matrix()).try_inverse() {
            Some(m) => m,
            None => {
                log::warn!("Model view matrix is not invertible, slices not drawn");
                return;
            }
        };

        program.set_uniform("stepMultCoeff", 1.0 / multiplier as f32);

        device.set_state(DrawState {
            depth_test: false,
            cull: CullMode::None,
            front_face: FrontFace::Ccw,
            blend: Some(Blend::ALPHA),
        });

        log::trace!("Drawing {} slices, step {}", sampling.num_steps + 1, sampling.step);

        for slab in slab_models(&model_view, &sampling) {
            program.set_uniform("TexInv", texture_inv * slab);
            program.set_uniform("Proj", state.projection * slab);
            device.draw(program, &self.plane);
        }
    }
}

struct SliceVertexShader;

struct SliceVertexKernel {
    proj: Matrix4<f32>,
    tex_inv: Matrix4<f32>,
}

impl VertexShader for SliceVertexShader {
    fn name(&self) -> &str {
        "slices.vert"
    }

    fn interface(&self) -> StageInterface {
        StageInterface {
            inputs: vec![Slot::new("position", ValueKind::Vec3)],
            outputs: vec![Slot::new("texCoord", ValueKind::Vec3)],
            uniforms: vec![
                Slot::new("Proj", ValueKind::Mat4),
                Slot::new("TexInv", ValueKind::Mat4),
            ],
        }
    }

    fn prepare<'a>(&'a self, uniforms: &'a Uniforms) -> Box<dyn VertexKernel + 'a> {
        Box::new(SliceVertexKernel {
            proj: uniforms.mat4("Proj"),
            tex_inv: uniforms.mat4("TexInv"),
        })
    }
}

impl VertexKernel for SliceVertexKernel {
    fn run(&self, vertex: &Vertex, out: &mut Varyings) -> Vector4<f32> {
        let position = vertex.position.to_homogeneous();
        let tex = self.tex_inv * position;
        out.set_vec3(TEX_COORD, tex.xyz() / tex.w);
        self.proj * position
    }
}

struct SliceFragmentShader;

struct SliceFragmentKernel<'a> {
    classifier: Classifier<'a>,
    volume: Sampler<'a>,
    step_coeff: f32,
}

impl FragmentShader for SliceFragmentShader {
    fn name(&self) -> &str {
        "slices.frag"
    }

    fn interface(&self) -> StageInterface {
        StageInterface {
            inputs: vec![Slot::new("texCoord", ValueKind::Vec3)],
            outputs: vec![Slot::new("fragColor", ValueKind::Vec4)],
            uniforms: vec![
                Slot::new("cutoffLow", ValueKind::Float),
                Slot::new("cutoffHigh", ValueKind::Float),
                Slot::new("cutoffCoeff", ValueKind::Float),
                Slot::new("stepMultCoeff", ValueKind::Float),
                Slot::new("texture3d", ValueKind::Sampler3D),
                Slot::new("palette", ValueKind::Sampler1D),
                Slot::new("opacity", ValueKind::Sampler1D),
            ],
        }
    }

    fn prepare<'a>(&'a self, uniforms: &'a Uniforms, samplers: Samplers<'a>) -> Box<dyn FragmentKernel + 'a> {
        Box::new(SliceFragmentKernel {
            classifier: Classifier::from_uniforms(uniforms, &samplers),
            volume: samplers.uniform(uniforms, "texture3d"),
            step_coeff: uniforms.float("stepMultCoeff"),
        })
    }
}

impl FragmentKernel for SliceFragmentKernel<'_> {
    fn run(&self, fragment: &Fragment) -> Option<RGBA> {
        let tex = fragment.varyings.vec3(TEX_COORD);
        if tex.iter().any(|&c| !(0.0..=1.0).contains(&c)) {
            return None;
        }

        let value = self.volume.sample(tex).x;
        let sample = self.classifier.classify(value)?;
        let alpha = correct_opacity(sample.w, self.step_coeff);

        Some(color::new(sample.x, sample.y, sample.z, alpha))
    }
}
