/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use super::{
    sampling::{ray_sampling, texture_max_dim},
    shading::{correct_opacity, gradient, Accumulator, Classifier, Phong},
    RenderState, RenderStrategy, RendererKind, JITTER_UNIT,
};
use crate::{
    color::{self, RGBA},
    common::{BoundBox, Ray},
    error::{ShaderError, VolumeError},
    gpu::{
        Blend, CullMode, Device, DrawState, Filter, Fragment, FragmentKernel, FragmentShader, FrontFace, Mesh,
        Program, Sampler, Samplers, Slot, StageInterface, Texture, TextureFormat, TextureHandle, Uniforms,
        ValueKind, Varyings, Vertex, VertexKernel, VertexShader, Wrap,
    },
};

const ENTRY: usize = 0;

/// Side of the tiled jitter texture in pixels
pub const JITTER_SIZE: usize = 64;
const JITTER_SEED: u64 = 0x5EED_0F_1177E2;

/// Light position in view space
const LIGHT_POSITION: [f32; 3] = [-5.0, -5.0, -5.0];

/// Ray casting in the fragment stage.
///
/// The volume cube is rasterized with back faces culled, every covered pixel
/// marches a ray from the front face into the volume.
pub struct RayCastRenderer {
    cube: Mesh,
    jitter: Option<TextureHandle>,
}

impl RayCastRenderer {
    pub fn new() -> RayCastRenderer {
        RayCastRenderer {
            cube: Mesh::cube(),
            jitter: None,
        }
    }
}

impl Default for RayCastRenderer {
    fn default() -> Self {
        RayCastRenderer::new()
    }
}

/// Tileable uniform noise in `<0;1)`, same for every run
pub fn jitter_texture() -> Result<Texture, VolumeError> {
    let mut rng = fastrand::Rng::with_seed(JITTER_SEED);
    let data = (0..JITTER_SIZE * JITTER_SIZE).map(|_| rng.f32()).collect();
    let texture = Texture::new_2d(JITTER_SIZE, JITTER_SIZE, TextureFormat::R32F, data)?;
    Ok(texture.with_filter(Filter::Nearest).with_wrap(Wrap::Repeat))
}

/// Camera and light position in object space
pub fn eye_and_light(model_view: &Matrix4<f32>) -> Option<(Point3<f32>, Point3<f32>)> {
    let inv = model_view.try_inverse()?;
    Some((
        inv.transform_point(&Point3::origin()),
        inv.transform_point(&Point3::from(LIGHT_POSITION)),
    ))
}

impl RenderStrategy for RayCastRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::RayCasting
    }

    fn init(&mut self, device: &mut Device) -> Result<Program, ShaderError> {
        let program = Program::link("raycast", Box::new(RayCastVertexShader), Box::new(RayCastFragmentShader))?;

        self.release(device);
        self.jitter = match jitter_texture() {
            Ok(texture) => Some(device.create_texture(texture)),
            Err(e) => {
                log::warn!("Jitter texture not created: {}", e);
                None
            }
        };

        Ok(program)
    }

    fn draw(&mut self, device: &mut Device, program: &mut Program, state: &RenderState) {
        let max_dim = match state.data.and_then(|h| texture_max_dim(device, h)) {
            Some(d) => d,
            None => return,
        };
        let multiplier = state.step_multiplier.max(1);
        let sampling = ray_sampling(max_dim, multiplier);

        let model_view = state.model_view();
        let (eye, light) = match eye_and_light(&model_view) {
            Some(positions) => positions,
            None => {
                log::warn!("Model view matrix is not invertible, volume not drawn");
                return;
            }
        };

        program.set_uniform("MVP", state.projection * model_view);
        program.set_uniform("eyePosition", eye);
        program.set_uniform("lightPosition", light);
        program.set_uniform("lightingEnabled", state.lighting);
        program.set_uniform("jitterEnabled", state.jitter);
        program.set_uniform("step", sampling.step);
        program.set_uniform("numSteps", sampling.num_steps as i32);
        program.set_uniform("stepMultCoeff", 1.0 / multiplier as f32);
        program.set_uniform("jitter", JITTER_UNIT as i32);

        device.bind_texture(JITTER_UNIT, self.jitter);
        device.set_state(DrawState {
            depth_test: false,
            cull: CullMode::Back,
            front_face: FrontFace::Cw,
            blend: Some(Blend::ALPHA),
        });

        log::trace!("Ray casting, step {} x {}", sampling.step, sampling.num_steps);

        device.draw(program, &self.cube);
    }

    fn release(&mut self, device: &mut Device) {
        if let Some(handle) = self.jitter.take() {
            device.destroy_texture(handle);
        }
    }
}

struct RayCastVertexShader;

struct RayCastVertexKernel {
    mvp: Matrix4<f32>,
}

impl VertexShader for RayCastVertexShader {
    fn name(&self) -> &str {
        "raycast.vert"
    }

    fn interface(&self) -> StageInterface {
        StageInterface {
            inputs: vec![Slot::new("position", ValueKind::Vec3)],
            outputs: vec![Slot::new("entry", ValueKind::Vec3)],
            uniforms: vec![Slot::new("MVP", ValueKind::Mat4)],
        }
    }

    fn prepare<'a>(&'a self, uniforms: &'a Uniforms) -> Box<dyn VertexKernel + 'a> {
        Box::new(RayCastVertexKernel {
            mvp: uniforms.mat4("MVP"),
        })
    }
}

impl VertexKernel for RayCastVertexKernel {
    fn run(&self, vertex: &Vertex, out: &mut Varyings) -> Vector4<f32> {
        out.set_vec3(ENTRY, vertex.position.coords);
        self.mvp * vertex.position.to_homogeneous()
    }
}

struct RayCastFragmentShader;

struct RayCastFragmentKernel<'a> {
    classifier: Classifier<'a>,
    volume: Sampler<'a>,
    jitter: Sampler<'a>,
    eye: Point3<f32>,
    light: Point3<f32>,
    lighting: bool,
    jitter_enabled: bool,
    step: f32,
    num_steps: u32,
    step_coeff: f32,
}

impl FragmentShader for RayCastFragmentShader {
    fn name(&self) -> &str {
        "raycast.frag"
    }

    fn interface(&self) -> StageInterface {
        StageInterface {
            inputs: vec![Slot::new("entry", ValueKind::Vec3)],
            outputs: vec![Slot::new("fragColor", ValueKind::Vec4)],
            uniforms: vec![
                Slot::new("eyePosition", ValueKind::Vec3),
                Slot::new("lightPosition", ValueKind::Vec3),
                Slot::new("lightingEnabled", ValueKind::Bool),
                Slot::new("jitterEnabled", ValueKind::Bool),
                Slot::new("step", ValueKind::Float),
                Slot::new("numSteps", ValueKind::Int),
                Slot::new("stepMultCoeff", ValueKind::Float),
                Slot::new("cutoffLow", ValueKind::Float),
                Slot::new("cutoffHigh", ValueKind::Float),
                Slot::new("cutoffCoeff", ValueKind::Float),
                Slot::new("texture3d", ValueKind::Sampler3D),
                Slot::new("palette", ValueKind::Sampler1D),
                Slot::new("opacity", ValueKind::Sampler1D),
                Slot::new("jitter", ValueKind::Sampler2D),
            ],
        }
    }

    fn prepare<'a>(&'a self, uniforms: &'a Uniforms, samplers: Samplers<'a>) -> Box<dyn FragmentKernel + 'a> {
        Box::new(RayCastFragmentKernel {
            classifier: Classifier::from_uniforms(uniforms, &samplers),
            volume: samplers.uniform(uniforms, "texture3d"),
            jitter: samplers.uniform(uniforms, "jitter"),
            eye: Point3::from(uniforms.vec3("eyePosition")),
            light: Point3::from(uniforms.vec3("lightPosition")),
            lighting: uniforms.bool("lightingEnabled"),
            jitter_enabled: uniforms.bool("jitterEnabled"),
            step: uniforms.float("step"),
            num_steps: uniforms.int("numSteps").max(0) as u32,
            step_coeff: uniforms.float("stepMultCoeff"),
        })
    }
}

impl FragmentKernel for RayCastFragmentKernel<'_> {
    fn run(&self, fragment: &Fragment) -> Option<RGBA> {
        if self.step <= 0.0 {
            return None;
        }

        let entry = Point3::from(fragment.varyings.vec3(ENTRY));
        let direction = (entry - self.eye).try_normalize(1e-6)?;
        let ray = Ray::new(entry, direction);
        let exit = BoundBox::unit_cube().intersect(&ray).map_or(0.0, |(_, t1)| t1);

        let mut t = if self.jitter_enabled {
            let size = JITTER_SIZE as f32;
            self.jitter.sample_2d(fragment.coord.x / size, fragment.coord.y / size).x * self.step
        } else {
            0.0
        };

        let mut acc = Accumulator::new();
        for _ in 0..self.num_steps {
            if t > exit {
                break;
            }

            let position = ray.point_from_t(t);
            let tex = (position.coords + Vector3::repeat(1.0)) * 0.5;
            t += self.step;

            let sample = match self.classifier.classify(self.volume.sample(tex).x) {
                Some(s) => s,
                None => continue,
            };
            let alpha = correct_opacity(sample.w, self.step_coeff);
            let rgb = if self.lighting {
                Phong::DEFAULT.shade(
                    sample.xyz(),
                    gradient(&self.volume, tex),
                    &position,
                    &self.eye,
                    &self.light,
                )
            } else {
                sample.xyz()
            };

            acc.add(color::new(rgb.x, rgb.y, rgb.z, alpha));
            if acc.is_saturated() {
                break;
            }
        }

        acc.result()
    }
}
