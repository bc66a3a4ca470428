/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

//! Volume renderers.
//!
//! [`Renderer`] holds the state shared by all rendering methods and forwards
//! drawing to a [`RenderStrategy`]. Two strategies exist, view aligned
//! slices composited back to front ([`SliceRenderer`]) and a front to back
//! ray caster running in the fragment stage ([`RayCastRenderer`]).

mod ray_cast_renderer;
pub mod sampling;
pub mod shading;
mod slice_renderer;

use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

pub use ray_cast_renderer::RayCastRenderer;
pub use slice_renderer::SliceRenderer;

use crate::{
    common::CutoffWindow,
    error::ShaderError,
    gpu::{Device, Program, TextureHandle},
};

/// Half of the edge of the object space volume cube
pub const CUBE_HALF_SIZE: f32 = 1.0;
/// Radius of the sphere circumscribing the volume cube, `CUBE_HALF_SIZE * sqrt(3)`
pub const CUBE_EXTENT_RADIUS: f32 = CUBE_HALF_SIZE * 1.732_050_8;

pub const DATA_UNIT: usize = 0;
pub const COLOR_UNIT: usize = 1;
pub const OPACITY_UNIT: usize = 2;
pub const JITTER_UNIT: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RendererKind {
    #[default]
    Slices,
    RayCasting,
}

impl RendererKind {
    pub const ALL: [RendererKind; 2] = [RendererKind::Slices, RendererKind::RayCasting];

    pub fn name(&self) -> &'static str {
        match self {
            RendererKind::Slices => "slices",
            RendererKind::RayCasting => "ray casting",
        }
    }

    pub fn create(&self) -> Box<dyn RenderStrategy> {
        match self {
            RendererKind::Slices => Box::new(SliceRenderer::new()),
            RendererKind::RayCasting => Box::new(RayCastRenderer::new()),
        }
    }
}

/// Parameters of the next render, set by the owner of [`Renderer`]
#[derive(Debug, Clone)]
pub struct RenderState {
    pub model: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub cutoff: CutoffWindow,
    /// Samples per voxel along a ray, at least 1
    pub step_multiplier: u32,
    pub lighting: bool,
    pub jitter: bool,
    pub data: Option<TextureHandle>,
    pub colors: Option<TextureHandle>,
    pub opacities: Option<TextureHandle>,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            model: Matrix4::identity(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            cutoff: CutoffWindow::default(),
            step_multiplier: 1,
            lighting: false,
            jitter: false,
            data: None,
            colors: None,
            opacities: None,
        }
    }
}

impl RenderState {
    pub fn model_view(&self) -> Matrix4<f32> {
        self.view * self.model
    }
}

/// Rendering method
pub trait RenderStrategy: Send {
    fn kind(&self) -> RendererKind;

    /// Build the program, static geometry and textures the strategy owns
    fn init(&mut self, device: &mut Device) -> Result<Program, ShaderError>;

    /// Issue draw calls.
    /// Data, color and opacity textures are bound and cutoff uniforms are set.
    fn draw(&mut self, device: &mut Device, program: &mut Program, state: &RenderState);

    /// Destroy textures created in `init`
    fn release(&mut self, _device: &mut Device) {}
}

pub struct Renderer {
    strategy: Box<dyn RenderStrategy>,
    program: Option<Program>,
    state: RenderState,
}

impl Renderer {
    pub fn new(kind: RendererKind) -> Renderer {
        Renderer::with_strategy(kind.create())
    }

    pub fn with_strategy(strategy: Box<dyn RenderStrategy>) -> Renderer {
        Renderer {
            strategy,
            program: None,
            state: RenderState::default(),
        }
    }

    pub fn kind(&self) -> RendererKind {
        self.strategy.kind()
    }

    pub fn init(&mut self, device: &mut Device) -> Result<(), ShaderError> {
        let program = self.strategy.init(device)?;
        log::debug!("Renderer `{}` initialized", self.kind().name());
        self.program = Some(program);
        Ok(())
    }

    /// Draw the volume into the device framebuffer.
    /// Does nothing until the program and all three textures are available.
    pub fn render(&mut self, device: &mut Device) {
        let program = match self.program.as_mut() {
            Some(p) => p,
            None => return,
        };
        let (data, colors, opacities) = match (self.state.data, self.state.colors, self.state.opacities) {
            (Some(d), Some(c), Some(o)) => (d, c, o),
            _ => return,
        };

        let textures = device.textures();
        if [data, colors, opacities].iter().any(|&h| !textures.contains(h)) {
            log::warn!("Render skipped, texture handle no longer valid");
            return;
        }

        let cutoff = self.state.cutoff;
        program.set_uniform("cutoffLow", cutoff.low);
        program.set_uniform("cutoffHigh", cutoff.high);
        program.set_uniform("cutoffCoeff", cutoff.coefficient());

        program.set_uniform("texture3d", DATA_UNIT as i32);
        program.set_uniform("palette", COLOR_UNIT as i32);
        program.set_uniform("opacity", OPACITY_UNIT as i32);

        device.bind_texture(DATA_UNIT, Some(data));
        device.bind_texture(COLOR_UNIT, Some(colors));
        device.bind_texture(OPACITY_UNIT, Some(opacities));

        self.strategy.draw(device, program, &self.state);
    }

    /// Free strategy resources, the renderer has to be initialized again
    pub fn release(&mut self, device: &mut Device) {
        self.strategy.release(device);
        self.program = None;
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn set_mvp(&mut self, model: Matrix4<f32>, view: Matrix4<f32>, projection: Matrix4<f32>) {
        self.state.model = model;
        self.state.view = view;
        self.state.projection = projection;
    }

    pub fn set_cutoff(&mut self, cutoff: CutoffWindow) {
        self.state.cutoff = cutoff;
    }

    pub fn set_step_multiplier(&mut self, multiplier: u32) {
        self.state.step_multiplier = multiplier.max(1);
    }

    pub fn enable_lighting(&mut self, enabled: bool) {
        self.state.lighting = enabled;
    }

    pub fn enable_jitter(&mut self, enabled: bool) {
        self.state.jitter = enabled;
    }

    pub fn set_data_texture(&mut self, handle: Option<TextureHandle>) {
        self.state.data = handle;
    }

    pub fn set_color_texture(&mut self, handle: Option<TextureHandle>) {
        self.state.colors = handle;
    }

    pub fn set_opacity_texture(&mut self, handle: Option<TextureHandle>) {
        self.state.opacities = handle;
    }
}
