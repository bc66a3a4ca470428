/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

//! Interactive view of a volume.
//!
//! [`VolumeView`] ties the device, renderer, camera and uploaded textures
//! together and reacts to window events. A windowing shell only forwards
//! input and presents the framebuffer.

use std::path::{Path, PathBuf};

use crate::{
    camera::OrbitCamera,
    color::{self, RGB},
    common::CutoffWindow,
    error::{ShaderError, VolumeError},
    gpu::{Device, Framebuffer, Texture, TextureHandle},
    render::{Renderer, RendererKind},
    settings::Settings,
    transfer_function::TransferFunction,
    volumetric::{load_volume, VolumeGrid},
};

/// Initialization state of the active renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererStatus {
    /// Initialized on the next paint
    Pending,
    Ready,
    /// Shader error was reported, painting only clears
    Failed,
}

pub struct VolumeView {
    device: Device,
    renderer: Renderer,
    status: RendererStatus,
    camera: OrbitCamera,
    data: Option<TextureHandle>,
    colors: Option<TextureHandle>,
    opacities: Option<TextureHandle>,
    background: RGB,
    cutoff: CutoffWindow,
    step_multiplier: u32,
    lighting: bool,
    jitter: bool,
    auto_rotate: bool,
    frame_dir: Option<PathBuf>,
}

impl VolumeView {
    pub fn new(width: usize, height: usize, kind: RendererKind) -> VolumeView {
        let defaults = Settings::default();
        VolumeView {
            device: Device::new(width, height),
            renderer: Renderer::new(kind),
            status: RendererStatus::Pending,
            camera: OrbitCamera::new(width, height),
            data: None,
            colors: None,
            opacities: None,
            background: RGB::from(defaults.background),
            cutoff: defaults.cutoff,
            step_multiplier: defaults.step_multiplier,
            lighting: defaults.lighting,
            jitter: defaults.jitter,
            auto_rotate: defaults.auto_rotate,
            frame_dir: None,
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        self.device.framebuffer()
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn renderer_kind(&self) -> RendererKind {
        self.renderer.kind()
    }

    pub fn status(&self) -> RendererStatus {
        self.status
    }

    pub fn has_frame(&self) -> bool {
        self.data.is_some()
    }

    /// Upload volume data, replaces the previous volume
    pub fn set_frame(&mut self, grid: &VolumeGrid) {
        let handle = self.device.create_texture(Texture::from_grid(grid));
        if let Some(old) = self.data.replace(handle) {
            self.device.destroy_texture(old);
        }
        log::info!("Volume {} x {} x {} uploaded", grid.width(), grid.height(), grid.depth());
    }

    /// Load a frame or cube file and show it.
    /// On error the current volume stays.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<(), VolumeError> {
        let path = path.as_ref();
        let grid = load_volume(path)?;
        self.set_frame(&grid);
        self.frame_dir = path.parent().map(Path::to_path_buf);
        Ok(())
    }

    /// Fails on an empty palette
    pub fn set_color_palette(&mut self, colors: &[RGB]) -> Result<(), VolumeError> {
        let texture = Texture::from_colors(colors)?;
        let handle = self.device.create_texture(texture);
        if let Some(old) = self.colors.replace(handle) {
            self.device.destroy_texture(old);
        }
        log::info!("Color palette of {} entries uploaded", colors.len());
        Ok(())
    }

    /// Fails on an empty table
    pub fn set_opacity_palette(&mut self, opacities: &[f32]) -> Result<(), VolumeError> {
        let texture = Texture::from_values(opacities)?;
        let handle = self.device.create_texture(texture);
        if let Some(old) = self.opacities.replace(handle) {
            self.device.destroy_texture(old);
        }
        log::info!("Opacity table of {} entries uploaded", opacities.len());
        Ok(())
    }

    pub fn set_transfer_function(&mut self, tf: &TransferFunction) -> Result<(), VolumeError> {
        self.set_color_palette(tf.colors())?;
        self.set_opacity_palette(tf.opacities())
    }

    /// Switch rendering method, the new one is initialized on the next paint
    pub fn set_renderer(&mut self, kind: RendererKind) {
        self.renderer.release(&mut self.device);
        self.renderer = Renderer::new(kind);
        self.status = RendererStatus::Pending;
        log::debug!("Renderer switched to {}", kind.name());
    }

    /// Draw the current state into the framebuffer.
    /// A renderer failing to initialize is reported once and then skipped.
    pub fn paint(&mut self) -> Result<(), ShaderError> {
        let bg = self.background;
        self.device.clear(color::new(bg.x, bg.y, bg.z, 1.0));
        // stats describe the last frame only
        self.device.reset_stats();

        if self.status == RendererStatus::Pending {
            match self.renderer.init(&mut self.device) {
                Ok(()) => self.status = RendererStatus::Ready,
                Err(e) => {
                    log::error!("{}", e);
                    self.status = RendererStatus::Failed;
                    return Err(e);
                }
            }
        }
        if self.status != RendererStatus::Ready {
            return Ok(());
        }

        let renderer = &mut self.renderer;
        renderer.set_mvp(
            self.camera.model_matrix(),
            self.camera.view_matrix(),
            self.camera.projection_matrix(),
        );
        renderer.set_cutoff(self.cutoff);
        renderer.set_step_multiplier(self.step_multiplier);
        renderer.enable_lighting(self.lighting);
        renderer.enable_jitter(self.jitter);
        renderer.set_data_texture(self.data);
        renderer.set_color_texture(self.colors);
        renderer.set_opacity_texture(self.opacities);

        renderer.render(&mut self.device);
        Ok(())
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.device.resize(width, height);
        self.camera.resize(width, height);
    }

    pub fn mouse_press(&mut self, x: f32, y: f32) {
        self.camera.begin_drag(x, y);
    }

    /// Returns `true` if the view changed
    pub fn mouse_move(&mut self, x: f32, y: f32) -> bool {
        if !self.camera.is_dragging() {
            return false;
        }
        self.camera.drag_to(x, y);
        true
    }

    pub fn mouse_release(&mut self) {
        self.camera.end_drag();
    }

    pub fn wheel(&mut self, delta: f32) {
        self.camera.dolly(delta);
    }

    /// Timer step, returns `true` if the view changed
    pub fn tick(&mut self) -> bool {
        if self.auto_rotate {
            self.camera.tick();
        }
        self.auto_rotate
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    pub fn background(&self) -> RGB {
        self.background
    }

    pub fn set_background(&mut self, background: RGB) {
        self.background = background;
    }

    pub fn cutoff(&self) -> CutoffWindow {
        self.cutoff
    }

    pub fn set_cutoff(&mut self, cutoff: CutoffWindow) {
        self.cutoff = cutoff;
    }

    pub fn step_multiplier(&self) -> u32 {
        self.step_multiplier
    }

    pub fn set_step_multiplier(&mut self, multiplier: u32) {
        self.step_multiplier = multiplier.max(1);
    }

    pub fn lighting(&self) -> bool {
        self.lighting
    }

    pub fn enable_lighting(&mut self, enabled: bool) {
        self.lighting = enabled;
    }

    pub fn jitter(&self) -> bool {
        self.jitter
    }

    pub fn enable_jitter(&mut self, enabled: bool) {
        self.jitter = enabled;
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    pub fn frame_dir(&self) -> Option<&Path> {
        self.frame_dir.as_deref()
    }

    /// Directory offered for the next file to open
    pub fn set_frame_dir(&mut self, dir: Option<PathBuf>) {
        self.frame_dir = dir;
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.background = RGB::from(settings.background);
        self.cutoff = settings.cutoff;
        self.set_step_multiplier(settings.step_multiplier);
        self.lighting = settings.lighting;
        self.jitter = settings.jitter;
        self.auto_rotate = settings.auto_rotate;
        self.frame_dir = settings.frame_dir.clone();
        if settings.renderer != self.renderer_kind() {
            self.set_renderer(settings.renderer);
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            background: self.background.into(),
            cutoff: self.cutoff,
            step_multiplier: self.step_multiplier,
            lighting: self.lighting,
            jitter: self.jitter,
            auto_rotate: self.auto_rotate,
            renderer: self.renderer_kind(),
            frame_dir: self.frame_dir.clone(),
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::{premade::palettes::rainbow, test_helpers::sphere_grid};

    fn configured_view(kind: RendererKind) -> VolumeView {
        let mut view = VolumeView::new(32, 32, kind);
        view.set_frame(&sphere_grid(16));
        view.set_color_palette(&rainbow()).unwrap();
        view.set_opacity_palette(&[0.0, 1.0]).unwrap();
        view
    }

    #[test]
    fn paint_initializes_lazily() {
        let mut view = configured_view(RendererKind::RayCasting);
        assert_eq!(view.status(), RendererStatus::Pending);

        view.paint().unwrap();

        assert_eq!(view.status(), RendererStatus::Ready);
        let first = view.device().stats();
        assert!(first.draw_calls > 0);

        view.paint().unwrap();
        assert_eq!(view.device().stats(), first);
    }

    #[test]
    fn replacing_frame_frees_texture() {
        let mut view = configured_view(RendererKind::Slices);
        let textures = view.device().textures().len();

        view.set_frame(&sphere_grid(8));
        view.set_color_palette(&rainbow()).unwrap();

        assert_eq!(view.device().textures().len(), textures);
    }

    #[test]
    fn empty_palette_keeps_previous() {
        let mut view = configured_view(RendererKind::Slices);
        let textures = view.device().textures().len();

        assert!(view.set_color_palette(&[]).is_err());
        assert!(view.set_opacity_palette(&[]).is_err());
        assert_eq!(view.device().textures().len(), textures);
    }

    #[test]
    fn switching_renderer_releases_jitter() {
        let mut view = configured_view(RendererKind::RayCasting);
        view.paint().unwrap();
        let textures = view.device().textures().len();

        view.set_renderer(RendererKind::Slices);

        assert_eq!(view.device().textures().len(), textures - 1);
        assert_eq!(view.status(), RendererStatus::Pending);
        view.paint().unwrap();
        assert_eq!(view.renderer_kind(), RendererKind::Slices);
    }

    #[test]
    fn settings_round_trip() {
        let mut view = VolumeView::new(8, 8, RendererKind::Slices);
        let settings = Settings {
            background: [0.1, 0.2, 0.3],
            cutoff: CutoffWindow::new(0.2, 0.8),
            step_multiplier: 3,
            lighting: true,
            jitter: true,
            auto_rotate: true,
            renderer: RendererKind::RayCasting,
            frame_dir: Some(PathBuf::from("/data")),
        };

        view.apply_settings(&settings);

        assert_eq!(view.settings(), settings);
        assert!(view.tick());
    }

    #[test]
    fn drag_only_while_pressed() {
        let mut view = VolumeView::new(8, 8, RendererKind::Slices);
        let rotation = *view.camera().rotation();

        assert!(!view.mouse_move(10.0, 0.0));
        view.mouse_press(0.0, 0.0);
        assert!(view.mouse_move(10.0, 0.0));
        view.mouse_release();

        assert_ne!(*view.camera().rotation(), rotation);
    }
}
