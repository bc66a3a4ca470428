/*
    vol_app
    Author: Michal Majer
    Date: 2022-05-05
*/

//! Viewer state behind the window.
//! Keyboard shortcuts are translated to [`Action`]s in `main`.

use std::{
    error::Error,
    path::{Path, PathBuf},
};

use volren_lib::{
    color::{self, RGB},
    common::CutoffWindow,
    premade::{generators::Preset, opacity::OpacityPreset, palettes::PalettePreset},
    render::RendererKind,
    volumetric::{load_raw, RawParams},
    Settings, ShaderError, TransferFunction, VolumeError, VolumeView,
};

/// Side of generated volumes
pub const GENERATED_SIDE: usize = 64;
const CUTOFF_STEP: f32 = 0.05;
const MAX_STEP_MULTIPLIER: u32 = 16;
const MAX_POWER: i32 = 9;

fn backgrounds() -> [RGB; 3] {
    [
        color::rgb(0.0, 0.0, 0.0),
        color::rgb(0.5, 0.5, 0.5),
        color::rgb(1.0, 1.0, 1.0),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NextGenerator,
    NextPalette,
    NextOpacity,
    NextBackground,
    SwitchRenderer,
    ToggleLighting,
    ToggleJitter,
    ToggleAutoRotate,
    MoreSteps,
    FewerSteps,
    /// Move the lower cutoff bound, in steps
    CutoffLow(i32),
    CutoffHigh(i32),
    ResetCamera,
}

pub struct Viewer {
    view: VolumeView,
    settings_path: PathBuf,
    generator: usize,
    seed: u64,
    palette: usize,
    opacity: OpacityPreset,
    transfer_function: TransferFunction,
    redraw: bool,
}

impl Viewer {
    pub fn new(width: usize, height: usize, settings_path: PathBuf) -> Result<Viewer, Box<dyn Error>> {
        let settings = Settings::load(&settings_path)?;
        let mut view = VolumeView::new(width, height, settings.renderer);
        view.apply_settings(&settings);

        let palette = 0;
        let opacity = OpacityPreset::Default;
        let transfer_function = TransferFunction::new(PalettePreset::ALL[palette].colors(), opacity.table())?;
        view.set_transfer_function(&transfer_function)?;

        Ok(Viewer {
            view,
            settings_path,
            generator: 0,
            seed: 0,
            palette,
            opacity,
            transfer_function,
            redraw: true,
        })
    }

    pub fn view(&self) -> &VolumeView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut VolumeView {
        self.redraw = true;
        &mut self.view
    }

    pub fn paint(&mut self) -> Result<(), ShaderError> {
        self.view.paint()
    }

    /// Returns `true` once after every change
    pub fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.redraw, false)
    }

    /// Open a volume file. Headerless `.raw` files without `raw` parameters
    /// are described by their file name, e.g. `skull_256x256x113_uint8.raw`.
    pub fn open(&mut self, path: &Path, raw: Option<RawParams>) -> Result<(), VolumeError> {
        let raw = raw.or_else(|| raw_params_from_name(path));
        match raw {
            Some(params) => {
                let grid = load_raw(path, params)?;
                self.view.set_frame(&grid);
                self.view.set_frame_dir(path.parent().map(Path::to_path_buf));
            }
            None => self.view.open(path)?,
        }
        self.redraw = true;
        self.save_settings();
        Ok(())
    }

    pub fn generate(&mut self) -> Result<(), VolumeError> {
        let preset = Preset::ALL[self.generator];
        let grid = preset.build(GENERATED_SIDE, self.seed)?;
        self.view.set_frame(&grid);
        self.redraw = true;
        log::info!("Generated {:?}", preset);
        Ok(())
    }

    pub fn title(&self) -> String {
        let view = &self.view;
        if !view.has_frame() {
            return "vol_app - no volume".to_owned();
        }
        format!(
            "vol_app - {} | m {} | cutoff {:.2}-{:.2} | lighting {} | jitter {}",
            view.renderer_kind().name(),
            view.step_multiplier(),
            view.cutoff().low,
            view.cutoff().high,
            on_off(view.lighting()),
            on_off(view.jitter()),
        )
    }

    pub fn handle(&mut self, action: Action) -> Result<(), Box<dyn Error>> {
        let view = &mut self.view;
        let mut persisted = true;

        match action {
            Action::NextGenerator => {
                self.generator = (self.generator + 1) % Preset::ALL.len();
                self.seed = self.seed.wrapping_add(1);
                persisted = false;
                self.generate()?;
            }
            Action::NextPalette => {
                self.palette = (self.palette + 1) % PalettePreset::ALL.len();
                self.transfer_function
                    .set_colors(PalettePreset::ALL[self.palette].colors())?;
                view.set_transfer_function(&self.transfer_function)?;
                persisted = false;
            }
            Action::NextOpacity => {
                self.opacity = next_opacity(self.opacity);
                self.transfer_function.set_opacities(self.opacity.table())?;
                view.set_transfer_function(&self.transfer_function)?;
                persisted = false;
            }
            Action::NextBackground => {
                let all = backgrounds();
                let next = all
                    .iter()
                    .position(|&bg| bg == view.background())
                    .map_or(0, |i| (i + 1) % all.len());
                view.set_background(all[next]);
            }
            Action::SwitchRenderer => {
                let next = match view.renderer_kind() {
                    RendererKind::Slices => RendererKind::RayCasting,
                    RendererKind::RayCasting => RendererKind::Slices,
                };
                view.set_renderer(next);
            }
            Action::ToggleLighting => view.enable_lighting(!view.lighting()),
            Action::ToggleJitter => view.enable_jitter(!view.jitter()),
            Action::ToggleAutoRotate => view.set_auto_rotate(!view.auto_rotate()),
            Action::MoreSteps => view.set_step_multiplier((view.step_multiplier() + 1).min(MAX_STEP_MULTIPLIER)),
            Action::FewerSteps => view.set_step_multiplier(view.step_multiplier().saturating_sub(1)),
            Action::CutoffLow(steps) => {
                let cutoff = view.cutoff();
                let low = (cutoff.low + steps as f32 * CUTOFF_STEP).clamp(0.0, cutoff.high);
                view.set_cutoff(CutoffWindow::new(low, cutoff.high));
            }
            Action::CutoffHigh(steps) => {
                let cutoff = view.cutoff();
                let high = (cutoff.high + steps as f32 * CUTOFF_STEP).clamp(cutoff.low, 1.0);
                view.set_cutoff(CutoffWindow::new(cutoff.low, high));
            }
            Action::ResetCamera => {
                view.reset_camera();
                persisted = false;
            }
        }

        self.redraw = true;
        if persisted {
            self.save_settings();
        }
        Ok(())
    }

    fn save_settings(&self) {
        if let Err(e) = self.view.settings().save(&self.settings_path) {
            log::warn!("Settings not saved: {}", e);
        }
    }
}

fn raw_params_from_name(path: &Path) -> Option<RawParams> {
    let is_raw = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("raw"))
        .unwrap_or(false);
    if !is_raw {
        return None;
    }
    let params = path.to_str().and_then(RawParams::from_file_name);
    if params.is_none() {
        log::warn!("Cannot tell dimensions and type from {}", path.display());
    }
    params
}

fn next_opacity(current: OpacityPreset) -> OpacityPreset {
    match current {
        OpacityPreset::Default => OpacityPreset::Power(1),
        OpacityPreset::Power(n) if n < MAX_POWER => OpacityPreset::Power(n + 1),
        OpacityPreset::Power(_) => OpacityPreset::Log,
        OpacityPreset::Log => OpacityPreset::None,
        OpacityPreset::None => OpacityPreset::Default,
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn viewer(name: &str) -> (Viewer, PathBuf) {
        let path = std::env::temp_dir().join(format!("vol_app_{}_{}.json", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        (Viewer::new(32, 32, path.clone()).unwrap(), path)
    }

    #[test]
    fn changes_are_persisted() {
        let (mut viewer, path) = viewer("persist");

        viewer.handle(Action::ToggleLighting).unwrap();
        viewer.handle(Action::SwitchRenderer).unwrap();
        viewer.handle(Action::MoreSteps).unwrap();

        let saved = Settings::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(saved.lighting);
        assert_eq!(saved.renderer, RendererKind::RayCasting);
        assert_eq!(saved.step_multiplier, 2);
    }

    #[test]
    fn cutoff_stays_ordered() {
        let (mut viewer, path) = viewer("cutoff");

        for _ in 0..30 {
            viewer.handle(Action::CutoffLow(1)).unwrap();
        }
        viewer.handle(Action::CutoffHigh(-100)).unwrap();
        let _ = std::fs::remove_file(&path);

        let cutoff = viewer.view().cutoff();
        assert!(cutoff.low <= cutoff.high);
        assert!(cutoff.low >= 0.0 && cutoff.high <= 1.0);
    }

    #[test]
    fn opacity_cycle() {
        let mut preset = OpacityPreset::Default;
        let mut seen = Vec::new();
        for _ in 0..12 {
            preset = next_opacity(preset);
            seen.push(preset);
        }

        // x^1 .. x^9, log, none, back to default
        for n in 1..=9 {
            assert_eq!(seen[n as usize - 1], OpacityPreset::Power(n));
        }
        assert_eq!(seen[9], OpacityPreset::Log);
        assert_eq!(seen[10], OpacityPreset::None);
        assert_eq!(seen[11], OpacityPreset::Default);
    }

    #[test]
    fn background_cycle_is_saved() {
        let (mut viewer, path) = viewer("background");

        viewer.handle(Action::NextBackground).unwrap();
        let saved = Settings::load(&path).unwrap();
        viewer.handle(Action::NextBackground).unwrap();
        viewer.handle(Action::NextBackground).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(saved.background, [0.5, 0.5, 0.5]);
        assert_eq!(viewer.view().background(), color::rgb(0.0, 0.0, 0.0));
    }

    #[test]
    fn title_without_volume() {
        let (mut viewer, path) = viewer("title");
        assert_eq!(viewer.title(), "vol_app - no volume");

        viewer.generate().unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(viewer.title().contains("cutoff"));
    }

    #[test]
    fn palette_cycle_reaches_single_color() {
        let (mut viewer, path) = viewer("palette");

        let mut seen = Vec::new();
        for _ in 0..PalettePreset::ALL.len() {
            viewer.handle(Action::NextPalette).unwrap();
            seen.push(PalettePreset::ALL[viewer.palette]);
        }
        let _ = std::fs::remove_file(&path);

        assert!(seen.contains(&PalettePreset::SingleColor));
        assert_eq!(*seen.last().unwrap(), PalettePreset::Rainbow);
    }

    #[test]
    fn raw_file_sets_frame_dir() {
        let (mut viewer, path) = viewer("raw");
        let dir = std::env::temp_dir().join(format!("vol_app_raw_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let explicit = dir.join("volume.bin");
        std::fs::write(&explicit, (0..8u8).collect::<Vec<_>>()).unwrap();
        let params = "2x2x2:uint8".parse().unwrap();
        viewer.open(&explicit, Some(params)).unwrap();
        assert_eq!(viewer.view().frame_dir(), Some(dir.as_path()));

        let named = dir.join("cube_2x2x1_int16.raw");
        std::fs::write(&named, [0u8; 8]).unwrap();
        viewer.view_mut().set_frame_dir(None);
        viewer.open(&named, None).unwrap();
        assert_eq!(viewer.view().frame_dir(), Some(dir.as_path()));

        let unnamed = dir.join("unknown.raw");
        std::fs::write(&unnamed, [0u8; 8]).unwrap();
        assert!(viewer.open(&unnamed, None).is_err());

        let _ = std::fs::remove_file(&path);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn generated_volume_paints() {
        let (mut viewer, path) = viewer("generate");

        viewer.generate().unwrap();
        viewer.paint().unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(viewer.take_redraw());
        assert!(!viewer.take_redraw());
        assert!(viewer.view().has_frame());
    }
}
