/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

//! Persistent viewer settings, stored as JSON.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{common::CutoffWindow, error::SettingsError, render::RendererKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RGB in `<0;1>`
    pub background: [f32; 3],
    pub cutoff: CutoffWindow,
    pub step_multiplier: u32,
    pub lighting: bool,
    pub jitter: bool,
    pub auto_rotate: bool,
    pub renderer: RendererKind,
    /// Directory of the last opened volume
    pub frame_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            background: [0.0, 0.0, 0.0],
            cutoff: CutoffWindow::default(),
            step_multiplier: 1,
            lighting: false,
            jitter: false,
            auto_rotate: false,
            renderer: RendererKind::default(),
            frame_dir: None,
        }
    }
}

impl Settings {
    /// Missing file gives default settings
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings, SettingsError> {
        let text = match fs::read_to_string(path.as_ref()) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.as_ref().display());
                return Ok(Settings::default());
            }
            Err(e) => return Err(e.into()),
        };
        let mut settings: Settings = serde_json::from_str(&text)?;
        settings.step_multiplier = settings.step_multiplier.max(1);
        Ok(settings)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::trace!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn missing_fields_default() {
        let settings: Settings = serde_json::from_str(r#"{ "lighting": true }"#).unwrap();

        assert!(settings.lighting);
        assert_eq!(settings.step_multiplier, 1);
        assert_eq!(settings.renderer, RendererKind::Slices);
    }

    #[test]
    fn missing_file() {
        let path = std::env::temp_dir().join("volren_lib_no_such_settings.json");
        let _ = fs::remove_file(&path);

        assert_eq!(Settings::load(&path).unwrap(), Settings::default());
    }

    #[test]
    fn malformed_file() {
        let path = std::env::temp_dir().join(format!("volren_lib_bad_settings_{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();

        let result = Settings::load(&path);
        fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(SettingsError::Json(_))));
    }
}
