//! Settings persistence
//!
//! Saves and loads [`BoardSettings`] to/from a JSON file so the chosen mode,
//! difficulty and endpoints survive restarts.
//!
//! # File Location
//!
//! `settings.json` in the platform config directory, e.g.
//! `~/.config/boardsense/settings.json` on Linux. Falls back to the current
//! directory when no config directory can be resolved.
//!
//! # Error Handling
//!
//! - [`load_settings`] never fails: a missing or broken file yields defaults
//! - [`save_settings`] returns the error so the caller decides whether to care

use crate::core::error::CoreResult;
use crate::core::settings::BoardSettings;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// Resolve the default settings file path
pub fn settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "trilltino", "boardsense") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

/// Load settings from `path`, falling back to defaults
pub fn load_settings(path: &Path) -> BoardSettings {
    if !path.exists() {
        info!("[SETTINGS] No settings file found at {:?}. Using defaults.", path);
        return BoardSettings::default();
    }

    match read_settings(path) {
        Ok(settings) => {
            info!("[SETTINGS] Loaded settings from {:?}", path);
            settings
        }
        Err(e) => {
            warn!(
                "[SETTINGS] Failed to load settings file at {:?}: {}. Using defaults.",
                path, e
            );
            BoardSettings::default()
        }
    }
}

fn read_settings(path: &Path) -> CoreResult<BoardSettings> {
    let contents = fs::read_to_string(path)?;
    let settings: BoardSettings = serde_json::from_str(&contents)?;
    settings.validate()?;
    Ok(settings)
}

/// Write settings to `path`, creating its directory if needed
pub fn save_settings(path: &Path, settings: &BoardSettings) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    info!("[SETTINGS] Saved settings to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::ModeSetting;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("boardsense-test-{}-{}", std::process::id(), name))
            .join(SETTINGS_FILENAME)
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch_path("roundtrip");
        let settings = BoardSettings {
            mode: ModeSetting::Assisted,
            poll_interval_ms: 120,
            ..BoardSettings::default()
        };
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path), settings);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = scratch_path("missing");
        assert_eq!(load_settings(&path), BoardSettings::default());
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let path = scratch_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), BoardSettings::default());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_invalid_values_yield_defaults() {
        let path = scratch_path("invalid");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"poll_interval_ms":0}"#).unwrap();
        assert_eq!(load_settings(&path), BoardSettings::default());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
