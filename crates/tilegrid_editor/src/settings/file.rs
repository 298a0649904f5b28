//! Persisting `EditorSettings` as JSON under the per-user config directory

use super::EditorSettings;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file access failed: {0}")]
    Io(String),
    #[error("settings file is not valid JSON: {0}")]
    Parse(String),
    #[error("settings could not be encoded: {0}")]
    Serialize(String),
    /// The platform reports no home or config location
    #[error("no per-user config directory on this platform")]
    NoConfigDir,
}

impl EditorSettings {
    /// Per-user directory holding `settings.json`
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "tilegrid", "tilegrid_editor")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(SETTINGS_FILE))
    }

    /// Settings from the per-user file, or defaults if it is missing or unreadable
    pub fn load() -> Self {
        let loaded = Self::settings_path()
            .ok_or(SettingsError::NoConfigDir)
            .and_then(|path| Self::load_from(&path));
        match loaded {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Falling back to default settings: {}", e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| SettingsError::Io(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save settings to a specific file, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| SettingsError::Io(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| SettingsError::Serialize(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| SettingsError::Io(e.to_string()))?;

        info!("Saved settings to {:?}", path);
        Ok(())
    }
}
