//! Configuration module for the ID analysis workbench
//!
//! This module handles application configuration including:
//! - Persistent preferences and frozen analysis parameters (`config.toml`)
//! - Model presets for each parametric device family
//! - Runtime settings during execution
//!
//! Projects themselves are never written to disk.
//!
//! # Config Location
//!
//! - **Linux**: `~/.config/dev.idanalysis.workbench/`
//! - **macOS**: `~/Library/Application Support/dev.idanalysis.workbench/`
//! - **Windows**: `%APPDATA%\dev.idanalysis.workbench\`
//!
//! # Example
//!
//! ```ignore
//! use idanalysis_rs::config::AppConfig;
//!
//! let mut config = AppConfig::load_or_default();
//! config.ui.dark_mode = false;
//! config.save()?;
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{Result, ResultExt, WorkbenchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.idanalysis.workbench";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Extension of measurement files accepted by the open dialog
pub const MEASUREMENT_FILE_EXTENSION: &str = "dat";

/// Get the application config directory path
pub fn app_config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app config directory exists
pub fn ensure_app_config_dir() -> Result<PathBuf> {
    let dir = app_config_dir().ok_or_else(|| {
        WorkbenchError::Config("Could not determine app config directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            WorkbenchError::Config(format!("Failed to create app config directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Directory for rolling log files
pub fn log_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID).join("logs"))
}

/// Persistent application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Parameters every new project starts with
    #[serde(default)]
    pub analysis: AnalysisParameters,

    /// UI preferences
    #[serde(default)]
    pub ui: UiPreferences,
}

impl AppConfig {
    /// Load configuration from an explicit path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(WorkbenchError::from)
            .with_context(|| format!("Failed to read config {:?}", path))?;

        let config: AppConfig = toml::from_str(&content)?;
        config
            .analysis
            .validate()
            .with_context(|| format!("Invalid analysis parameters in {:?}", path))?;
        Ok(config)
    }

    /// Load configuration from the default location, returning defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = app_config_dir().map(|d| d.join(CONFIG_FILE)) else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)
            .map_err(|e| WorkbenchError::Config(format!("Failed to write config: {}", e)))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_config_dir()?;
        self.save_to(dir.join(CONFIG_FILE))
    }
}

/// UI preferences that persist across sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiPreferences {
    /// Enable dark mode
    #[serde(default = "default_true")]
    pub dark_mode: bool,

    /// Font scale factor
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,

    /// Directory the open-file dialog starts in
    #[serde(default)]
    pub last_directory: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_font_scale() -> f32 {
    1.0
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            font_scale: 1.0,
            last_directory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = AppConfig::default();
        config.analysis.energy_gev = 1.5;
        config.ui.dark_mode = false;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.analysis.energy_gev, 1.5);
        assert!(!loaded.ui.dark_mode);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[ui]\nfont_scale = 1.25\n").unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.ui.font_scale, 1.25);
        assert!(loaded.ui.dark_mode);
        assert_eq!(loaded.analysis, AnalysisParameters::default());
    }

    #[test]
    fn test_invalid_parameters_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[analysis]\nenergy_gev = -1.0\n").unwrap();

        assert!(AppConfig::load(&path).is_err());
    }
}
