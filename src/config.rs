//! Configuration file support.
//!
//! Persists operator preferences (zoom step, last-used directories, log
//! verbosity) as JSON in the platform configuration directory so a session
//! can resume where the previous one left off.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

const CONFIG_FILE: &str = "tiepoint.json";

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Application configuration that survives restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: UserPreferences::default(),
        }
    }
}

/// User preferences section of the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Multiplier applied per zoom-in wheel step (zoom-out uses its inverse)
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Last-used optical source directory
    #[serde(default)]
    pub optical_dir: Option<PathBuf>,

    /// Last-used radar source directory
    #[serde(default)]
    pub radar_dir: Option<PathBuf>,

    /// Last-used annotation save directory
    #[serde(default)]
    pub save_dir: Option<PathBuf>,
}

fn default_zoom_step() -> f32 {
    1.25
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            zoom_step: default_zoom_step(),
            log_level: LogLevel::default(),
            optical_dir: None,
            radar_dir: None,
            save_dir: None,
        }
    }
}

impl AppConfig {
    /// Default config file location under the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tiepoint").join(CONFIG_FILE))
    }

    /// Load a config from a file, falling back to defaults when it does not
    /// exist yet.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if config.version != CONFIG_VERSION {
            log::warn!(
                "Config version mismatch: expected {}, got {}",
                CONFIG_VERSION,
                config.version
            );
        }
        Ok(config)
    }

    /// Save the config, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}
