//! Application configuration and constants.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::{info, warn};
use serde::Deserialize;

/// Window caption, shown as the header line.
pub const APP_TITLE: &str = "B-Citation Generator";

/// Logical canvas the bubbles live in, scaled onto the terminal.
pub const CANVAS_WIDTH: f32 = 800.0;
pub const CANVAS_HEIGHT: f32 = 600.0;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "BCITE_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Main loop tick rate in milliseconds (target 60 FPS = ~16ms)
    pub tick_rate_ms: u64,

    /// How many ticks to show status messages (180 = ~3s at 60fps)
    pub status_timeout_ticks: u64,

    /// Modulo for animation frame counter
    pub animation_frame_mod: usize,

    /// Fluid grid cells per side
    pub grid_size: usize,

    /// Decay applied on every fluid step, must be in [0, 1)
    pub viscosity: f32,

    /// Added to the cell under the pointer when it moves
    pub mouse_influence: f32,

    /// Written to the cell under the pointer on press
    pub press_value: f32,

    /// Starting value of the visible fluid buffer
    pub initial_fill: f32,

    pub bubble_count: usize,

    pub fetch_timeout_secs: u64,

    /// Style selected at startup: "APA", "MLA" or "Chicago"
    pub default_style: String,

    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate_ms: 16,
            status_timeout_ticks: 180,
            animation_frame_mod: 360,
            grid_size: 100,
            viscosity: 0.93,
            mouse_influence: 0.7,
            press_value: 1.0,
            initial_fill: 0.05,
            bubble_count: 10,
            fetch_timeout_secs: 10,
            default_style: "MLA".to_string(),
            user_agent: format!("bcite/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Invalid(e) => write!(f, "Invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json(&json)
    }

    /// Load from `path` if it exists; any problem falls back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 3 {
            return Err(ConfigError::Invalid(format!(
                "grid_size must be at least 3, got {}",
                self.grid_size
            )));
        }
        if !(0.0..1.0).contains(&self.viscosity) {
            return Err(ConfigError::Invalid(format!(
                "viscosity must be in [0, 1), got {}",
                self.viscosity
            )));
        }
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::Invalid("tick_rate_ms must be positive".to_string()));
        }
        if self.animation_frame_mod == 0 {
            return Err(ConfigError::Invalid("animation_frame_mod must be positive".to_string()));
        }
        Ok(())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "bcite", "bcite")
}

/// `$BCITE_CONFIG`, else `config.json` in the platform config directory.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
}

/// Directory for the log file.
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_size, 100);
        assert_eq!(config.viscosity, 0.93);
        assert_eq!(config.mouse_influence, 0.7);
        assert_eq!(config.default_style, "MLA");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{"grid_size": 40, "default_style": "APA"}"#).unwrap();
        assert_eq!(config.grid_size, 40);
        assert_eq!(config.default_style, "APA");
        assert_eq!(config.bubble_count, 10);
        assert_eq!(config.tick_rate_ms, 16);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            Config::from_json(r#"{"grid_size": 2}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{"viscosity": 1.5}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{"tick_rate_ms": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(Config::from_json("{not json"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_or_default_fallbacks() {
        assert_eq!(Config::load_or_default(None), Config::default());

        let missing = std::env::temp_dir().join("bcite-missing-config.json");
        assert_eq!(Config::load_or_default(Some(&missing)), Config::default());

        let bad = std::env::temp_dir().join(format!("bcite-bad-config-{}.json", std::process::id()));
        fs::write(&bad, "{\"viscosity\": -1}").unwrap();
        assert_eq!(Config::load_or_default(Some(&bad)), Config::default());

        fs::write(&bad, "{\"bubble_count\": 3}").unwrap();
        assert_eq!(Config::load_or_default(Some(&bad)).bubble_count, 3);
        let _ = fs::remove_file(&bad);
    }
}
