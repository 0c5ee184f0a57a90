//! Chapterplay Configuration System
//!
//! Settings live in a single `config.toml`, one table per [`ConfigSection`].
//!
//! - Missing files yield defaults; missing keys take their default values
//! - Invalid values are reported as warnings on load and rejected on save
//! - Writes go through a temporary file so the config is never half written
//!
//! # Example
//!
//! ```rust,no_run
//! use chapterplay_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("Speed: {}", config.player.playback_speed());
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

// Config sections
pub mod app_config;
mod player_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{apply_overrides, ConfigManager};
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use player_config::PlayerConfig;

use serde::{Deserialize, Serialize};

/// Newest file format this build reads
pub const CONFIG_VERSION: u32 = 1;

/// Contents of `config.toml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// File format version, see [`CONFIG_VERSION`]
    pub version: u32,
    pub app: AppConfig,
    pub player: PlayerConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every section, collecting all problems
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = [self.app.validate(), self.player.validate()]
            .into_iter()
            .filter_map(Result::err)
            .flatten()
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Takes every section from `other`
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.player.merge(other.player);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            player: PlayerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chapterplay_core::PlaybackSpeed;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_version_is_set() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        let mut override_config = Config::default();
        override_config.player.default_speed = 1.5;

        base.merge(override_config);
        assert_eq!(base.player.playback_speed(), PlaybackSpeed::OneAndHalf);
    }

    #[test]
    fn test_errors_collected_across_sections() {
        let mut config = Config::default();
        config.app.bundle_path = std::path::PathBuf::new();
        config.player.jump_secs = 0;

        assert_eq!(config.validate().unwrap_err().len(), 2);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[player]\ndefault_speed = 2.0\n").unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.player.default_speed, 2.0);
        assert_eq!(config.player.poll_interval_ms, 500);
        assert_eq!(config.app, AppConfig::default());
    }
}
