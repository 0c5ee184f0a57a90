//! Configuration manager, the main API for config operations

use crate::persistence::ConfigPersistence;
use crate::{Config, ConfigError, ConfigResult, LogLevel};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Applies `CHAPTERPLAY_SECTION_FIELD` overrides found through `lookup`
///
/// Unparsable values are logged and ignored.
pub fn apply_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(speed) = lookup("CHAPTERPLAY_PLAYER_DEFAULT_SPEED") {
        match speed.trim().parse::<f32>() {
            Ok(s) => config.player.default_speed = s,
            Err(e) => log::warn!("Ignoring CHAPTERPLAY_PLAYER_DEFAULT_SPEED={}: {}", speed, e),
        }
    }

    if let Some(jump) = lookup("CHAPTERPLAY_PLAYER_JUMP_SECS") {
        match jump.trim().parse::<u32>() {
            Ok(j) => config.player.jump_secs = j,
            Err(e) => log::warn!("Ignoring CHAPTERPLAY_PLAYER_JUMP_SECS={}: {}", jump, e),
        }
    }

    if let Some(level) = lookup("CHAPTERPLAY_APP_LOG_LEVEL") {
        match level.parse::<LogLevel>() {
            Ok(l) => config.app.log_level = l,
            Err(e) => log::warn!("Ignoring CHAPTERPLAY_APP_LOG_LEVEL: {}", e),
        }
    }

    if let Some(bundle) = lookup("CHAPTERPLAY_APP_BUNDLE_PATH") {
        config.app.bundle_path = PathBuf::from(bundle);
    }
}

/// Locates `config.toml` and runs every config operation against it
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Uses the platform config directory
    ///
    /// - Linux: `~/.config/chapterplay/`
    /// - macOS: `~/Library/Application Support/chapterplay/`
    /// - Windows: `%APPDATA%\chapterplay\`
    pub fn new() -> ConfigResult<Self> {
        let dirs = ProjectDirs::from("", "", "chapterplay").ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_directory(dirs.config_dir()))
    }

    pub fn with_directory(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            persistence: ConfigPersistence::new(config_dir.join(CONFIG_FILE_NAME)),
            config_dir,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.persistence.path().to_path_buf()
    }

    pub fn load(&self) -> ConfigResult<Config> {
        self.persistence.load()
    }

    /// Like [`load`](Self::load), but any failure yields the defaults
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_else(|e| {
            log::warn!("{}, using defaults", e);
            Config::default()
        })
    }

    /// Loads the file and applies `CHAPTERPLAY_*` environment variables
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_overrides(&mut config, |key| std::env::var(key).ok());

        if let Err(problems) = config.validate() {
            for problem in &problems {
                log::warn!("After environment overrides: {}", problem);
            }
        }

        Ok(config)
    }

    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Loads, edits and saves in one step
    ///
    /// ```rust,no_run
    /// # use chapterplay_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.player.jump_secs = 30;
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, edit: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        edit(&mut config);
        self.save(&config)
    }

    /// Writes the defaults unless a file is already there
    ///
    /// Returns whether a file was written.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.persistence.exists() {
            log::debug!("Keeping existing {}", self.persistence.path().display());
            return Ok(false);
        }

        self.save(&Config::default())?;
        Ok(true)
    }

    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Every invalid value in the file, rendered for display
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let problems = match self.load()?.validate() {
            Ok(()) => Vec::new(),
            Err(problems) => problems.iter().map(ToString::to_string).collect(),
        };
        Ok(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn setup_test_manager() -> (TempDir, ConfigManager) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manager = ConfigManager::with_directory(temp_dir.path());
        (temp_dir, manager)
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_load_or_default_with_missing_file() {
        let (_temp_dir, manager) = setup_test_manager();
        assert_eq!(manager.load_or_default(), Config::default());
    }

    #[test]
    fn test_load_or_default_with_corrupt_file() {
        let (_temp_dir, manager) = setup_test_manager();
        std::fs::write(manager.config_path(), "[player\n").expect("Should write");
        assert_eq!(manager.load_or_default(), Config::default());
    }

    #[test]
    fn test_update() {
        let (_temp_dir, manager) = setup_test_manager();
        manager.save(&Config::default()).expect("Should save");

        manager
            .update(|config| config.player.jump_secs = 45)
            .expect("Should update");

        let loaded = manager.load().expect("Should load");
        assert_eq!(loaded.player.jump_secs, 45);
    }

    #[test]
    fn test_initialize_creates_file_once() {
        let (_temp_dir, manager) = setup_test_manager();

        assert!(manager.initialize().expect("Should initialize"));
        assert!(manager.config_path().exists());
        assert!(!manager.initialize().expect("Should initialize"));
    }

    #[test]
    fn test_reset() {
        let (_temp_dir, manager) = setup_test_manager();

        let mut config = Config::default();
        config.player.default_speed = 2.0;
        manager.save(&config).expect("Should save");

        manager.reset().expect("Should reset");
        assert_eq!(manager.load().expect("Should load"), Config::default());
    }

    #[test]
    fn test_validate_reports_file_problems() {
        let (_temp_dir, manager) = setup_test_manager();
        std::fs::write(
            manager.config_path(),
            "[player]\npoll_interval_ms = 10\njump_secs = 0\n",
        )
        .expect("Should write");

        let errors = manager.validate().expect("Should validate");
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("player.poll_interval_ms"));
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = Config::default();
        apply_overrides(
            &mut config,
            env(&[
                ("CHAPTERPLAY_PLAYER_DEFAULT_SPEED", "1.5"),
                ("CHAPTERPLAY_PLAYER_JUMP_SECS", "10"),
                ("CHAPTERPLAY_APP_LOG_LEVEL", "debug"),
                ("CHAPTERPLAY_APP_BUNDLE_PATH", "/srv/bundle"),
            ]),
        );

        assert_eq!(config.player.default_speed, 1.5);
        assert_eq!(config.player.jump_secs, 10);
        assert_eq!(config.app.log_level, LogLevel::Debug);
        assert_eq!(config.app.bundle_path, PathBuf::from("/srv/bundle"));
    }

    #[test]
    fn test_unparsable_overrides_ignored() {
        let mut config = Config::default();
        apply_overrides(
            &mut config,
            env(&[
                ("CHAPTERPLAY_PLAYER_DEFAULT_SPEED", "fast"),
                ("CHAPTERPLAY_APP_LOG_LEVEL", "loud"),
            ]),
        );

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_file_path() {
        let (temp_dir, manager) = setup_test_manager();
        assert_eq!(manager.config_dir(), temp_dir.path());
        assert!(manager.config_path().ends_with("config.toml"));
    }
}
