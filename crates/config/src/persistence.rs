//! Reading and writing `config.toml`
//!
//! Saves write a sibling temporary file and rename it over the target, and
//! the file being replaced is first copied to `config.toml.backup`.

use crate::{Config, ConfigError, ConfigResult, CONFIG_VERSION};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Owns the location of one config file
pub struct ConfigPersistence {
    config_path: PathBuf,
}

impl ConfigPersistence {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn exists(&self) -> bool {
        self.config_path.is_file()
    }

    /// Loads the file, or the defaults when there is no file yet
    ///
    /// Invalid values are logged but still returned so the user can fix
    /// them by hand.
    pub fn load(&self) -> ConfigResult<Config> {
        if !self.exists() {
            log::info!(
                "No config at {}, using defaults",
                self.config_path.display()
            );
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&self.config_path).map_err(|source| ConfigError::Read {
            path: self.config_path.clone(),
            source,
        })?;
        let config = self.parse(&contents)?;

        if let Err(problems) = config.validate() {
            for problem in &problems {
                log::warn!("{}: {}", self.config_path.display(), problem);
            }
        }

        Ok(config)
    }

    fn parse(&self, contents: &str) -> ConfigResult<Config> {
        if contents.trim().is_empty() {
            return Err(ConfigError::Empty {
                path: self.config_path.clone(),
            });
        }

        let config: Config = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: self.config_path.clone(),
            source,
        })?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                path: self.config_path.clone(),
                found: config.version,
                supported: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Validates, then replaces the file atomically
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        config.validate().map_err(ConfigError::Invalid)?;
        let rendered = toml::to_string_pretty(config)?;

        let dir = self.parent_dir()?;
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
            log::info!("Created config directory {}", dir.display());
        }

        if self.exists() {
            let backup = self.backup_path();
            fs::copy(&self.config_path, &backup).map_err(|source| ConfigError::Backup {
                path: self.config_path.clone(),
                source,
            })?;
            log::debug!("Previous config kept at {}", backup.display());
        }

        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(rendered.as_bytes())?;
        staged.flush()?;
        staged
            .persist(&self.config_path)
            .map_err(|e| ConfigError::Write {
                path: self.config_path.clone(),
                source: e.error,
            })?;

        log::info!("Config saved to {}", self.config_path.display());
        Ok(())
    }

    pub fn backup_path(&self) -> PathBuf {
        self.config_path.with_extension("toml.backup")
    }

    fn parent_dir(&self) -> ConfigResult<&Path> {
        match self.config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => Ok(dir),
            Some(_) => Ok(Path::new(".")),
            None => Err(ConfigError::NoConfigDir),
        }
    }
}
