//! Config errors

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    /// The file exists but holds nothing but whitespace
    #[error("Config file {path} is empty")]
    Empty { path: PathBuf },

    #[error("Cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Cannot render config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Written by a newer release than this one
    #[error("Config file {path} has version {found}, this build supports up to {supported}")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },

    /// Refused to save a config with invalid values
    #[error("{} invalid config value(s): {}", .0.len(), join_problems(.0))]
    Invalid(Vec<ValidationError>),

    #[error("Cannot create config directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("No config directory for this platform")]
    NoConfigDir,

    #[error("Cannot back up {path}: {source}")]
    Backup { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}

fn join_problems(problems: &[ValidationError]) -> String {
    problems
        .iter()
        .map(ValidationError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One invalid value, addressed as `section.field`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    /// The offending value as written, when there is one
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            value: Some(value.to_string()),
            ..Self::new(field, message)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} {} (got {})", self.field, self.message, value),
            None => write!(f, "{} {}", self.field, self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("player.jump_secs", "must be between 1 and 300");
        assert_eq!(err.to_string(), "player.jump_secs must be between 1 and 300");

        let err = ValidationError::with_value(
            "player.default_speed",
            "must be one of: 0.5, 1, 1.5, 2",
            1.25,
        );
        assert_eq!(
            err.to_string(),
            "player.default_speed must be one of: 0.5, 1, 1.5, 2 (got 1.25)"
        );
    }

    #[test]
    fn test_invalid_lists_every_problem() {
        let err = ConfigError::Invalid(vec![
            ValidationError::new("app.bundle_path", "must not be empty"),
            ValidationError::new("player.jump_secs", "must be between 1 and 300"),
        ]);
        assert_eq!(
            err.to_string(),
            "2 invalid config value(s): app.bundle_path must not be empty; \
             player.jump_secs must be between 1 and 300"
        );
    }
}
