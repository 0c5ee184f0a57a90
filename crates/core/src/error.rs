//! Error types for Chapterplay
//!
//! Errors are grouped by how the player reacts to them:
//! - **Degraded**: a feature is unavailable but the session continues
//!   (no summary could be retrieved, a chapter failed to play)
//! - **Fatal**: the front end cannot start (no audio device, unusable config)
//!
//! Library crates define their own error enums; this type is what the
//! front end reports to the user.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Feature degraded but app can continue
    Degraded,
    /// Critical error requiring restart or user action
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Main error type for Chapterplay
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Retrieval Errors =====
    /// The summary could not be retrieved from its provider
    #[error("Summary retrieval failed: {reason}")]
    SummaryUnavailable { reason: String },

    /// A bundled resource is missing
    #[error("Missing resource: {path}")]
    MissingResource { path: PathBuf },

    // ===== Playback Errors =====
    /// The audio backend reported a failure for the current chapter
    #[error("Playback error: {message}")]
    PlaybackResource { message: String },

    /// Audio output device unavailable
    #[error("Playback device error: {message}")]
    PlaybackDeviceError { message: String },

    // ===== Configuration Errors =====
    /// Invalid configuration
    #[error("Invalid configuration: {setting} = '{value}' ({reason})")]
    InvalidConfiguration {
        setting: String,
        value: String,
        reason: String,
    },

    // ===== Generic Errors =====
    /// General I/O error
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },

    /// Generic internal error
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SummaryUnavailable { .. }
            | Self::MissingResource { .. }
            | Self::PlaybackResource { .. } => ErrorSeverity::Degraded,

            Self::PlaybackDeviceError { .. }
            | Self::InvalidConfiguration { .. }
            | Self::IoError { .. }
            | Self::InternalError { .. } => ErrorSeverity::Fatal,
        }
    }

    /// Returns a user-friendly error message suitable for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            Self::SummaryUnavailable { .. } => {
                "The book summary is not available right now.".to_string()
            }
            Self::MissingResource { path } => {
                format!("A bundled file is missing: {}", path.display())
            }
            Self::PlaybackResource { message } => message.clone(),
            Self::PlaybackDeviceError { .. } => {
                "Cannot access audio playback. Please check your device settings.".to_string()
            }
            Self::InvalidConfiguration { setting, .. } => {
                format!("Invalid setting: {}. Please check your configuration.", setting)
            }
            Self::IoError { .. } => "A file operation failed. Please try again.".to_string(),
            Self::InternalError { .. } => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }

    /// Returns true if this error should be logged at ERROR level
    pub fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        Self::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}
