// FILE: crates/media-engine/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Failures inside the engine's own decode/output pipeline
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("Seek error: {0}")]
    SeekError(String),

    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// A resource-level playback failure delivered on the error stream
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Cannot open audio: {0}")]
    Open(String),

    #[error("Cannot decode audio: {0}")]
    Decode(String),

    #[error("Audio output failed: {0}")]
    Output(String),

    #[error("Cannot seek: {0}")]
    Seek(String),

    #[error("{0}")]
    Other(String),
}

impl From<EngineError> for TransportError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound(path) => {
                TransportError::Open(format!("file not found: {}", path.display()))
            }
            EngineError::IoError(e) => TransportError::Open(e.to_string()),
            EngineError::DecodeError(msg) => TransportError::Decode(msg),
            EngineError::OutputError(msg) => TransportError::Output(msg),
            EngineError::SeekError(msg) => TransportError::Seek(msg),
            EngineError::InvalidState(msg) => TransportError::Other(msg),
        }
    }
}
