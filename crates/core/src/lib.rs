pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorSeverity, Result};
pub use types::{
    format_time, BookSummary, Chapter, ErrorAlert, InvalidSpeed, PlaybackSpeed,
};
