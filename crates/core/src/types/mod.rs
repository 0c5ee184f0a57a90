//! Domain types for Chapterplay
//!
//! This module contains the domain models organized by responsibility:
//! - `summary`: Book summary and its chapters
//! - `playback`: Playback speed selection
//! - `alert`: User-facing playback alerts
//! - `common`: Shared utilities

mod alert;
mod common;
mod playback;
mod summary;

// Re-export all public types
pub use alert::ErrorAlert;
pub use common::format_time;
pub use playback::{InvalidSpeed, PlaybackSpeed};
pub use summary::{BookSummary, Chapter};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_all_types_are_exported() {
        let chapter = Chapter::new("Motto", PathBuf::from("sound1.mp3"));
        let summary = BookSummary::new(PathBuf::from("bookCover.jpg"), vec![chapter]);
        assert_eq!(summary.len(), 1);
        assert_eq!(PlaybackSpeed::default(), PlaybackSpeed::Normal);
        let _alert = ErrorAlert::playback("boom");
    }

    #[test]
    fn test_time_formatting() {
        assert_eq!(format_time(65.0), "01:05");
    }
}
