//! Book summary and chapter domain models

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One audio segment of a book summary with its short caption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub short_motto: String,
    pub audio_path: PathBuf,
}

impl Chapter {
    /// Creates a new chapter
    pub fn new(short_motto: impl Into<String>, audio_path: impl Into<PathBuf>) -> Self {
        Self {
            short_motto: short_motto.into(),
            audio_path: audio_path.into(),
        }
    }

    /// Returns the audio file location
    pub fn audio_path(&self) -> &Path {
        &self.audio_path
    }
}

/// A book summary: cover art plus chapters in playback order
///
/// The chapter list may be empty, in which case nothing is played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub cover_path: PathBuf,
    pub chapters: Vec<Chapter>,
}

impl BookSummary {
    /// Creates a new summary
    pub fn new(cover_path: impl Into<PathBuf>, chapters: Vec<Chapter>) -> Self {
        Self {
            cover_path: cover_path.into(),
            chapters,
        }
    }

    /// Gets a chapter by index
    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    /// Returns the total number of chapters
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Returns true if there are no chapters
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Returns true if `index` addresses an existing chapter
    pub fn contains_index(&self, index: usize) -> bool {
        index < self.chapters.len()
    }

    /// Returns formatted chapter info (e.g., "3/15")
    pub fn chapter_progress(&self, index: usize) -> String {
        match self.len() {
            0 => "No chapters".to_string(),
            count if index < count => format!("{}/{}", index + 1, count),
            count => format!("?/{}", count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_summary() -> BookSummary {
        BookSummary::new(
            "bookCover.jpg",
            vec![
                Chapter::new("Lorem ipsum dolor sit amet", "sound1.mp3"),
                Chapter::new("Curabitur mollis blandit pretium", "sound2.mp3"),
                Chapter::new("Proin non placerat diam", "sound3.mp3"),
                Chapter::new("Sed rutrum massa massa", "sound4.mp3"),
            ],
        )
    }

    #[test]
    fn test_chapter_creation() {
        let chapter = Chapter::new("Motto", "a/b.mp3");
        assert_eq!(chapter.short_motto, "Motto");
        assert_eq!(chapter.audio_path(), Path::new("a/b.mp3"));
    }

    #[test]
    fn test_summary_lookup() {
        let summary = create_test_summary();
        assert_eq!(summary.len(), 4);
        assert!(!summary.is_empty());
        assert_eq!(
            summary.chapter(2).map(|c| c.short_motto.as_str()),
            Some("Proin non placerat diam")
        );
        assert!(summary.chapter(4).is_none());
        assert!(summary.contains_index(3));
        assert!(!summary.contains_index(4));
    }

    #[test]
    fn test_empty_summary() {
        let summary = BookSummary::new("cover.jpg", Vec::new());
        assert!(summary.is_empty());
        assert!(summary.chapter(0).is_none());
        assert_eq!(summary.chapter_progress(0), "No chapters");
    }

    #[test]
    fn test_chapter_progress() {
        let summary = create_test_summary();
        assert_eq!(summary.chapter_progress(0), "1/4");
        assert_eq!(summary.chapter_progress(3), "4/4");
        assert_eq!(summary.chapter_progress(9), "?/4");
    }
}
