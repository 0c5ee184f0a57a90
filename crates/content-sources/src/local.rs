// FILE: crates/content-sources/src/local.rs

use crate::{BundleResources, SourceError, SourceMetadata, SourceResult, SummaryProvider};
use chapterplay_core::{BookSummary, Chapter};
use std::future::Future;
use std::path::PathBuf;

/// Summary read from a local resource bundle
#[derive(Debug, Clone)]
pub struct LocalSummaryProvider {
    /// Human-readable name for this source
    pub name: String,
    pub resources: BundleResources,
}

impl LocalSummaryProvider {
    pub fn new(resources: BundleResources) -> Self {
        Self {
            name: "Local Bundle".to_string(),
            resources,
        }
    }

    /// Creates a provider for the bundle in `root`, honouring its manifest
    pub fn from_directory(root: impl Into<PathBuf>) -> SourceResult<Self> {
        BundleResources::from_manifest(root).map(Self::new)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builds the summary from whatever the bundle currently holds
    ///
    /// Chapters whose audio is missing are left out; a missing cover fails.
    pub fn load(&self) -> SourceResult<BookSummary> {
        let cover_path = self.resources.cover_path();
        if !cover_path.is_file() {
            return Err(SourceError::MissingResource(cover_path));
        }

        let chapters: Vec<Chapter> = self
            .resources
            .chapters
            .iter()
            .filter_map(|entry| {
                let audio_path = self.resources.chapter_path(entry);
                if audio_path.is_file() {
                    Some(Chapter::new(entry.motto.clone(), audio_path))
                } else {
                    log::warn!("Skipping chapter with missing audio: {}", audio_path.display());
                    None
                }
            })
            .collect();

        log::info!(
            "Loaded summary from {} with {} of {} chapters",
            self.resources.root().display(),
            chapters.len(),
            self.resources.chapters.len()
        );

        Ok(BookSummary::new(cover_path, chapters))
    }
}

impl Default for LocalSummaryProvider {
    fn default() -> Self {
        Self::new(BundleResources::default())
    }
}

impl SummaryProvider for LocalSummaryProvider {
    fn fetch_summary(&self) -> impl Future<Output = SourceResult<BookSummary>> + Send {
        let result = self.load();
        async move { result }
    }

    fn metadata(&self) -> SourceMetadata {
        SourceMetadata::new(
            self.name.clone(),
            format!("Book summary at {}", self.resources.root().display()),
        )
    }

    fn is_available(&self) -> bool {
        self.resources.root().is_dir()
    }
}

/// Serves a summary built in memory
#[derive(Debug, Clone)]
pub struct StaticSummaryProvider {
    summary: BookSummary,
}

impl StaticSummaryProvider {
    pub fn new(summary: BookSummary) -> Self {
        Self { summary }
    }

    /// A summary with no chapters
    pub fn empty() -> Self {
        Self::new(BookSummary::new(PathBuf::new(), Vec::new()))
    }
}

impl SummaryProvider for StaticSummaryProvider {
    fn fetch_summary(&self) -> impl Future<Output = SourceResult<BookSummary>> + Send {
        let summary = self.summary.clone();
        async move { Ok(summary) }
    }

    fn metadata(&self) -> SourceMetadata {
        SourceMetadata::new("In-memory", format!("{} chapters", self.summary.len()))
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BundleChapter;
    use std::fs;
    use tempfile::TempDir;

    fn stock_bundle_dir(sounds: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bookCover.jpg"), b"jpeg").unwrap();
        for sound in sounds {
            fs::write(dir.path().join(sound), b"mp3").unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_full_bundle() {
        let dir = stock_bundle_dir(&["sound1.mp3", "sound2.mp3", "sound3.mp3", "sound4.mp3"]);
        let provider = LocalSummaryProvider::from_directory(dir.path()).unwrap();

        let summary = provider.fetch_summary().await.unwrap();
        assert_eq!(summary.len(), 4);
        assert_eq!(summary.cover_path, dir.path().join("bookCover.jpg"));
        assert_eq!(summary.chapters[1].short_motto, "Curabitur mollis blandit pretium");
        assert_eq!(summary.chapters[3].audio_path, dir.path().join("sound4.mp3"));
    }

    #[tokio::test]
    async fn test_missing_chapter_audio_skipped_in_order() {
        let dir = stock_bundle_dir(&["sound1.mp3", "sound3.mp3"]);
        let provider = LocalSummaryProvider::from_directory(dir.path()).unwrap();

        let summary = provider.fetch_summary().await.unwrap();
        let mottos: Vec<&str> = summary.chapters.iter().map(|c| c.short_motto.as_str()).collect();
        assert_eq!(mottos, vec!["Lorem ipsum dolor sit amet", "Proin non placerat diam"]);
    }

    #[tokio::test]
    async fn test_missing_cover_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("sound1.mp3"), b"mp3").unwrap();
        let provider = LocalSummaryProvider::new(BundleResources::new(dir.path()));

        let result = provider.fetch_summary().await;
        assert!(matches!(result, Err(SourceError::MissingResource(p)) if p.ends_with("bookCover.jpg")));
    }

    #[tokio::test]
    async fn test_no_audio_yields_empty_summary() {
        let dir = stock_bundle_dir(&[]);
        let provider = LocalSummaryProvider::new(BundleResources::new(dir.path()));

        let summary = provider.fetch_summary().await.unwrap();
        assert!(summary.is_empty());
    }

    #[test]
    fn test_metadata_and_availability() {
        let dir = stock_bundle_dir(&[]);
        let provider = LocalSummaryProvider::new(BundleResources::new(dir.path())).with_name("Demo");
        assert_eq!(provider.metadata().name, "Demo");
        assert!(provider.is_available());

        let gone = LocalSummaryProvider::new(BundleResources {
            root: PathBuf::from("/nonexistent/bundle"),
            cover_name: "c.jpg".to_string(),
            chapters: vec![BundleChapter::new("a.mp3", "A")],
        });
        assert!(!gone.is_available());
    }

    #[tokio::test]
    async fn test_static_provider() {
        let summary = BookSummary::new("cover.jpg", vec![Chapter::new("One", "one.mp3")]);
        let provider = StaticSummaryProvider::new(summary.clone());
        assert_eq!(provider.fetch_summary().await.unwrap(), summary);
        assert!(StaticSummaryProvider::empty().fetch_summary().await.unwrap().is_empty());
    }
}
