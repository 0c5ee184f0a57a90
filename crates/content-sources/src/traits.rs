// FILE: src/traits.rs
// ============================================================================

use crate::SourceResult;
use chapterplay_core::BookSummary;
use std::future::Future;

/// Supplies the book summary for a listening session
pub trait SummaryProvider: Send + Sync + 'static {
    /// Retrieves the summary; called once per session
    fn fetch_summary(&self) -> impl Future<Output = SourceResult<BookSummary>> + Send;

    /// Get metadata about the source
    fn metadata(&self) -> SourceMetadata;

    /// Check if source is available
    fn is_available(&self) -> bool;
}

/// Source metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMetadata {
    pub name: String,
    pub description: String,
}

impl SourceMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}
