// FILE: crates/content-sources/src/lib.rs

mod local;
mod manifest;
mod traits;

pub use local::{LocalSummaryProvider, StaticSummaryProvider};
pub use manifest::{BundleChapter, BundleResources, MANIFEST_FILE_NAME};
use std::path::PathBuf;
use thiserror::Error;
pub use traits::{SourceMetadata, SummaryProvider};

/// Result type for content source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors from summary providers
#[derive(Debug, Error)]
pub enum SourceError {
    /// A file the summary cannot do without is absent
    #[error("Missing resource: {}", .0.display())]
    MissingResource(PathBuf),

    /// The bundle manifest exists but cannot be used
    #[error("Invalid manifest {}: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
