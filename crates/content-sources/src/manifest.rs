// FILE: crates/content-sources/src/manifest.rs

use crate::{SourceError, SourceResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the optional bundle description file
pub const MANIFEST_FILE_NAME: &str = "summary.toml";

const DEFAULT_COVER: &str = "bookCover.jpg";

const DEFAULT_CHAPTERS: [(&str, &str); 4] = [
    ("sound1.mp3", "Lorem ipsum dolor sit amet"),
    ("sound2.mp3", "Curabitur mollis blandit pretium"),
    ("sound3.mp3", "Proin non placerat diam"),
    ("sound4.mp3", "Sed rutrum massa massa"),
];

/// A chapter entry as declared by the bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleChapter {
    /// Audio file name relative to the bundle root
    #[serde(rename = "sound")]
    pub sound_name: String,
    pub motto: String,
}

impl BundleChapter {
    pub fn new(sound_name: impl Into<String>, motto: impl Into<String>) -> Self {
        Self {
            sound_name: sound_name.into(),
            motto: motto.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    cover: Option<String>,
    #[serde(default)]
    chapters: Vec<BundleChapter>,
}

/// A directory holding a cover image and chapter audio files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleResources {
    pub root: PathBuf,
    pub cover_name: String,
    pub chapters: Vec<BundleChapter>,
}

impl Default for BundleResources {
    fn default() -> Self {
        Self::new(".")
    }
}

impl BundleResources {
    /// The stock four-chapter bundle rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cover_name: DEFAULT_COVER.to_string(),
            chapters: DEFAULT_CHAPTERS
                .iter()
                .map(|(sound, motto)| BundleChapter::new(*sound, *motto))
                .collect(),
        }
    }

    /// Reads `summary.toml` under `root`, falling back to the stock bundle
    ///
    /// ```toml
    /// cover = "bookCover.jpg"
    ///
    /// [[chapters]]
    /// sound = "sound1.mp3"
    /// motto = "Lorem ipsum dolor sit amet"
    /// ```
    pub fn from_manifest(root: impl Into<PathBuf>) -> SourceResult<Self> {
        let root = root.into();
        let path = root.join(MANIFEST_FILE_NAME);

        if !path.exists() {
            log::debug!("No manifest at {}, using stock bundle", path.display());
            return Ok(Self::new(root));
        }

        let content = fs::read_to_string(&path)?;
        let manifest: ManifestFile = toml::from_str(&content).map_err(|e| SourceError::Manifest {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        if let Some(chapter) = manifest
            .chapters
            .iter()
            .find(|chapter| chapter.sound_name.trim().is_empty())
        {
            return Err(SourceError::Manifest {
                path,
                reason: format!("chapter '{}' has no sound file", chapter.motto),
            });
        }

        log::debug!(
            "Loaded manifest {} with {} chapters",
            path.display(),
            manifest.chapters.len()
        );

        Ok(Self {
            root,
            cover_name: manifest.cover.unwrap_or_else(|| DEFAULT_COVER.to_string()),
            chapters: manifest.chapters,
        })
    }

    pub fn cover_path(&self) -> PathBuf {
        self.root.join(&self.cover_name)
    }

    pub fn chapter_path(&self, chapter: &BundleChapter) -> PathBuf {
        self.root.join(&chapter.sound_name)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
