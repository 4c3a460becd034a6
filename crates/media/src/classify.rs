use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Kind of a deliverable media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    /// Extension written for this kind when downloading, without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Image => "jpg",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
        }
    }
}

const VIDEO_SUFFIXES: &[&str] = &[".mp4"];
const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".jpeg"];

/// A file found in a download directory together with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFile {
    pub path: PathBuf,
    pub kind: MediaKind,
}

/// Classify a file name by suffix. Matching is case-sensitive; anything
/// that is neither a video nor an image yields `None`.
#[must_use]
pub fn classify_name(name: &str) -> Option<MediaKind> {
    if VIDEO_SUFFIXES.iter().any(|s| name.ends_with(s)) {
        Some(MediaKind::Video)
    } else if IMAGE_SUFFIXES.iter().any(|s| name.ends_with(s)) {
        Some(MediaKind::Image)
    } else {
        None
    }
}

/// List the immediate entries of `dir` and keep the deliverable ones.
///
/// The directory listing order is preserved; no sorting or grouping by kind
/// happens here.
pub async fn classify_dir(dir: &Path) -> Result<Vec<ClassifiedFile>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| Error::io("list", dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io("list", dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| Error::io("stat", &entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(kind) = name.to_str().and_then(classify_name) else {
            debug!(file = ?name, "skipping non-media file");
            continue;
        };
        files.push(ClassifiedFile {
            path: entry.path(),
            kind,
        });
    }

    Ok(files)
}
