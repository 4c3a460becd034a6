use std::path::{Path, PathBuf};

use {tracing::debug, uuid::Uuid};

use crate::error::{Error, Result};

const SUFFIX_LEN: usize = 12;

/// A per-request working directory that is removed when dropped.
///
/// The directory name is `<label>-<random suffix>`, so two requests for the
/// same post never share a directory. Removal errors are discarded.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create a fresh directory under `root`, creating `root` if needed.
    ///
    /// `label` must be a single path component.
    pub async fn create(root: &Path, label: &str) -> Result<Self> {
        if label.is_empty()
            || label.contains(['/', '\\'])
            || label == "."
            || label.contains("..")
        {
            return Err(Error::invalid_input(format!(
                "invalid scratch directory label: {label:?}"
            )));
        }

        tokio::fs::create_dir_all(root)
            .await
            .map_err(|e| Error::io("create", root, e))?;

        let suffix = Uuid::new_v4().simple().to_string();
        let path = root.join(format!("{label}-{}", &suffix[..SUFFIX_LEN]));
        tokio::fs::create_dir(&path)
            .await
            .map_err(|e| Error::io("create", &path, e))?;

        debug!(path = %path.display(), "created scratch directory");
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        // Whatever now sits at the path goes, even if a fetcher swapped the
        // directory for a file.
        let _ = match std::fs::symlink_metadata(&self.path) {
            Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(&self.path),
            Ok(_) => std::fs::remove_file(&self.path),
            Err(_) => Ok(()),
        };
    }
}
