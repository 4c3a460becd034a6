use std::path::Path;

use async_trait::async_trait;

use crate::{error::FetchError, link::Shortcode};

/// What a successful fetch left on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Every file written, sidecar text files included.
    pub files_written: usize,
}

/// Resolves a post shortcode to media files on local disk.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download all media of `shortcode` into `target`, which already exists
    /// and is owned by the caller. Writing zero files is a success.
    async fn fetch(
        &self,
        shortcode: &Shortcode,
        target: &Path,
    ) -> Result<FetchSummary, FetchError>;
}
