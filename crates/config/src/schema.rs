use std::path::PathBuf;

use {
    instarelay_instagram::InstagramConfig,
    instarelay_telegram::TelegramBotConfig,
    serde::{Deserialize, Serialize},
};

/// Root configuration.
///
/// Every section is optional in the file; missing keys take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub telegram: TelegramBotConfig,
    pub instagram: InstagramConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Parent of the per-request scratch directories. Defaults to
    /// `<system temp>/instarelay`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
}

impl StorageConfig {
    #[must_use]
    pub fn work_root(&self) -> PathBuf {
        self.work_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("instarelay"))
    }
}
