use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

use crate::texts;

/// Configuration for the relay bot.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramBotConfig {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Bot API base URL. Leave unset for the public API; set it when running
    /// a local Bot API server (larger upload limits).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Long-polling timeout passed to `getUpdates` (seconds).
    pub poll_timeout_secs: u32,

    /// Caption attached to every relayed video.
    pub video_caption: String,

    /// Caption attached to every relayed photo.
    pub photo_caption: String,

    /// Link shown as a button under the `/start` greeting. An empty string
    /// hides the button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_url: Option<String>,
}

impl std::fmt::Debug for TelegramBotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBotConfig")
            .field("token", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish_non_exhaustive()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl TelegramBotConfig {
    /// Whether a non-blank token is configured.
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().trim().is_empty()
    }
}

impl Default for TelegramBotConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            api_url: None,
            poll_timeout_secs: 30,
            video_caption: texts::DEFAULT_VIDEO_CAPTION.into(),
            photo_caption: texts::DEFAULT_PHOTO_CAPTION.into(),
            developer_url: Some(texts::DEFAULT_DEVELOPER_URL.into()),
        }
    }
}
