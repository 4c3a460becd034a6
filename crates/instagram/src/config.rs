use serde::{Deserialize, Serialize};

/// Settings for the public-post retrieval client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InstagramConfig {
    /// Scheme and host of the web endpoint, without a trailing path.
    pub api_base: String,

    /// User agent sent with every request.
    pub user_agent: String,

    /// Web application id sent as `X-IG-App-ID`.
    pub app_id: String,

    /// Persisted GraphQL query id for a single post by shortcode.
    pub post_doc_id: String,

    /// Whole-request timeout for metadata and media downloads (seconds).
    pub request_timeout_secs: u64,

    /// Also save the cover image of every video.
    pub download_video_thumbnails: bool,

    /// Save the post caption next to the media as `<stem>.txt`.
    pub save_captions: bool,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://www.instagram.com".into(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/126.0.0.0 Safari/537.36"
                .into(),
            app_id: "936619743392459".into(),
            post_doc_id: "8845758582119845".into(),
            request_timeout_secs: 60,
            download_video_thumbnails: true,
            save_captions: true,
        }
    }
}
