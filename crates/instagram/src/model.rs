//! Response shapes of the web GraphQL post query.
//!
//! Only the fields the downloader reads are modelled; everything else in the
//! payload is ignored.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlResponse {
    pub data: Option<GraphqlData>,
    #[serde(default)]
    pub require_login: bool,
    pub message: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlData {
    #[serde(alias = "shortcode_media")]
    pub xdt_shortcode_media: Option<PostNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostNode {
    pub display_url: Option<String>,
    #[serde(default)]
    pub is_video: bool,
    pub video_url: Option<String>,
    pub taken_at_timestamp: Option<i64>,
    pub owner: Option<Owner>,
    pub edge_sidecar_to_children: Option<Edges<ChildNode>>,
    pub edge_media_to_caption: Option<Edges<CaptionNode>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Owner {
    pub username: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Edges<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChildNode {
    pub display_url: Option<String>,
    #[serde(default)]
    pub is_video: bool,
    pub video_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CaptionNode {
    pub text: String,
}

impl PostNode {
    pub fn caption(&self) -> Option<&str> {
        self.edge_media_to_caption
            .as_ref()
            .and_then(|c| c.edges.first())
            .map(|e| e.node.text.as_str())
            .filter(|t| !t.trim().is_empty())
    }

    /// Whether the node carries any downloadable URL at all.
    pub fn has_media(&self) -> bool {
        self.display_url.is_some()
            || self.video_url.is_some()
            || self
                .edge_sidecar_to_children
                .as_ref()
                .is_some_and(|s| !s.edges.is_empty())
    }

    pub fn owner_is_private(&self) -> bool {
        self.owner.as_ref().is_some_and(|o| o.is_private)
    }
}
