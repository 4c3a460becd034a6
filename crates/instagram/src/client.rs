use std::{path::Path, time::Duration};

use {
    async_trait::async_trait,
    chrono::DateTime,
    instarelay_media::MediaKind,
    reqwest::{StatusCode, header},
    tokio::io::AsyncWriteExt,
    tracing::{debug, info, warn},
};

use crate::{
    config::InstagramConfig,
    error::{FetchError, Result},
    fetcher::{FetchSummary, MediaFetcher},
    link::Shortcode,
    model::{GraphqlResponse, PostNode},
};

/// Downloads public posts through the web GraphQL endpoint.
///
/// Built once at startup and shared; holds no per-request state.
pub struct InstagramClient {
    http: reqwest::Client,
    config: InstagramConfig,
    graphql_url: String,
}

/// One file to download, in download order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedFile {
    url: String,
    file_name: String,
}

impl InstagramClient {
    pub fn new(config: InstagramConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let graphql_url = format!("{}/graphql/query", config.api_base.trim_end_matches('/'));
        Ok(Self {
            http,
            config,
            graphql_url,
        })
    }

    async fn fetch_post(&self, shortcode: &Shortcode) -> std::result::Result<PostNode, FetchError> {
        let variables = serde_json::json!({
            "shortcode": shortcode.as_str(),
            "fetch_tagged_user_count": null,
            "hoisted_comment_id": null,
            "hoisted_reply_id": null,
        })
        .to_string();
        let referer = format!(
            "{}/p/{shortcode}/",
            self.config.api_base.trim_end_matches('/')
        );

        let response = self
            .http
            .post(&self.graphql_url)
            .header("X-IG-App-ID", self.config.app_id.as_str())
            .header(header::REFERER, referer)
            .form(&[
                ("variables", variables.as_str()),
                ("doc_id", self.config.post_doc_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::other(format!("post metadata request failed: {e}")))?;

        if response.url().path().starts_with("/accounts/login") {
            return Err(FetchError::LoginRequired);
        }

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::other(format!("failed to read post metadata: {e}")))?;
        let parsed = serde_json::from_str::<GraphqlResponse>(&body);

        if status == StatusCode::UNAUTHORIZED
            || parsed.as_ref().is_ok_and(|r| r.require_login)
        {
            return Err(FetchError::LoginRequired);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::other(
                "Instagram is rate limiting requests, try again later",
            ));
        }
        if !status.is_success() {
            return Err(FetchError::other(format!(
                "post metadata request returned HTTP {status}"
            )));
        }

        let parsed =
            parsed.map_err(|e| FetchError::other(format!("malformed post metadata: {e}")))?;
        if parsed.status.as_deref() == Some("fail") {
            let message = parsed.message.unwrap_or_else(|| "unknown error".into());
            return Err(FetchError::other(format!("Instagram refused the request: {message}")));
        }

        let node = parsed
            .data
            .and_then(|d| d.xdt_shortcode_media)
            .ok_or_else(|| {
                FetchError::other(format!("post {shortcode} not found or unavailable"))
            })?;

        if node.owner_is_private() && !node.has_media() {
            return Err(FetchError::PrivateProfile);
        }

        Ok(node)
    }

    async fn download(&self, file: &PlannedFile, target: &Path) -> std::result::Result<(), FetchError> {
        let failed = |detail: String| {
            FetchError::other(format!("failed to download {}: {detail}", file.file_name))
        };

        let mut response = self
            .http
            .get(&file.url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("HTTP {status}")));
        }

        let path = target.join(&file.file_name);
        let mut out = tokio::fs::File::create(&path)
            .await
            .map_err(|e| failed(e.to_string()))?;
        let mut written = 0usize;
        let copied: std::result::Result<(), String> = async {
            while let Some(chunk) = response.chunk().await.map_err(|e| e.to_string())? {
                out.write_all(&chunk).await.map_err(|e| e.to_string())?;
                written += chunk.len();
            }
            out.flush().await.map_err(|e| e.to_string())
        }
        .await;
        if let Err(detail) = copied {
            drop(out);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(failed(detail));
        }

        debug!(file = %file.file_name, bytes = written, "downloaded media file");
        Ok(())
    }
}

#[async_trait]
impl MediaFetcher for InstagramClient {
    async fn fetch(
        &self,
        shortcode: &Shortcode,
        target: &Path,
    ) -> std::result::Result<FetchSummary, FetchError> {
        let node = self.fetch_post(shortcode).await?;
        let stem = file_stem(&node, shortcode);
        let plan = plan_downloads(&node, &stem, self.config.download_video_thumbnails);

        info!(
            %shortcode,
            owner = node.owner.as_ref().and_then(|o| o.username.as_deref()),
            files = plan.len(),
            "fetching instagram post"
        );

        let mut summary = FetchSummary::default();
        for file in &plan {
            self.download(file, target).await?;
            summary.files_written += 1;
        }

        if self.config.save_captions
            && let Some(caption) = node.caption()
        {
            let path = target.join(format!("{stem}.txt"));
            match tokio::fs::write(&path, caption).await {
                Ok(()) => summary.files_written += 1,
                Err(e) => warn!(%shortcode, error = %e, "failed to save caption"),
            }
        }

        Ok(summary)
    }
}

/// `2024-05-01_12-30-00_UTC` from the post timestamp, or the shortcode when
/// the timestamp is missing.
fn file_stem(node: &PostNode, shortcode: &Shortcode) -> String {
    node.taken_at_timestamp
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.format("%Y-%m-%d_%H-%M-%S_UTC").to_string())
        .unwrap_or_else(|| shortcode.to_string())
}

/// Files to download for a post, in the order they should land on disk.
///
/// Videos are preceded by their cover image when `video_thumbnails` is set.
/// Carousel children get a 1-based `_<n>` suffix.
fn plan_downloads(node: &PostNode, stem: &str, video_thumbnails: bool) -> Vec<PlannedFile> {
    let mut plan = Vec::new();
    let mut push = |url: &str, suffix: &str, kind: MediaKind| {
        plan.push(PlannedFile {
            url: url.to_string(),
            file_name: format!("{stem}{suffix}.{}", kind.extension()),
        });
    };

    let children = node
        .edge_sidecar_to_children
        .as_ref()
        .map(|s| s.edges.as_slice())
        .unwrap_or_default();

    if children.is_empty() {
        if let Some(url) = node.display_url.as_deref()
            && (!node.is_video || video_thumbnails)
        {
            push(url, "", MediaKind::Image);
        }
        if node.is_video
            && let Some(url) = node.video_url.as_deref()
        {
            push(url, "", MediaKind::Video);
        }
        return plan;
    }

    for (index, edge) in children.iter().enumerate() {
        let child = &edge.node;
        let suffix = format!("_{}", index + 1);
        if let Some(url) = child.display_url.as_deref()
            && (!child.is_video || video_thumbnails)
        {
            push(url, &suffix, MediaKind::Image);
        }
        if child.is_video
            && let Some(url) = child.video_url.as_deref()
        {
            push(url, &suffix, MediaKind::Video);
        }
    }
    plan
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use {
        axum::{
            Form, Json, Router,
            extract::{Path as UrlPath, State},
            http::StatusCode as AxumStatus,
            routing::{get, post},
        },
        serde_json::{Value, json},
        std::collections::HashMap,
        tokio::sync::oneshot,
    };

    use super::*;

    #[derive(Clone)]
    struct MockInstagram {
        status: AxumStatus,
        body: Value,
        forms: Arc<Mutex<Vec<HashMap<String, String>>>>,
    }

    async fn graphql_handler(
        State(state): State<MockInstagram>,
        Form(form): Form<HashMap<String, String>>,
    ) -> (AxumStatus, Json<Value>) {
        state.forms.lock().expect("lock forms").push(form);
        (state.status, Json(state.body.clone()))
    }

    /// 4 MiB body, large enough to arrive in many chunks.
    const LARGE_REPEAT: usize = 256 * 1024;

    async fn media_handler(UrlPath(name): UrlPath<String>) -> (AxumStatus, String) {
        if name == "missing" {
            return (AxumStatus::NOT_FOUND, String::new());
        }
        if name == "large" {
            return (AxumStatus::OK, "0123456789abcdef".repeat(LARGE_REPEAT));
        }
        (AxumStatus::OK, format!("bytes of {name}"))
    }

    struct MockServer {
        client: InstagramClient,
        forms: Arc<Mutex<Vec<HashMap<String, String>>>>,
        shutdown: oneshot::Sender<()>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl MockServer {
        async fn stop(self) {
            let _ = self.shutdown.send(());
            self.handle.await.expect("server join");
        }
    }

    /// Start a mock endpoint whose GraphQL answer is built from the server
    /// base URL (so media URLs can point back at it).
    async fn start_mock(
        status: AxumStatus,
        body: impl FnOnce(&str) -> Value,
        config: InstagramConfig,
    ) -> MockServer {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let base = format!("http://{}", listener.local_addr().expect("local addr"));
        let forms = Arc::new(Mutex::new(Vec::new()));
        let state = MockInstagram {
            status,
            body: body(&base),
            forms: Arc::clone(&forms),
        };
        let app = Router::new()
            .route("/graphql/query", post(graphql_handler))
            .route("/media/{name}", get(media_handler))
            .with_state(state);

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("serve mock instagram");
        });

        let client = InstagramClient::new(InstagramConfig {
            api_base: base,
            ..config
        })
        .expect("build client");
        MockServer {
            client,
            forms,
            shutdown,
            handle,
        }
    }

    fn post_body(node: Value) -> Value {
        json!({ "data": { "xdt_shortcode_media": node }, "status": "ok" })
    }

    fn names_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn code(raw: &str) -> Shortcode {
        Shortcode::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn single_image_with_caption() {
        let server = start_mock(
            AxumStatus::OK,
            |base| {
                post_body(json!({
                    "__typename": "XDTGraphImage",
                    "display_url": format!("{base}/media/photo"),
                    "is_video": false,
                    "taken_at_timestamp": 1_700_000_000,
                    "owner": { "username": "someone", "is_private": false },
                    "edge_media_to_caption": { "edges": [ { "node": { "text": "sunset" } } ] }
                }))
            },
            InstagramConfig::default(),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let summary = server.client.fetch(&code("ABC123"), dir.path()).await.unwrap();

        assert_eq!(summary.files_written, 2);
        assert_eq!(names_in(dir.path()), vec![
            "2023-11-14_22-13-20_UTC.jpg",
            "2023-11-14_22-13-20_UTC.txt"
        ]);
        let photo = std::fs::read_to_string(dir.path().join("2023-11-14_22-13-20_UTC.jpg")).unwrap();
        assert_eq!(photo, "bytes of photo");

        {
            let forms = server.forms.lock().unwrap();
            assert_eq!(forms.len(), 1);
            assert_eq!(forms[0]["doc_id"], InstagramConfig::default().post_doc_id);
            let vars: Value = serde_json::from_str(&forms[0]["variables"]).unwrap();
            assert_eq!(vars["shortcode"], "ABC123");
        }
        server.stop().await;
    }

    #[tokio::test]
    async fn video_downloads_cover_and_clip() {
        let server = start_mock(
            AxumStatus::OK,
            |base| {
                post_body(json!({
                    "display_url": format!("{base}/media/cover"),
                    "is_video": true,
                    "video_url": format!("{base}/media/clip"),
                }))
            },
            InstagramConfig {
                save_captions: false,
                ..Default::default()
            },
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let summary = server.client.fetch(&code("REEL1"), dir.path()).await.unwrap();

        assert_eq!(summary.files_written, 2);
        assert_eq!(names_in(dir.path()), vec!["REEL1.jpg", "REEL1.mp4"]);
        server.stop().await;
    }

    #[tokio::test]
    async fn video_without_thumbnail_when_disabled() {
        let server = start_mock(
            AxumStatus::OK,
            |base| {
                post_body(json!({
                    "display_url": format!("{base}/media/cover"),
                    "is_video": true,
                    "video_url": format!("{base}/media/clip"),
                }))
            },
            InstagramConfig {
                download_video_thumbnails: false,
                ..Default::default()
            },
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        server.client.fetch(&code("REEL1"), dir.path()).await.unwrap();

        assert_eq!(names_in(dir.path()), vec!["REEL1.mp4"]);
        server.stop().await;
    }

    #[tokio::test]
    async fn sidecar_children_are_numbered() {
        let server = start_mock(
            AxumStatus::OK,
            |base| {
                post_body(json!({
                    "display_url": format!("{base}/media/first"),
                    "is_video": false,
                    "edge_sidecar_to_children": { "edges": [
                        { "node": { "display_url": format!("{base}/media/one"), "is_video": false } },
                        { "node": {
                            "display_url": format!("{base}/media/two-cover"),
                            "is_video": true,
                            "video_url": format!("{base}/media/two")
                        } }
                    ] }
                }))
            },
            InstagramConfig::default(),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let summary = server.client.fetch(&code("SIDE"), dir.path()).await.unwrap();

        assert_eq!(summary.files_written, 3);
        assert_eq!(names_in(dir.path()), vec![
            "SIDE_1.jpg",
            "SIDE_2.jpg",
            "SIDE_2.mp4"
        ]);
        server.stop().await;
    }

    #[tokio::test]
    async fn post_without_media_writes_nothing() {
        let server = start_mock(
            AxumStatus::OK,
            |_| post_body(json!({ "is_video": false })),
            InstagramConfig::default(),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let summary = server.client.fetch(&code("EMPTY"), dir.path()).await.unwrap();

        assert_eq!(summary.files_written, 0);
        assert!(names_in(dir.path()).is_empty());
        server.stop().await;
    }

    #[tokio::test]
    async fn unauthorized_means_login_required() {
        let server = start_mock(
            AxumStatus::UNAUTHORIZED,
            |_| json!({ "message": "Please wait a few minutes", "status": "fail" }),
            InstagramConfig::default(),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let err = server.client.fetch(&code("X"), dir.path()).await.unwrap_err();

        assert_eq!(err, FetchError::LoginRequired);
        server.stop().await;
    }

    #[tokio::test]
    async fn require_login_body_means_login_required() {
        let server = start_mock(
            AxumStatus::BAD_REQUEST,
            |_| json!({ "message": "login_required", "require_login": true, "status": "fail" }),
            InstagramConfig::default(),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let err = server.client.fetch(&code("X"), dir.path()).await.unwrap_err();

        assert_eq!(err, FetchError::LoginRequired);
        server.stop().await;
    }

    #[tokio::test]
    async fn private_owner_without_media() {
        let server = start_mock(
            AxumStatus::OK,
            |_| post_body(json!({ "owner": { "username": "hidden", "is_private": true } })),
            InstagramConfig::default(),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let err = server.client.fetch(&code("X"), dir.path()).await.unwrap_err();

        assert_eq!(err, FetchError::PrivateProfile);
        server.stop().await;
    }

    #[tokio::test]
    async fn missing_node_is_generic_failure() {
        let server = start_mock(
            AxumStatus::OK,
            |_| json!({ "data": { "xdt_shortcode_media": null }, "status": "ok" }),
            InstagramConfig::default(),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let err = server.client.fetch(&code("GONE"), dir.path()).await.unwrap_err();

        assert!(
            matches!(&err, FetchError::Other(detail) if detail.contains("GONE")),
            "{err:?}"
        );
        server.stop().await;
    }

    #[tokio::test]
    async fn legacy_response_shape_is_accepted() {
        let server = start_mock(
            AxumStatus::OK,
            |base| {
                json!({ "data": { "shortcode_media": {
                    "display_url": format!("{base}/media/photo"),
                    "is_video": false
                } } })
            },
            InstagramConfig::default(),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        server.client.fetch(&code("OLD"), dir.path()).await.unwrap();

        assert_eq!(names_in(dir.path()), vec!["OLD.jpg"]);
        server.stop().await;
    }

    #[tokio::test]
    async fn failed_media_download_is_reported() {
        let server = start_mock(
            AxumStatus::OK,
            |base| post_body(json!({ "display_url": format!("{base}/media/missing") })),
            InstagramConfig::default(),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let err = server.client.fetch(&code("X"), dir.path()).await.unwrap_err();

        assert!(
            matches!(&err, FetchError::Other(detail) if detail.contains("404")),
            "{err:?}"
        );
        server.stop().await;
    }

    #[tokio::test]
    async fn large_media_is_written_in_full() {
        let server = start_mock(
            AxumStatus::OK,
            |base| post_body(json!({ "display_url": format!("{base}/media/large") })),
            InstagramConfig::default(),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        server.client.fetch(&code("BIG"), dir.path()).await.unwrap();

        let bytes = std::fs::read(dir.path().join("BIG.jpg")).unwrap();
        assert_eq!(bytes.len(), 16 * LARGE_REPEAT);
        assert!(bytes.chunks(16).all(|c| c == b"0123456789abcdef"));
        server.stop().await;
    }

    #[tokio::test]
    async fn failed_download_leaves_no_file() {
        let server = start_mock(
            AxumStatus::OK,
            |base| post_body(json!({ "display_url": format!("{base}/media/missing") })),
            InstagramConfig::default(),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        assert!(server.client.fetch(&code("X"), dir.path()).await.is_err());
        assert!(names_in(dir.path()).is_empty());
        server.stop().await;
    }

    #[test]
    fn stem_falls_back_to_shortcode() {
        let node: PostNode = serde_json::from_value(json!({})).unwrap();
        assert_eq!(file_stem(&node, &code("ABC")), "ABC");
    }
}
