//! The link relay workflow: validate, fetch, classify, deliver, clean up.

use {
    instarelay_instagram::{FetchError, Shortcode, is_instagram_link},
    instarelay_media::{MediaKind, ScratchDir, classify_dir},
    teloxide::types::{ChatId, MessageId},
    tracing::{debug, info, warn},
};

use crate::{
    error::{Error, Result},
    outbound::RelayOutbound,
    state::RelayState,
    texts,
};

/// An inbound text message to relay.
#[derive(Debug, Clone)]
pub struct LinkRequest {
    pub chat_id: ChatId,
    /// The user's message; every reply is threaded to it.
    pub message_id: MessageId,
    pub text: String,
}

/// Terminal state of one relay request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Not a link; the rejection reply was sent and nothing else happened.
    Rejected,
    /// All classified files were sent.
    Delivered { sent: usize },
    /// The fetch succeeded but left nothing deliverable.
    Empty,
    Failed(FailureReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    PrivateProfile,
    LoginRequired,
    /// Anything else, with the underlying error text.
    Other(String),
}

impl From<FetchError> for FailureReason {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::PrivateProfile => Self::PrivateProfile,
            FetchError::LoginRequired => Self::LoginRequired,
            FetchError::Other(detail) => Self::Other(detail),
        }
    }
}

impl RelayOutcome {
    /// Final text of the status message, if a status message was sent.
    #[must_use]
    pub fn status_text(&self) -> Option<String> {
        match self {
            Self::Rejected => None,
            Self::Delivered { .. } => Some(texts::DELIVERED.into()),
            Self::Empty => Some(texts::NOTHING_FOUND.into()),
            Self::Failed(FailureReason::PrivateProfile) => Some(texts::PRIVATE_PROFILE.into()),
            Self::Failed(FailureReason::LoginRequired) => Some(texts::LOGIN_REQUIRED.into()),
            Self::Failed(FailureReason::Other(detail)) => Some(texts::generic_error(detail)),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Rejected => "rejected",
            Self::Delivered { .. } => "delivered",
            Self::Empty => "empty",
            Self::Failed(_) => "failed",
        }
    }
}

/// Run the relay workflow for one message.
///
/// Only failures to send or edit the status message are returned as errors;
/// every fetch, classification and delivery problem ends up in the outcome.
pub async fn relay_link(
    state: &RelayState,
    outbound: &dyn RelayOutbound,
    request: &LinkRequest,
) -> Result<RelayOutcome> {
    let chat_id = request.chat_id;
    let link = request.text.trim();

    if !is_instagram_link(link) {
        debug!(chat_id = chat_id.0, "rejecting non-instagram text");
        outbound
            .send_text(chat_id, Some(request.message_id), texts::NOT_A_LINK)
            .await?;
        return Ok(RelayOutcome::Rejected);
    }

    let status_id = outbound
        .send_text(chat_id, Some(request.message_id), texts::DOWNLOADING)
        .await?;

    let outcome = fetch_and_deliver(state, outbound, request, link).await;
    match &outcome {
        RelayOutcome::Failed(FailureReason::Other(detail)) => {
            warn!(chat_id = chat_id.0, error = %detail, "relay failed");
        },
        other => info!(chat_id = chat_id.0, outcome = other.label(), "relay finished"),
    }

    if let Some(text) = outcome.status_text() {
        outbound.edit_text(chat_id, status_id, &text).await?;
    }
    Ok(outcome)
}

/// Everything between the pending status and its final edit. The scratch
/// directory lives exactly as long as this call, whichever step fails.
async fn fetch_and_deliver(
    state: &RelayState,
    outbound: &dyn RelayOutbound,
    request: &LinkRequest,
    link: &str,
) -> RelayOutcome {
    match deliver_post(state, outbound, request, link).await {
        Ok(0) => RelayOutcome::Empty,
        Ok(sent) => RelayOutcome::Delivered { sent },
        Err(Error::Fetch(e)) => RelayOutcome::Failed(e.into()),
        Err(e) => RelayOutcome::Failed(FailureReason::Other(e.to_string())),
    }
}

/// Fetch into a fresh scratch directory and send every classified file.
/// Returns the number of files sent.
async fn deliver_post(
    state: &RelayState,
    outbound: &dyn RelayOutbound,
    request: &LinkRequest,
    link: &str,
) -> Result<usize> {
    let shortcode = Shortcode::from_link(link)?;
    let scratch = ScratchDir::create(&state.work_root, shortcode.as_str()).await?;

    state.fetcher.fetch(&shortcode, scratch.path()).await?;

    let files = classify_dir(scratch.path()).await?;
    for file in &files {
        let caption = match file.kind {
            MediaKind::Video => state.config.video_caption.as_str(),
            MediaKind::Image => state.config.photo_caption.as_str(),
        };
        outbound
            .send_media(request.chat_id, request.message_id, file, caption)
            .await?;
    }
    Ok(files.len())
}
