use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid post identifier: {message}")]
    InvalidShortcode { message: String },

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

impl Error {
    #[must_use]
    pub fn invalid_shortcode(message: impl Into<String>) -> Self {
        Self::InvalidShortcode {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a fetch did not produce media.
///
/// The first two variants are the access restrictions the relay reports with
/// dedicated texts; everything else carries a human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("the account is private and not followed")]
    PrivateProfile,

    #[error("login required to access this post")]
    LoginRequired,

    #[error("{0}")]
    Other(String),
}

impl FetchError {
    #[must_use]
    pub fn other(detail: impl Into<String>) -> Self {
        Self::Other(detail.into())
    }
}
