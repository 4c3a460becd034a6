use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),

    #[error(transparent)]
    Media(#[from] instarelay_media::Error),

    #[error(transparent)]
    Instagram(#[from] instarelay_instagram::Error),

    #[error(transparent)]
    Fetch(#[from] instarelay_instagram::FetchError),
}

pub type Result<T> = std::result::Result<T, Error>;
