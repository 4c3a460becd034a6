use std::{error::Error as StdError, path::Path};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("{message}")]
    InvalidInput { message: String },
}

impl Error {
    #[must_use]
    pub fn external<E>(context: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the path it happened on.
    #[must_use]
    pub fn io(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::external(format!("failed to {action} {}", path.display()), source)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
