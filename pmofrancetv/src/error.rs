//! Error types for the France.tv client

use std::sync::Arc;

/// Result type alias for France.tv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the France.tv client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered outside the 2xx range
    #[error("HTTP {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure of a cached computation awaited by several callers
    #[error("{0}")]
    Shared(Arc<Error>),
}

impl Error {
    /// HTTP status of a non-2xx response, if that is what failed
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(err) => err.status(),
            Self::Shared(inner) => inner.status(),
            _ => None,
        }
    }
}

impl From<Arc<Error>> for Error {
    fn from(err: Arc<Error>) -> Self {
        Arc::try_unwrap(err).unwrap_or_else(Error::Shared)
    }
}
