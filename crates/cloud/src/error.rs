//! Error types for STAC access.

use thiserror::Error;

/// Errors produced while talking to a STAC API.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("STAC API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid STAC response: {0}")]
    Parse(String),

    #[error("core error: {0}")]
    Core(#[from] litterscope_core::Error),
}

impl CloudError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            CloudError::Http(_) | CloudError::Network(_) => true,
            CloudError::Status { status, .. } => *status == 429 || *status >= 500,
            CloudError::Parse(_) | CloudError::Core(_) => false,
        }
    }
}

impl From<CloudError> for litterscope_core::Error {
    fn from(e: CloudError) -> Self {
        match e {
            CloudError::Core(inner) => inner,
            other => litterscope_core::Error::Imagery(other.to_string()),
        }
    }
}

/// Result alias for cloud operations.
pub type Result<T> = std::result::Result<T, CloudError>;
