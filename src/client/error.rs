//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the request helper and the typed API namespaces.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("Failed to reach {url}: {message}")]
    Transport { url: String, message: String },

    /// The proxy answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The response body was not what the caller expected.
    #[error("Invalid JSON response: {0}")]
    Decode(String),

    /// A request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status for [`ClientError::Status`] failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
