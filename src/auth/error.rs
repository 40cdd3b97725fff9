//! Authentication error types.

use thiserror::Error;

use crate::client::ClientError;

/// Failures of the session storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Errors returned by login and registration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The request itself failed.
    #[error(transparent)]
    Api(#[from] ClientError),

    /// The backend explicitly refused the credentials.
    #[error("{0}")]
    Rejected(String),

    /// The backend answered with a shape none of the matchers recognize.
    #[error("Invalid response from server")]
    UnrecognizedResponse,

    /// Registration failed with a message from the backend.
    #[error("{0}")]
    Registration(String),
}
