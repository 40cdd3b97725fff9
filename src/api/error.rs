//! Proxy-side error handling.
//!
//! Failures that originate in the proxy itself (as opposed to error statuses
//! passed through from the backend) are rendered with the same `{error}`
//! envelope the backend passthrough uses.

use axum::{
    Json,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::envelope::Envelope;

/// Proxy error type.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The inbound POST/PUT body was not valid JSON.
    #[error("{0}")]
    InvalidBody(String),

    /// The proxied path could not be decoded.
    #[error("{0}")]
    InvalidPath(String),

    /// Reaching the backend or reading its response failed.
    #[error("{0}")]
    Upstream(String),

    /// The proxy could not build the outbound request.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Invalid request body for the given method.
    pub fn invalid_body(method: &Method) -> Self {
        if *method == Method::PUT {
            Self::InvalidBody("Invalid JSON in request body for PUT.".to_string())
        } else {
            Self::InvalidBody("Invalid JSON in request body.".to_string())
        }
    }

    /// Upstream failure, falling back to a generic message naming the method.
    pub fn upstream(method: &Method, message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::Upstream(format!("Failed to fetch from API ({method})"))
        } else {
            Self::Upstream(message)
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) | Self::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        match &self {
            ApiError::Upstream(msg) | ApiError::Internal(msg) => {
                error!(status = status.as_u16(), message = %msg, "proxy error");
            }
            ApiError::InvalidBody(msg) => {
                warn!(message = %msg, "rejected request body");
            }
            ApiError::InvalidPath(msg) => {
                warn!(message = %msg, "rejected request path");
            }
        }

        (status, Json(Envelope::error(message))).into_response()
    }
}

/// Result type for proxy handlers
pub type ApiResult<T> = Result<T, ApiError>;
