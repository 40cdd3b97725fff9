//! Application state shared across handlers.

use std::sync::Arc;

use axum::body::Body;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;

use crate::config::ProxyConfig;

/// Pooled client used to reach the backend.
pub type BackendClient = Client<HttpConnector, Body>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// HTTP client for forwarding requests to the backend.
    pub http_client: BackendClient,
    /// Origin requests are forwarded to, without a trailing slash.
    pub backend_url: Arc<str>,
    /// Largest inbound body accepted for forwarding.
    pub max_body_bytes: usize,
    /// Allowed CORS origins (empty allows any).
    pub cors_origins: Arc<[String]>,
}

impl AppState {
    /// Create new application state from proxy configuration.
    pub fn new(config: &ProxyConfig) -> Self {
        let http_client = Client::builder(TokioExecutor::new()).build_http();

        Self {
            http_client,
            backend_url: Arc::from(config.backend_url.trim_end_matches('/')),
            max_body_bytes: config.max_body_bytes,
            cors_origins: config.cors_origins.clone().into(),
        }
    }
}
