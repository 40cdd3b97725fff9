//! HTTP proxy from `/api/proxy/{*path}` to the room backend.
//!
//! Every request is re-issued once against the backend origin and the answer
//! is normalized into an [`Envelope`]:
//! - 204 passes through with an empty body
//! - non-2xx becomes `{error}` with the backend status
//! - 2xx becomes `{data}`, JSON-parsed when possible, raw text otherwise

use axum::{
    Json,
    body::Body,
    extract::{Path, State, rejection::PathRejection},
    http::{HeaderMap, HeaderValue, Method, Request, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use http_body_util::BodyExt;
use log::{debug, error, warn};
use serde_json::Value;

use crate::envelope::Envelope;

use super::error::{ApiError, ApiResult};
use super::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Forward a request under the proxy prefix to the backend.
pub async fn proxy_backend(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    req: Request<Body>,
) -> ApiResult<Response> {
    let Path(path) = path.map_err(|rejection| ApiError::InvalidPath(rejection.body_text()))?;
    let (parts, body) = req.into_parts();
    let method = parts.method;

    // Only GET carries the query string through.
    let query = if method == Method::GET {
        parts.uri.query()
    } else {
        None
    };
    let uri = target_uri(&state.backend_url, &path, query)?;

    let body = match method {
        Method::POST | Method::PUT => {
            Body::from(read_json_body(body, &method, state.max_body_bytes).await?)
        }
        _ => Body::empty(),
    };

    let mut builder = Request::builder()
        .method(method.clone())
        .uri(uri.clone())
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(credential) = bearer_credential(&parts.headers) {
        builder = builder.header(header::AUTHORIZATION, credential);
    }
    let upstream = builder
        .body(body)
        .map_err(|e| ApiError::internal(format!("Invalid upstream request: {e}")))?;

    debug!("Proxying {} request to {}", method, uri);

    let response = state.http_client.request(upstream).await.map_err(|e| {
        error!("Proxy {} request to {} failed: {:?}", method, uri, e);
        ApiError::upstream(&method, e.to_string())
    })?;

    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let bytes = response
        .into_body()
        .collect()
        .await
        .map_err(|e| {
            error!("Failed to read backend response from {}: {:?}", uri, e);
            ApiError::upstream(&method, e.to_string())
        })?
        .to_bytes();
    let text = String::from_utf8_lossy(&bytes);

    let (status, envelope) = normalize_response(&method, status, &text);
    Ok((status, Json(envelope)).into_response())
}

/// Map a backend status and body onto the proxy's reply.
pub fn normalize_response(method: &Method, status: StatusCode, text: &str) -> (StatusCode, Envelope) {
    if !status.is_success() {
        let message = if text.is_empty() { "API error" } else { text };
        return (status, Envelope::error(message));
    }

    let data = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(_) if text.is_empty() && *method == Method::DELETE => Value::Null,
        Err(_) => Value::String(text.to_string()),
    };
    (StatusCode::OK, Envelope::Data(data))
}

/// The inbound `Authorization` value, when it carries a bearer credential.
fn bearer_credential(headers: &HeaderMap) -> Option<HeaderValue> {
    let value = headers.get(header::AUTHORIZATION)?;
    value
        .to_str()
        .ok()?
        .starts_with(BEARER_PREFIX)
        .then(|| value.clone())
}

/// Build the backend URI for a proxied path.
///
/// Path segments arrive percent-decoded and are re-encoded one by one.
fn target_uri(backend_url: &str, path: &str, query: Option<&str>) -> ApiResult<Uri> {
    let encoded: Vec<_> = path
        .trim_start_matches('/')
        .split('/')
        .map(urlencoding::encode)
        .collect();
    let mut target = format!("{}/{}", backend_url.trim_end_matches('/'), encoded.join("/"));
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }

    target.parse().map_err(|e| {
        error!("Invalid target URI {}: {:?}", target, e);
        ApiError::internal(format!("Invalid target URI {target}: {e}"))
    })
}

/// Read an inbound body that must be JSON and re-serialize it for forwarding.
async fn read_json_body(body: Body, method: &Method, limit: usize) -> ApiResult<Bytes> {
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to read request body: {e}")))?;

    let parsed: Value = serde_json::from_slice(&bytes).map_err(|e| {
        warn!("Rejecting {} body that is not JSON: {}", method, e);
        ApiError::invalid_body(method)
    })?;

    serde_json::to_vec(&parsed)
        .map(Bytes::from)
        .map_err(|e| ApiError::internal(format!("Failed to encode request body: {e}")))
}
