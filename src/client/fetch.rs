//! Shared request helper.
//!
//! Hides the proxy's envelope from callers: a successful call yields the
//! unwrapped `data` value, anything else becomes a [`ClientError`].

use log::{debug, warn};
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::PROXY_PREFIX;
use crate::envelope::Envelope;

use super::error::{ClientError, ClientResult};
use super::messages::MessageApi;
use super::rooms::RoomsApi;
use super::streams::StreamApi;
use super::users::UserApi;

/// Transport options for a single request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    /// JSON-encoded request body.
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    /// A request of `method` carrying `body` encoded as JSON.
    pub fn json<B: Serialize + ?Sized>(method: Method, body: &B) -> ClientResult<Self> {
        Ok(Self {
            method,
            headers: HeaderMap::new(),
            body: Some(serde_json::to_string(body)?),
        })
    }

    pub fn post<B: Serialize + ?Sized>(body: &B) -> ClientResult<Self> {
        Self::json(Method::POST, body)
    }

    pub fn put<B: Serialize + ?Sized>(body: &B) -> ClientResult<Self> {
        Self::json(Method::PUT, body)
    }
}

/// Client for the proxy's `/api/proxy` surface.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client.
    http: Client,
    /// Base URL of the proxy (e.g., "http://localhost:3000").
    base_url: String,
    /// Bearer token attached to every request.
    bearer: Option<String>,
}

impl ApiClient {
    /// Create a client for the proxy at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), base_url)
    }

    pub fn with_http_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            bearer: None,
        }
    }

    /// Attach a bearer token. Blank tokens are ignored.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.bearer = (!token.trim().is_empty()).then_some(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn users(&self) -> UserApi<'_> {
        UserApi::new(self)
    }

    pub fn rooms(&self) -> RoomsApi<'_> {
        RoomsApi::new(self)
    }

    pub fn messages(&self) -> MessageApi<'_> {
        MessageApi::new(self)
    }

    pub fn streams(&self) -> StreamApi<'_> {
        StreamApi::new(self)
    }

    /// Full URL of a proxied endpoint.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            PROXY_PREFIX,
            endpoint.trim_start_matches('/')
        )
    }

    /// Issue a request through the proxy and unwrap its envelope.
    pub async fn fetch(&self, endpoint: &str, options: RequestOptions) -> ClientResult<Value> {
        let url = self.endpoint_url(endpoint);
        debug!("Fetching: {} {}", options.method, url);

        let mut request = self
            .http
            .request(options.method, &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }
        request = request.headers(options.headers);
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| ClientError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Array(Vec::new()));
        }

        let text = response.text().await.map_err(|e| ClientError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        decode_envelope(status, &text)
    }

    /// [`ApiClient::fetch`] followed by decoding into `T`.
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let value = self.fetch(endpoint, options).await?;
        serde_json::from_value(value)
            .map_err(|e| ClientError::Decode(format!("unexpected shape from {endpoint}: {e}")))
    }
}

/// Turn a proxy status and body into the caller-facing result.
pub fn decode_envelope(status: StatusCode, text: &str) -> ClientResult<Value> {
    if !status.is_success() {
        let message = serde_json::from_str::<Value>(text)
            .ok()
            .as_ref()
            .and_then(Envelope::error_message)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    let body: Value =
        serde_json::from_str(text).map_err(|e| ClientError::Decode(e.to_string()))?;

    Envelope::take_data(body).or_else(|body| {
        warn!("Response has no data envelope, using the whole body");
        Ok(body)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_error_uses_envelope_message() {
        let err = decode_envelope(StatusCode::NOT_FOUND, r#"{"error":"Room not found"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Room not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_status_error_without_message_names_status() {
        for body in ["", "<html>oops</html>", r#"{"error":null}"#] {
            let err = decode_envelope(StatusCode::BAD_GATEWAY, body).unwrap_err();
            assert_eq!(err.to_string(), "HTTP error! status: 502");
        }
    }

    #[test]
    fn test_data_is_unwrapped_exactly() {
        for data in [json!({ "id": 1 }), json!([1, 2, 3]), json!("text"), Value::Null] {
            let body = json!({ "data": data.clone() }).to_string();
            assert_eq!(decode_envelope(StatusCode::OK, &body).unwrap(), data);
        }
    }

    #[test]
    fn test_missing_data_returns_whole_body() {
        let value = decode_envelope(StatusCode::OK, r#"{"id":5}"#).unwrap();
        assert_eq!(value, json!({ "id": 5 }));
    }

    #[test]
    fn test_blank_success_body() {
        assert_eq!(decode_envelope(StatusCode::OK, "  ").unwrap(), json!({}));
    }

    #[test]
    fn test_malformed_success_body() {
        let err = decode_envelope(StatusCode::OK, "{not json").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn test_endpoint_url() {
        let client = ApiClient::new("http://localhost:3000/");
        assert_eq!(
            client.endpoint_url("rooms/5"),
            "http://localhost:3000/api/proxy/rooms/5"
        );
        assert_eq!(
            client.endpoint_url("/roomsWEB"),
            "http://localhost:3000/api/proxy/roomsWEB"
        );
    }

    #[test]
    fn test_blank_bearer_is_ignored() {
        let client = ApiClient::new("http://localhost:3000").with_bearer("  ");
        assert!(client.bearer.is_none());
        let client = client.with_bearer("tok");
        assert_eq!(client.bearer.as_deref(), Some("tok"));
    }
}
