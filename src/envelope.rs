//! Response envelope shared by the proxy and the request helper.
//!
//! The proxy wraps every backend answer as either `{"data": ...}` or
//! `{"error": "..."}`. The client side never trusts that shape blindly; it
//! goes through [`Envelope::take_data`] and [`Envelope::error_message`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized proxy response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope {
    /// Successful backend response, JSON-parsed when possible.
    Data(Value),
    /// Failure message, either from the backend or from the proxy itself.
    Error(String),
}

impl Envelope {
    pub fn data(value: impl Into<Value>) -> Self {
        Self::Data(value.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Extract the `data` member of a decoded envelope.
    ///
    /// Returns the untouched body as `Err` when it is not an object carrying
    /// a `data` key.
    pub fn take_data(body: Value) -> Result<Value, Value> {
        match body {
            Value::Object(mut map) if map.contains_key("data") => {
                Ok(map.remove("data").unwrap_or(Value::Null))
            }
            other => Err(other),
        }
    }

    /// The `error` member of a decoded envelope, if it is a non-empty string.
    pub fn error_message(body: &Value) -> Option<&str> {
        body.get("error")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
    }
}
