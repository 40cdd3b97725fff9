//! The persisted session record.

use serde::{Deserialize, Serialize};

use crate::client::Id;

/// Local-storage key the session record lives under.
pub const SESSION_STORAGE_KEY: &str = "gtuverse-user";

/// Avatar used when the backend does not provide one.
pub const DEFAULT_AVATAR: &str = "/placeholder.svg?height=40&width=40";

/// The signed-in user as the client remembers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Bearer token; empty when the backend issued none.
    #[serde(default)]
    pub token: String,
}

impl SessionUser {
    pub fn new(
        id: Id,
        username: impl Into<String>,
        email: Option<String>,
        avatar: Option<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into_string(),
            username: username.into(),
            email,
            avatar: avatar.or_else(|| Some(DEFAULT_AVATAR.to_string())),
            token: token.into(),
        }
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}
