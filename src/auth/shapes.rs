//! Recognized login and registration response shapes.
//!
//! The backend has answered auth calls with several shapes over time. Each
//! shape has a matcher; matchers run in a fixed order and the first hit
//! wins. A response no matcher accepts is unrecognized.

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::client::Id;

use super::session::SessionUser;

/// What a login response means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginShape {
    /// `{error: "..."}`
    Rejected(String),
    /// `{user: {...}, token: "..."}` or a bare `{id, username}` user.
    Session(SessionUser),
}

/// What a registration response means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterShape {
    /// A plain string mentioning "registered".
    Confirmation(String),
    /// `{message: "..."}`
    Message(String),
    /// `{user: {...}, token: "..."}`, signs the user in directly.
    Session(SessionUser),
}

struct Matcher<T> {
    name: &'static str,
    matches: fn(&Value) -> Option<T>,
}

const LOGIN_MATCHERS: &[Matcher<LoginShape>] = &[
    Matcher {
        name: "error",
        matches: rejected_login,
    },
    Matcher {
        name: "wrapped-user",
        matches: wrapped_login,
    },
    Matcher {
        name: "bare-user",
        matches: bare_login,
    },
];

const REGISTER_MATCHERS: &[Matcher<RegisterShape>] = &[
    Matcher {
        name: "confirmation",
        matches: confirmation_register,
    },
    Matcher {
        name: "message",
        matches: message_register,
    },
    Matcher {
        name: "wrapped-user",
        matches: wrapped_register,
    },
];

/// Classify a login response.
pub fn classify_login(response: &Value) -> Option<LoginShape> {
    classify(LOGIN_MATCHERS, response)
}

/// Classify a registration response.
pub fn classify_register(response: &Value) -> Option<RegisterShape> {
    classify(REGISTER_MATCHERS, response)
}

fn classify<T>(matchers: &[Matcher<T>], response: &Value) -> Option<T> {
    matchers.iter().find_map(|matcher| {
        let shape = (matcher.matches)(response)?;
        debug!("auth response matched the {} shape", matcher.name);
        Some(shape)
    })
}

#[derive(Deserialize)]
struct RawUser {
    id: Id,
    username: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Deserialize)]
struct WrappedUser {
    user: RawUser,
    #[serde(default)]
    token: Option<String>,
}

impl RawUser {
    fn into_session(self, token: Option<String>) -> SessionUser {
        let token = token.or(self.token).unwrap_or_default();
        SessionUser::new(self.id, self.username, self.email, self.avatar, token)
    }
}

fn wrapped_session(response: &Value) -> Option<SessionUser> {
    let wrapped = WrappedUser::deserialize(response).ok()?;
    Some(wrapped.user.into_session(wrapped.token))
}

fn rejected_login(response: &Value) -> Option<LoginShape> {
    response
        .get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(|message| LoginShape::Rejected(message.to_string()))
}

fn wrapped_login(response: &Value) -> Option<LoginShape> {
    wrapped_session(response).map(LoginShape::Session)
}

fn bare_login(response: &Value) -> Option<LoginShape> {
    let user = RawUser::deserialize(response).ok()?;
    Some(LoginShape::Session(user.into_session(None)))
}

fn confirmation_register(response: &Value) -> Option<RegisterShape> {
    response
        .as_str()
        .filter(|text| text.to_lowercase().contains("registered"))
        .map(|text| RegisterShape::Confirmation(text.to_string()))
}

fn message_register(response: &Value) -> Option<RegisterShape> {
    response
        .get("message")
        .and_then(Value::as_str)
        .map(|message| RegisterShape::Message(message.to_string()))
}

fn wrapped_register(response: &Value) -> Option<RegisterShape> {
    wrapped_session(response).map(RegisterShape::Session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session(shape: Option<LoginShape>) -> SessionUser {
        match shape {
            Some(LoginShape::Session(user)) => user,
            other => panic!("expected a session, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_user_login() {
        let user = session(classify_login(&json!({ "id": 7, "username": "a" })));
        assert_eq!(user.id, "7");
        assert_eq!(user.username, "a");
        assert_eq!(user.token, "");
        assert!(user.avatar.is_some());
    }

    #[test]
    fn test_wrapped_user_login() {
        let user = session(classify_login(&json!({
            "user": { "id": 7, "username": "a", "email": "a@gtu.edu.tr" },
            "token": "t"
        })));
        assert_eq!(user.id, "7");
        assert_eq!(user.token, "t");
        assert_eq!(user.email.as_deref(), Some("a@gtu.edu.tr"));
    }

    #[test]
    fn test_bare_user_carries_own_token() {
        let user = session(classify_login(&json!({ "id": "u1", "username": "a", "token": "x" })));
        assert_eq!(user.token, "x");
    }

    #[test]
    fn test_error_field_wins_over_user_fields() {
        let shape = classify_login(&json!({
            "error": "Invalid credentials",
            "id": 7,
            "username": "a"
        }));
        assert_eq!(shape, Some(LoginShape::Rejected("Invalid credentials".to_string())));
    }

    #[test]
    fn test_unrecognized_login_shapes() {
        for response in [
            json!("ok"),
            json!([]),
            json!({}),
            json!({ "username": "a" }),
            json!({ "user": { "username": "a" }, "token": "t" }),
            json!({ "error": "" }),
        ] {
            assert_eq!(classify_login(&response), None, "{response}");
        }
    }

    #[test]
    fn test_register_confirmation_string() {
        assert_eq!(
            classify_register(&json!("User Registered successfully")),
            Some(RegisterShape::Confirmation(
                "User Registered successfully".to_string()
            ))
        );
        assert_eq!(classify_register(&json!("Username already exists")), None);
    }

    #[test]
    fn test_register_message_object() {
        assert_eq!(
            classify_register(&json!({ "message": "Check your inbox" })),
            Some(RegisterShape::Message("Check your inbox".to_string()))
        );
    }

    #[test]
    fn test_register_wrapped_session() {
        match classify_register(&json!({ "user": { "id": 3, "username": "b" }, "token": "t" })) {
            Some(RegisterShape::Session(user)) => {
                assert_eq!(user.id, "3");
                assert_eq!(user.token, "t");
            }
            other => panic!("expected a session, got {other:?}"),
        }
    }
}
