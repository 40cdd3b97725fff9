//! Room chat with optimistic sends.
//!
//! A sent message shows up in the timeline immediately as a pending entry
//! and is confirmed or rolled back once the backend answers.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::SessionUser;
use crate::client::{ApiClient, ClientResult, Id, Message, OutgoingMessage};

/// Prefix of ids assigned to messages the backend has not confirmed yet.
pub const PENDING_ID_PREFIX: &str = "temp-";

/// Message calls the timeline depends on.
#[async_trait]
pub trait MessageBackend: Send + Sync {
    async fn room_messages(&self, room_id: &str) -> ClientResult<Vec<Message>>;
    async fn send_message(&self, room_id: &str, message: &OutgoingMessage) -> ClientResult<Value>;
}

#[async_trait]
impl MessageBackend for ApiClient {
    async fn room_messages(&self, room_id: &str) -> ClientResult<Vec<Message>> {
        self.messages().get_room_messages(room_id).await
    }

    async fn send_message(&self, room_id: &str, message: &OutgoingMessage) -> ClientResult<Value> {
        self.messages().send_message(room_id, message).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Pending,
    Confirmed,
}

/// A message as shown in the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub message: Message,
    pub delivery: Delivery,
}

impl ChatEntry {
    pub fn is_pending(&self) -> bool {
        self.delivery == Delivery::Pending
    }
}

/// Messages of one room plus the unsent draft.
#[derive(Debug, Clone)]
pub struct ChatTimeline {
    room_id: String,
    entries: Vec<ChatEntry>,
    draft: String,
}

impl ChatTimeline {
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            entries: Vec::new(),
            draft: String::new(),
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Replace the timeline with the room's history.
    pub async fn load(&mut self, backend: &dyn MessageBackend) -> ClientResult<()> {
        let messages = backend.room_messages(&self.room_id).await?;
        debug!("Loaded {} message(s) for room {}", messages.len(), self.room_id);
        self.entries = messages
            .into_iter()
            .map(|message| ChatEntry {
                message,
                delivery: Delivery::Confirmed,
            })
            .collect();
        Ok(())
    }

    /// Send the current draft as `user`.
    ///
    /// Returns `Ok(None)` when the draft is blank and nothing was sent.
    pub async fn send(
        &mut self,
        backend: &dyn MessageBackend,
        user: &SessionUser,
    ) -> ClientResult<Option<Message>> {
        let content = self.draft.trim().to_string();
        if content.is_empty() {
            return Ok(None);
        }

        let pending_id = Id::new(format!("{PENDING_ID_PREFIX}{}", Uuid::new_v4()));
        self.entries.push(ChatEntry {
            message: Message {
                id: pending_id.clone(),
                room_id: Some(Id::new(self.room_id.as_str())),
                user_id: Id::new(user.id.as_str()),
                username: user.username.clone(),
                content: content.clone(),
                timestamp: Some(Utc::now().to_rfc3339()),
            },
            delivery: Delivery::Pending,
        });
        let draft = std::mem::take(&mut self.draft);

        let outgoing = OutgoingMessage {
            user_id: user.id.clone(),
            content,
        };

        match backend.send_message(&self.room_id, &outgoing).await {
            Ok(response) => {
                let confirmed = self.confirm(&pending_id, response);
                Ok(confirmed)
            }
            Err(e) => {
                warn!("Failed to send message to room {}: {}", self.room_id, e);
                self.entries.retain(|entry| entry.message.id != pending_id);
                self.draft = draft;
                Err(e)
            }
        }
    }

    fn confirm(&mut self, pending_id: &Id, response: Value) -> Option<Message> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| &entry.message.id == pending_id)?;

        if let Ok(message) = serde_json::from_value::<Message>(response) {
            entry.message = message;
        }
        entry.delivery = Delivery::Confirmed;
        Some(entry.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use serde_json::json;
    use std::sync::Mutex;

    struct FakeMessages {
        history: Vec<Message>,
        reply: Mutex<Option<ClientResult<Value>>>,
        sent: Mutex<Vec<OutgoingMessage>>,
    }

    impl FakeMessages {
        fn replying(reply: ClientResult<Value>) -> Self {
            Self {
                history: Vec::new(),
                reply: Mutex::new(Some(reply)),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MessageBackend for FakeMessages {
        async fn room_messages(&self, _room_id: &str) -> ClientResult<Vec<Message>> {
            Ok(self.history.clone())
        }

        async fn send_message(
            &self,
            _room_id: &str,
            message: &OutgoingMessage,
        ) -> ClientResult<Value> {
            self.sent.lock().unwrap().push(message.clone());
            self.reply.lock().unwrap().take().unwrap_or(Ok(Value::Null))
        }
    }

    fn user() -> SessionUser {
        SessionUser::new(Id::new("7"), "dj", None, None, "t")
    }

    #[tokio::test]
    async fn test_blank_draft_is_not_sent() {
        let backend = FakeMessages::replying(Ok(Value::Null));
        let mut timeline = ChatTimeline::new("3");
        timeline.set_draft("   ");

        assert_eq!(timeline.send(&backend, &user()).await.unwrap(), None);
        assert!(timeline.entries().is_empty());
        assert!(backend.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_replaces_pending_with_server_message() {
        let backend = FakeMessages::replying(Ok(json!({
            "id": 41,
            "roomId": 3,
            "userId": 7,
            "username": "dj",
            "content": "hello"
        })));
        let mut timeline = ChatTimeline::new("3");
        timeline.set_draft("hello");

        let sent = timeline.send(&backend, &user()).await.unwrap().unwrap();
        assert_eq!(sent.id, Id::new("41"));
        assert_eq!(timeline.draft(), "");
        assert_eq!(timeline.entries().len(), 1);
        assert!(!timeline.entries()[0].is_pending());

        let outgoing = backend.sent.lock().unwrap();
        assert_eq!(outgoing[0].user_id, "7");
        assert_eq!(outgoing[0].content, "hello");
    }

    #[tokio::test]
    async fn test_send_keeps_local_message_when_reply_is_not_a_message() {
        let backend = FakeMessages::replying(Ok(json!({ "ok": true })));
        let mut timeline = ChatTimeline::new("3");
        timeline.set_draft("hi");

        let sent = timeline.send(&backend, &user()).await.unwrap().unwrap();
        assert!(sent.id.as_str().starts_with(PENDING_ID_PREFIX));
        assert_eq!(timeline.entries()[0].delivery, Delivery::Confirmed);
    }

    #[tokio::test]
    async fn test_failed_send_rolls_back() {
        let backend = FakeMessages::replying(Err(ClientError::Status {
            status: 500,
            message: "boom".to_string(),
        }));
        let mut timeline = ChatTimeline::new("3");
        timeline.set_draft("hello");

        let err = timeline.send(&backend, &user()).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(timeline.entries().is_empty());
        assert_eq!(timeline.draft(), "hello");
    }

    #[tokio::test]
    async fn test_load_replaces_entries() {
        let mut backend = FakeMessages::replying(Ok(Value::Null));
        backend.history = vec![Message {
            id: Id::new("1"),
            room_id: Some(Id::new("3")),
            user_id: Id::new("2"),
            username: "a".to_string(),
            content: "first".to_string(),
            timestamp: None,
        }];

        let mut timeline = ChatTimeline::new("3");
        timeline.set_draft("x");
        timeline.send(&backend, &user()).await.unwrap();
        assert_eq!(timeline.entries().len(), 1);

        timeline.load(&backend).await.unwrap();
        assert_eq!(timeline.entries().len(), 1);
        assert_eq!(timeline.entries()[0].message.content, "first");
        assert!(!timeline.entries()[0].is_pending());
    }
}
