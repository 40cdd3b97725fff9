//! Chat message endpoints.

use serde_json::Value;

use super::error::ClientResult;
use super::fetch::{ApiClient, RequestOptions};
use super::models::{Message, OutgoingMessage};
use super::segment;

/// `messages/room/:id` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct MessageApi<'a> {
    client: &'a ApiClient,
}

impl<'a> MessageApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_room_messages(&self, room_id: &str) -> ClientResult<Vec<Message>> {
        self.client
            .fetch_as(
                &format!("messages/room/{}", segment(room_id)),
                RequestOptions::get(),
            )
            .await
    }

    pub async fn send_message(&self, room_id: &str, message: &OutgoingMessage) -> ClientResult<Value> {
        self.client
            .fetch(
                &format!("messages/room/{}", segment(room_id)),
                RequestOptions::post(message)?,
            )
            .await
    }
}
