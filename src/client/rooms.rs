//! Room ("club") endpoints.

use serde_json::{Value, json};

use super::error::ClientResult;
use super::fetch::{ApiClient, RequestOptions};
use super::models::{NewRoom, Room, UserProfile};
use super::segment;

/// `rooms/...` and `roomsWEB/...` endpoints.
///
/// `roomsWEB` serves the web projection of a room (thumbnail and video
/// fields); writes go through the plain `rooms` resource.
#[derive(Debug, Clone, Copy)]
pub struct RoomsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> RoomsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// All rooms, plain projection.
    pub async fn list(&self) -> ClientResult<Vec<Room>> {
        self.client.fetch_as("rooms", RequestOptions::get()).await
    }

    /// All rooms, web projection.
    pub async fn get_all(&self) -> ClientResult<Vec<Room>> {
        self.client.fetch_as("roomsWEB", RequestOptions::get()).await
    }

    pub async fn get_by_id(&self, room_id: &str) -> ClientResult<Room> {
        self.client
            .fetch_as(&format!("roomsWEB/{}", segment(room_id)), RequestOptions::get())
            .await
    }

    pub async fn create(&self, room: &NewRoom) -> ClientResult<Room> {
        self.client
            .fetch_as("rooms", RequestOptions::post(room)?)
            .await
    }

    pub async fn update(&self, room_id: &str, room: &NewRoom) -> ClientResult<Value> {
        self.client
            .fetch(&format!("rooms/{}", segment(room_id)), RequestOptions::put(room)?)
            .await
    }

    pub async fn delete(&self, room_id: &str) -> ClientResult<Value> {
        self.client
            .fetch(&format!("rooms/{}", segment(room_id)), RequestOptions::delete())
            .await
    }

    /// Users currently in the room.
    pub async fn get_users(&self, room_id: &str) -> ClientResult<Vec<UserProfile>> {
        self.client
            .fetch_as(
                &format!("rooms/{}/users", segment(room_id)),
                RequestOptions::get(),
            )
            .await
    }

    pub async fn join(&self, room_id: &str, user_id: &str) -> ClientResult<Value> {
        self.client
            .fetch(
                &format!("rooms/{}/users", segment(room_id)),
                RequestOptions::post(&json!({ "userId": user_id }))?,
            )
            .await
    }

    pub async fn leave(&self, room_id: &str, user_id: &str) -> ClientResult<Value> {
        self.client
            .fetch(
                &format!("rooms/{}/users/{}", segment(room_id), segment(user_id)),
                RequestOptions::delete(),
            )
            .await
    }

    /// Rooms of a given type. A blank term resolves to no rooms without
    /// touching the network.
    pub async fn search_by_type(&self, room_type: &str) -> ClientResult<Vec<Room>> {
        let term = room_type.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        self.client
            .fetch_as(&format!("rooms/type/{}", segment(term)), RequestOptions::get())
            .await
    }
}
