//! User endpoints.

use serde_json::{Value, json};

use super::error::ClientResult;
use super::fetch::{ApiClient, RequestOptions};
use super::models::{Credentials, ProfileUpdate, Registration, Room, UserProfile};
use super::segment;

/// `login`, `register`, `users/...` and `usersWEB/...` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct UserApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UserApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Raw login response; its shape is interpreted by the auth context.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<Value> {
        self.client
            .fetch("login", RequestOptions::post(credentials)?)
            .await
    }

    /// Raw registration response; its shape is interpreted by the auth context.
    pub async fn register(&self, registration: &Registration) -> ClientResult<Value> {
        self.client
            .fetch("register", RequestOptions::post(registration)?)
            .await
    }

    pub async fn get_profile(&self, user_id: &str) -> ClientResult<UserProfile> {
        self.client
            .fetch_as(&format!("users/{}", segment(user_id)), RequestOptions::get())
            .await
    }

    pub async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> ClientResult<Value> {
        self.client
            .fetch(
                &format!("users/{}", segment(user_id)),
                RequestOptions::put(update)?,
            )
            .await
    }

    pub async fn update_username(&self, user_id: &str, username: &str) -> ClientResult<Value> {
        self.client
            .fetch(
                &format!("users/{}/username", segment(user_id)),
                RequestOptions::put(&json!({ "username": username }))?,
            )
            .await
    }

    pub async fn get_by_username(&self, username: &str) -> ClientResult<UserProfile> {
        self.client
            .fetch_as(
                &format!("users/username/{}", segment(username)),
                RequestOptions::get(),
            )
            .await
    }

    /// Rooms the user belongs to.
    pub async fn get_rooms(&self, user_id: &str) -> ClientResult<Vec<Room>> {
        self.client
            .fetch_as(
                &format!("usersWEB/{}/rooms", segment(user_id)),
                RequestOptions::get(),
            )
            .await
    }
}
