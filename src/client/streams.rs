//! Stream endpoints.

use serde_json::Value;

use super::error::ClientResult;
use super::fetch::{ApiClient, RequestOptions};
use super::models::{NewStream, Stream};
use super::segment;

/// `streams/...` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct StreamApi<'a> {
    client: &'a ApiClient,
}

impl<'a> StreamApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> ClientResult<Vec<Stream>> {
        self.client.fetch_as("streams", RequestOptions::get()).await
    }

    pub async fn get_by_id(&self, stream_id: &str) -> ClientResult<Stream> {
        self.client
            .fetch_as(&format!("streams/{}", segment(stream_id)), RequestOptions::get())
            .await
    }

    pub async fn create(&self, stream: &NewStream) -> ClientResult<Value> {
        self.client
            .fetch("streams", RequestOptions::post(stream)?)
            .await
    }

    pub async fn update(&self, stream_id: &str, stream: &NewStream) -> ClientResult<Value> {
        self.client
            .fetch(
                &format!("streams/{}", segment(stream_id)),
                RequestOptions::put(stream)?,
            )
            .await
    }

    pub async fn delete(&self, stream_id: &str) -> ClientResult<Value> {
        self.client
            .fetch(
                &format!("streams/{}", segment(stream_id)),
                RequestOptions::delete(),
            )
            .await
    }
}
