//! HTTP client for the DungeonMind backend

use super::types::{CharacterRecord, ChatReply, ChatRequest};
use super::{ApiError, ChatApi};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// reqwest-backed client for `POST /chat` and `GET /character`
pub struct DungeonMindClient {
    client: Client,
    base_url: String,
}

impl DungeonMindClient {
    /// No request timeout is set: a turn waits as long as the backend needs.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(
                ApiError::request_failed(format!("{what} endpoint returned {status}"))
                    .with_status(status),
            );
        }
        response.json::<T>().await.map_err(|e| {
            ApiError::request_failed(format!("Invalid {what} response: {e}")).with_status(status)
        })
    }
}

#[async_trait]
impl ChatApi for DungeonMindClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        let response = self
            .client
            .post(self.endpoint("chat"))
            .json(request)
            .send()
            .await?;
        Self::decode(response, "chat").await
    }

    async fn character(&self) -> Result<CharacterRecord, ApiError> {
        let response = self.client.get(self.endpoint("character")).send().await?;
        Self::decode(response, "character").await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
