//! Client for the DungeonMind backend
//!
//! Provides a common interface over the chat and character endpoints.

mod client;
mod error;
mod types;

pub use client::DungeonMindClient;
pub use error::{ApiError, ApiErrorKind};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Remote endpoints the client talks to
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Submit a turn with the full transcript as context
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;

    /// Fetch the character sheet
    async fn character(&self) -> Result<CharacterRecord, ApiError>;

    /// Base URL, for logging
    fn base_url(&self) -> &str;
}

#[async_trait]
impl<T: ChatApi + ?Sized> ChatApi for Arc<T> {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        (**self).chat(request).await
    }

    async fn character(&self) -> Result<CharacterRecord, ApiError> {
        (**self).character().await
    }

    fn base_url(&self) -> &str {
        (**self).base_url()
    }
}

/// Logging wrapper for API clients
pub struct LoggingApi<A> {
    inner: A,
}

impl<A: ChatApi> LoggingApi<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: ChatApi> ChatApi for LoggingApi<A> {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        let start = std::time::Instant::now();
        let result = self.inner.chat(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    base_url = %self.inner.base_url(),
                    duration_ms = %duration.as_millis(),
                    history_len = request.conversation_history.len(),
                    metadata = reply.metadata.len(),
                    replaced_history = reply.conversation_history.is_some(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    base_url = %self.inner.base_url(),
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    status = ?e.status,
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }

    async fn character(&self) -> Result<CharacterRecord, ApiError> {
        let result = self.inner.character().await;
        if let Err(e) = &result {
            tracing::error!(
                base_url = %self.inner.base_url(),
                status = ?e.status,
                error = %e.message,
                "Error loading character sheet"
            );
        }
        result
    }

    fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}
