/// Backend API for the Memo conversation service
///
/// Every controller talks to the backend through the [`ChatBackend`] trait so
/// that the HTTP transport can be swapped for an in-memory fake in tests.
///
/// # Architecture
///
/// - `client` - [`HttpBackend`], the reqwest implementation with bearer auth
/// - `wire` - request/response bodies exactly as the backend sends them
mod client;
mod wire;

use async_trait::async_trait;

use crate::capture::AudioBlob;
use crate::types::ChatMessage;

pub use client::HttpBackend;
pub use wire::{ConversationRow, CreatedConversation, MessageRow};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("no auth token available")]
    AuthMissing,

    #[error("network failure: {0}")]
    Network(String),

    #[error("server rejected request with status {status}")]
    ServerRejected { status: u16, detail: Option<String> },

    #[error("audio was not understood")]
    Unintelligible,

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// GET `/conversation/getall`
    async fn list_conversations(&self) -> ApiResult<Vec<ConversationRow>>;

    /// POST `/conversation/create`, seeded with the opening message.
    async fn create_conversation(&self, opening: &str) -> ApiResult<CreatedConversation>;

    /// GET `/message/getall/{id}`, oldest first.
    async fn fetch_messages(&self, conversation_id: i64) -> ApiResult<Vec<ChatMessage>>;

    /// POST `/message/create` with role "user".
    async fn send_message(&self, conversation_id: i64, content: &str) -> ApiResult<()>;

    /// GET `/message/createbase`
    async fn opening_message(&self) -> ApiResult<String>;

    /// POST `/message/transcribe`. A 422 maps to [`ApiError::Unintelligible`].
    async fn transcribe(&self, audio: AudioBlob) -> ApiResult<String>;
}
