use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

use super::wire::{
    ContentOnly, ConversationRow, CreateConversationRequest, CreatedConversation, MessageRow,
    SendMessageRequest, error_detail,
};
use super::{ApiError, ApiResult, ChatBackend};
use crate::capture::AudioBlob;
use crate::config::ClientConfig;
use crate::credentials::TokenStore;
use crate::types::{ChatMessage, Role};

/// The backend is usually reached through an ngrok tunnel during testing;
/// this header skips its interstitial page.
const NGROK_SKIP_HEADER: &str = "ngrok-skip-browser-warning";

pub struct HttpBackend {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            tokens,
        }
    }

    pub fn from_config(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Self {
        Self::new(config.api_url.clone(), tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let token = self.tokens.token().ok_or(ApiError::AuthMissing)?;
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "backend request");
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(token)
            .header(NGROK_SKIP_HEADER, "true"))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(rejected(status, &body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn expect_success(response: Response) -> ApiResult<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(rejected(status, &body))
    }
}

fn rejected(status: StatusCode, body: &str) -> ApiError {
    let detail = error_detail(body);
    warn!(status = status.as_u16(), ?detail, "backend rejected request");
    ApiError::ServerRejected {
        status: status.as_u16(),
        detail,
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn list_conversations(&self) -> ApiResult<Vec<ConversationRow>> {
        let response = self
            .request(Method::GET, "/conversation/getall")?
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn create_conversation(&self, opening: &str) -> ApiResult<CreatedConversation> {
        let response = self
            .request(Method::POST, "/conversation/create")?
            .json(&CreateConversationRequest { ia_msg_in: opening })
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn fetch_messages(&self, conversation_id: i64) -> ApiResult<Vec<ChatMessage>> {
        let path = format!("/message/getall/{}", conversation_id);
        let response = self.request(Method::GET, &path)?.send().await?;
        let rows: Vec<MessageRow> = Self::read_json(response).await?;
        Ok(rows.into_iter().map(ChatMessage::from).collect())
    }

    async fn send_message(&self, conversation_id: i64, content: &str) -> ApiResult<()> {
        let response = self
            .request(Method::POST, "/message/create")?
            .json(&SendMessageRequest {
                conversation_id,
                content,
                role: Role::User,
            })
            .send()
            .await?;
        Self::expect_success(response).await
    }

    async fn opening_message(&self) -> ApiResult<String> {
        let response = self
            .request(Method::GET, "/message/createbase")?
            .send()
            .await?;
        let body: ContentOnly = Self::read_json(response).await?;
        body.content
            .ok_or_else(|| ApiError::Decode("opening message without content".to_string()))
    }

    async fn transcribe(&self, audio: AudioBlob) -> ApiResult<String> {
        let AudioBlob {
            file_name,
            mime,
            bytes,
        } = audio;
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&mime)?;
        let form = Form::new().part("audio", part);

        let response = self
            .request(Method::POST, "/message/transcribe")?
            .multipart(form)
            .send()
            .await?;
        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(ApiError::Unintelligible);
        }
        let body: ContentOnly = Self::read_json(response).await?;
        Ok(body.content.unwrap_or_default())
    }
}
