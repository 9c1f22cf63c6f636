//! Chat backend client.
//!
//! The backend is consumed as a plain request/response contract: the full
//! transcript goes up with each message, one assistant reply comes back.
//! Any non-success status is a recoverable failure — the coordinator
//! substitutes an apologetic reply and the session stays usable.

use crate::config::BackendConfig;
use crate::error::{Result, VoiceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The human user.
    User,
    /// The Fatou assistant.
    Assistant,
}

/// One turn of conversation context sent with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Turn author.
    pub role: ChatRole,
    /// Turn text.
    pub content: String,
}

/// Request body for the chat endpoint.
///
/// Field names match the deployed endpoint's JSON contract
/// (`conversationHistory` is camelCase on the wire).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    message: &'a str,
    conversation_history: &'a [ChatTurn],
}

/// Response body from the chat endpoint.
#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    message: String,
}

/// Message-send contract consumed by the coordinator.
///
/// Implemented over HTTP in production and by in-memory doubles in tests.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a user message with conversation context, yielding the
    /// assistant reply text.
    ///
    /// # Errors
    ///
    /// Returns [`VoiceError::Backend`] on network failure, a non-success
    /// status, or a malformed response body.
    async fn send(&self, message: &str, history: &[ChatTurn]) -> Result<String>;
}

/// HTTP chat backend over reqwest.
pub struct HttpChatBackend {
    client: reqwest::Client,
    api_url: String,
}

impl HttpChatBackend {
    /// Build a client from backend configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| VoiceError::Backend(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
        debug!("sending chat message ({} context turns)", history.len());

        let response = self
            .client
            .post(&self.api_url)
            .json(&ChatRequest {
                message,
                conversation_history: history,
            })
            .send()
            .await
            .map_err(|e| VoiceError::Backend(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VoiceError::Backend(format!(
                "chat endpoint returned {status}"
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Backend(format!("invalid response body: {e}")))?;

        Ok(body.message)
    }
}
