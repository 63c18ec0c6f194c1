//! LLM Provider Boundary
//!
//! Hosted chat-completion APIs seen as a black box: one request in, text +
//! stop reason + token usage out, or an error. Single attempt, no retry,
//! no streaming.

pub mod anthropic;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;

/// Errors from a provider call
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("{0} not set - API unavailable")]
    MissingApiKey(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{0} returned no content")]
    EmptyResponse(&'static str),
}

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Message in conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Provider-neutral completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Completion result with usage stats
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    pub content: String,
    pub model: String,
    pub stop_reason: Option<String>,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl ChatCompletion {
    /// Model finished on its own rather than hitting a limit
    pub fn is_natural_stop(&self) -> bool {
        matches!(
            self.stop_reason.as_deref(),
            Some("end_turn") | Some("stop") | Some("stop_sequence")
        )
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// A hosted chat-completion backend
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name for logs and result objects
    fn name(&self) -> &'static str;

    /// Whether an API key is configured
    fn is_configured(&self) -> bool;

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmError>;
}
