//! Claude API Client
//!
//! Anthropic Messages API client. The agent system prompt is sent as a
//! cached system block (cache_control: ephemeral).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{ChatCompletion, ChatMessage, ChatProvider, ChatRequest, LlmError};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude API client
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

/// System message block with optional cache control
#[derive(Debug, Serialize)]
struct SystemBlock {
    r#type: String,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_control: Option<CacheControl>,
}

#[derive(Debug, Serialize)]
struct CacheControl {
    r#type: String,
}

/// API request
#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: String,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    system: Vec<SystemBlock>,
    messages: &'a [ChatMessage],
}

/// API response
#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
    model: Option<String>,
    stop_reason: Option<String>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    r#type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

impl AnthropicClient {
    pub fn new(api_key: Option<&str>, base_url: Option<&str>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.map(|s| s.to_string()),
            base_url: base_url
                .unwrap_or(ANTHROPIC_API_URL)
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// Resolve a model hint (haiku, sonnet, opus) to a model ID; other
    /// values pass through unchanged
    pub fn model_id(model: &str) -> String {
        match model.to_lowercase().as_str() {
            "haiku" => "claude-3-5-haiku-20241022".to_string(),
            "sonnet" => "claude-sonnet-4-20250514".to_string(),
            "opus" => "claude-3-opus-20240229".to_string(),
            _ => model.to_string(),
        }
    }

    fn build_request<'a>(request: &'a ChatRequest) -> MessageRequest<'a> {
        // empty text blocks are rejected by the API
        let system = if request.system.trim().is_empty() {
            Vec::new()
        } else {
            vec![SystemBlock {
                r#type: "text".to_string(),
                text: request.system.clone(),
                cache_control: Some(CacheControl {
                    r#type: "ephemeral".to_string(),
                }),
            }]
        };

        MessageRequest {
            model: Self::model_id(&request.model),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system,
            messages: &request.messages,
        }
    }

    fn parse_response(response: MessageResponse, requested_model: String) -> Result<ChatCompletion, LlmError> {
        let content = response
            .content
            .into_iter()
            .filter_map(|b| if b.r#type == "text" { b.text } else { None })
            .collect::<Vec<_>>()
            .join("\n");

        if content.is_empty() {
            return Err(LlmError::EmptyResponse("Claude"));
        }

        Ok(ChatCompletion {
            content,
            model: response.model.unwrap_or(requested_model),
            stop_reason: response.stop_reason,
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
        })
    }
}

#[async_trait]
impl ChatProvider for AnthropicClient {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(LlmError::MissingApiKey("ANTHROPIC_API_KEY"))?;

        let body = Self::build_request(request);
        let model_id = body.model.clone();

        debug!(
            "Calling Claude API: model={}, messages={}",
            model_id,
            request.messages.len()
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("anthropic-beta", "prompt-caching-2024-07-31")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await?;
            return Err(LlmError::Api {
                provider: "Claude",
                status,
                body: text,
            });
        }

        let result: MessageResponse = response.json().await?;
        let completion = Self::parse_response(result, model_id)?;

        info!(
            "Claude response: model={}, in={}, out={}, stop={:?}",
            completion.model,
            completion.input_tokens,
            completion.output_tokens,
            completion.stop_reason
        );

        Ok(completion)
    }
}
