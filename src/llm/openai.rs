//! OpenAI API Client
//!
//! Chat Completions client. The system prompt travels as the first message.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{ChatCompletion, ChatProvider, ChatRequest, LlmError};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl OpenAiClient {
    pub fn new(api_key: Option<&str>, base_url: Option<&str>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.map(|s| s.to_string()),
            base_url: base_url
                .unwrap_or(OPENAI_API_URL)
                .trim_end_matches('/')
                .to_string(),
        }
    }

    fn build_request(request: &ChatRequest) -> CompletionRequest<'_> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(WireMessage {
            role: "system",
            content: &request.system,
        });
        messages.extend(request.messages.iter().map(|m| WireMessage {
            role: match m.role {
                super::ChatRole::User => "user",
                super::ChatRole::Assistant => "assistant",
            },
            content: &m.content,
        }));

        CompletionRequest {
            model: &request.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    fn parse_response(response: CompletionResponse, requested_model: &str) -> Result<ChatCompletion, LlmError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse("OpenAI"))?;

        let content = choice
            .message
            .content
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::EmptyResponse("OpenAI"))?;

        let (input_tokens, output_tokens) = response
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        Ok(ChatCompletion {
            content,
            model: response.model.unwrap_or_else(|| requested_model.to_string()),
            stop_reason: choice.finish_reason,
            input_tokens,
            output_tokens,
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(LlmError::MissingApiKey("OPENAI_API_KEY"))?;

        debug!(
            "Calling OpenAI API: model={}, messages={}",
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&Self::build_request(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await?;
            return Err(LlmError::Api {
                provider: "OpenAI",
                status,
                body: text,
            });
        }

        let result: CompletionResponse = response.json().await?;
        let completion = Self::parse_response(result, &request.model)?;

        info!(
            "OpenAI response: model={}, in={}, out={}, finish={:?}",
            completion.model,
            completion.input_tokens,
            completion.output_tokens,
            completion.stop_reason
        );

        Ok(completion)
    }
}
