//! Configuration management

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::metrics::DEFAULT_HISTORY_CAPACITY;
use crate::model::agent_config::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Anthropic API key (optional - the Claude agent reports offline without it)
    pub anthropic_api_key: Option<String>,

    /// OpenAI API key (optional - the GPT agent reports offline without it)
    pub openai_api_key: Option<String>,

    pub anthropic_base_url: Option<String>,
    pub openai_base_url: Option<String>,

    /// Claude model (haiku, sonnet, opus or a full model id)
    pub claude_model: String,

    pub gpt_model: String,

    /// Completion budget for LLM-backed agents
    pub max_tokens: u32,

    pub temperature: f64,

    /// Execution records kept in memory
    pub history_capacity: usize,

    /// Tasks dispatched in parallel by the coordinator
    pub max_concurrent: usize,

    /// HTTP timeout for provider calls
    pub request_timeout: Duration,

    /// Root for files referenced by tasks
    pub workspace_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            openai_api_key: None,
            anthropic_base_url: None,
            openai_base_url: None,
            claude_model: "sonnet".to_string(),
            gpt_model: "gpt-4o".to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_concurrent: 4,
            request_timeout: Duration::from_secs(120),
            workspace_path: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let config = Self {
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            openai_api_key: get("OPENAI_API_KEY"),
            anthropic_base_url: get("ANTHROPIC_BASE_URL"),
            openai_base_url: get("OPENAI_BASE_URL"),
            claude_model: get("DEVCREW_CLAUDE_MODEL").unwrap_or(defaults.claude_model),
            gpt_model: get("DEVCREW_GPT_MODEL").unwrap_or(defaults.gpt_model),
            max_tokens: parse(get("DEVCREW_MAX_TOKENS"), "DEVCREW_MAX_TOKENS", defaults.max_tokens)?,
            temperature: parse(get("DEVCREW_TEMPERATURE"), "DEVCREW_TEMPERATURE", defaults.temperature)?,
            history_capacity: parse(
                get("DEVCREW_HISTORY_CAPACITY"),
                "DEVCREW_HISTORY_CAPACITY",
                defaults.history_capacity,
            )?,
            max_concurrent: parse(
                get("DEVCREW_MAX_CONCURRENT"),
                "DEVCREW_MAX_CONCURRENT",
                defaults.max_concurrent,
            )?,
            request_timeout: Duration::from_secs(parse(
                get("DEVCREW_REQUEST_TIMEOUT_SECS"),
                "DEVCREW_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            workspace_path: get("DEVCREW_WORKSPACE")
                .map(PathBuf::from)
                .unwrap_or(defaults.workspace_path),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            bail!("DEVCREW_MAX_TOKENS must be greater than 0");
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            bail!("DEVCREW_TEMPERATURE must be between 0 and 2, got {}", self.temperature);
        }
        if self.max_concurrent == 0 {
            bail!("DEVCREW_MAX_CONCURRENT must be greater than 0");
        }
        if self.history_capacity == 0 {
            bail!("DEVCREW_HISTORY_CAPACITY must be greater than 0");
        }
        Ok(())
    }
}

fn parse<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
