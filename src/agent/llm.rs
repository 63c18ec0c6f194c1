//! LLM-backed Agents
//!
//! Claude and GPT agents forward the task to a hosted chat model: the
//! configured system prompt, a user prompt built from the task, and the
//! contents of every file the task references. One provider call per task.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use super::presets::{BACKEND_AGENT_ID, CLAUDE_AGENT_ID, FRONTEND_AGENT_ID, GPT_AGENT_ID, QA_AGENT_ID};
use super::{AgentStrategy, Execution};
use crate::error::TaskError;
use crate::files::FileReader;
use crate::llm::{ChatCompletion, ChatMessage, ChatProvider, ChatRequest};
use crate::model::{AgentConfig, Task};

/// Starting point before the completion heuristics
pub const BASE_CONFIDENCE: f64 = 0.6;

/// Answers longer than this many characters count as substantive
const SUBSTANTIVE_CHARS: usize = 500;

/// Output/max token ratio bounds (exclusive) for a well-sized answer
const HEALTHY_RATIO: (f64, f64) = (0.1, 0.8);

static FILE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"`([A-Za-z0-9_][A-Za-z0-9_./-]*\.[A-Za-z0-9]{1,8})`").expect("valid file reference regex")
});

/// Static identity of an LLM-backed agent
#[derive(Debug, Clone, Copy)]
pub struct LlmProfile {
    pub kind: &'static str,
    pub specialized: &'static [&'static str],
    pub preferences: &'static [(&'static str, f64)],
}

pub const CLAUDE_PROFILE: LlmProfile = LlmProfile {
    kind: "claude",
    specialized: &[
        "Long-Context Reasoning",
        "Code Explanation",
        "Architecture Review",
        "Technical Writing",
    ],
    preferences: &[
        (GPT_AGENT_ID, 0.7),
        (BACKEND_AGENT_ID, 0.8),
        (FRONTEND_AGENT_ID, 0.8),
        (QA_AGENT_ID, 0.75),
    ],
};

pub const GPT_PROFILE: LlmProfile = LlmProfile {
    kind: "gpt",
    specialized: &[
        "Rapid Prototyping",
        "Code Completion",
        "Data Transformation",
        "API Integration",
    ],
    preferences: &[
        (CLAUDE_AGENT_ID, 0.7),
        (BACKEND_AGENT_ID, 0.8),
        (FRONTEND_AGENT_ID, 0.8),
        (QA_AGENT_ID, 0.7),
    ],
};

pub struct LlmStrategy<P: ChatProvider> {
    profile: LlmProfile,
    provider: P,
    files: Arc<dyn FileReader>,
}

impl<P: ChatProvider> LlmStrategy<P> {
    pub fn new(profile: LlmProfile, provider: P, files: Arc<dyn FileReader>) -> Self {
        Self {
            profile,
            provider,
            files,
        }
    }

    async fn build_request(&self, task: &Task, config: &AgentConfig) -> Result<ChatRequest, TaskError> {
        let mut prompt = user_prompt(task);
        for path in &task.files {
            let contents = self.files.read(path).await?;
            prompt.push_str(&format!("\n\n## File: {}\n\n```\n{}\n```", path, contents));
        }

        Ok(ChatRequest {
            model: config.model.clone(),
            system: config.system_prompt.clone(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl<P: ChatProvider> AgentStrategy for LlmStrategy<P> {
    fn kind(&self) -> &'static str {
        self.profile.kind
    }

    fn specialized_capabilities(&self) -> &'static [&'static str] {
        self.profile.specialized
    }

    fn collaboration_preferences(&self) -> &'static [(&'static str, f64)] {
        self.profile.preferences
    }

    fn is_online(&self) -> bool {
        self.provider.is_configured()
    }

    async fn execute(&self, task: &Task, config: &AgentConfig) -> Result<Execution, TaskError> {
        let request = self.build_request(task, config).await?;
        debug!(
            provider = self.provider.name(),
            model = %request.model,
            files = task.files.len(),
            "Sending task to provider"
        );

        let completion = self.provider.complete(&request).await?;
        let confidence = completion_confidence(&completion, config.max_tokens);
        let tokens = completion.total_tokens();

        let result = json!({
            "type": "llm_response",
            "provider": self.provider.name(),
            "model": completion.model,
            "task_type": task.task_type.as_str(),
            "content": completion.content,
            "stop_reason": completion.stop_reason,
            "referenced_files": referenced_files(&completion.content),
        });

        Ok(Execution::new(result, confidence).with_tokens(tokens))
    }
}

/// Task rendered as a markdown prompt
pub fn user_prompt(task: &Task) -> String {
    let mut prompt = format!(
        "# Task: {}\n\nType: {}\nPriority: {:?}\n\n## Description\n\n{}",
        task.title, task.task_type, task.priority, task.description
    );

    if !task.required_capabilities.is_empty() {
        prompt.push_str("\n\n## Required Capabilities\n");
        for capability in &task.required_capabilities {
            prompt.push_str(&format!("\n- {}", capability));
        }
    }

    if let Some(context) = task.context.as_ref().filter(|c| !c.is_empty()) {
        let rendered = serde_json::to_string_pretty(context).unwrap_or_default();
        prompt.push_str(&format!("\n\n## Context\n\n```json\n{}\n```", rendered));
    }

    prompt
}

/// Heuristic score for a completion, in [0, 1]
pub fn completion_confidence(completion: &ChatCompletion, max_tokens: u32) -> f64 {
    let mut confidence = BASE_CONFIDENCE;

    if completion.content.chars().count() > SUBSTANTIVE_CHARS {
        confidence += 0.1;
    }
    if completion.is_natural_stop() {
        confidence += 0.1;
    }
    if max_tokens > 0 {
        let ratio = completion.output_tokens as f64 / f64::from(max_tokens);
        if ratio > HEALTHY_RATIO.0 && ratio < HEALTHY_RATIO.1 {
            confidence += 0.1;
        }
    }

    confidence.clamp(0.0, 1.0)
}

/// Backtick-quoted file paths mentioned in an answer, sorted and unique
pub fn referenced_files(content: &str) -> Vec<String> {
    FILE_REF
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::model::{AgentRole, TaskType};
    use parking_lot::Mutex;
    use std::collections::HashMap;

    struct MockProvider {
        configured: bool,
        reply: Result<ChatCompletion, &'static str>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl MockProvider {
        fn replying(content: &str, stop: &str, output_tokens: u64) -> Self {
            Self {
                configured: true,
                reply: Ok(ChatCompletion {
                    content: content.to_string(),
                    model: "mock-1".to_string(),
                    stop_reason: Some(stop.to_string()),
                    input_tokens: 100,
                    output_tokens,
                }),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmError> {
            self.seen.lock().push(request.clone());
            match &self.reply {
                Ok(c) => Ok(c.clone()),
                Err(_) => Err(LlmError::Api {
                    provider: "mock",
                    status: 529,
                    body: "overloaded".to_string(),
                }),
            }
        }
    }

    struct MemoryFiles(HashMap<String, String>);

    #[async_trait]
    impl FileReader for MemoryFiles {
        async fn read(&self, path: &str) -> Result<String, TaskError> {
            self.0.get(path).cloned().ok_or_else(|| TaskError::FileRead {
                path: path.to_string(),
                reason: "not found".to_string(),
            })
        }
    }

    fn files() -> Arc<dyn FileReader> {
        let mut map = HashMap::new();
        map.insert("src/main.rs".to_string(), "fn main() {}".to_string());
        Arc::new(MemoryFiles(map))
    }

    fn config() -> AgentConfig {
        AgentConfig::new("claude-agent", "Claude", AgentRole::Copilot, "sonnet", "You are a senior engineer.")
            .with_max_tokens(1000)
            .with_temperature(0.3)
    }

    fn completion(len: usize, stop: &str, output_tokens: u64) -> ChatCompletion {
        ChatCompletion {
            content: "x".repeat(len),
            model: "m".to_string(),
            stop_reason: Some(stop.to_string()),
            input_tokens: 0,
            output_tokens,
        }
    }

    #[test]
    fn test_confidence_heuristic() {
        assert!((completion_confidence(&completion(10, "max_tokens", 0), 1000) - 0.6).abs() < 1e-9);
        assert!((completion_confidence(&completion(501, "max_tokens", 0), 1000) - 0.7).abs() < 1e-9);
        assert!((completion_confidence(&completion(10, "end_turn", 0), 1000) - 0.7).abs() < 1e-9);
        assert!((completion_confidence(&completion(600, "end_turn", 400), 1000) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_bounds_are_exclusive() {
        assert!((completion_confidence(&completion(0, "length", 100), 1000) - 0.6).abs() < 1e-9);
        assert!((completion_confidence(&completion(0, "length", 800), 1000) - 0.6).abs() < 1e-9);
        assert!((completion_confidence(&completion(0, "length", 101), 1000) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_referenced_files() {
        let text = "Change `src/lib.rs` and `web/app.ts`, then rerun `src/lib.rs` tests. Not `cargo`.";
        assert_eq!(referenced_files(text), vec!["src/lib.rs", "web/app.ts"]);
    }

    #[test]
    fn test_user_prompt_sections() {
        let task = Task::new("Explain ownership", "Walk through borrowck", TaskType::Documentation)
            .unwrap()
            .with_required_capabilities(["Technical Writing"])
            .with_context("audience", json!("juniors"));
        let prompt = user_prompt(&task);
        assert!(prompt.starts_with("# Task: Explain ownership"));
        assert!(prompt.contains("Type: documentation"));
        assert!(prompt.contains("- Technical Writing"));
        assert!(prompt.contains("\"audience\": \"juniors\""));
    }

    #[tokio::test]
    async fn test_execute_builds_request_and_result() {
        let provider = MockProvider::replying("See `src/main.rs` for the entry point.", "end_turn", 400);
        let strategy = LlmStrategy::new(CLAUDE_PROFILE, provider, files());
        let task = Task::new("Review entry point", "", TaskType::CodeReview)
            .unwrap()
            .with_files(["src/main.rs"]);

        let exec = strategy.execute(&task, &config()).await.unwrap();
        assert_eq!(exec.tokens_used, Some(500));
        assert!((exec.confidence - 0.8).abs() < 1e-9);
        assert_eq!(exec.result["provider"], "mock");
        assert_eq!(exec.result["referenced_files"], json!(["src/main.rs"]));

        let seen = strategy.provider.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].system, "You are a senior engineer.");
        assert_eq!(seen[0].max_tokens, 1000);
        assert!(seen[0].messages[0].content.contains("## File: src/main.rs"));
        assert!(seen[0].messages[0].content.contains("fn main() {}"));
    }

    #[tokio::test]
    async fn test_missing_file_fails_before_calling_provider() {
        let provider = MockProvider::replying("ok", "end_turn", 10);
        let strategy = LlmStrategy::new(GPT_PROFILE, provider, files());
        let task = Task::new("Review", "", TaskType::CodeReview)
            .unwrap()
            .with_files(["src/missing.rs"]);

        let err = strategy.execute(&task, &config()).await.unwrap_err();
        assert!(matches!(err, TaskError::FileRead { .. }));
        assert!(strategy.provider.seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let mut provider = MockProvider::replying("", "end_turn", 0);
        provider.reply = Err("overloaded");
        let strategy = LlmStrategy::new(CLAUDE_PROFILE, provider, files());
        let task = Task::new("Anything", "", TaskType::Refactoring).unwrap();

        let err = strategy.execute(&task, &config()).await.unwrap_err();
        assert!(err.to_string().contains("529"));
    }

    #[test]
    fn test_online_follows_provider_key() {
        let mut provider = MockProvider::replying("", "end_turn", 0);
        provider.configured = false;
        let strategy = LlmStrategy::new(GPT_PROFILE, provider, files());
        assert!(!strategy.is_online());
        assert_eq!(strategy.kind(), "gpt");
    }
}
