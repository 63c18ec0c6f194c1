//! Agent System
//!
//! One concrete runtime (`Agent`) owns the contract every agent shares:
//! capability matching, timing, metrics, logging and turning every failure
//! into a response. What an agent actually does with a task is an injected
//! `AgentStrategy`:
//!
//! ```text
//! Task ──► Agent::process_task ──► AgentStrategy::execute ──► Execution
//!              │                         │
//!              │                         ├── templated roles (backend, frontend,
//!              │                         │   uiux, project manager, qa, testing)
//!              │                         └── LLM-backed (Claude, GPT)
//!              ├── metrics (streaming means)
//!              └── tracing + ExecutionLog
//! ```

pub mod backend;
pub mod frontend;
pub mod llm;
pub mod presets;
pub mod project_manager;
pub mod qa;
pub mod runtime;
pub mod testing;
pub mod uiux;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::TaskError;
use crate::model::{AgentConfig, Task};

pub use backend::BackendStrategy;
pub use frontend::FrontendStrategy;
pub use llm::LlmStrategy;
pub use project_manager::ProjectManagerStrategy;
pub use qa::QaStrategy;
pub use runtime::{Agent, AgentInfo};
pub use testing::TestingStrategy;
pub use uiux::UiUxStrategy;

/// Confidence reported when no capability lines up with the task
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// What a strategy produced for one task
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub result: Value,
    pub confidence: f64,
    pub tokens_used: Option<u64>,
}

impl Execution {
    pub fn new(result: Value, confidence: f64) -> Self {
        Self {
            result,
            confidence,
            tokens_used: None,
        }
    }

    pub fn with_tokens(mut self, tokens: u64) -> Self {
        self.tokens_used = Some(tokens);
        self
    }
}

/// Role-specific behaviour plugged into an `Agent`
#[async_trait]
pub trait AgentStrategy: Send + Sync {
    /// Short name used in logs and result objects
    fn kind(&self) -> &'static str;

    /// Named competencies beyond the granted capabilities
    fn specialized_capabilities(&self) -> &'static [&'static str];

    /// Declared affinity for working with other agents, by agent id
    fn collaboration_preferences(&self) -> &'static [(&'static str, f64)];

    fn is_online(&self) -> bool {
        true
    }

    async fn execute(&self, task: &Task, config: &AgentConfig) -> Result<Execution, TaskError>;
}

/// Static capability-alignment score
///
/// Mean of `priority / 10` over the enabled capabilities named by the task or
/// by the agent's specialized list; `DEFAULT_CONFIDENCE` when none match.
/// Ignores anything about the produced result.
pub fn capability_confidence(config: &AgentConfig, task: &Task, specialized: &[&str]) -> f64 {
    let matched: Vec<f64> = config
        .enabled_capabilities()
        .filter(|c| {
            task.required_capabilities.iter().any(|r| *r == c.name)
                || specialized.contains(&c.name.as_str())
        })
        .map(|c| c.weight())
        .collect();

    if matched.is_empty() {
        return DEFAULT_CONFIDENCE;
    }
    matched.iter().sum::<f64>() / matched.len() as f64
}

// ============ Shared handler helpers ============

/// Fallback handler for task types a role has no dedicated handler for
pub(crate) fn generic_result(task: &Task, kind: &str, focus: &str) -> Value {
    json!({
        "type": "generic",
        "agent": kind,
        "task_type": task.task_type.as_str(),
        "summary": format!("{} reviewed \"{}\" from a {} perspective", kind, task.title, focus),
        "recommendations": [
            format!("Clarify acceptance criteria for \"{}\"", task.title),
            format!("Route to a specialist for {} work if deeper analysis is needed", task.task_type),
            "Break the work into reviewable increments",
        ],
    })
}

/// Optional string value from the task context
pub(crate) fn context_str(task: &Task, key: &str) -> Result<Option<String>, TaskError> {
    match task.context.as_ref().and_then(|c| c.get(key)) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(TaskError::execution(format!(
            "context.{} must be a string, got {}",
            key, other
        ))),
    }
}

/// Optional list of strings from the task context
pub(crate) fn context_list(task: &Task, key: &str) -> Result<Option<Vec<String>>, TaskError> {
    match task.context.as_ref().and_then(|c| c.get(key)) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str().map(String::from).ok_or_else(|| {
                    TaskError::execution(format!("context.{} must contain only strings", key))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(TaskError::execution(format!(
            "context.{} must be an array of strings",
            key
        ))),
    }
}

/// Lowercase, hyphen-separated identifier derived from free text
pub(crate) fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        "item".to_string()
    } else {
        out
    }
}

/// PascalCase identifier derived from free text
pub(crate) fn pascal_case(text: &str) -> String {
    slug(text)
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AgentRole, Capability, TaskType};

    fn config() -> AgentConfig {
        AgentConfig::new("backend-agent", "Backend", AgentRole::Developer, "sonnet", "")
            .with_capability(Capability::new("API Design and Implementation", "", 10).unwrap())
            .with_capability(Capability::new("Database Design", "", 8).unwrap())
            .with_capability(Capability::new("Caching", "", 4).unwrap())
    }

    fn task(required: &[&str]) -> Task {
        Task::new("Orders", "", TaskType::ApiDesign)
            .unwrap()
            .with_required_capabilities(required.iter().copied())
    }

    #[test]
    fn test_confidence_from_required_capabilities() {
        let c = capability_confidence(&config(), &task(&["API Design and Implementation"]), &[]);
        assert!((c - 1.0).abs() < 1e-9);

        let c = capability_confidence(
            &config(),
            &task(&["API Design and Implementation", "Caching"]),
            &[],
        );
        assert!((c - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_includes_specialized() {
        let c = capability_confidence(&config(), &task(&[]), &["Database Design"]);
        assert!((c - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_skips_disabled_capabilities() {
        let c = config().with_capability(Capability::new("GraphQL", "", 2).unwrap().disabled());
        let score = capability_confidence(&c, &task(&["API Design and Implementation", "GraphQL"]), &[]);
        assert!((score - 1.0).abs() < 1e-9);

        let score = capability_confidence(&c, &task(&["GraphQL"]), &[]);
        assert_eq!(score, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_confidence_default_when_nothing_matches() {
        let c = capability_confidence(&config(), &task(&["Nonexistent Capability"]), &["Kubernetes"]);
        assert_eq!(c, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_context_helpers() {
        let t = task(&[])
            .with_context("framework", json!("axum"))
            .with_context("endpoints", json!(["GET /orders", "POST /orders"]))
            .with_context("bad_list", json!([1, 2]))
            .with_context("bad_str", json!(5));

        assert_eq!(context_str(&t, "framework").unwrap().as_deref(), Some("axum"));
        assert_eq!(context_str(&t, "missing").unwrap(), None);
        assert!(context_str(&t, "bad_str").is_err());
        assert_eq!(context_list(&t, "endpoints").unwrap().unwrap().len(), 2);
        assert!(context_list(&t, "bad_list").is_err());
        assert!(context_list(&t, "framework").is_err());
    }

    #[test]
    fn test_slug_and_pascal_case() {
        assert_eq!(slug("User Profile Page!"), "user-profile-page");
        assert_eq!(slug("  --  "), "item");
        assert_eq!(pascal_case("user profile card"), "UserProfileCard");
    }

    #[test]
    fn test_generic_result_shape() {
        let v = generic_result(&task(&[]), "backend", "server-side");
        assert_eq!(v["type"], "generic");
        assert_eq!(v["task_type"], "api_design");
        assert_eq!(v["recommendations"].as_array().unwrap().len(), 3);
    }
}
