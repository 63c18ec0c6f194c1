//! Per-call agent responses

use serde::{Deserialize, Serialize};

/// Outcome of exactly one `process_task` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent_id: String,
    pub task_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock milliseconds
    pub duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl AgentResponse {
    pub fn success(
        agent_id: &str,
        task_id: &str,
        result: serde_json::Value,
        duration: u64,
        tokens_used: Option<u64>,
        confidence: Option<f64>,
    ) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            task_id: task_id.to_string(),
            success: true,
            result: Some(result),
            error: None,
            duration,
            tokens_used,
            confidence: confidence.map(|c| c.clamp(0.0, 1.0)),
        }
    }

    /// Failed response; confidence is always zero
    pub fn failure(agent_id: &str, task_id: &str, error: &str, duration: u64) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            task_id: task_id.to_string(),
            success: false,
            result: None,
            error: Some(error.to_string()),
            duration,
            tokens_used: None,
            confidence: Some(0.0),
        }
    }
}
