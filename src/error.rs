//! Error Types
//!
//! Construction-time validation errors and task execution errors.
//! Capability mismatch is deliberately absent: an agent that cannot take a
//! task answers `false` from `can_handle_task`, it does not fail.

use crate::llm::LlmError;
use crate::model::TaskStatus;

/// Malformed capability, agent config or task
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("{field} out of range: {value} (expected {expected})")]
    OutOfRange {
        field: String,
        value: String,
        expected: String,
    },
}

impl ValidationError {
    pub(crate) fn out_of_range(
        field: &str,
        value: impl ToString,
        expected: &str,
    ) -> Self {
        Self::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }
}

/// Failure while executing a task
///
/// Never escapes `Agent::process_task`; it is folded into a failed
/// `AgentResponse` there.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("{0}")]
    Execution(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Failed to read {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("Invalid task transition: {from:?} -> {to:?}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    #[error("{0}")]
    Panicked(String),
}

impl TaskError {
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }
}
