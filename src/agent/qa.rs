//! QA Agent
//!
//! Quality gates, code review checklists, bug triage and security audits.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::presets::{BACKEND_AGENT_ID, FRONTEND_AGENT_ID, PROJECT_MANAGER_AGENT_ID, TESTING_AGENT_ID};
use super::{capability_confidence, context_str, generic_result, AgentStrategy, Execution};
use crate::error::TaskError;
use crate::model::{AgentConfig, Task, TaskPriority, TaskType};

const SPECIALIZED: &[&str] = &[
    "Test Strategy",
    "Exploratory Testing",
    "Regression Analysis",
    "OWASP Top 10",
    "Acceptance Criteria Review",
    "Release Readiness",
];

const PREFERENCES: &[(&str, f64)] = &[
    (TESTING_AGENT_ID, 0.95),
    (BACKEND_AGENT_ID, 0.8),
    (FRONTEND_AGENT_ID, 0.8),
    (PROJECT_MANAGER_AGENT_ID, 0.7),
];

pub struct QaStrategy;

#[async_trait]
impl AgentStrategy for QaStrategy {
    fn kind(&self) -> &'static str {
        "qa"
    }

    fn specialized_capabilities(&self) -> &'static [&'static str] {
        SPECIALIZED
    }

    fn collaboration_preferences(&self) -> &'static [(&'static str, f64)] {
        PREFERENCES
    }

    async fn execute(&self, task: &Task, config: &AgentConfig) -> Result<Execution, TaskError> {
        let result = match task.task_type {
            TaskType::QualityAssurance => quality_gate(task),
            TaskType::CodeReview => review_checklist(task),
            TaskType::BugAnalysis => triage_bug(task)?,
            TaskType::SecurityReview => security_audit(task),
            _ => generic_result(task, self.kind(), "quality"),
        };
        Ok(Execution::new(
            result,
            capability_confidence(config, task, SPECIALIZED),
        ))
    }
}

/// Severity label for a bug at the given task priority
pub fn severity_for(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Urgent => "critical",
        TaskPriority::High => "major",
        TaskPriority::Medium => "minor",
        TaskPriority::Low => "trivial",
    }
}

fn quality_gate(task: &Task) -> Value {
    json!({
        "type": TaskType::QualityAssurance.as_str(),
        "scope": task.title,
        "quality_gates": [
            { "gate": "Unit test coverage", "threshold": ">= 80%" },
            { "gate": "No open critical bugs", "threshold": "0" },
            { "gate": "Lint and type checks", "threshold": "clean" },
            { "gate": "Accessibility audit", "threshold": "WCAG AA" },
        ],
        "test_plan": {
            "smoke": ["Login", "Primary navigation", "Core happy path"],
            "regression": "Full suite on release branch",
            "exploratory_hours": 4,
        },
        "recommendations": [
            "Block the release on failed gates, not on warnings",
            "Track escaped defects per release",
        ],
    })
}

fn review_checklist(task: &Task) -> Value {
    json!({
        "type": TaskType::CodeReview.as_str(),
        "files_reviewed": task.files,
        "checklist": [
            { "item": "Requirements covered by tests", "status": "pending" },
            { "item": "Error paths handled and logged", "status": "pending" },
            { "item": "No secrets or debug output committed", "status": "pending" },
            { "item": "Public API changes documented", "status": "pending" },
        ],
        "verdict": "NEEDS_VERIFICATION",
        "recommendations": [
            "Pair the review with a short exploratory session",
        ],
    })
}

fn triage_bug(task: &Task) -> Result<Value, TaskError> {
    let component = context_str(task, "component")?.unwrap_or_else(|| "unknown".to_string());

    Ok(json!({
        "type": TaskType::BugAnalysis.as_str(),
        "bug": task.title,
        "component": component,
        "severity": severity_for(task.priority),
        "reproduction": [
            "Reproduce on a clean environment",
            "Capture logs and request ids",
            "Reduce to a minimal failing case",
        ],
        "suspected_causes": ["Unhandled edge case in input validation", "Race between concurrent requests"],
        "recommendations": [
            "Add a regression test before fixing",
            "Link the fix to this bug in the changelog",
        ],
    }))
}

fn security_audit(task: &Task) -> Value {
    json!({
        "type": TaskType::SecurityReview.as_str(),
        "scope": task.title,
        "owasp_checks": [
            "A01 Broken Access Control",
            "A02 Cryptographic Failures",
            "A03 Injection",
            "A05 Security Misconfiguration",
            "A07 Identification and Authentication Failures",
        ],
        "risk_level": "MEDIUM",
        "recommendations": [
            "Schedule a dependency audit",
            "Add negative tests for authorization rules",
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AgentRole;

    fn config() -> AgentConfig {
        AgentConfig::new("qa-agent", "QA", AgentRole::Reviewer, "template", "")
    }

    #[tokio::test]
    async fn test_bug_severity_follows_priority() {
        let task = Task::new("Crash on save", "", TaskType::BugAnalysis)
            .unwrap()
            .with_priority(TaskPriority::Urgent)
            .with_context("component", json!("editor"));
        let exec = QaStrategy.execute(&task, &config()).await.unwrap();
        assert_eq!(exec.result["severity"], "critical");
        assert_eq!(exec.result["component"], "editor");
    }

    #[tokio::test]
    async fn test_component_must_be_string() {
        let task = Task::new("Crash", "", TaskType::BugAnalysis)
            .unwrap()
            .with_context("component", json!(42));
        assert!(QaStrategy.execute(&task, &config()).await.is_err());
    }

    #[tokio::test]
    async fn test_dispatch_table() {
        for (task_type, tag) in [
            (TaskType::QualityAssurance, "quality_assurance"),
            (TaskType::CodeReview, "code_review"),
            (TaskType::SecurityReview, "security_review"),
            (TaskType::ApiDesign, "generic"),
        ] {
            let task = Task::new("Release 2.1", "", task_type).unwrap();
            let exec = QaStrategy.execute(&task, &config()).await.unwrap();
            assert_eq!(exec.result["type"], tag);
            assert_eq!(exec.confidence, 0.5);
        }
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(severity_for(TaskPriority::Low), "trivial");
        assert_eq!(severity_for(TaskPriority::High), "major");
    }
}
