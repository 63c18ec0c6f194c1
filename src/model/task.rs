//! Tasks
//!
//! A `Task` is a unit of work routed to an agent. It moves
//! PENDING -> IN_PROGRESS -> {COMPLETED | FAILED | CANCELLED}; terminal
//! states are final. A pending task may also be cancelled directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{TaskError, ValidationError};

/// Category of work; drives per-agent dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    CodeGeneration,
    CodeReview,
    ApiDesign,
    DatabaseSchema,
    SecurityReview,
    PerformanceOptimization,
    UiDesign,
    UxResearch,
    ComponentDevelopment,
    StateManagement,
    FeaturePlanning,
    SprintPlanning,
    RequirementsAnalysis,
    TestGeneration,
    BugAnalysis,
    QualityAssurance,
    Documentation,
    Refactoring,
}

impl TaskType {
    pub const ALL: [TaskType; 18] = [
        TaskType::CodeGeneration,
        TaskType::CodeReview,
        TaskType::ApiDesign,
        TaskType::DatabaseSchema,
        TaskType::SecurityReview,
        TaskType::PerformanceOptimization,
        TaskType::UiDesign,
        TaskType::UxResearch,
        TaskType::ComponentDevelopment,
        TaskType::StateManagement,
        TaskType::FeaturePlanning,
        TaskType::SprintPlanning,
        TaskType::RequirementsAnalysis,
        TaskType::TestGeneration,
        TaskType::BugAnalysis,
        TaskType::QualityAssurance,
        TaskType::Documentation,
        TaskType::Refactoring,
    ];

    /// Tag used in result objects
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CodeGeneration => "code_generation",
            Self::CodeReview => "code_review",
            Self::ApiDesign => "api_design",
            Self::DatabaseSchema => "database_schema",
            Self::SecurityReview => "security_review",
            Self::PerformanceOptimization => "performance_optimization",
            Self::UiDesign => "ui_design",
            Self::UxResearch => "ux_research",
            Self::ComponentDevelopment => "component_development",
            Self::StateManagement => "state_management",
            Self::FeaturePlanning => "feature_planning",
            Self::SprintPlanning => "sprint_planning",
            Self::RequirementsAnalysis => "requirements_analysis",
            Self::TestGeneration => "test_generation",
            Self::BugAnalysis => "bug_analysis",
            Self::QualityAssurance => "quality_assurance",
            Self::Documentation => "documentation",
            Self::Refactoring => "refactoring",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task urgency
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
    Urgent = 4,
}

/// Lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// A unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default = "new_task_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub assigned_agent_id: Option<String>,
    #[serde(default)]
    pub required_capabilities: Vec<String>,
    #[serde(default)]
    pub context: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Estimate in milliseconds
    #[serde(default)]
    pub estimated_duration: Option<u64>,
    /// Measured start-to-terminal time in milliseconds
    #[serde(default)]
    pub actual_duration: Option<u64>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

fn new_task_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Task {
    /// Create a pending task
    pub fn new(title: &str, description: &str, task_type: TaskType) -> Result<Self, ValidationError> {
        let now = Utc::now();
        let task = Self {
            id: new_task_id(),
            title: title.to_string(),
            description: description.to_string(),
            task_type,
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            assigned_agent_id: None,
            required_capabilities: Vec::new(),
            context: None,
            files: Vec::new(),
            dependencies: Vec::new(),
            estimated_duration: None,
            actual_duration: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        };
        task.validate()?;
        Ok(task)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingField("task.id".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("task.title".to_string()));
        }
        Ok(())
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_required_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context(mut self, key: &str, value: serde_json::Value) -> Self {
        self.context
            .get_or_insert_with(HashMap::new)
            .insert(key.to_string(), value);
        self
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn depends_on(mut self, task_id: &str) -> Self {
        self.dependencies.push(task_id.to_string());
        self
    }

    pub fn with_estimated_duration(mut self, millis: u64) -> Self {
        self.estimated_duration = Some(millis);
        self
    }

    // ============ Lifecycle ============

    /// Record the agent responsible for this task
    pub fn assign(&mut self, agent_id: &str) -> Result<(), TaskError> {
        if self.status.is_terminal() {
            return Err(TaskError::InvalidTransition {
                from: self.status,
                to: self.status,
            });
        }
        self.assigned_agent_id = Some(agent_id.to_string());
        self.touch();
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), TaskError> {
        self.transition(&[TaskStatus::Pending], TaskStatus::InProgress)?;
        self.started_at = Some(self.updated_at);
        Ok(())
    }

    pub fn complete(&mut self, result: Option<serde_json::Value>) -> Result<(), TaskError> {
        self.transition(&[TaskStatus::InProgress], TaskStatus::Completed)?;
        self.result = result;
        self.error = None;
        self.finish();
        Ok(())
    }

    pub fn fail(&mut self, error: &str) -> Result<(), TaskError> {
        self.transition(&[TaskStatus::InProgress], TaskStatus::Failed)?;
        self.error = Some(error.to_string());
        self.finish();
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), TaskError> {
        self.transition(
            &[TaskStatus::Pending, TaskStatus::InProgress],
            TaskStatus::Cancelled,
        )?;
        self.finish();
        Ok(())
    }

    fn transition(&mut self, allowed_from: &[TaskStatus], to: TaskStatus) -> Result<(), TaskError> {
        if !allowed_from.contains(&self.status) {
            return Err(TaskError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.touch();
        Ok(())
    }

    fn finish(&mut self) {
        self.completed_at = Some(self.updated_at);
        if let Some(started) = self.started_at {
            let elapsed = (self.updated_at - started).num_milliseconds().max(0);
            self.actual_duration = Some(elapsed as u64);
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task() -> Task {
        Task::new("Orders API", "CRUD for orders", TaskType::ApiDesign).unwrap()
    }

    #[test]
    fn test_defaults() {
        let t = task();
        assert_eq!(t.priority, TaskPriority::Medium);
        assert_eq!(t.status, TaskStatus::Pending);
        assert!(t.required_capabilities.is_empty());
        assert!(t.files.is_empty());
        assert!(t.dependencies.is_empty());
        assert!(t.completed_at.is_none());
    }

    #[test]
    fn test_empty_title_rejected() {
        assert_eq!(
            Task::new("", "desc", TaskType::Documentation),
            Err(ValidationError::MissingField("task.title".to_string()))
        );
    }

    #[test]
    fn test_task_type_count_and_tags() {
        assert_eq!(TaskType::ALL.len(), 18);
        let tags: std::collections::HashSet<_> = TaskType::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(tags.len(), 18);
        assert_eq!(TaskType::ApiDesign.to_string(), "api_design");
    }

    #[test]
    fn test_priority_ordering() {
        assert!(TaskPriority::Urgent > TaskPriority::High);
        assert!(TaskPriority::Low < TaskPriority::Medium);
        assert_eq!(TaskPriority::Urgent as u8, 4);
    }

    #[test]
    fn test_deserialize_minimal_task() {
        let t: Task = serde_json::from_value(json!({
            "title": "Plan checkout",
            "type": "FEATURE_PLANNING"
        }))
        .unwrap();
        assert_eq!(t.task_type, TaskType::FeaturePlanning);
        assert_eq!(t.priority, TaskPriority::Medium);
        assert_eq!(t.status, TaskStatus::Pending);
        assert!(!t.id.is_empty());
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_happy_lifecycle() {
        let mut t = task();
        t.assign("backend-agent").unwrap();
        t.start().unwrap();
        assert_eq!(t.status, TaskStatus::InProgress);
        assert!(t.started_at.is_some());

        t.complete(Some(json!({"type": "api_design"}))).unwrap();
        assert_eq!(t.status, TaskStatus::Completed);
        assert!(t.completed_at.is_some());
        assert!(t.actual_duration.is_some());
        assert_eq!(t.assigned_agent_id.as_deref(), Some("backend-agent"));
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut t = task();
        t.start().unwrap();
        t.fail("boom").unwrap();
        assert_eq!(t.error.as_deref(), Some("boom"));

        assert!(t.start().is_err());
        assert!(t.complete(None).is_err());
        assert!(t.cancel().is_err());
        assert!(t.assign("qa-agent").is_err());
        assert_eq!(t.status, TaskStatus::Failed);
    }

    #[test]
    fn test_cannot_complete_pending_task() {
        let mut t = task();
        let err = t.complete(None).unwrap_err();
        assert!(matches!(
            err,
            TaskError::InvalidTransition {
                from: TaskStatus::Pending,
                to: TaskStatus::Completed
            }
        ));
    }

    #[test]
    fn test_cancel_pending() {
        let mut t = task();
        t.cancel().unwrap();
        assert_eq!(t.status, TaskStatus::Cancelled);
        assert!(t.actual_duration.is_none());
    }

    #[test]
    fn test_builders() {
        let t = task()
            .with_priority(TaskPriority::Urgent)
            .with_required_capabilities(["API Design and Implementation"])
            .with_context("framework", json!("axum"))
            .with_files(["src/orders.rs"])
            .depends_on("task-0")
            .with_estimated_duration(3_600_000);
        assert_eq!(t.required_capabilities, vec!["API Design and Implementation"]);
        assert_eq!(t.context.unwrap()["framework"], "axum");
        assert_eq!(t.files, vec!["src/orders.rs"]);
        assert_eq!(t.dependencies, vec!["task-0"]);
        assert_eq!(t.estimated_duration, Some(3_600_000));
    }
}
