//! Project Manager Agent
//!
//! Feature planning, sprint planning, requirements and documentation
//! outlines. Feature planning is a fixed template: one user story, a
//! four-item breakdown, a day-based timeline with milestones at 70%, 90%
//! and 100%, and three standard risks.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use super::presets::{BACKEND_AGENT_ID, FRONTEND_AGENT_ID, QA_AGENT_ID, UIUX_AGENT_ID};
use super::{capability_confidence, context_list, generic_result, AgentStrategy, Execution};
use crate::error::TaskError;
use crate::model::{AgentConfig, Task, TaskType};

/// Focused engineering hours in a working day
pub const HOURS_PER_DAY: u32 = 6;

/// Milestone positions as percent of the estimated days
const MILESTONES: [(u32, &str); 3] = [
    (70, "Feature complete"),
    (90, "Testing and fixes complete"),
    (100, "Release"),
];

/// Fixed work breakdown: (category, title prefix, hours)
const BREAKDOWN: [(&str, &str, u32); 4] = [
    ("backend", "Implement backend API and data model", 8),
    ("frontend", "Build user interface", 12),
    ("design", "Design UI and interaction flow", 4),
    ("testing", "Write and run tests", 6),
];

const SPECIALIZED: &[&str] = &[
    "Agile Planning",
    "Scrum",
    "Estimation",
    "Risk Management",
    "Stakeholder Communication",
    "Roadmapping",
];

const PREFERENCES: &[(&str, f64)] = &[
    (BACKEND_AGENT_ID, 0.8),
    (FRONTEND_AGENT_ID, 0.8),
    (UIUX_AGENT_ID, 0.85),
    (QA_AGENT_ID, 0.75),
];

pub struct ProjectManagerStrategy;

#[async_trait]
impl AgentStrategy for ProjectManagerStrategy {
    fn kind(&self) -> &'static str {
        "project_manager"
    }

    fn specialized_capabilities(&self) -> &'static [&'static str] {
        SPECIALIZED
    }

    fn collaboration_preferences(&self) -> &'static [(&'static str, f64)] {
        PREFERENCES
    }

    async fn execute(&self, task: &Task, config: &AgentConfig) -> Result<Execution, TaskError> {
        let result = match task.task_type {
            TaskType::FeaturePlanning => plan_feature(task),
            TaskType::SprintPlanning => plan_sprint(task)?,
            TaskType::RequirementsAnalysis => analyze_requirements(task),
            TaskType::Documentation => outline_documentation(task),
            _ => generic_result(task, self.kind(), "delivery planning"),
        };
        Ok(Execution::new(
            result,
            capability_confidence(config, task, SPECIALIZED),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedTask {
    pub id: String,
    pub title: String,
    pub category: &'static str,
    pub estimated_hours: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Milestone {
    pub name: &'static str,
    pub day: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub total_hours: u32,
    pub estimated_days: u32,
    pub milestones: Vec<Milestone>,
}

/// Fixed four-item breakdown for a feature
pub fn breakdown(feature: &str) -> Vec<PlannedTask> {
    BREAKDOWN
        .iter()
        .enumerate()
        .map(|(i, (category, title, hours))| PlannedTask {
            id: format!("task-{}", i + 1),
            title: format!("{} for {}", title, feature),
            category,
            estimated_hours: *hours,
        })
        .collect()
}

/// Days at `HOURS_PER_DAY`, milestones at ceil(days * pct / 100)
pub fn timeline(tasks: &[PlannedTask]) -> Timeline {
    let total_hours: u32 = tasks.iter().map(|t| t.estimated_hours).sum();
    let estimated_days = total_hours.div_ceil(HOURS_PER_DAY);
    let milestones = MILESTONES
        .iter()
        .map(|(pct, name)| Milestone {
            name,
            day: (estimated_days * pct).div_ceil(100),
        })
        .collect();

    Timeline {
        total_hours,
        estimated_days,
        milestones,
    }
}

fn plan_feature(task: &Task) -> Value {
    let tasks = breakdown(&task.title);
    let timeline = timeline(&tasks);

    json!({
        "type": TaskType::FeaturePlanning.as_str(),
        "user_stories": [{
            "id": "story-1",
            "story": format!(
                "As a user, I want {} so that I can accomplish my goals more efficiently",
                task.title
            ),
            "acceptance_criteria": [
                "Feature works as described",
                "Edge cases and errors are handled",
                "Automated tests cover the main flows",
            ],
            "priority": task.priority,
        }],
        "task_breakdown": tasks,
        "timeline": timeline,
        "risks": [
            {
                "risk": "Scope creep",
                "probability": "medium",
                "impact": "high",
                "mitigation": "Freeze scope after planning and track change requests",
            },
            {
                "risk": "Technical complexity underestimated",
                "probability": "medium",
                "impact": "medium",
                "mitigation": "Spike unknowns early and keep buffer in the estimate",
            },
            {
                "risk": "Dependency delays",
                "probability": "low",
                "impact": "medium",
                "mitigation": "Identify external dependencies up front and agree on dates",
            },
        ],
        "recommendations": [
            "Review the breakdown with the implementing agents",
            "Re-estimate after the design task completes",
        ],
    })
}

fn plan_sprint(task: &Task) -> Result<Value, TaskError> {
    let backlog = context_list(task, "backlog")?.unwrap_or_default();
    let capacity_hours = 10 * HOURS_PER_DAY;

    Ok(json!({
        "type": TaskType::SprintPlanning.as_str(),
        "sprint_goal": task.title,
        "duration_days": 10,
        "capacity_hours": capacity_hours,
        "committed_items": backlog,
        "ceremonies": [
            { "name": "Sprint planning", "duration_minutes": 120 },
            { "name": "Daily standup", "duration_minutes": 15 },
            { "name": "Sprint review", "duration_minutes": 60 },
            { "name": "Retrospective", "duration_minutes": 60 },
        ],
        "recommendations": [
            "Commit to no more than 80% of capacity",
            "Keep the sprint goal visible on the board",
        ],
    }))
}

fn analyze_requirements(task: &Task) -> Value {
    json!({
        "type": TaskType::RequirementsAnalysis.as_str(),
        "subject": task.title,
        "functional": [
            format!("Users can use {}", task.title),
            "Administrators can audit changes",
        ],
        "non_functional": [
            "p95 response time under 300ms",
            "WCAG AA accessibility",
            "Audit log retained for 90 days",
        ],
        "open_questions": [
            "Who are the primary users?",
            "What does success look like in numbers?",
        ],
        "recommendations": [
            "Confirm requirements with stakeholders before estimation",
        ],
    })
}

fn outline_documentation(task: &Task) -> Value {
    json!({
        "type": TaskType::Documentation.as_str(),
        "document": task.title,
        "sections": ["Overview", "Getting Started", "Architecture", "API Reference", "FAQ"],
        "audience": ["developers", "product"],
        "recommendations": [
            "Keep docs next to the code and review them in pull requests",
        ],
    })
}
