//! UI/UX Agent
//!
//! Design specifications, user research plans and component design
//! guidance.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::presets::{FRONTEND_AGENT_ID, PROJECT_MANAGER_AGENT_ID, QA_AGENT_ID};
use super::{capability_confidence, context_list, generic_result, pascal_case, AgentStrategy, Execution};
use crate::error::TaskError;
use crate::model::{AgentConfig, Task, TaskType};

const SPECIALIZED: &[&str] = &[
    "Design Systems",
    "Wireframing",
    "Prototyping",
    "User Research",
    "Interaction Design",
    "Visual Hierarchy",
];

const PREFERENCES: &[(&str, f64)] = &[
    (FRONTEND_AGENT_ID, 0.95),
    (PROJECT_MANAGER_AGENT_ID, 0.8),
    (QA_AGENT_ID, 0.5),
];

pub struct UiUxStrategy;

#[async_trait]
impl AgentStrategy for UiUxStrategy {
    fn kind(&self) -> &'static str {
        "uiux"
    }

    fn specialized_capabilities(&self) -> &'static [&'static str] {
        SPECIALIZED
    }

    fn collaboration_preferences(&self) -> &'static [(&'static str, f64)] {
        PREFERENCES
    }

    async fn execute(&self, task: &Task, config: &AgentConfig) -> Result<Execution, TaskError> {
        let result = match task.task_type {
            TaskType::UiDesign => design_specification(task)?,
            TaskType::UxResearch => research_plan(task)?,
            TaskType::ComponentDevelopment => component_design(task),
            _ => generic_result(task, self.kind(), "user experience"),
        };
        Ok(Execution::new(
            result,
            capability_confidence(config, task, SPECIALIZED),
        ))
    }
}

fn design_specification(task: &Task) -> Result<Value, TaskError> {
    let screens = context_list(task, "screens")?.unwrap_or_else(|| vec![task.title.clone()]);

    Ok(json!({
        "type": TaskType::UiDesign.as_str(),
        "design_specification": {
            "screens": screens,
            "color_palette": {
                "primary": "#2563EB",
                "secondary": "#7C3AED",
                "neutral": "#6B7280",
                "success": "#16A34A",
                "error": "#DC2626",
            },
            "typography": {
                "font_family": "Inter, system-ui, sans-serif",
                "scale": [12, 14, 16, 20, 24, 32, 40],
            },
            "spacing_unit": 4,
            "border_radius": 8,
        },
        "deliverables": ["Wireframes", "High-fidelity mockups", "Clickable prototype"],
        "recommendations": [
            "Start from low-fidelity wireframes and validate flows first",
            "Document states (hover, focus, disabled, error) for every control",
            "Keep contrast ratio at 4.5:1 or higher for body text",
        ],
    }))
}

fn research_plan(task: &Task) -> Result<Value, TaskError> {
    let personas = context_list(task, "personas")?
        .unwrap_or_else(|| vec!["First-time visitor".to_string(), "Returning customer".to_string()]);

    Ok(json!({
        "type": TaskType::UxResearch.as_str(),
        "objective": task.title,
        "personas": personas,
        "methods": [
            { "method": "User interviews", "participants": 5, "duration_days": 3 },
            { "method": "Usability testing", "participants": 8, "duration_days": 4 },
            { "method": "Analytics review", "participants": 0, "duration_days": 1 },
        ],
        "success_metrics": ["Task completion rate", "Time on task", "System Usability Scale"],
        "recommendations": [
            "Recruit participants matching each persona",
            "Synthesize findings into an affinity map before redesigning",
        ],
    }))
}

fn component_design(task: &Task) -> Value {
    let name = pascal_case(&task.title);
    json!({
        "type": TaskType::ComponentDevelopment.as_str(),
        "component_design": {
            "name": name,
            "variants": ["primary", "secondary", "ghost"],
            "sizes": ["sm", "md", "lg"],
            "states": ["default", "hover", "focus", "disabled", "loading"],
            "tokens": ["color.primary", "space.2", "radius.md"],
        },
        "recommendations": [
            format!("Add {} to the design system library before implementation", name),
            "Provide keyboard interaction notes for the frontend team",
        ],
    })
}
