//! Frontend Agent
//!
//! React components, state management, UI implementation and client-side
//! performance.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::presets::{BACKEND_AGENT_ID, QA_AGENT_ID, TESTING_AGENT_ID, UIUX_AGENT_ID};
use super::{
    capability_confidence, context_list, context_str, generic_result, pascal_case, AgentStrategy,
    Execution,
};
use crate::error::TaskError;
use crate::model::{AgentConfig, Task, TaskType};

const SPECIALIZED: &[&str] = &[
    "React",
    "TypeScript",
    "Redux Toolkit",
    "React Query",
    "Tailwind CSS",
    "Accessibility (WCAG)",
    "Responsive Layouts",
];

const PREFERENCES: &[(&str, f64)] = &[
    (UIUX_AGENT_ID, 0.95),
    (BACKEND_AGENT_ID, 0.9),
    (TESTING_AGENT_ID, 0.7),
    (QA_AGENT_ID, 0.7),
];

pub struct FrontendStrategy;

#[async_trait]
impl AgentStrategy for FrontendStrategy {
    fn kind(&self) -> &'static str {
        "frontend"
    }

    fn specialized_capabilities(&self) -> &'static [&'static str] {
        SPECIALIZED
    }

    fn collaboration_preferences(&self) -> &'static [(&'static str, f64)] {
        PREFERENCES
    }

    async fn execute(&self, task: &Task, config: &AgentConfig) -> Result<Execution, TaskError> {
        let result = match task.task_type {
            TaskType::ComponentDevelopment => develop_component(task)?,
            TaskType::StateManagement => design_state(task)?,
            TaskType::UiDesign => implement_ui(task),
            TaskType::PerformanceOptimization => optimize_bundle(task),
            TaskType::CodeGeneration => scaffold_page(task),
            TaskType::CodeReview => review_frontend(task),
            _ => generic_result(task, self.kind(), "client-side"),
        };
        Ok(Execution::new(
            result,
            capability_confidence(config, task, SPECIALIZED),
        ))
    }
}

fn develop_component(task: &Task) -> Result<Value, TaskError> {
    let name = context_str(task, "component_name")?.unwrap_or_else(|| pascal_case(&task.title));
    let props = context_list(task, "props")?.unwrap_or_default();

    let props_interface = if props.is_empty() {
        format!("interface {}Props {{}}", name)
    } else {
        let fields: Vec<String> = props.iter().map(|p| format!("  {}: unknown;", p)).collect();
        format!("interface {}Props {{\n{}\n}}", name, fields.join("\n"))
    };

    Ok(json!({
        "type": TaskType::ComponentDevelopment.as_str(),
        "component": {
            "name": name,
            "path": format!("src/components/{}/{}.tsx", name, name),
            "props_interface": props_interface,
            "code": format!(
                "export function {name}(props: {name}Props) {{\n  return <div className=\"{name}\" />;\n}}",
                name = name
            ),
            "test_path": format!("src/components/{}/{}.test.tsx", name, name),
        },
        "recommendations": [
            "Keep the component presentational and lift data fetching into hooks",
            "Expose className and aria-* props for composition",
            "Add a Storybook story covering empty, loading and error states",
        ],
    }))
}

fn design_state(task: &Task) -> Result<Value, TaskError> {
    let slices = context_list(task, "slices")?.unwrap_or_else(|| vec!["ui".to_string(), "session".to_string()]);

    Ok(json!({
        "type": TaskType::StateManagement.as_str(),
        "approach": "Server state in React Query, client state in Redux Toolkit slices",
        "slices": slices
            .iter()
            .map(|s| json!({ "name": s, "actions": ["set", "reset"], "persisted": s == "session" }))
            .collect::<Vec<_>>(),
        "recommendations": [
            "Do not mirror server data in the client store",
            "Derive values with memoized selectors",
            "Persist only session state, never tokens in localStorage",
        ],
    }))
}

fn implement_ui(task: &Task) -> Value {
    json!({
        "type": TaskType::UiDesign.as_str(),
        "screen": task.title,
        "layout": {
            "grid": "12-column, 24px gutter",
            "breakpoints": { "sm": 640, "md": 768, "lg": 1024, "xl": 1280 },
        },
        "components": ["Header", "Navigation", "ContentArea", "Footer"],
        "recommendations": [
            "Build mobile-first and enhance at larger breakpoints",
            "Use design tokens for color and spacing",
            "Check color contrast against WCAG AA",
        ],
    })
}

fn optimize_bundle(task: &Task) -> Value {
    json!({
        "type": TaskType::PerformanceOptimization.as_str(),
        "target": task.title,
        "metrics": ["LCP", "INP", "CLS", "bundle size"],
        "optimizations": [
            { "action": "Route-level code splitting with React.lazy", "impact": "high" },
            { "action": "Memoize expensive list rows", "impact": "medium" },
            { "action": "Serve responsive images with width descriptors", "impact": "medium" },
            { "action": "Tree-shake icon and date libraries", "impact": "low" },
        ],
        "recommendations": [
            "Track Web Vitals in production",
            "Set a bundle size budget in CI",
        ],
    })
}

fn scaffold_page(task: &Task) -> Value {
    let name = pascal_case(&task.title);
    json!({
        "type": TaskType::CodeGeneration.as_str(),
        "language": "typescript",
        "files": [
            { "path": format!("src/pages/{}Page.tsx", name), "content": format!("// {}Page route component", name) },
            { "path": format!("src/hooks/use{}.ts", name), "content": format!("// use{} data hook", name) },
        ],
        "recommendations": [
            "Wire the page into the router with a lazy import",
            "Handle loading and error states in the data hook",
        ],
    })
}

fn review_frontend(task: &Task) -> Value {
    json!({
        "type": TaskType::CodeReview.as_str(),
        "files_reviewed": task.files,
        "findings": [
            { "severity": "medium", "category": "hooks", "message": "Effect dependencies are incomplete" },
            { "severity": "low", "category": "a11y", "message": "Interactive elements need accessible labels" },
        ],
        "verdict": "APPROVED_WITH_COMMENTS",
        "recommendations": [
            "Enable eslint-plugin-react-hooks",
            "Add tests with Testing Library queries by role",
        ],
    })
}
