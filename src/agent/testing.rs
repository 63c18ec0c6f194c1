//! Testing Agent
//!
//! Test suite generation, failure analysis and load test plans.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::presets::{BACKEND_AGENT_ID, FRONTEND_AGENT_ID, QA_AGENT_ID};
use super::{capability_confidence, context_str, generic_result, pascal_case, slug, AgentStrategy, Execution};
use crate::error::TaskError;
use crate::model::{AgentConfig, Task, TaskType};

const SPECIALIZED: &[&str] = &[
    "Jest",
    "Playwright",
    "Property-Based Testing",
    "Load Testing",
    "Mocking",
    "Coverage Analysis",
];

const PREFERENCES: &[(&str, f64)] = &[
    (QA_AGENT_ID, 0.95),
    (BACKEND_AGENT_ID, 0.85),
    (FRONTEND_AGENT_ID, 0.85),
];

pub struct TestingStrategy;

#[async_trait]
impl AgentStrategy for TestingStrategy {
    fn kind(&self) -> &'static str {
        "testing"
    }

    fn specialized_capabilities(&self) -> &'static [&'static str] {
        SPECIALIZED
    }

    fn collaboration_preferences(&self) -> &'static [(&'static str, f64)] {
        PREFERENCES
    }

    async fn execute(&self, task: &Task, config: &AgentConfig) -> Result<Execution, TaskError> {
        let result = match task.task_type {
            TaskType::TestGeneration => generate_tests(task)?,
            TaskType::BugAnalysis => analyze_failure(task),
            TaskType::PerformanceOptimization => load_test_plan(task),
            _ => generic_result(task, self.kind(), "testing"),
        };
        Ok(Execution::new(
            result,
            capability_confidence(config, task, SPECIALIZED),
        ))
    }
}

fn generate_tests(task: &Task) -> Result<Value, TaskError> {
    let framework = context_str(task, "framework")?.unwrap_or_else(|| "jest".to_string());
    let subject = pascal_case(&task.title);
    let file = slug(&task.title);

    let targets: Vec<String> = if task.files.is_empty() {
        vec![format!("src/{}.ts", file)]
    } else {
        task.files.clone()
    };
    let suites: Vec<Value> = targets
        .iter()
        .map(|target| {
            let test_path = match target.rsplit_once('.') {
                Some((stem, ext)) => format!("{}.test.{}", stem, ext),
                None => format!("{}.test", target),
            };
            json!({
                "target": target,
                "path": test_path,
                "cases": [
                    format!("{} handles the happy path", subject),
                    format!("{} rejects invalid input", subject),
                    format!("{} surfaces downstream errors", subject),
                ],
            })
        })
        .collect();

    Ok(json!({
        "type": TaskType::TestGeneration.as_str(),
        "framework": framework,
        "suites": suites,
        "coverage_target": 80,
        "recommendations": [
            "Keep each test independent of execution order",
            "Mock network and clock boundaries only",
        ],
    }))
}

fn analyze_failure(task: &Task) -> Value {
    json!({
        "type": TaskType::BugAnalysis.as_str(),
        "bug": task.title,
        "analysis_steps": [
            "Write a failing test that reproduces the report",
            "Bisect recent changes touching the affected code",
            "Check for flaky timing or shared state",
        ],
        "regression_test": format!("it('does not regress: {}')", task.title),
        "recommendations": [
            "Keep the reproducing test in the suite after the fix",
        ],
    })
}

fn load_test_plan(task: &Task) -> Value {
    json!({
        "type": TaskType::PerformanceOptimization.as_str(),
        "target": task.title,
        "load_profile": [
            { "stage": "ramp-up", "virtual_users": 50, "duration_secs": 60 },
            { "stage": "steady", "virtual_users": 200, "duration_secs": 300 },
            { "stage": "spike", "virtual_users": 500, "duration_secs": 60 },
        ],
        "thresholds": { "p95_ms": 500, "error_rate": 0.01 },
        "recommendations": [
            "Run against a production-like dataset",
            "Compare results with the previous baseline",
        ],
    })
}
