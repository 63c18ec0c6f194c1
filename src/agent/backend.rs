//! Backend Agent
//!
//! Server-side work: API surfaces, schemas, security and performance
//! reviews, code scaffolding. Template output only, no model calls.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::presets::{FRONTEND_AGENT_ID, PROJECT_MANAGER_AGENT_ID, QA_AGENT_ID, TESTING_AGENT_ID};
use super::{
    capability_confidence, context_list, context_str, generic_result, pascal_case, slug,
    AgentStrategy, Execution,
};
use crate::error::TaskError;
use crate::model::{AgentConfig, Task, TaskType};

const SPECIALIZED: &[&str] = &[
    "RESTful API Design",
    "GraphQL",
    "PostgreSQL",
    "ORM Modeling",
    "Authentication & Authorization",
    "Caching Strategies",
    "Microservices",
];

const PREFERENCES: &[(&str, f64)] = &[
    (FRONTEND_AGENT_ID, 0.9),
    (QA_AGENT_ID, 0.8),
    (TESTING_AGENT_ID, 0.8),
    (PROJECT_MANAGER_AGENT_ID, 0.6),
];

pub struct BackendStrategy;

#[async_trait]
impl AgentStrategy for BackendStrategy {
    fn kind(&self) -> &'static str {
        "backend"
    }

    fn specialized_capabilities(&self) -> &'static [&'static str] {
        SPECIALIZED
    }

    fn collaboration_preferences(&self) -> &'static [(&'static str, f64)] {
        PREFERENCES
    }

    async fn execute(&self, task: &Task, config: &AgentConfig) -> Result<Execution, TaskError> {
        let result = match task.task_type {
            TaskType::ApiDesign => design_api(task)?,
            TaskType::DatabaseSchema => design_schema(task)?,
            TaskType::SecurityReview => review_security(task),
            TaskType::PerformanceOptimization => optimize_performance(task),
            TaskType::CodeGeneration => generate_code(task)?,
            TaskType::CodeReview => review_code(task),
            _ => generic_result(task, self.kind(), "server-side"),
        };
        Ok(Execution::new(
            result,
            capability_confidence(config, task, SPECIALIZED),
        ))
    }
}

fn design_api(task: &Task) -> Result<Value, TaskError> {
    let resource = slug(&task.title);
    let endpoints: Vec<Value> = match context_list(task, "endpoints")? {
        Some(list) => list
            .iter()
            .map(|e| {
                let (method, path) = e.split_once(' ').unwrap_or(("GET", e.as_str()));
                json!({ "method": method, "path": path, "description": format!("{} {}", method, path) })
            })
            .collect(),
        None => vec![
            json!({ "method": "GET", "path": format!("/api/v1/{}", resource), "description": "List with pagination" }),
            json!({ "method": "POST", "path": format!("/api/v1/{}", resource), "description": "Create" }),
            json!({ "method": "GET", "path": format!("/api/v1/{}/:id", resource), "description": "Fetch one" }),
            json!({ "method": "PATCH", "path": format!("/api/v1/{}/:id", resource), "description": "Partial update" }),
            json!({ "method": "DELETE", "path": format!("/api/v1/{}/:id", resource), "description": "Soft delete" }),
        ],
    };

    Ok(json!({
        "type": TaskType::ApiDesign.as_str(),
        "resource": resource,
        "endpoints": endpoints,
        "authentication": "JWT bearer tokens with refresh rotation",
        "versioning": "URI prefix /api/v1",
        "error_format": { "code": "string", "message": "string", "details": "object?" },
        "recommendations": [
            "Validate request bodies with DTO schemas before reaching services",
            "Return 201 with a Location header on create",
            "Paginate list endpoints with limit/offset and a total count",
            "Document the contract with OpenAPI and keep it in version control",
        ],
    }))
}

fn design_schema(task: &Task) -> Result<Value, TaskError> {
    let entities = context_list(task, "entities")?.unwrap_or_else(|| vec![task.title.clone()]);
    let tables: Vec<Value> = entities
        .iter()
        .map(|entity| {
            let table = slug(entity).replace('-', "_");
            json!({
                "name": table,
                "columns": [
                    { "name": "id", "type": "uuid", "primary_key": true },
                    { "name": "created_at", "type": "timestamptz", "nullable": false },
                    { "name": "updated_at", "type": "timestamptz", "nullable": false },
                    { "name": "deleted_at", "type": "timestamptz", "nullable": true },
                ],
                "indexes": [format!("idx_{}_created_at", table)],
            })
        })
        .collect();

    Ok(json!({
        "type": TaskType::DatabaseSchema.as_str(),
        "database": context_str(task, "database")?.unwrap_or_else(|| "postgresql".to_string()),
        "tables": tables,
        "migrations": ["create tables", "add indexes", "seed reference data"],
        "recommendations": [
            "Use UUID primary keys and timestamptz audit columns",
            "Add foreign keys with explicit ON DELETE behaviour",
            "Ship every schema change as a reversible migration",
        ],
    }))
}

fn review_security(task: &Task) -> Value {
    json!({
        "type": TaskType::SecurityReview.as_str(),
        "scope": task.title,
        "checks": [
            { "category": "Injection", "status": "review", "note": "Parameterize every query" },
            { "category": "Authentication", "status": "review", "note": "Hash passwords with argon2 or bcrypt" },
            { "category": "Access Control", "status": "review", "note": "Enforce ownership checks in services" },
            { "category": "Sensitive Data", "status": "review", "note": "Keep secrets out of logs and responses" },
            { "category": "Rate Limiting", "status": "review", "note": "Throttle auth and write endpoints" },
        ],
        "risk_level": "MEDIUM",
        "recommendations": [
            "Run dependency vulnerability scans in CI",
            "Add security headers (HSTS, CSP, X-Content-Type-Options)",
            "Rotate credentials and load them from the environment",
        ],
    })
}

fn optimize_performance(task: &Task) -> Value {
    json!({
        "type": TaskType::PerformanceOptimization.as_str(),
        "target": task.title,
        "bottlenecks": [
            "N+1 queries in list endpoints",
            "Missing indexes on filter columns",
            "Uncached read-heavy lookups",
        ],
        "optimizations": [
            { "area": "database", "action": "Batch related-entity loading", "expected_gain": "high" },
            { "area": "database", "action": "Add composite indexes for common filters", "expected_gain": "high" },
            { "area": "cache", "action": "Cache reference data with a short TTL", "expected_gain": "medium" },
            { "area": "transport", "action": "Enable response compression", "expected_gain": "low" },
        ],
        "recommendations": [
            "Measure p50/p95 latency before and after each change",
            "Add query logging with duration thresholds",
        ],
    })
}

fn generate_code(task: &Task) -> Result<Value, TaskError> {
    let language = context_str(task, "language")?.unwrap_or_else(|| "typescript".to_string());
    let name = pascal_case(&task.title);
    let module = slug(&task.title);

    Ok(json!({
        "type": TaskType::CodeGeneration.as_str(),
        "language": language,
        "files": [
            { "path": format!("src/{}/{}.service.ts", module, module), "content": format!("// {}Service: business logic for {}", name, task.title) },
            { "path": format!("src/{}/{}.controller.ts", module, module), "content": format!("// {}Controller: HTTP handlers for {}", name, task.title) },
            { "path": format!("src/{}/{}.entity.ts", module, module), "content": format!("// {} entity definition", name) },
        ],
        "recommendations": [
            "Keep controllers thin and move logic into services",
            "Inject repositories so services stay unit-testable",
            "Add unit tests alongside each generated service",
        ],
    }))
}

fn review_code(task: &Task) -> Value {
    json!({
        "type": TaskType::CodeReview.as_str(),
        "files_reviewed": task.files,
        "findings": [
            { "severity": "medium", "category": "error-handling", "message": "Propagate errors with context instead of swallowing them" },
            { "severity": "low", "category": "naming", "message": "Prefer intention-revealing names for service methods" },
            { "severity": "low", "category": "tests", "message": "Cover failure paths of external calls" },
        ],
        "verdict": "APPROVED_WITH_COMMENTS",
        "recommendations": [
            "Address medium findings before merging",
            "Add integration tests for the changed endpoints",
        ],
    })
}
