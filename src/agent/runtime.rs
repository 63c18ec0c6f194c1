//! Agent Runtime
//!
//! The single place that times task execution, catches failures, updates
//! metrics and logs outcomes. `process_task` never returns an error and
//! never lets a panic out of a strategy.

use chrono::Utc;
use futures_util::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::AgentStrategy;
use crate::error::{TaskError, ValidationError};
use crate::metrics::{AgentMetrics, ExecutionLog, ExecutionRecord, LatencyTimer};
use crate::model::{AgentConfig, AgentResponse, AgentRole, Capability, Task, TaskStatus};

/// An agent: configuration + strategy + running metrics
pub struct Agent {
    config: AgentConfig,
    enabled: AtomicBool,
    strategy: Box<dyn AgentStrategy>,
    metrics: Mutex<AgentMetrics>,
    created_at: Instant,
    execution_log: Option<Arc<ExecutionLog>>,
}

/// Read-only summary of an agent
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub role: AgentRole,
    pub model: String,
    pub enabled: bool,
    pub capabilities: Vec<Capability>,
    pub specialized_capabilities: Vec<String>,
    pub collaboration_preferences: HashMap<String, f64>,
    pub metrics: AgentMetrics,
    pub online: bool,
    pub healthy: bool,
}

impl Agent {
    /// Build an agent; the config is validated here and never changes
    /// afterwards except for the enabled flag
    pub fn new(
        config: AgentConfig,
        strategy: impl AgentStrategy + 'static,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        let enabled = AtomicBool::new(config.enabled);
        let metrics = Mutex::new(AgentMetrics::new(&config.id));

        Ok(Self {
            config,
            enabled,
            strategy: Box::new(strategy),
            metrics,
            created_at: Instant::now(),
            execution_log: None,
        })
    }

    /// Also append every execution to a shared log
    pub fn with_execution_log(mut self, log: Arc<ExecutionLog>) -> Self {
        self.execution_log = Some(log);
        self
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn kind(&self) -> &'static str {
        self.strategy.kind()
    }

    /// Config snapshot reflecting the current enabled flag
    pub fn config(&self) -> AgentConfig {
        let mut config = self.config.clone();
        config.enabled = self.is_enabled();
        config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
        info!(agent_id = %self.config.id, enabled, "Agent enabled flag changed");
    }

    // ============ Routing ============

    /// Every required capability must be an enabled capability of this agent
    pub fn can_handle_task(&self, task: &Task) -> bool {
        if !self.is_enabled() {
            return false;
        }
        task.required_capabilities.iter().all(|required| {
            self.config
                .enabled_capabilities()
                .any(|c| c.name == *required)
        })
    }

    /// Mean priority of the enabled capabilities the task asks for; 0 when none match
    pub fn get_task_priority(&self, task: &Task) -> f64 {
        let matched: Vec<f64> = self
            .config
            .enabled_capabilities()
            .filter(|c| task.required_capabilities.iter().any(|r| *r == c.name))
            .map(|c| f64::from(c.priority))
            .collect();

        if matched.is_empty() {
            return 0.0;
        }
        matched.iter().sum::<f64>() / matched.len() as f64
    }

    // ============ Execution ============

    /// Execute a task. Every failure becomes a `success = false` response.
    pub async fn process_task(&self, task: &Task) -> AgentResponse {
        let timer = LatencyTimer::start();
        let config = self.config();

        debug!(
            agent_id = %config.id,
            task_id = %task.id,
            task_type = %task.task_type,
            "Processing task"
        );

        let outcome = AssertUnwindSafe(self.strategy.execute(task, &config))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(TaskError::Panicked(panic_message(payload))));

        let duration = timer.elapsed_ms();
        let response = match outcome {
            Ok(execution) => AgentResponse::success(
                &config.id,
                &task.id,
                execution.result,
                duration,
                execution.tokens_used,
                Some(execution.confidence),
            ),
            Err(e) => AgentResponse::failure(&config.id, &task.id, &e.to_string(), duration),
        };

        self.update_metrics(&response);
        self.log_task_execution(task, &response);
        response
    }

    /// Drive a task through its lifecycle around `process_task`
    ///
    /// Only PENDING tasks are run. Anything else is refused untouched and
    /// does not count towards metrics or the execution log.
    pub async fn run_task(&self, task: &mut Task) -> AgentResponse {
        if let Err(e) = Self::claim(task, self.id()) {
            warn!(agent_id = %self.config.id, task_id = %task.id, error = %e, "Task refused");
            return AgentResponse::failure(self.id(), &task.id, &e.to_string(), 0);
        }

        let response = self.process_task(task).await;

        let transition = if response.success {
            task.complete(response.result.clone())
        } else {
            task.fail(response.error.as_deref().unwrap_or("unknown error"))
        };
        if let Err(e) = transition {
            warn!(task_id = %task.id, error = %e, "Task lifecycle update rejected");
        }

        response
    }

    fn claim(task: &mut Task, agent_id: &str) -> Result<(), TaskError> {
        if task.status != TaskStatus::Pending {
            return Err(TaskError::InvalidTransition {
                from: task.status,
                to: TaskStatus::InProgress,
            });
        }
        task.start()?;
        task.assign(agent_id)
    }

    fn update_metrics(&self, response: &AgentResponse) {
        self.metrics.lock().record(response, Utc::now());
    }

    fn log_task_execution(&self, task: &Task, response: &AgentResponse) {
        if response.success {
            info!(
                agent_id = %response.agent_id,
                task_id = %task.id,
                task_type = %task.task_type,
                duration_ms = response.duration,
                tokens_used = ?response.tokens_used,
                confidence = ?response.confidence,
                "Task completed"
            );
        } else {
            warn!(
                agent_id = %response.agent_id,
                task_id = %task.id,
                task_type = %task.task_type,
                duration_ms = response.duration,
                tokens_used = ?response.tokens_used,
                confidence = ?response.confidence,
                error = response.error.as_deref().unwrap_or_default(),
                "Task failed"
            );
        }

        if let Some(log) = &self.execution_log {
            log.record(ExecutionRecord {
                agent_id: response.agent_id.clone(),
                task_id: task.id.clone(),
                task_type: task.task_type.as_str().to_string(),
                success: response.success,
                duration_ms: response.duration,
                tokens_used: response.tokens_used,
                confidence: response.confidence,
                error: response.error.clone(),
                timestamp: Utc::now(),
            });
        }
    }

    // ============ Introspection ============

    /// Snapshot; mutating it does not touch the agent
    pub fn get_metrics(&self) -> AgentMetrics {
        let mut snapshot = self.metrics.lock().clone();
        snapshot.uptime = self.created_at.elapsed().as_secs();
        snapshot
    }

    pub fn is_online(&self) -> bool {
        self.strategy.is_online()
    }

    pub fn is_healthy(&self) -> bool {
        self.is_enabled() && self.is_online()
    }

    pub fn specialized_capabilities(&self) -> &'static [&'static str] {
        self.strategy.specialized_capabilities()
    }

    pub fn collaboration_preferences(&self) -> HashMap<String, f64> {
        self.strategy
            .collaboration_preferences()
            .iter()
            .map(|(id, weight)| (id.to_string(), weight.clamp(0.0, 1.0)))
            .collect()
    }

    pub fn get_info(&self) -> AgentInfo {
        AgentInfo {
            id: self.config.id.clone(),
            name: self.config.name.clone(),
            kind: self.kind().to_string(),
            role: self.config.role,
            model: self.config.model.clone(),
            enabled: self.is_enabled(),
            capabilities: self.config.enabled_capabilities().cloned().collect(),
            specialized_capabilities: self
                .specialized_capabilities()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            collaboration_preferences: self.collaboration_preferences(),
            metrics: self.get_metrics(),
            online: self.is_online(),
            healthy: self.is_healthy(),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task handler panicked".to_string()
    }
}
