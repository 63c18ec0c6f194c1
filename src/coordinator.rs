//! Task Coordinator
//!
//! Routes tasks to registered agents:
//! - Candidate ranking by capability priority (ties by agent id)
//! - Single and batch dispatch with bounded concurrency
//! - Collaborator suggestions from collaboration preferences
//! - Roster status

use futures_util::stream::{self, StreamExt};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::agent::{Agent, AgentInfo};
use crate::model::{AgentResponse, Task};

/// Coordinator errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinatorError {
    #[error("no eligible agent for task {task_id}")]
    NoEligibleAgent { task_id: String },

    #[error("agent already registered: {0}")]
    DuplicateAgent(String),

    #[error("unknown agent: {0}")]
    UnknownAgent(String),
}

/// Coordinator configuration
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub max_concurrent_tasks: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 4,
        }
    }
}

/// A dispatched task with the response it produced
#[derive(Debug)]
pub struct DispatchOutcome {
    pub task: Task,
    pub result: Result<AgentResponse, CoordinatorError>,
}

/// Task coordinator
pub struct Coordinator {
    config: CoordinatorConfig,
    agents: RwLock<Vec<Arc<Agent>>>,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            config,
            agents: RwLock::new(Vec::new()),
        }
    }

    /// Coordinator pre-loaded with agents; duplicate ids are rejected
    pub fn with_agents(
        config: CoordinatorConfig,
        agents: impl IntoIterator<Item = Arc<Agent>>,
    ) -> Result<Self, CoordinatorError> {
        let coordinator = Self::new(config);
        for agent in agents {
            coordinator.register(agent)?;
        }
        Ok(coordinator)
    }

    // ============ Registry ============

    pub fn register(&self, agent: Arc<Agent>) -> Result<(), CoordinatorError> {
        let mut agents = self.agents.write();
        if agents.iter().any(|a| a.id() == agent.id()) {
            return Err(CoordinatorError::DuplicateAgent(agent.id().to_string()));
        }
        info!(agent_id = %agent.id(), kind = agent.kind(), "Agent registered");
        agents.push(agent);
        Ok(())
    }

    pub fn agent(&self, agent_id: &str) -> Option<Arc<Agent>> {
        self.agents.read().iter().find(|a| a.id() == agent_id).cloned()
    }

    pub fn agents(&self) -> Vec<Arc<Agent>> {
        self.agents.read().clone()
    }

    pub fn len(&self) -> usize {
        self.agents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.read().is_empty()
    }

    // ============ Routing ============

    /// Healthy agents able to take the task, best first
    pub fn candidates(&self, task: &Task) -> Vec<Arc<Agent>> {
        let mut ranked: Vec<(f64, Arc<Agent>)> = self
            .agents
            .read()
            .iter()
            .filter(|a| a.is_healthy() && a.can_handle_task(task))
            .map(|a| (a.get_task_priority(task), a.clone()))
            .collect();

        ranked.sort_by(|(pa, a), (pb, b)| {
            pb.partial_cmp(pa)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id().cmp(b.id()))
        });
        ranked.into_iter().map(|(_, a)| a).collect()
    }

    pub fn select(&self, task: &Task) -> Option<Arc<Agent>> {
        self.candidates(task).into_iter().next()
    }

    /// Run a task on the best candidate, driving its lifecycle
    pub async fn dispatch(&self, task: &mut Task) -> Result<AgentResponse, CoordinatorError> {
        let agent = match self.select(task) {
            Some(agent) => agent,
            None => {
                warn!(
                    task_id = %task.id,
                    task_type = %task.task_type,
                    required = ?task.required_capabilities,
                    "No eligible agent"
                );
                return Err(CoordinatorError::NoEligibleAgent {
                    task_id: task.id.clone(),
                });
            }
        };

        debug!(task_id = %task.id, agent_id = %agent.id(), "Dispatching task");
        Ok(agent.run_task(task).await)
    }

    /// Dispatch many tasks, urgent first, at most `max_concurrent_tasks`
    /// in flight. Outcomes arrive in completion order.
    pub async fn dispatch_all(&self, mut tasks: Vec<Task>) -> Vec<DispatchOutcome> {
        tasks.sort_by(|a, b| b.priority.cmp(&a.priority));
        let limit = self.config.max_concurrent_tasks.max(1);

        info!(tasks = tasks.len(), max_concurrent = limit, "Dispatching batch");

        stream::iter(tasks)
            .map(|mut task| async move {
                let result = self.dispatch(&mut task).await;
                DispatchOutcome { task, result }
            })
            .buffer_unordered(limit)
            .collect()
            .await
    }

    // ============ Collaboration ============

    /// Healthy registered peers the agent prefers, strongest first
    pub fn collaborators(&self, agent_id: &str, limit: usize) -> Result<Vec<(String, f64)>, CoordinatorError> {
        let agent = self
            .agent(agent_id)
            .ok_or_else(|| CoordinatorError::UnknownAgent(agent_id.to_string()))?;

        let mut peers: Vec<(String, f64)> = agent
            .collaboration_preferences()
            .into_iter()
            .filter(|(peer, _)| {
                peer != agent_id && self.agent(peer).map(|p| p.is_healthy()).unwrap_or(false)
            })
            .collect();

        peers.sort_by(|(ia, wa), (ib, wb)| {
            wb.partial_cmp(wa)
                .unwrap_or(Ordering::Equal)
                .then_with(|| ia.cmp(ib))
        });
        peers.truncate(limit);
        Ok(peers)
    }

    /// Info for every registered agent, in registration order
    pub fn status(&self) -> Vec<AgentInfo> {
        self.agents.read().iter().map(|a| a.get_info()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::presets::{self, BACKEND_AGENT_ID, FRONTEND_AGENT_ID, QA_AGENT_ID, TESTING_AGENT_ID, UIUX_AGENT_ID};
    use crate::model::{TaskPriority, TaskStatus, TaskType};

    fn coordinator() -> Coordinator {
        let agents = vec![
            presets::backend_agent().unwrap(),
            presets::frontend_agent().unwrap(),
            presets::uiux_agent().unwrap(),
            presets::qa_agent().unwrap(),
            presets::testing_agent().unwrap(),
        ];
        Coordinator::with_agents(CoordinatorConfig::default(), agents.into_iter().map(Arc::new)).unwrap()
    }

    fn task(task_type: TaskType, required: &[&str]) -> Task {
        Task::new("Checkout", "", task_type)
            .unwrap()
            .with_required_capabilities(required.iter().copied())
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let c = coordinator();
        let err = c.register(Arc::new(presets::qa_agent().unwrap())).unwrap_err();
        assert_eq!(err, CoordinatorError::DuplicateAgent(QA_AGENT_ID.to_string()));
        assert_eq!(c.len(), 5);
    }

    #[test]
    fn test_candidates_ranked_by_priority_then_id() {
        let c = coordinator();
        // backend grants Code Review at 7, frontend at 7, qa at 9
        let ids: Vec<String> = c
            .candidates(&task(TaskType::CodeReview, &["Code Review"]))
            .iter()
            .map(|a| a.id().to_string())
            .collect();
        assert_eq!(ids, vec![QA_AGENT_ID, BACKEND_AGENT_ID, FRONTEND_AGENT_ID]);
    }

    #[test]
    fn test_no_requirements_means_everyone_ties() {
        let c = coordinator();
        let first = c.select(&task(TaskType::Documentation, &[])).unwrap();
        assert_eq!(first.id(), BACKEND_AGENT_ID);
        assert_eq!(c.candidates(&task(TaskType::Documentation, &[])).len(), 5);
    }

    #[test]
    fn test_disabled_agent_not_selected() {
        let c = coordinator();
        c.agent(QA_AGENT_ID).unwrap().set_enabled(false);
        let first = c.select(&task(TaskType::CodeReview, &["Code Review"])).unwrap();
        assert_eq!(first.id(), BACKEND_AGENT_ID);
    }

    #[tokio::test]
    async fn test_dispatch_runs_lifecycle() {
        let c = coordinator();
        let mut t = task(TaskType::ApiDesign, &["API Design and Implementation"]);
        let response = c.dispatch(&mut t).await.unwrap();
        assert!(response.success);
        assert_eq!(response.agent_id, BACKEND_AGENT_ID);
        assert_eq!(t.status, TaskStatus::Completed);
        assert_eq!(t.assigned_agent_id.as_deref(), Some(BACKEND_AGENT_ID));
    }

    #[tokio::test]
    async fn test_dispatch_without_candidate() {
        let c = coordinator();
        let mut t = task(TaskType::ApiDesign, &["Nonexistent Capability"]);
        let err = c.dispatch(&mut t).await.unwrap_err();
        assert!(matches!(err, CoordinatorError::NoEligibleAgent { .. }));
        assert_eq!(t.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_dispatch_all() {
        let c = coordinator();
        let tasks = vec![
            task(TaskType::TestGeneration, &["Test Generation"]),
            task(TaskType::UiDesign, &["UI Design"]).with_priority(TaskPriority::Urgent),
            task(TaskType::ApiDesign, &["Nonexistent Capability"]),
        ];
        let outcomes = c.dispatch_all(tasks).await;
        assert_eq!(outcomes.len(), 3);

        let ok: Vec<&str> = outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|r| r.agent_id.as_str())
            .collect();
        assert_eq!(ok.len(), 2);
        assert!(ok.contains(&TESTING_AGENT_ID));
        assert!(ok.contains(&UIUX_AGENT_ID));
        assert_eq!(outcomes.iter().filter(|o| o.result.is_err()).count(), 1);
    }

    #[test]
    fn test_collaborators() {
        let c = coordinator();
        // backend prefers frontend 0.9, qa 0.8, testing 0.8; project manager is not registered
        let peers = c.collaborators(BACKEND_AGENT_ID, 10).unwrap();
        let ids: Vec<&str> = peers.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec![FRONTEND_AGENT_ID, QA_AGENT_ID, TESTING_AGENT_ID]);

        let top = c.collaborators(BACKEND_AGENT_ID, 1).unwrap();
        assert_eq!(top, vec![(FRONTEND_AGENT_ID.to_string(), 0.9)]);

        assert!(c.collaborators("nobody", 3).is_err());
    }

    #[test]
    fn test_status_lists_every_agent() {
        let c = coordinator();
        let status = c.status();
        assert_eq!(status.len(), 5);
        assert!(status.iter().all(|info| info.healthy));
    }
}
