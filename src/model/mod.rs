//! Capability & Task Model
//!
//! Value types shared by every agent: declared capabilities, agent
//! configuration, units of work and per-call responses.

pub mod agent_config;
pub mod capability;
pub mod response;
pub mod task;

pub use agent_config::{AgentConfig, AgentRole};
pub use capability::Capability;
pub use response::AgentResponse;
pub use task::{Task, TaskPriority, TaskStatus, TaskType};
