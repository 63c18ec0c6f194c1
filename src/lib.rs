//! DevCrew Agents
//!
//! Task routing and confidence scoring for a crew of software-development
//! agents.
//!
//! # Features
//!
//! - **Capability model**: prioritized capabilities, typed tasks with a lifecycle
//! - **Templated agents**: backend, frontend, UI/UX, project manager, QA, testing
//! - **LLM-backed agents**: Claude and GPT over their HTTP APIs
//! - **Metrics**: streaming per-agent averages and a bounded execution log
//! - **Coordinator**: capability-ranked dispatch with bounded concurrency
//!
//! # Architecture
//!
//! ```text
//! stdin (JSON lines) ──► TaskServer ──► Coordinator ──► Agent ──► AgentStrategy
//!                                          │              │          ├── templates
//!                                          │              │          └── ChatProvider
//!                                          │              ├── AgentMetrics
//!                                          │              └── ExecutionLog
//!                                          └── collaborators / status
//! ```

pub mod agent;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod files;
pub mod llm;
pub mod metrics;
pub mod model;
pub mod server;

pub use agent::{Agent, AgentInfo, AgentStrategy, Execution};
pub use config::Config;
pub use coordinator::{Coordinator, CoordinatorConfig, CoordinatorError, DispatchOutcome};
pub use error::{TaskError, ValidationError};
pub use files::{FileReader, FsFileReader};
pub use llm::{AnthropicClient, ChatProvider, LlmError, OpenAiClient};
pub use metrics::{AgentMetrics, ExecutionLog, ExecutionSummary};
pub use model::{AgentConfig, AgentResponse, AgentRole, Capability, Task, TaskPriority, TaskStatus, TaskType};
pub use server::TaskServer;
