//! Agent Presets
//!
//! The default crew: stable ids, granted capabilities and system prompts
//! for every built-in agent, plus `default_roster` to build all eight.

use std::sync::Arc;

use super::llm::{LlmStrategy, CLAUDE_PROFILE, GPT_PROFILE};
use super::{
    Agent, BackendStrategy, FrontendStrategy, ProjectManagerStrategy, QaStrategy,
    TestingStrategy, UiUxStrategy,
};
use crate::config::Config;
use crate::error::ValidationError;
use crate::files::{FileReader, FsFileReader};
use crate::llm::{AnthropicClient, OpenAiClient};
use crate::metrics::ExecutionLog;
use crate::model::{AgentConfig, AgentRole, Capability};

pub const BACKEND_AGENT_ID: &str = "backend-agent";
pub const FRONTEND_AGENT_ID: &str = "frontend-agent";
pub const UIUX_AGENT_ID: &str = "uiux-agent";
pub const PROJECT_MANAGER_AGENT_ID: &str = "project-manager-agent";
pub const QA_AGENT_ID: &str = "qa-agent";
pub const TESTING_AGENT_ID: &str = "testing-agent";
pub const CLAUDE_AGENT_ID: &str = "claude-agent";
pub const GPT_AGENT_ID: &str = "gpt-agent";

/// Model name recorded for agents that never call a provider
pub const TEMPLATE_MODEL: &str = "template";

/// (name, description, priority)
type CapabilitySpec = (&'static str, &'static str, u8);

const BACKEND_CAPABILITIES: &[CapabilitySpec] = &[
    ("API Design and Implementation", "REST and GraphQL endpoint design", 10),
    ("Database Design", "Relational schemas, indexes and migrations", 9),
    ("Security Implementation", "Authentication, authorization and hardening", 8),
    ("Performance Optimization", "Query tuning, caching and profiling", 7),
    ("Code Generation", "Service, controller and entity scaffolding", 8),
    ("Code Review", "Server-side review", 7),
];

const FRONTEND_CAPABILITIES: &[CapabilitySpec] = &[
    ("Component Development", "Reusable typed UI components", 10),
    ("State Management", "Client and server state design", 9),
    ("UI Implementation", "Responsive layouts from designs", 9),
    ("Frontend Performance", "Bundle size and Web Vitals", 7),
    ("Code Generation", "Page and hook scaffolding", 8),
    ("Code Review", "Client-side review", 7),
];

const UIUX_CAPABILITIES: &[CapabilitySpec] = &[
    ("UI Design", "Visual design specifications", 10),
    ("UX Research", "Research plans and usability studies", 9),
    ("Component Design", "Variants, states and tokens", 8),
    ("Accessibility", "Inclusive design reviews", 8),
];

const PROJECT_MANAGER_CAPABILITIES: &[CapabilitySpec] = &[
    ("Feature Planning", "User stories, breakdowns and timelines", 10),
    ("Sprint Planning", "Sprint scope and ceremonies", 9),
    ("Requirements Analysis", "Functional and non-functional requirements", 9),
    ("Documentation", "Document outlines", 7),
];

const QA_CAPABILITIES: &[CapabilitySpec] = &[
    ("Quality Assurance", "Quality gates and test plans", 10),
    ("Code Review", "Review checklists", 9),
    ("Bug Analysis", "Bug triage and severity", 8),
    ("Security Review", "OWASP-based audits", 8),
];

const TESTING_CAPABILITIES: &[CapabilitySpec] = &[
    ("Test Generation", "Unit and integration test suites", 10),
    ("Test Automation", "CI test pipelines", 9),
    ("Bug Analysis", "Reproduction and regression tests", 8),
    ("Performance Testing", "Load and stress test plans", 8),
];

const CLAUDE_CAPABILITIES: &[CapabilitySpec] = &[
    ("Code Generation", "General-purpose code generation", 9),
    ("Code Review", "In-depth review with file context", 9),
    ("Architecture Design", "System and module design", 8),
    ("Documentation", "Technical documentation", 8),
    ("Refactoring", "Behaviour-preserving restructuring", 8),
];

const GPT_CAPABILITIES: &[CapabilitySpec] = &[
    ("Code Generation", "General-purpose code generation", 9),
    ("Code Review", "Review with file context", 8),
    ("Bug Analysis", "Debugging assistance", 7),
    ("Documentation", "Technical documentation", 7),
    ("Refactoring", "Behaviour-preserving restructuring", 7),
];

fn capabilities(specs: &[CapabilitySpec]) -> Result<Vec<Capability>, ValidationError> {
    specs
        .iter()
        .map(|(name, description, priority)| Capability::new(name, description, *priority))
        .collect()
}

fn templated_config(
    id: &str,
    name: &str,
    role: AgentRole,
    prompt: &str,
    specs: &[CapabilitySpec],
) -> Result<AgentConfig, ValidationError> {
    Ok(AgentConfig::new(id, name, role, TEMPLATE_MODEL, prompt).with_capabilities(capabilities(specs)?))
}

// ============ Templated agents ============

pub fn backend_config() -> Result<AgentConfig, ValidationError> {
    templated_config(
        BACKEND_AGENT_ID,
        "Backend Agent",
        AgentRole::Developer,
        "You design and build server-side systems: APIs, databases, security and performance.",
        BACKEND_CAPABILITIES,
    )
}

pub fn frontend_config() -> Result<AgentConfig, ValidationError> {
    templated_config(
        FRONTEND_AGENT_ID,
        "Frontend Agent",
        AgentRole::Developer,
        "You build accessible, fast client applications with React and TypeScript.",
        FRONTEND_CAPABILITIES,
    )
}

pub fn uiux_config() -> Result<AgentConfig, ValidationError> {
    templated_config(
        UIUX_AGENT_ID,
        "UI/UX Agent",
        AgentRole::Architect,
        "You design user experiences and visual systems grounded in research.",
        UIUX_CAPABILITIES,
    )
}

pub fn project_manager_config() -> Result<AgentConfig, ValidationError> {
    templated_config(
        PROJECT_MANAGER_AGENT_ID,
        "Project Manager Agent",
        AgentRole::Architect,
        "You plan features and sprints and keep requirements clear.",
        PROJECT_MANAGER_CAPABILITIES,
    )
}

pub fn qa_config() -> Result<AgentConfig, ValidationError> {
    templated_config(
        QA_AGENT_ID,
        "QA Agent",
        AgentRole::Reviewer,
        "You guard release quality through reviews, triage and audits.",
        QA_CAPABILITIES,
    )
}

pub fn testing_config() -> Result<AgentConfig, ValidationError> {
    templated_config(
        TESTING_AGENT_ID,
        "Testing Agent",
        AgentRole::Tester,
        "You write and automate tests that catch regressions early.",
        TESTING_CAPABILITIES,
    )
}

pub fn backend_agent() -> Result<Agent, ValidationError> {
    Agent::new(backend_config()?, BackendStrategy)
}

pub fn frontend_agent() -> Result<Agent, ValidationError> {
    Agent::new(frontend_config()?, FrontendStrategy)
}

pub fn uiux_agent() -> Result<Agent, ValidationError> {
    Agent::new(uiux_config()?, UiUxStrategy)
}

pub fn project_manager_agent() -> Result<Agent, ValidationError> {
    Agent::new(project_manager_config()?, ProjectManagerStrategy)
}

pub fn qa_agent() -> Result<Agent, ValidationError> {
    Agent::new(qa_config()?, QaStrategy)
}

pub fn testing_agent() -> Result<Agent, ValidationError> {
    Agent::new(testing_config()?, TestingStrategy)
}

// ============ LLM-backed agents ============

pub fn claude_config(config: &Config) -> Result<AgentConfig, ValidationError> {
    Ok(AgentConfig::new(
        CLAUDE_AGENT_ID,
        "Claude Agent",
        AgentRole::Copilot,
        &config.claude_model,
        "You are a senior software engineer. Answer with concrete, reviewable changes and \
         quote file paths in backticks.",
    )
    .with_capabilities(capabilities(CLAUDE_CAPABILITIES)?)
    .with_max_tokens(config.max_tokens)
    .with_temperature(config.temperature)
    .with_api_key(config.anthropic_api_key.clone())
    .with_base_url(config.anthropic_base_url.clone()))
}

pub fn gpt_config(config: &Config) -> Result<AgentConfig, ValidationError> {
    Ok(AgentConfig::new(
        GPT_AGENT_ID,
        "GPT Agent",
        AgentRole::Copilot,
        &config.gpt_model,
        "You are a pragmatic software engineer. Prefer working code over prose and \
         quote file paths in backticks.",
    )
    .with_capabilities(capabilities(GPT_CAPABILITIES)?)
    .with_max_tokens(config.max_tokens)
    .with_temperature(config.temperature)
    .with_api_key(config.openai_api_key.clone())
    .with_base_url(config.openai_base_url.clone()))
}

pub fn claude_agent(config: &Config, files: Arc<dyn FileReader>) -> Result<Agent, ValidationError> {
    let agent_config = claude_config(config)?;
    let provider = AnthropicClient::new(
        agent_config.api_key.as_deref(),
        agent_config.base_url.as_deref(),
        config.request_timeout,
    );
    Agent::new(agent_config, LlmStrategy::new(CLAUDE_PROFILE, provider, files))
}

pub fn gpt_agent(config: &Config, files: Arc<dyn FileReader>) -> Result<Agent, ValidationError> {
    let agent_config = gpt_config(config)?;
    let provider = OpenAiClient::new(
        agent_config.api_key.as_deref(),
        agent_config.base_url.as_deref(),
        config.request_timeout,
    );
    Agent::new(agent_config, LlmStrategy::new(GPT_PROFILE, provider, files))
}

/// All eight built-in agents sharing one execution log
pub fn default_roster(config: &Config, log: Arc<ExecutionLog>) -> Result<Vec<Arc<Agent>>, ValidationError> {
    let files: Arc<dyn FileReader> = Arc::new(FsFileReader::new(config.workspace_path.clone()));

    let agents = vec![
        backend_agent()?,
        frontend_agent()?,
        uiux_agent()?,
        project_manager_agent()?,
        qa_agent()?,
        testing_agent()?,
        claude_agent(config, files.clone())?,
        gpt_agent(config, files)?,
    ];

    Ok(agents
        .into_iter()
        .map(|agent| Arc::new(agent.with_execution_log(log.clone())))
        .collect())
}
