//! DevCrew Agents - Entry Point
//!
//! Modes:
//! - Default: JSON-lines task server over stdio
//! - --agents / -a: print the roster as JSON and exit

use devcrew_agents::agent::presets::default_roster;
use devcrew_agents::{Config, Coordinator, CoordinatorConfig, ExecutionLog, TaskServer};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Parse args
    let args: Vec<String> = std::env::args().collect();
    let agents_mode = args.iter().any(|a| a == "--agents" || a == "-a");
    let help_mode = args.iter().any(|a| a == "--help" || a == "-h");

    if help_mode {
        println!("DevCrew Agents v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: devcrew-agents [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --agents, -a   Print the agent roster as JSON");
        println!("  --help, -h     Show this help");
        println!();
        println!("Default: read tasks as JSON lines on stdin, write results to stdout");
        println!();
        println!("Environment variables:");
        println!("  ANTHROPIC_API_KEY              Claude API key");
        println!("  OPENAI_API_KEY                 OpenAI API key");
        println!("  ANTHROPIC_BASE_URL             Override Claude endpoint");
        println!("  OPENAI_BASE_URL                Override OpenAI endpoint");
        println!("  DEVCREW_CLAUDE_MODEL           haiku, sonnet, opus or model id (default: sonnet)");
        println!("  DEVCREW_GPT_MODEL              OpenAI model (default: gpt-4o)");
        println!("  DEVCREW_MAX_TOKENS             Completion budget (default: 4000)");
        println!("  DEVCREW_TEMPERATURE            Sampling temperature (default: 0.7)");
        println!("  DEVCREW_HISTORY_CAPACITY       Execution records kept (default: 1000)");
        println!("  DEVCREW_MAX_CONCURRENT         Parallel dispatches (default: 4)");
        println!("  DEVCREW_REQUEST_TIMEOUT_SECS   Provider HTTP timeout (default: 120)");
        println!("  DEVCREW_WORKSPACE              Root for task files (default: .)");
        println!("  RUST_LOG                       Log filter (default: info)");
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if agents_mode {
        // Interactive mode - human-readable logs
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .init();
    } else {
        // Server mode - stdout carries data, log to stderr as JSON
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .json()
            .init();
    }

    let config = Config::from_env()?;
    let log = Arc::new(ExecutionLog::new(config.history_capacity));
    let roster = default_roster(&config, log.clone())?;
    let coordinator = Coordinator::with_agents(
        CoordinatorConfig {
            max_concurrent_tasks: config.max_concurrent,
        },
        roster,
    )?;

    if agents_mode {
        println!("{}", serde_json::to_string_pretty(&coordinator.status())?);
        return Ok(());
    }

    info!("DevCrew Agents v{}", env!("CARGO_PKG_VERSION"));
    let server = TaskServer::new(Arc::new(coordinator), log);
    server.run().await?;

    Ok(())
}
