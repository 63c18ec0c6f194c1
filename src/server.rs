//! JSON-Lines Task Server
//!
//! Reads one JSON object per stdin line and writes one JSON object per
//! stdout line. A line is either a task to dispatch or a command:
//!
//! ```text
//! {"title": "...", "description": "...", "type": "API_DESIGN", ...}
//!     → {"task": {...}, "response": {...}}
//! {"command": "status"}                       → {"agents": [...]}
//! {"command": "metrics", "agent_id": "..."}   → {"metrics": {...}, "history": {...}}
//! {"command": "collaborators", "agent_id": "...", "limit": 3}
//!     → {"collaborators": [...]}
//! anything invalid                             → {"error": "..."}
//! ```

use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::coordinator::Coordinator;
use crate::metrics::ExecutionLog;
use crate::model::{Task, TaskStatus};

/// Default number of collaborators returned
const DEFAULT_COLLABORATOR_LIMIT: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum Command {
    Status,
    Metrics {
        agent_id: String,
    },
    Collaborators {
        agent_id: String,
        #[serde(default)]
        limit: Option<usize>,
    },
}

/// Task server
pub struct TaskServer {
    coordinator: Arc<Coordinator>,
    log: Arc<ExecutionLog>,
}

impl TaskServer {
    pub fn new(coordinator: Arc<Coordinator>, log: Arc<ExecutionLog>) -> Self {
        Self { coordinator, log }
    }

    /// Run the server over stdio until EOF
    pub async fn run(&self) -> anyhow::Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.serve(reader, writer).await
    }

    /// Serve any line-oriented reader/writer pair until EOF
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        info!(agents = self.coordinator.len(), "Task server ready, waiting for tasks...");

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                info!("Input closed (EOF)");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            debug!("← {}", trimmed);

            let reply = self.handle_line(trimmed).await;
            let reply_json = serde_json::to_string(&reply)?;
            debug!("→ {}", reply_json);

            writer.write_all(reply_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        Ok(())
    }

    /// Handle a single input line
    pub async fn handle_line(&self, line: &str) -> Value {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                error!("Parse error: {}", e);
                return error_reply(format!("Parse error: {}", e));
            }
        };

        if value.get("command").is_some() {
            return match serde_json::from_value::<Command>(value) {
                Ok(command) => self.handle_command(command),
                Err(e) => error_reply(format!("Invalid command: {}", e)),
            };
        }

        let mut task: Task = match serde_json::from_value(value) {
            Ok(t) => t,
            Err(e) => return error_reply(format!("Invalid task: {}", e)),
        };
        if let Err(e) = task.validate() {
            return error_reply(format!("Invalid task: {}", e));
        }
        if task.status != TaskStatus::Pending {
            return error_reply(format!("Invalid task: status must be PENDING, got {:?}", task.status));
        }

        match self.coordinator.dispatch(&mut task).await {
            Ok(response) => json!({ "task": task, "response": response }),
            Err(e) => json!({ "task": task, "error": e.to_string() }),
        }
    }

    fn handle_command(&self, command: Command) -> Value {
        match command {
            Command::Status => json!({ "agents": self.coordinator.status() }),
            Command::Metrics { agent_id } => match self.coordinator.agent(&agent_id) {
                Some(agent) => json!({
                    "metrics": agent.get_metrics(),
                    "history": self.log.summary(&agent_id),
                }),
                None => error_reply(format!("unknown agent: {}", agent_id)),
            },
            Command::Collaborators { agent_id, limit } => {
                let limit = limit.unwrap_or(DEFAULT_COLLABORATOR_LIMIT);
                match self.coordinator.collaborators(&agent_id, limit) {
                    Ok(peers) => {
                        let peers: Vec<Value> = peers
                            .into_iter()
                            .map(|(id, weight)| json!({ "agent_id": id, "weight": weight }))
                            .collect();
                        json!({ "collaborators": peers })
                    }
                    Err(e) => error_reply(e.to_string()),
                }
            }
        }
    }
}

fn error_reply(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::presets;
    use crate::coordinator::CoordinatorConfig;

    fn server() -> TaskServer {
        let log = Arc::new(ExecutionLog::new(100));
        let agents = [
            presets::backend_agent().unwrap(),
            presets::frontend_agent().unwrap(),
            presets::project_manager_agent().unwrap(),
        ]
        .into_iter()
        .map(|a| Arc::new(a.with_execution_log(log.clone())));
        let coordinator = Coordinator::with_agents(CoordinatorConfig::default(), agents).unwrap();
        TaskServer::new(Arc::new(coordinator), log)
    }

    #[tokio::test]
    async fn test_task_line_dispatches() {
        let s = server();
        let reply = s
            .handle_line(r#"{"title":"Orders API","description":"","type":"API_DESIGN","required_capabilities":["API Design and Implementation"]}"#)
            .await;
        assert_eq!(reply["response"]["success"], true);
        assert_eq!(reply["response"]["agent_id"], "backend-agent");
        assert_eq!(reply["task"]["status"], "COMPLETED");
    }

    #[tokio::test]
    async fn test_invalid_lines() {
        let s = server();
        assert!(s.handle_line("not json").await["error"]
            .as_str()
            .unwrap()
            .starts_with("Parse error"));
        assert!(s.handle_line(r#"{"title":"x"}"#).await["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid task"));
        assert!(s.handle_line(r#"{"command":"reboot"}"#).await["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid command"));
    }

    #[tokio::test]
    async fn test_non_pending_task_rejected() {
        let s = server();
        for status in ["COMPLETED", "IN_PROGRESS"] {
            let line = format!(
                r#"{{"title":"x","description":"","type":"API_DESIGN","status":"{}"}}"#,
                status
            );
            let reply = s.handle_line(&line).await;
            assert!(reply["error"].as_str().unwrap().contains("must be PENDING"));
        }

        let reply = s.handle_line(r#"{"command":"metrics","agent_id":"backend-agent"}"#).await;
        assert_eq!(reply["metrics"]["tasks_completed"], 0);
        assert_eq!(reply["history"]["executions"], 0);
    }

    #[tokio::test]
    async fn test_no_eligible_agent_reply() {
        let s = server();
        let reply = s
            .handle_line(r#"{"title":"x","description":"","type":"API_DESIGN","required_capabilities":["Nonexistent Capability"]}"#)
            .await;
        assert!(reply["error"].as_str().unwrap().contains("no eligible agent"));
        assert_eq!(reply["task"]["status"], "PENDING");
    }

    #[tokio::test]
    async fn test_commands() {
        let s = server();
        s.handle_line(r#"{"title":"Plan","description":"","type":"FEATURE_PLANNING","required_capabilities":["Feature Planning"]}"#)
            .await;

        let status = s.handle_line(r#"{"command":"status"}"#).await;
        assert_eq!(status["agents"].as_array().unwrap().len(), 3);

        let metrics = s
            .handle_line(r#"{"command":"metrics","agent_id":"project-manager-agent"}"#)
            .await;
        assert_eq!(metrics["metrics"]["tasks_completed"], 1);
        assert_eq!(metrics["history"]["executions"], 1);

        let peers = s
            .handle_line(r#"{"command":"collaborators","agent_id":"backend-agent"}"#)
            .await;
        let peers = peers["collaborators"].as_array().unwrap();
        assert_eq!(peers[0]["agent_id"], "frontend-agent");
        assert_eq!(peers.len(), 2);
    }

    #[tokio::test]
    async fn test_serve_writes_one_line_per_input() {
        let s = server();
        let input = b"{\"command\":\"status\"}\n\n{\"command\":\"metrics\",\"agent_id\":\"nobody\"}\n";
        let mut output = Vec::new();
        s.serve(&input[..], &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("unknown agent: nobody"));
    }
}
