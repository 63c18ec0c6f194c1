//! Metrics & Execution History
//!
//! Running per-agent statistics plus a bounded, explicitly owned log of
//! recent executions shared by every agent that is handed a reference.
//!
//! `AgentMetrics` is updated incrementally: averages use the streaming mean
//! `new = (old * (n - 1) + x) / n` and are never recomputed from history.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::model::AgentResponse;

/// Default number of executions retained by `ExecutionLog`
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Cumulative statistics for one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub agent_id: String,
    pub tasks_completed: u64,
    pub tasks_successful: u64,
    pub tasks_failed: u64,
    /// Milliseconds
    pub average_response_time: f64,
    pub total_tokens_used: u64,
    pub average_confidence: f64,
    pub last_active: Option<DateTime<Utc>>,
    /// Seconds since the agent was created
    pub uptime: u64,
    /// Responses that carried a confidence score
    #[serde(default)]
    pub confidence_samples: u64,
}

impl AgentMetrics {
    pub fn new(agent_id: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            tasks_completed: 0,
            tasks_successful: 0,
            tasks_failed: 0,
            average_response_time: 0.0,
            total_tokens_used: 0,
            average_confidence: 0.0,
            last_active: None,
            uptime: 0,
            confidence_samples: 0,
        }
    }

    /// Pure update: metrics after folding in one more response
    pub fn updated(&self, response: &AgentResponse, at: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.record(response, at);
        next
    }

    /// Fold one response into the running statistics
    pub fn record(&mut self, response: &AgentResponse, at: DateTime<Utc>) {
        self.tasks_completed += 1;
        if response.success {
            self.tasks_successful += 1;
        } else {
            self.tasks_failed += 1;
        }

        self.average_response_time = streaming_mean(
            self.average_response_time,
            response.duration as f64,
            self.tasks_completed,
        );

        if let Some(tokens) = response.tokens_used {
            self.total_tokens_used = self.total_tokens_used.saturating_add(tokens);
        }

        if let Some(confidence) = response.confidence {
            self.confidence_samples += 1;
            self.average_confidence =
                streaming_mean(self.average_confidence, confidence, self.confidence_samples);
        }

        self.last_active = Some(at);
    }

    pub fn success_rate(&self) -> f64 {
        if self.tasks_completed == 0 {
            return 0.0;
        }
        self.tasks_successful as f64 / self.tasks_completed as f64
    }
}

#[inline]
fn streaming_mean(old: f64, sample: f64, n: u64) -> f64 {
    debug_assert!(n > 0);
    (old * (n - 1) as f64 + sample) / n as f64
}

// ============ Execution Log ============

/// One logged task execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub agent_id: String,
    pub task_id: String,
    pub task_type: String,
    pub success: bool,
    pub duration_ms: u64,
    pub tokens_used: Option<u64>,
    pub confidence: Option<f64>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate over the retained executions of one agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub executions: usize,
    pub success_rate: f64,
    pub avg_duration_ms: f64,
    pub avg_confidence: f64,
    pub total_tokens: u64,
}

/// Bounded execution history (rolling window, oldest evicted first)
pub struct ExecutionLog {
    records: RwLock<VecDeque<ExecutionRecord>>,
    capacity: usize,
}

impl ExecutionLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&self, record: ExecutionRecord) {
        let mut records = self.records.write();
        if records.len() == self.capacity {
            records.pop_front();
        }
        debug!(
            agent_id = %record.agent_id,
            task_id = %record.task_id,
            retained = records.len() + 1,
            "Execution recorded"
        );
        records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Most recent executions of an agent, newest first
    pub fn recent(&self, agent_id: &str, limit: usize) -> Vec<ExecutionRecord> {
        self.records
            .read()
            .iter()
            .rev()
            .filter(|r| r.agent_id == agent_id)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn summary(&self, agent_id: &str) -> ExecutionSummary {
        let records = self.records.read();
        let mine: Vec<_> = records.iter().filter(|r| r.agent_id == agent_id).collect();
        if mine.is_empty() {
            return ExecutionSummary::default();
        }

        let executions = mine.len();
        let successes = mine.iter().filter(|r| r.success).count();
        let total_duration: u64 = mine.iter().map(|r| r.duration_ms).sum();
        let confidences: Vec<f64> = mine.iter().filter_map(|r| r.confidence).collect();

        ExecutionSummary {
            executions,
            success_rate: successes as f64 / executions as f64,
            avg_duration_ms: total_duration as f64 / executions as f64,
            avg_confidence: if confidences.is_empty() {
                0.0
            } else {
                confidences.iter().sum::<f64>() / confidences.len() as f64
            },
            total_tokens: mine.iter().filter_map(|r| r.tokens_used).sum(),
        }
    }

    pub fn clear(&self) {
        self.records.write().clear();
        info!("Execution log cleared");
    }
}

impl Default for ExecutionLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

// ============ Timing ============

/// Timer for measuring operation latency
pub struct LatencyTimer {
    start: Instant,
}

impl LatencyTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(duration: u64, success: bool, confidence: Option<f64>) -> AgentResponse {
        let mut r = if success {
            AgentResponse::success("a", "t", serde_json::json!({}), duration, Some(10), confidence)
        } else {
            AgentResponse::failure("a", "t", "err", duration)
        };
        r.confidence = confidence;
        r
    }

    fn record(agent: &str, success: bool, duration_ms: u64) -> ExecutionRecord {
        ExecutionRecord {
            agent_id: agent.to_string(),
            task_id: uuid::Uuid::new_v4().to_string(),
            task_type: "generic".to_string(),
            success,
            duration_ms,
            tokens_used: Some(5),
            confidence: Some(if success { 0.8 } else { 0.0 }),
            error: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_streaming_mean_scenario() {
        let mut m = AgentMetrics::new("a");
        for (d, c) in [(100, 0.5), (200, 0.7), (300, 0.9)] {
            m.record(&response(d, true, Some(c)), Utc::now());
        }
        assert_eq!(m.tasks_completed, 3);
        assert!((m.average_response_time - 200.0).abs() < 1e-9);
        assert!((m.average_confidence - 0.7).abs() < 1e-9);
        assert_eq!(m.total_tokens_used, 30);
    }

    #[test]
    fn test_counts_stay_consistent() {
        let mut m = AgentMetrics::new("a");
        let outcomes = [true, false, true, true, false];
        for (i, ok) in outcomes.iter().enumerate() {
            m.record(&response(i as u64 * 10, *ok, Some(0.5)), Utc::now());
            assert_eq!(m.tasks_completed, m.tasks_successful + m.tasks_failed);
        }
        assert_eq!(m.tasks_successful, 3);
        assert_eq!(m.tasks_failed, 2);
        assert!((m.average_response_time - 20.0).abs() < 1e-9);
        assert!((m.success_rate() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_missing_confidence_does_not_dilute_average() {
        let mut m = AgentMetrics::new("a");
        m.record(&response(10, true, Some(0.9)), Utc::now());
        m.record(&response(10, true, None), Utc::now());
        assert!((m.average_confidence - 0.9).abs() < 1e-9);
        assert_eq!(m.confidence_samples, 1);
    }

    #[test]
    fn test_updated_is_pure() {
        let m = AgentMetrics::new("a");
        let next = m.updated(&response(50, false, Some(0.0)), Utc::now());
        assert_eq!(m.tasks_completed, 0);
        assert!(m.last_active.is_none());
        assert_eq!(next.tasks_failed, 1);
        assert!(next.last_active.is_some());
    }

    #[test]
    fn test_log_evicts_oldest() {
        let log = ExecutionLog::new(3);
        for ms in [1, 2, 3, 4, 5] {
            log.record(record("a", true, ms));
        }
        assert_eq!(log.len(), 3);
        let recent = log.recent("a", 10);
        let durations: Vec<_> = recent.iter().map(|r| r.duration_ms).collect();
        assert_eq!(durations, vec![5, 4, 3]);
    }

    #[test]
    fn test_log_summary_per_agent() {
        let log = ExecutionLog::new(10);
        log.record(record("a", true, 100));
        log.record(record("a", false, 300));
        log.record(record("b", true, 50));

        let s = log.summary("a");
        assert_eq!(s.executions, 2);
        assert!((s.success_rate - 0.5).abs() < 1e-9);
        assert!((s.avg_duration_ms - 200.0).abs() < 1e-9);
        assert!((s.avg_confidence - 0.4).abs() < 1e-9);
        assert_eq!(s.total_tokens, 10);

        assert_eq!(log.summary("missing"), ExecutionSummary::default());
    }

    #[test]
    fn test_log_clear_and_zero_capacity() {
        let log = ExecutionLog::new(0);
        assert_eq!(log.capacity(), 1);
        log.record(record("a", true, 1));
        log.record(record("a", true, 2));
        assert_eq!(log.len(), 1);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_latency_timer() {
        let timer = LatencyTimer::start();
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.elapsed_ms() >= 5);
    }
}
