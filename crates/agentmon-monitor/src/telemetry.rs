//! Convenience recorders for common AI-agent measurements.

use crate::Monitor;
use agentmon_common::types::Tags;
use std::time::Duration;

/// Series names written by the helpers below.
pub mod metrics {
    pub const LLM_TOKENS: &str = "llm.tokens";
    pub const LLM_LATENCY_MS: &str = "llm.latency_ms";
    pub const TOKEN_COST: &str = "token_cost";
    pub const TASK_DURATION_MS: &str = "task.duration_ms";
    /// 1.0 for a successful task, 0.0 for a failure; the windowed mean is
    /// the success rate.
    pub const TASK_SUCCESS: &str = "task.success";
    pub const AGENT_ERRORS: &str = "agent.errors";
}

fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Monitor {
    /// Records one LLM call: token count, latency and cost.
    pub fn record_llm_call(
        &self,
        agent_id: &str,
        model: &str,
        tokens: u64,
        latency: Duration,
        cost: f64,
    ) {
        let tags = tags(&[("agent_id", agent_id), ("model", model)]);
        self.record(metrics::LLM_TOKENS, tokens as f64, tags.clone());
        self.record(
            metrics::LLM_LATENCY_MS,
            latency.as_secs_f64() * 1000.0,
            tags.clone(),
        );
        self.record(metrics::TOKEN_COST, cost, tags);
    }

    /// Records the outcome of one agent task.
    pub fn record_task(&self, agent_id: &str, task: &str, duration: Duration, success: bool) {
        let tags = tags(&[("agent_id", agent_id), ("task", task)]);
        self.record(
            metrics::TASK_DURATION_MS,
            duration.as_secs_f64() * 1000.0,
            tags.clone(),
        );
        self.record(metrics::TASK_SUCCESS, if success { 1.0 } else { 0.0 }, tags);
    }

    /// Records one agent error occurrence.
    pub fn record_error(&self, agent_id: &str, kind: &str) {
        tracing::debug!(agent_id, kind, "Agent error recorded");
        self.record(
            metrics::AGENT_ERRORS,
            1.0,
            tags(&[("agent_id", agent_id), ("kind", kind)]),
        );
    }
}
