use crate::NotificationChannel;
use agentmon_common::types::{AlertEvent, Severity};
use std::sync::Arc;

/// A registered channel plus the filter deciding which events reach it.
#[derive(Clone)]
pub struct ChannelRoute {
    pub channel: Arc<dyn NotificationChannel>,
    pub min_severity: Severity,
    /// Restricts the route to a single rule (per-rule callbacks).
    pub rule_id: Option<String>,
}

impl ChannelRoute {
    /// Route accepting every event.
    pub fn new(channel: Arc<dyn NotificationChannel>) -> Self {
        Self {
            channel,
            min_severity: Severity::Info,
            rule_id: None,
        }
    }

    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn for_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    pub fn should_send(&self, event: &AlertEvent) -> bool {
        event.severity >= self.min_severity
            && self.rule_id.as_deref().map_or(true, |id| id == event.rule_id)
    }
}
