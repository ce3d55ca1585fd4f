use crate::error::{AlertError, Result};
use crate::rule::AlertRule;
use agentmon_common::types::{AlertEvent, Transition};
use agentmon_store::MetricStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Per-rule alert bookkeeping. Created on the first breach and kept with
/// `active = false` after resolution so the last incident stays inspectable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertState {
    pub rule_id: String,
    pub active: bool,
    pub first_triggered_at: DateTime<Utc>,
    pub last_value: f64,
    pub last_evaluated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

pub struct AlertEngine {
    rules: Vec<AlertRule>,
    states: HashMap<String, AlertState>,
}

impl AlertEngine {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            states: HashMap::new(),
        }
    }

    pub fn rules(&self) -> &[AlertRule] {
        &self.rules
    }

    pub fn get_rule(&self, id: &str) -> Option<&AlertRule> {
        self.rules.iter().find(|r| r.id() == id)
    }

    /// Registers a rule and returns its id.
    pub fn add_rule(&mut self, rule: AlertRule) -> Result<String> {
        if self.get_rule(rule.id()).is_some() {
            return Err(AlertError::DuplicateRule(rule.id().to_string()));
        }
        let id = rule.id().to_string();
        tracing::debug!(
            rule_id = %id,
            metric = rule.metric(),
            threshold = rule.threshold(),
            sustained_secs = rule.sustained().as_secs_f64(),
            "Alert rule registered"
        );
        self.rules.push(rule);
        Ok(id)
    }

    pub fn state(&self, rule_id: &str) -> Option<&AlertState> {
        self.states.get(rule_id)
    }

    /// Every state ever created, resolved ones included. Unordered.
    pub fn states(&self) -> impl Iterator<Item = &AlertState> {
        self.states.values()
    }

    pub fn active_alerts(&self) -> Vec<&AlertState> {
        let mut active: Vec<&AlertState> = self.states().filter(|s| s.active).collect();
        active.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));
        active
    }

    /// Evaluates every rule once against `store` and returns the
    /// transitions that happened, in rule registration order.
    pub fn evaluate(&mut self, store: &MetricStore) -> Vec<AlertEvent> {
        self.evaluate_at(store, Utc::now())
    }

    pub fn evaluate_at(&mut self, store: &MetricStore, now: DateTime<Utc>) -> Vec<AlertEvent> {
        let mut events = Vec::new();

        for rule in &self.rules {
            // No data in the window cannot confirm a breach.
            let mean = store
                .stats_at(rule.metric(), rule.sustained(), now)
                .map(|s| s.mean);
            let breached = mean.is_some_and(|m| rule.is_breached(m));
            let was_active = self.states.get(rule.id()).is_some_and(|s| s.active);

            match (was_active, breached) {
                (false, true) => {
                    let value = mean.unwrap_or_default();
                    let state = AlertState {
                        rule_id: rule.id().to_string(),
                        active: true,
                        first_triggered_at: now,
                        last_value: value,
                        last_evaluated_at: now,
                        resolved_at: None,
                    };
                    tracing::info!(rule_id = rule.id(), value, "Alert opened");
                    events.push(build_event(rule, &state, Transition::Opened, now));
                    self.states.insert(rule.id().to_string(), state);
                }
                (true, false) => {
                    if let Some(state) = self.states.get_mut(rule.id()) {
                        state.active = false;
                        state.resolved_at = Some(now);
                        state.last_evaluated_at = now;
                        if let Some(m) = mean {
                            state.last_value = m;
                        }
                        tracing::info!(rule_id = rule.id(), value = state.last_value, "Alert resolved");
                        events.push(build_event(rule, state, Transition::Resolved, now));
                    }
                }
                (true, true) => {
                    if let Some(state) = self.states.get_mut(rule.id()) {
                        state.last_value = mean.unwrap_or(state.last_value);
                        state.last_evaluated_at = now;
                    }
                }
                (false, false) => {}
            }
        }

        events
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn build_event(
    rule: &AlertRule,
    state: &AlertState,
    transition: Transition,
    now: DateTime<Utc>,
) -> AlertEvent {
    let message = match transition {
        Transition::Opened => format!(
            "{} mean {:.3} has been {} {} over the last {}s",
            rule.metric(),
            state.last_value,
            rule.condition().describe(),
            rule.threshold(),
            rule.sustained().as_secs(),
        ),
        Transition::Resolved => format!(
            "{} is no longer {} {} (last mean {:.3})",
            rule.metric(),
            rule.condition().describe(),
            rule.threshold(),
            state.last_value,
        ),
    };

    AlertEvent {
        rule_id: rule.id().to_string(),
        rule_name: rule.name().to_string(),
        metric_name: rule.metric().to_string(),
        transition,
        condition: rule.condition(),
        threshold: rule.threshold(),
        current_value: state.last_value,
        severity: rule.severity(),
        timestamp: now,
        first_triggered_at: state.first_triggered_at,
        message,
    }
}
