use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use agentmon_alert::{AlertEngine, AlertRule, AlertState};
use agentmon_common::types::{AlertEvent, MetricSample, Tags};
use agentmon_notify::plugin::ChannelRegistry;
use agentmon_notify::{ChannelRoute, Dispatcher, NotificationChannel};
use agentmon_store::{MetricStore, RecordOutcome, WindowStats};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Process-wide monitoring context: metric store, alert engine and
/// notification dispatcher.
///
/// Build one at startup and share it with an `Arc`. Producers call
/// [`Monitor::record`]; a scheduler calls [`Monitor::evaluate_all`] on a
/// fixed interval.
pub struct Monitor {
    store: MetricStore,
    engine: Mutex<AlertEngine>,
    dispatcher: Dispatcher,
}

/// Read model for dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub window_secs: u64,
    /// Series with at least one sample in the window.
    pub series: BTreeMap<String, WindowStats>,
    pub active_alerts: Vec<AlertState>,
}

impl Monitor {
    pub fn new(series_capacity: usize, notify_timeout: Duration) -> Self {
        Self {
            store: MetricStore::with_default_capacity(series_capacity),
            engine: Mutex::new(AlertEngine::new()),
            dispatcher: Dispatcher::new(notify_timeout),
        }
    }

    /// Builds a monitor with the rules and channels declared in `config`,
    /// failing on the first invalid one.
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        config.validate()?;
        let monitor = Self::new(
            config.store.series_capacity,
            config.alerting.notify_timeout(),
        );

        for rule in &config.rules {
            monitor.add_rule(rule.to_rule()?)?;
        }

        let registry = ChannelRegistry::default();
        for channel in &config.channels {
            let instance = registry
                .create_channel(&channel.channel_type, &channel.config)
                .map_err(|source| MonitorError::Channel {
                    name: channel.name.clone(),
                    source,
                })?;
            let redacted = registry
                .get_plugin(&channel.channel_type)
                .map(|p| p.redact_config(&channel.config))
                .unwrap_or_default();
            tracing::info!(
                channel = %channel.name,
                channel_type = %channel.channel_type,
                min_severity = %channel.min_severity,
                config = %redacted,
                "Notification channel configured"
            );
            monitor.dispatcher.register_route(
                &channel.name,
                ChannelRoute::new(instance).with_min_severity(channel.min_severity),
            );
        }

        Ok(monitor)
    }

    fn engine(&self) -> MutexGuard<'_, AlertEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn store(&self) -> &MetricStore {
        &self.store
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // ---- producers ----

    /// Records a sample at the current time. Non-finite values are dropped.
    pub fn record(&self, name: &str, value: f64, tags: Tags) -> RecordOutcome {
        self.store.record(name, value, tags)
    }

    pub fn record_at(
        &self,
        name: &str,
        value: f64,
        tags: Tags,
        timestamp: DateTime<Utc>,
    ) -> RecordOutcome {
        self.store.record_at(name, value, tags, timestamp)
    }

    // ---- rule configuration ----

    pub fn add_rule(&self, rule: AlertRule) -> Result<String> {
        Ok(self.engine().add_rule(rule)?)
    }

    /// Adds a rule whose transitions are also delivered to `callback`, in
    /// addition to the globally registered channels.
    pub fn add_rule_with_callback(
        &self,
        rule: AlertRule,
        callback: Arc<dyn NotificationChannel>,
    ) -> Result<String> {
        let id = self.add_rule(rule)?;
        self.dispatcher
            .register_route(&format!("rule:{id}"), ChannelRoute::new(callback).for_rule(&id));
        Ok(id)
    }

    /// Registers a channel for every rule; replaces any channel of the same
    /// name.
    pub fn register_channel(&self, name: &str, channel: Arc<dyn NotificationChannel>) {
        self.dispatcher.register(name, channel);
    }

    // ---- scheduler ----

    /// Evaluates every rule against the current time and dispatches the
    /// resulting transitions. Deliveries run in the background; call
    /// [`Monitor::flush`] to wait for them.
    pub fn evaluate_all(&self) -> Vec<AlertEvent> {
        self.evaluate_at(Utc::now())
    }

    pub fn evaluate_at(&self, now: DateTime<Utc>) -> Vec<AlertEvent> {
        let events = self.engine().evaluate_at(&self.store, now);
        for event in &events {
            let deliveries = self.dispatcher.dispatch(event);
            tracing::debug!(
                rule_id = %event.rule_id,
                transition = %event.transition,
                deliveries,
                "Alert transition dispatched"
            );
        }
        events
    }

    /// Waits for in-flight notifications.
    pub async fn flush(&self) {
        self.dispatcher.flush().await;
    }

    // ---- dashboard reads ----

    pub fn stats(&self, name: &str, window: Duration) -> Option<WindowStats> {
        self.store.stats(name, window)
    }

    pub fn samples_since(&self, name: &str, since: DateTime<Utc>) -> Vec<MetricSample> {
        self.store.samples_since(name, since)
    }

    pub fn known_series_names(&self) -> BTreeSet<String> {
        self.store.known_series_names()
    }

    pub fn active_alerts(&self) -> Vec<AlertState> {
        self.engine().active_alerts().into_iter().cloned().collect()
    }

    pub fn alert_state(&self, rule_id: &str) -> Option<AlertState> {
        self.engine().state(rule_id).cloned()
    }

    pub fn snapshot(&self, window: Duration) -> DashboardSnapshot {
        self.snapshot_at(window, Utc::now())
    }

    pub fn snapshot_at(&self, window: Duration, now: DateTime<Utc>) -> DashboardSnapshot {
        let series = self
            .store
            .known_series_names()
            .into_iter()
            .filter_map(|name| {
                let stats = self.store.stats_at(&name, window, now)?;
                Some((name, stats))
            })
            .collect();

        DashboardSnapshot {
            generated_at: now,
            window_secs: window.as_secs(),
            series,
            active_alerts: self.active_alerts(),
        }
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new(
            agentmon_store::DEFAULT_SERIES_CAPACITY,
            agentmon_notify::dispatcher::DEFAULT_NOTIFY_TIMEOUT,
        )
    }
}
