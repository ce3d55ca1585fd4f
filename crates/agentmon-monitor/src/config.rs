use crate::error::{MonitorError, Result};
use agentmon_alert::{AlertError, AlertRule};
use agentmon_common::types::{Condition, Severity};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub alerting: AlertingConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Samples kept per series before the oldest are evicted.
    #[serde(default = "default_series_capacity")]
    pub series_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertingConfig {
    #[serde(default = "default_evaluation_interval")]
    pub evaluation_interval_secs: u64,
    /// Upper bound for a single channel delivery.
    #[serde(default = "default_notify_timeout")]
    pub notify_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_collection_interval")]
    pub interval_secs: u64,
    /// Added as a `host` tag to every host metric when set.
    #[serde(default)]
    pub host: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub metric: String,
    pub condition: Condition,
    pub threshold: f64,
    pub sustained_secs: u64,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: String,
    #[serde(default = "default_min_severity")]
    pub min_severity: Severity,
    #[serde(default = "default_channel_config")]
    pub config: serde_json::Value,
}

fn default_series_capacity() -> usize {
    agentmon_store::DEFAULT_SERIES_CAPACITY
}

fn default_evaluation_interval() -> u64 {
    30
}

fn default_notify_timeout() -> u64 {
    10
}

fn default_collection_interval() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_min_severity() -> Severity {
    Severity::Info
}

fn default_channel_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            series_capacity: default_series_capacity(),
        }
    }
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            evaluation_interval_secs: default_evaluation_interval(),
            notify_timeout_secs: default_notify_timeout(),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_collection_interval(),
            host: None,
        }
    }
}

impl AlertingConfig {
    pub fn evaluation_interval(&self) -> Duration {
        Duration::from_secs(self.evaluation_interval_secs)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }
}

impl RuleConfig {
    pub fn to_rule(&self) -> std::result::Result<AlertRule, AlertError> {
        let mut rule = AlertRule::new(
            self.metric.clone(),
            self.condition,
            self.threshold,
            Duration::from_secs(self.sustained_secs),
        )?
        .with_severity(self.severity);
        if let Some(name) = &self.name {
            rule = rule.with_name(name.clone());
        }
        Ok(rule)
    }
}

impl MonitorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the numeric settings. Rules and channels are validated when a
    /// [`crate::Monitor`] is built from this config.
    pub fn validate(&self) -> Result<()> {
        if self.store.series_capacity == 0 {
            return Err(MonitorError::Config(
                "store.series_capacity must be positive".into(),
            ));
        }
        if self.alerting.evaluation_interval_secs == 0 {
            return Err(MonitorError::Config(
                "alerting.evaluation_interval_secs must be positive".into(),
            ));
        }
        if self.alerting.notify_timeout_secs == 0 {
            return Err(MonitorError::Config(
                "alerting.notify_timeout_secs must be positive".into(),
            ));
        }
        if self.collector.enabled && self.collector.interval_secs == 0 {
            return Err(MonitorError::Config(
                "collector.interval_secs must be positive".into(),
            ));
        }
        let mut names = std::collections::HashSet::new();
        for channel in &self.channels {
            if !names.insert(channel.name.as_str()) {
                return Err(MonitorError::Config(format!(
                    "duplicate channel name '{}'",
                    channel.name
                )));
            }
        }
        Ok(())
    }
}
