use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form key/value tags attached to a sample (e.g. `agent_id=planner`).
pub type Tags = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    #[serde(default)]
    pub tags: Tags,
}

impl MetricSample {
    pub fn new(timestamp: DateTime<Utc>, value: f64, tags: Tags) -> Self {
        Self {
            timestamp,
            value,
            tags,
        }
    }
}

/// Alert severity level, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use agentmon_common::types::Severity;
///
/// let sev: Severity = "warning".parse().unwrap();
/// assert_eq!(sev, Severity::Warning);
/// assert_eq!(sev.to_string(), "warning");
/// assert!(Severity::Critical > Severity::Info);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// Comparison applied between a windowed mean and a rule threshold.
///
/// # Examples
///
/// ```
/// use agentmon_common::types::Condition;
///
/// let cond: Condition = "gt".parse().unwrap();
/// assert_eq!(cond, Condition::GreaterThan);
/// assert!(cond.check(1.5, 1.0));
/// assert!(!Condition::LessThan.check(1.5, 1.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[serde(alias = "gt")]
    GreaterThan,
    #[serde(alias = "lt")]
    LessThan,
    #[serde(alias = "eq")]
    Equals,
}

impl std::str::FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greater_than" | "gt" => Ok(Self::GreaterThan),
            "less_than" | "lt" => Ok(Self::LessThan),
            "equals" | "eq" => Ok(Self::Equals),
            _ => Err(format!("unknown condition: {s}")),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GreaterThan => write!(f, "greater_than"),
            Self::LessThan => write!(f, "less_than"),
            Self::Equals => write!(f, "equals"),
        }
    }
}

impl Condition {
    pub fn check(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::LessThan => value < threshold,
            // relative tolerance so `equals 0.3` matches `0.1 + 0.2`
            Self::Equals => (value - threshold).abs() <= f64::EPSILON * threshold.abs().max(1.0),
        }
    }

    /// Phrase used in alert messages ("above", "below", "equal to").
    pub fn describe(&self) -> &'static str {
        match self {
            Self::GreaterThan => "above",
            Self::LessThan => "below",
            Self::Equals => "equal to",
        }
    }
}

/// Direction of an alert state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Opened,
    Resolved,
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Opened => write!(f, "opened"),
            Transition::Resolved => write!(f, "resolved"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub rule_id: String,
    /// Human-readable rule name; falls back to the rule id.
    pub rule_name: String,
    pub metric_name: String,
    pub transition: Transition,
    pub condition: Condition,
    pub threshold: f64,
    /// Windowed mean at the evaluation that caused the transition. For a
    /// resolution caused by an empty window this is the last observed mean.
    pub current_value: f64,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub first_triggered_at: DateTime<Utc>,
    pub message: String,
}

/// Format a tag map into a human-readable string.
///
/// # Examples
///
/// ```
/// use agentmon_common::types::{format_tags, Tags};
///
/// let mut tags = Tags::new();
/// tags.insert("model".to_string(), "claude".to_string());
/// tags.insert("agent_id".to_string(), "planner".to_string());
/// assert_eq!(format_tags(&tags), "agent_id=planner, model=claude");
/// ```
pub fn format_tags(tags: &Tags) -> String {
    tags.iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}
