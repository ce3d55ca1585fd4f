use crate::error::{AlertError, Result};
use agentmon_common::types::{Condition, Severity};
use std::time::Duration;

/// Threshold rule evaluated against the windowed mean of one metric.
///
/// The rule holds when the mean of every sample recorded during the last
/// `sustained` duration satisfies `condition` against `threshold`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRule {
    id: String,
    name: Option<String>,
    metric: String,
    condition: Condition,
    threshold: f64,
    sustained: Duration,
    severity: Severity,
}

impl AlertRule {
    /// Builds and validates a rule. The id is derived from the metric,
    /// condition and threshold, e.g. `token_cost:greater_than:1`.
    ///
    /// # Errors
    ///
    /// Fails on an empty metric name, a NaN/infinite threshold, or a zero
    /// sustained duration.
    ///
    /// # Examples
    ///
    /// ```
    /// use agentmon_alert::AlertRule;
    /// use agentmon_common::types::Condition;
    /// use std::time::Duration;
    ///
    /// let rule = AlertRule::new("token_cost", Condition::GreaterThan, 1.0, Duration::from_secs(60)).unwrap();
    /// assert_eq!(rule.id(), "token_cost:greater_than:1");
    /// assert!(AlertRule::new("token_cost", Condition::GreaterThan, f64::NAN, Duration::from_secs(60)).is_err());
    /// ```
    pub fn new(
        metric: impl Into<String>,
        condition: Condition,
        threshold: f64,
        sustained: Duration,
    ) -> Result<Self> {
        let metric = metric.into();
        if metric.trim().is_empty() {
            return Err(AlertError::EmptyMetric);
        }
        if !threshold.is_finite() {
            return Err(AlertError::NonFiniteThreshold { metric, threshold });
        }
        if sustained.is_zero() {
            return Err(AlertError::NonPositiveDuration(metric));
        }

        Ok(Self {
            id: format!("{metric}:{condition}:{threshold}"),
            name: None,
            metric,
            condition,
            threshold,
            sustained,
            severity: Severity::default(),
        })
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name, falling back to the id.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn sustained(&self) -> Duration {
        self.sustained
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_breached(&self, mean: f64) -> bool {
        self.condition.check(mean, self.threshold)
    }
}
