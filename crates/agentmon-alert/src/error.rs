/// Rule configuration errors. These are programmer errors detectable at
/// startup, so `add_rule` reports them instead of registering a rule that
/// could never fire.
///
/// # Examples
///
/// ```rust
/// use agentmon_alert::error::AlertError;
///
/// let err = AlertError::DuplicateRule("cpu:greater_than:90".to_string());
/// assert!(err.to_string().contains("cpu:greater_than:90"));
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlertError {
    #[error("Alert: rule metric name must not be empty")]
    EmptyMetric,

    #[error("Alert: threshold for '{metric}' must be finite, got {threshold}")]
    NonFiniteThreshold { metric: String, threshold: f64 },

    #[error("Alert: sustained duration for '{0}' must be positive")]
    NonPositiveDuration(String),

    #[error("Alert: rule '{0}' is already registered")]
    DuplicateRule(String),
}

pub type Result<T> = std::result::Result<T, AlertError>;
