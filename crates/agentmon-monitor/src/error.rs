use agentmon_alert::AlertError;
use agentmon_notify::error::NotifyError;

/// Errors surfaced while building a [`crate::Monitor`] or loading its
/// configuration. Recording and evaluation never return these.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Monitor: invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Alert(#[from] AlertError),

    #[error("Monitor: channel '{name}': {source}")]
    Channel {
        name: String,
        #[source]
        source: NotifyError,
    },

    #[error("Monitor: failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Monitor: failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
