//! Monitoring context for AI-agent applications.
//!
//! [`Monitor`] ties together the metric store, the alert rule engine and
//! the notification dispatcher behind one explicit handle, built from a
//! typed [`config::MonitorConfig`].
//!
//! # Examples
//!
//! ```
//! use agentmon_common::types::{Condition, Tags};
//! use agentmon_alert::AlertRule;
//! use agentmon_monitor::Monitor;
//! use std::time::Duration;
//!
//! let monitor = Monitor::default();
//! monitor
//!     .add_rule(AlertRule::new("token_cost", Condition::GreaterThan, 1.0, Duration::from_secs(60)).unwrap())
//!     .unwrap();
//! monitor.record("token_cost", 0.4, Tags::new());
//! assert_eq!(monitor.stats("token_cost", Duration::from_secs(60)).unwrap().count, 1);
//! ```

pub mod config;
pub mod error;
pub mod monitor;
pub mod telemetry;

pub use config::MonitorConfig;
pub use error::MonitorError;
pub use monitor::{DashboardSnapshot, Monitor};
