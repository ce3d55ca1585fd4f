//! Value types shared by the agentmon store, alert engine and notifiers.

pub mod types;
