//! Alert rule engine for agentmon.
//!
//! [`AlertEngine`] holds a set of threshold [`AlertRule`]s. Each evaluation
//! compares the windowed mean of the rule's metric against its threshold and
//! tracks per-rule [`engine::AlertState`]. Only state changes produce
//! [`agentmon_common::types::AlertEvent`]s; a rule that stays firing or stays
//! quiet is silent.

pub mod engine;
pub mod error;
pub mod rule;

#[cfg(test)]
mod tests;

pub use engine::{AlertEngine, AlertState};
pub use error::AlertError;
pub use rule::AlertRule;
