//! In-memory metric storage for agentmon.
//!
//! [`MetricStore`] keeps one bounded [`series::MetricSeries`] per metric
//! name and answers trailing-window aggregate queries through
//! [`aggregate::WindowStats`]. Every operation is safe to call from many
//! threads at once.

pub mod aggregate;
pub mod series;
pub mod store;

#[cfg(test)]
mod tests;

pub use aggregate::WindowStats;
pub use store::{MetricStore, RecordOutcome, DEFAULT_SERIES_CAPACITY};
