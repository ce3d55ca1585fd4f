//! Host metric collectors.
//!
//! Each [`Collector`] gathers one category of process-host metrics (CPU,
//! memory, load) and returns them as [`Reading`]s for the caller to record
//! into a metric store.

pub mod cpu;
pub mod load;
pub mod memory;

use agentmon_common::types::Tags;
use anyhow::Result;

/// One measured value, not yet timestamped.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub metric: String,
    pub value: f64,
    pub tags: Tags,
}

impl Reading {
    pub fn new(metric: &str, value: f64) -> Self {
        Self {
            metric: metric.to_string(),
            value,
            tags: Tags::new(),
        }
    }

    pub fn with_tag(mut self, key: &str, value: impl Into<String>) -> Self {
        self.tags.insert(key.to_string(), value.into());
        self
    }
}

/// A system metric collector.
///
/// Implementations are called once per collection interval from the agent
/// loop.
pub trait Collector: Send + Sync {
    /// Returns the collector name (e.g., `"cpu"`), used for logging.
    fn name(&self) -> &str;

    /// Collects current metric values.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying system API call fails.
    fn collect(&mut self) -> Result<Vec<Reading>>;
}

/// The default collector set.
pub fn default_collectors() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(cpu::CpuCollector::new()),
        Box::new(memory::MemoryCollector::new()),
        Box::new(load::LoadCollector),
    ]
}
