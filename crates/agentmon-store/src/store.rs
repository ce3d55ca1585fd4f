use crate::aggregate::{window_start, WindowStats};
use crate::series::MetricSeries;
use agentmon_common::types::{format_tags, MetricSample, Tags};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

pub const DEFAULT_SERIES_CAPACITY: usize = 1000;

/// Result of a [`MetricStore::record`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Stored,
    /// The value was NaN or infinite and was not stored.
    Dropped,
}

/// Thread-safe collection of named [`MetricSeries`].
///
/// A single read/write lock guards every series: `record` takes the write
/// lock for the append/evict, queries take the read lock, so readers never
/// observe a half-updated ring buffer.
pub struct MetricStore {
    default_capacity: usize,
    series: RwLock<HashMap<String, MetricSeries>>,
}

impl MetricStore {
    pub fn new() -> Self {
        Self::with_default_capacity(DEFAULT_SERIES_CAPACITY)
    }

    pub fn with_default_capacity(capacity: usize) -> Self {
        Self {
            default_capacity: capacity.max(1),
            series: RwLock::new(HashMap::new()),
        }
    }

    pub fn default_capacity(&self) -> usize {
        self.default_capacity
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, MetricSeries>> {
        self.series.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, MetricSeries>> {
        self.series.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a series with a capacity other than the store default. Does
    /// nothing if the series already exists.
    pub fn declare_series(&self, name: &str, capacity: usize) {
        self.write()
            .entry(name.to_string())
            .or_insert_with(|| MetricSeries::new(name, capacity));
    }

    /// Records `value` at the current time.
    pub fn record(&self, name: &str, value: f64, tags: Tags) -> RecordOutcome {
        self.record_at(name, value, tags, Utc::now())
    }

    pub fn record_at(
        &self,
        name: &str,
        value: f64,
        tags: Tags,
        timestamp: DateTime<Utc>,
    ) -> RecordOutcome {
        if !value.is_finite() {
            tracing::debug!(
                metric = name,
                value,
                tags = %format_tags(&tags),
                "Dropping non-finite sample"
            );
            return RecordOutcome::Dropped;
        }

        let mut series = self.write();
        match series.get_mut(name) {
            Some(s) => s.push(MetricSample::new(timestamp, value, tags)),
            None => {
                let mut s = MetricSeries::new(name, self.default_capacity);
                s.push(MetricSample::new(timestamp, value, tags));
                series.insert(name.to_string(), s);
            }
        }
        RecordOutcome::Stored
    }

    /// Samples of `name` with `timestamp >= since`, oldest first. Unknown
    /// series yield an empty vector.
    pub fn samples_since(&self, name: &str, since: DateTime<Utc>) -> Vec<MetricSample> {
        self.read()
            .get(name)
            .map(|s| s.since(since).cloned().collect())
            .unwrap_or_default()
    }

    /// Aggregates over the trailing `window` ending now.
    pub fn stats(&self, name: &str, window: Duration) -> Option<WindowStats> {
        self.stats_at(name, window, Utc::now())
    }

    /// Aggregates over the trailing `window` ending at `now`, both bounds
    /// inclusive. Samples stamped after `now` are ignored.
    pub fn stats_at(&self, name: &str, window: Duration, now: DateTime<Utc>) -> Option<WindowStats> {
        let since = window_start(now, window);
        let series = self.read();
        WindowStats::from_samples(
            series
                .get(name)?
                .since(since)
                .take_while(|s| s.timestamp <= now),
        )
    }

    pub fn known_series_names(&self) -> BTreeSet<String> {
        self.read().keys().cloned().collect()
    }

    pub fn latest(&self, name: &str) -> Option<MetricSample> {
        self.read().get(name)?.latest().cloned()
    }

    /// Number of retained samples for `name` (0 when unknown).
    pub fn len(&self, name: &str) -> usize {
        self.read().get(name).map_or(0, MetricSeries::len)
    }

    pub fn is_empty(&self) -> bool {
        self.read().values().all(MetricSeries::is_empty)
    }
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new()
    }
}
