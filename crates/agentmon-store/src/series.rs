use agentmon_common::types::MetricSample;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Bounded, time-ordered sample buffer for one metric.
pub struct MetricSeries {
    name: String,
    capacity: usize,
    samples: VecDeque<MetricSample>,
}

impl MetricSeries {
    /// `capacity` is clamped to at least one sample.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name: name.into(),
            capacity,
            samples: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Inserts a sample, evicting the oldest one when full.
    ///
    /// In-order samples are appended. A sample older than the current tail is
    /// placed at its ordered position so range queries stay valid.
    pub fn push(&mut self, sample: MetricSample) {
        if self.samples.len() >= self.capacity {
            // A late sample older than everything retained would be evicted
            // right away anyway.
            if self
                .samples
                .front()
                .is_some_and(|front| sample.timestamp < front.timestamp)
            {
                return;
            }
            self.samples.pop_front();
        }

        let in_order = self
            .samples
            .back()
            .map_or(true, |back| back.timestamp <= sample.timestamp);
        if in_order {
            self.samples.push_back(sample);
        } else {
            let idx = self
                .samples
                .partition_point(|s| s.timestamp <= sample.timestamp);
            self.samples.insert(idx, sample);
        }
    }

    /// Samples with `timestamp >= since`, oldest first.
    pub fn since(&self, since: DateTime<Utc>) -> impl Iterator<Item = &MetricSample> {
        let start = self.samples.partition_point(|s| s.timestamp < since);
        self.samples.range(start..)
    }

    pub fn latest(&self) -> Option<&MetricSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
