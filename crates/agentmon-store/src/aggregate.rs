use agentmon_common::types::MetricSample;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Aggregates over the samples of one series inside a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
}

impl WindowStats {
    /// Computes all aggregates in one pass. Returns `None` for an empty input
    /// so "no data" is never confused with a zero reading.
    pub fn from_samples<'a, I>(samples: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a MetricSample>,
    {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for sample in samples {
            count += 1;
            sum += sample.value;
            min = min.min(sample.value);
            max = max.max(sample.value);
        }

        if count == 0 {
            return None;
        }

        // Keep mean inside [min, max] when all values are equal.
        let mean = (sum / count as f64).clamp(min, max);
        Some(Self {
            count,
            mean,
            min,
            max,
            sum,
        })
    }
}

/// Start of the trailing window ending at `now`. Saturates at the earliest
/// representable instant for very large windows.
pub fn window_start(now: DateTime<Utc>, window: std::time::Duration) -> DateTime<Utc> {
    Duration::from_std(window)
        .ok()
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
