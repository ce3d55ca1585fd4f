use crate::store::{MetricStore, RecordOutcome};
use agentmon_common::types::Tags;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn secs(n: u64) -> std::time::Duration {
    std::time::Duration::from_secs(n)
}

#[test]
fn capacity_keeps_most_recent_samples() {
    let store = MetricStore::with_default_capacity(5);
    let base = Utc::now() - Duration::seconds(100);
    for i in 0..12 {
        store.record_at("llm.tokens", i as f64, Tags::new(), base + Duration::seconds(i));
    }

    let all = store.samples_since("llm.tokens", DateTime::<Utc>::MIN_UTC);
    assert_eq!(all.len(), 5);
    let values: Vec<f64> = all.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![7.0, 8.0, 9.0, 10.0, 11.0]);
}

#[test]
fn declared_series_uses_its_own_capacity() {
    let store = MetricStore::with_default_capacity(100);
    store.declare_series("task.duration_ms", 2);
    for i in 0..4 {
        store.record("task.duration_ms", i as f64, Tags::new());
    }
    assert_eq!(store.len("task.duration_ms"), 2);
}

#[test]
fn non_finite_values_are_dropped() {
    let store = MetricStore::new();
    assert_eq!(store.record("latency", f64::NAN, Tags::new()), RecordOutcome::Dropped);
    assert_eq!(
        store.record("latency", f64::INFINITY, Tags::new()),
        RecordOutcome::Dropped
    );
    assert_eq!(store.record("latency", 12.5, Tags::new()), RecordOutcome::Stored);
    assert_eq!(store.len("latency"), 1);
    assert_eq!(store.stats("latency", secs(60)).unwrap().mean, 12.5);
}

#[test]
fn stats_only_covers_the_window() {
    let store = MetricStore::new();
    let now = Utc::now();
    // outside the 60s window
    store.record_at("latency", 1000.0, Tags::new(), now - Duration::seconds(120));
    store.record_at("latency", 10.0, Tags::new(), now - Duration::seconds(50));
    store.record_at("latency", 20.0, Tags::new(), now - Duration::seconds(30));
    store.record_at("latency", 60.0, Tags::new(), now - Duration::seconds(5));

    let stats = store.stats_at("latency", secs(60), now).unwrap();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.sum, 90.0);
    assert_eq!(stats.mean, 30.0);
    assert_eq!(stats.min, 10.0);
    assert_eq!(stats.max, 60.0);
}

#[test]
fn stats_at_ignores_samples_after_now() {
    let store = MetricStore::new();
    let now = Utc::now() - Duration::seconds(300);
    store.record_at("latency", 10.0, Tags::new(), now - Duration::seconds(20));
    store.record_at("latency", 30.0, Tags::new(), now);
    store.record_at("latency", 900.0, Tags::new(), now + Duration::seconds(1));
    store.record_at("latency", 900.0, Tags::new(), now + Duration::seconds(120));

    let stats = store.stats_at("latency", secs(60), now).unwrap();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.mean, 20.0);
    assert_eq!(stats.max, 30.0);

    // one second earlier only the first sample qualifies
    let earlier = store
        .stats_at("latency", secs(60), now - Duration::seconds(1))
        .unwrap();
    assert_eq!(earlier.count, 1);
}

#[test]
fn tags_do_not_affect_aggregation() {
    let store = MetricStore::new();
    let now = Utc::now();
    store.record_at("llm.tokens", 100.0, tags(&[("model", "a")]), now);
    store.record_at("llm.tokens", 300.0, tags(&[("model", "b")]), now);

    let stats = store.stats_at("llm.tokens", secs(10), now).unwrap();
    assert_eq!(stats.mean, 200.0);

    let samples = store.samples_since("llm.tokens", now);
    assert_eq!(samples[1].tags.get("model").map(String::as_str), Some("b"));
}

#[test]
fn unknown_series_has_no_stats() {
    let store = MetricStore::new();
    assert!(store.stats("missing", secs(3600)).is_none());
    assert!(store.samples_since("missing", DateTime::<Utc>::MIN_UTC).is_empty());
    assert!(store.latest("missing").is_none());
}

#[test]
fn stale_series_has_no_stats_in_tiny_window() {
    let store = MetricStore::new();
    store.record_at("latency", 3.0, Tags::new(), Utc::now() - Duration::seconds(1));
    assert!(store
        .stats("latency", std::time::Duration::from_nanos(1))
        .is_none());
}

#[test]
fn known_series_names_lists_every_series() {
    let store = MetricStore::new();
    store.record("b", 1.0, Tags::new());
    store.record("a", 1.0, Tags::new());
    store.record("a", 2.0, Tags::new());
    // dropped values never create a series
    store.record("c", f64::NAN, Tags::new());

    let names: Vec<String> = store.known_series_names().into_iter().collect();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn concurrent_records_are_not_lost() {
    let store = Arc::new(MetricStore::with_default_capacity(10_000));
    let threads = 16;
    let per_thread = 250;

    std::thread::scope(|scope| {
        for t in 0..threads {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                for i in 0..per_thread {
                    store.record("requests", (t * per_thread + i) as f64, Tags::new());
                }
            });
        }
    });

    let samples = store.samples_since("requests", DateTime::<Utc>::MIN_UTC);
    assert_eq!(samples.len(), threads * per_thread);
    let sum: f64 = samples.iter().map(|s| s.value).sum();
    let n = (threads * per_thread) as f64;
    assert_eq!(sum, n * (n - 1.0) / 2.0);
    assert!(samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn concurrent_records_respect_capacity() {
    let store = Arc::new(MetricStore::with_default_capacity(100));

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                for i in 0..500 {
                    store.record("requests", i as f64, Tags::new());
                }
            });
        }
    });

    assert_eq!(store.len("requests"), 100);
}
