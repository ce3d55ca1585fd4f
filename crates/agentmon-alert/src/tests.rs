use crate::engine::AlertEngine;
use crate::error::AlertError;
use crate::rule::AlertRule;
use agentmon_common::types::{Condition, Severity, Tags, Transition};
use agentmon_store::MetricStore;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn secs(n: u64) -> std::time::Duration {
    std::time::Duration::from_secs(n)
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

fn at(offset_secs: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(offset_secs)
}

#[test]
fn rule_validation_rejects_bad_config() {
    assert_eq!(
        AlertRule::new("", Condition::GreaterThan, 1.0, secs(60)).unwrap_err(),
        AlertError::EmptyMetric
    );
    assert!(matches!(
        AlertRule::new("cost", Condition::LessThan, f64::INFINITY, secs(60)),
        Err(AlertError::NonFiniteThreshold { .. })
    ));
    assert_eq!(
        AlertRule::new("cost", Condition::Equals, 1.0, secs(0)).unwrap_err(),
        AlertError::NonPositiveDuration("cost".into())
    );
}

#[test]
fn duplicate_rule_is_rejected() {
    let mut engine = AlertEngine::new();
    let rule = AlertRule::new("cost", Condition::GreaterThan, 1.0, secs(60)).unwrap();
    engine.add_rule(rule.clone()).unwrap();
    assert_eq!(
        engine.add_rule(rule),
        Err(AlertError::DuplicateRule("cost:greater_than:1".into()))
    );
    assert_eq!(engine.rules().len(), 1);
}

#[test]
fn rule_name_defaults_to_id() {
    let rule = AlertRule::new("latency", Condition::GreaterThan, 250.0, secs(30)).unwrap();
    assert_eq!(rule.name(), "latency:greater_than:250");
    let rule = rule.with_name("Slow LLM").with_severity(Severity::Critical);
    assert_eq!(rule.name(), "Slow LLM");
    assert_eq!(rule.severity(), Severity::Critical);
}

#[test]
fn opens_once_and_resolves_once() {
    let store = MetricStore::new();
    let mut engine = AlertEngine::new();
    engine
        .add_rule(AlertRule::new("x", Condition::GreaterThan, 10.0, secs(60)).unwrap())
        .unwrap();

    let mut transitions = Vec::new();
    for tick in 0..5 {
        store.record_at("x", 15.0, Tags::new(), at(tick * 30));
        transitions.extend(engine.evaluate_at(&store, at(tick * 30)));
    }
    // active now; steady state must stay silent
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].transition, Transition::Opened);

    for tick in 5..10 {
        store.record_at("x", 2.0, Tags::new(), at(tick * 30));
        transitions.extend(engine.evaluate_at(&store, at(tick * 30)));
    }
    assert_eq!(transitions.len(), 2);
    assert_eq!(transitions[1].transition, Transition::Resolved);
    assert_eq!(transitions[1].rule_id, "x:greater_than:10");
}

#[test]
fn no_data_does_not_open() {
    let store = MetricStore::new();
    let mut engine = AlertEngine::new();
    engine
        .add_rule(AlertRule::new("errors", Condition::LessThan, 5.0, secs(60)).unwrap())
        .unwrap();
    // an empty window would satisfy `< 5` if treated as zero
    assert!(engine.evaluate_at(&store, at(0)).is_empty());
    assert!(engine.state("errors:less_than:5").is_none());
}

#[test]
fn active_alert_resolves_when_window_empties() {
    let store = MetricStore::new();
    let mut engine = AlertEngine::new();
    let id = engine
        .add_rule(AlertRule::new("cost", Condition::GreaterThan, 1.0, secs(60)).unwrap())
        .unwrap();

    store.record_at("cost", 3.0, Tags::new(), at(0));
    assert_eq!(engine.evaluate_at(&store, at(10)).len(), 1);

    let events = engine.evaluate_at(&store, at(200));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].transition, Transition::Resolved);
    assert_eq!(events[0].current_value, 3.0);

    let state = engine.state(&id).unwrap();
    assert!(!state.active);
    assert_eq!(state.resolved_at, Some(at(200)));
    assert!(engine.active_alerts().is_empty());
}

#[test]
fn states_keep_resolved_incidents() {
    let store = MetricStore::new();
    let mut engine = AlertEngine::new();
    let cost = engine
        .add_rule(AlertRule::new("cost", Condition::GreaterThan, 1.0, secs(30)).unwrap())
        .unwrap();
    let errors = engine
        .add_rule(AlertRule::new("errors", Condition::GreaterThan, 0.0, secs(30)).unwrap())
        .unwrap();

    store.record_at("cost", 5.0, Tags::new(), at(0));
    store.record_at("errors", 1.0, Tags::new(), at(0));
    engine.evaluate_at(&store, at(0));
    store.record_at("errors", 2.0, Tags::new(), at(100));
    engine.evaluate_at(&store, at(100));

    let mut states: Vec<(String, bool)> = engine
        .states()
        .map(|s| (s.rule_id.clone(), s.active))
        .collect();
    states.sort();
    assert_eq!(states, vec![(cost, false), (errors.clone(), true)]);
    assert_eq!(engine.active_alerts().len(), 1);
    assert_eq!(engine.active_alerts()[0].rule_id, errors);
}

#[test]
fn back_dated_evaluation_ignores_later_samples() {
    let store = MetricStore::new();
    let mut engine = AlertEngine::new();
    engine
        .add_rule(AlertRule::new("cost", Condition::GreaterThan, 1.0, secs(60)).unwrap())
        .unwrap();

    store.record_at("cost", 0.5, Tags::new(), at(0));
    store.record_at("cost", 9.0, Tags::new(), at(90));

    assert!(engine.evaluate_at(&store, at(30)).is_empty());
    let events = engine.evaluate_at(&store, at(90));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].current_value, 9.0);
}

#[test]
fn reopening_resets_first_triggered_at() {
    let store = MetricStore::new();
    let mut engine = AlertEngine::new();
    let id = engine
        .add_rule(AlertRule::new("cost", Condition::GreaterThan, 1.0, secs(10)).unwrap())
        .unwrap();

    store.record_at("cost", 2.0, Tags::new(), at(0));
    engine.evaluate_at(&store, at(0));
    engine.evaluate_at(&store, at(60));
    store.record_at("cost", 2.0, Tags::new(), at(120));
    let events = engine.evaluate_at(&store, at(120));

    assert_eq!(events[0].transition, Transition::Opened);
    assert_eq!(engine.state(&id).unwrap().first_triggered_at, at(120));
}

#[test]
fn mean_decides_not_individual_samples() {
    let store = MetricStore::new();
    let mut engine = AlertEngine::new();
    engine
        .add_rule(AlertRule::new("latency", Condition::GreaterThan, 100.0, secs(60)).unwrap())
        .unwrap();

    // one spike below a mean of 100
    store.record_at("latency", 250.0, Tags::new(), at(0));
    store.record_at("latency", 10.0, Tags::new(), at(10));
    store.record_at("latency", 10.0, Tags::new(), at(20));
    assert!(engine.evaluate_at(&store, at(30)).is_empty());

    // one low sample in a mean above 100
    store.record_at("latency", 400.0, Tags::new(), at(40));
    let events = engine.evaluate_at(&store, at(40));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].current_value, 167.5);
}

#[test]
fn equals_condition_fires_on_exact_mean() {
    let store = MetricStore::new();
    let mut engine = AlertEngine::new();
    engine
        .add_rule(AlertRule::new("queue.depth", Condition::Equals, 0.0, secs(60)).unwrap())
        .unwrap();

    store.record_at("queue.depth", 0.0, Tags::new(), at(0));
    let events = engine.evaluate_at(&store, at(5));
    assert_eq!(events.len(), 1);
    assert!(events[0].message.contains("equal to"));
}

#[test]
fn event_carries_rule_metadata() {
    let store = MetricStore::new();
    let mut engine = AlertEngine::new();
    engine
        .add_rule(
            AlertRule::new("token_cost", Condition::GreaterThan, 1.0, secs(60))
                .unwrap()
                .with_name("Budget breach")
                .with_severity(Severity::Critical),
        )
        .unwrap();

    store.record_at("token_cost", 2.0, Tags::new(), at(0));
    let event = engine.evaluate_at(&store, at(1)).remove(0);
    assert_eq!(event.rule_name, "Budget breach");
    assert_eq!(event.metric_name, "token_cost");
    assert_eq!(event.severity, Severity::Critical);
    assert_eq!(event.threshold, 1.0);
    assert_eq!(event.timestamp, at(1));
    assert_eq!(event.first_triggered_at, at(1));
}

#[test]
fn rules_are_independent() {
    let store = MetricStore::new();
    let mut engine = AlertEngine::new();
    engine
        .add_rule(AlertRule::new("a", Condition::GreaterThan, 1.0, secs(60)).unwrap())
        .unwrap();
    engine
        .add_rule(AlertRule::new("b", Condition::GreaterThan, 1.0, secs(60)).unwrap())
        .unwrap();

    store.record_at("a", 5.0, Tags::new(), at(0));
    let events = engine.evaluate_at(&store, at(0));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].metric_name, "a");
    assert_eq!(engine.active_alerts().len(), 1);
}
