use agentmon_collector::{default_collectors, Collector};
use agentmon_monitor::{Monitor, MonitorConfig};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::signal;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

/// Window used for the periodic dashboard snapshot log line.
const SNAPSHOT_WINDOW: Duration = Duration::from_secs(300);

fn collect_once(monitor: &Monitor, collectors: &mut [Box<dyn Collector>], host: Option<&str>) {
    let now = Utc::now();
    let mut recorded = 0usize;
    for collector in collectors.iter_mut() {
        match collector.collect() {
            Ok(readings) => {
                for mut reading in readings {
                    if let Some(host) = host {
                        reading.tags.insert("host".to_string(), host.to_string());
                    }
                    monitor.record_at(&reading.metric, reading.value, reading.tags, now);
                    recorded += 1;
                }
            }
            Err(e) => tracing::warn!(collector = collector.name(), error = %e, "Collection failed"),
        }
    }
    tracing::debug!(count = recorded, "Collected host metrics");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("agentmon=info".parse()?))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/agentmon.toml".to_string());

    let config = MonitorConfig::load(&config_path)?;
    let monitor = Arc::new(Monitor::from_config(&config)?);
    tracing::info!(
        config = %config_path,
        rules = config.rules.len(),
        channels = config.channels.len(),
        "agentmon-agent starting"
    );

    let mut collectors = default_collectors();
    let collector_enabled = config.collector.enabled;
    let host = config.collector.host.clone();

    let mut collect_tick = interval(Duration::from_secs(config.collector.interval_secs.max(1)));
    collect_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut evaluate_tick = interval(config.alerting.evaluation_interval());
    evaluate_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        collect_secs = config.collector.interval_secs,
        evaluate_secs = config.alerting.evaluation_interval_secs,
        collector_enabled,
        "Starting monitoring loop"
    );

    loop {
        tokio::select! {
            _ = collect_tick.tick(), if collector_enabled => {
                collect_once(&monitor, &mut collectors, host.as_deref());
            }
            _ = evaluate_tick.tick() => {
                let events = monitor.evaluate_all();
                if !events.is_empty() {
                    tracing::info!(transitions = events.len(), "Alert rules evaluated");
                }
                let snapshot = monitor.snapshot(SNAPSHOT_WINDOW);
                match serde_json::to_string(&snapshot) {
                    Ok(json) => tracing::debug!(snapshot = %json, "Dashboard snapshot"),
                    Err(e) => tracing::warn!(error = %e, "Failed to serialize snapshot"),
                }
            }
            _ = signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    monitor.flush().await;
    tracing::info!(active_alerts = monitor.active_alerts().len(), "agentmon-agent stopped");
    Ok(())
}
