#![allow(dead_code)]

use agentmon_common::types::{AlertEvent, Transition};
use agentmon_notify::channels::callback::FnChannel;
use agentmon_notify::NotificationChannel;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

/// Collects every delivered event for later inspection.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<AlertEvent>>>,
}

impl Recorder {
    pub fn channel(&self) -> Arc<dyn NotificationChannel> {
        let events = Arc::clone(&self.events);
        Arc::new(FnChannel::new(move |event| {
            events.lock().unwrap().push(event.clone());
            Ok(())
        }))
    }

    /// Channel that takes `delay` to deliver `Opened` events and records
    /// everything else immediately.
    pub fn slow_on_open(&self, delay: std::time::Duration) -> Arc<dyn NotificationChannel> {
        Arc::new(SlowOpen {
            events: Arc::clone(&self.events),
            delay,
        })
    }

    pub fn events(&self) -> Vec<AlertEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn transitions(&self) -> Vec<(String, Transition)> {
        self.events()
            .into_iter()
            .map(|e| (e.rule_id, e.transition))
            .collect()
    }
}

struct SlowOpen {
    events: Arc<Mutex<Vec<AlertEvent>>>,
    delay: std::time::Duration,
}

#[async_trait]
impl NotificationChannel for SlowOpen {
    async fn send(&self, event: &AlertEvent) -> anyhow::Result<()> {
        if event.transition == Transition::Opened {
            tokio::time::sleep(self.delay).await;
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    fn channel_type(&self) -> &str {
        "slow-open"
    }
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

pub fn at(offset_secs: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(offset_secs)
}

pub fn secs(n: u64) -> std::time::Duration {
    std::time::Duration::from_secs(n)
}
