use crate::routing::ChannelRoute;
use crate::NotificationChannel;
use agentmon_common::types::AlertEvent;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinSet;

pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Fans alert events out to named channels.
///
/// Each delivery runs on its own tokio task, bounded by the dispatcher
/// timeout, so a slow webhook never delays rule evaluation. Deliveries to
/// the same channel name start only after the previous one finished, so a
/// channel always sees `Opened` before the matching `Resolved`. Failures,
/// timeouts and panics are logged and swallowed here.
pub struct Dispatcher {
    routes: RwLock<HashMap<String, ChannelRoute>>,
    timeout: Duration,
    in_flight: Mutex<InFlight>,
}

#[derive(Default)]
struct InFlight {
    tasks: JoinSet<()>,
    /// Completion signal of the last delivery queued per channel name. The
    /// sender is dropped when that delivery ends.
    tails: HashMap<String, oneshot::Receiver<()>>,
}

impl Dispatcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            routes: RwLock::new(HashMap::new()),
            timeout,
            in_flight: Mutex::new(InFlight::default()),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Registers `channel` under `name` accepting every event. A previous
    /// registration with the same name is replaced.
    pub fn register(&self, name: &str, channel: Arc<dyn NotificationChannel>) {
        self.register_route(name, ChannelRoute::new(channel));
    }

    pub fn register_route(&self, name: &str, route: ChannelRoute) {
        let replaced = self
            .routes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), route)
            .is_some();
        tracing::debug!(channel = name, replaced, "Notification channel registered");
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tails
            .remove(name);
        self.routes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Schedules delivery of `event` to every accepting channel and returns
    /// the number of deliveries started. Must be called from within a tokio
    /// runtime; otherwise nothing is sent and 0 is returned.
    pub fn dispatch(&self, event: &AlertEvent) -> usize {
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::error!(
                rule_id = %event.rule_id,
                "No tokio runtime available, notification dropped"
            );
            return 0;
        }

        let targets: Vec<(String, Arc<dyn NotificationChannel>)> = self
            .routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, route)| route.should_send(event))
            .map(|(name, route)| (name.clone(), Arc::clone(&route.channel)))
            .collect();

        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        // reap finished deliveries so the set does not grow unbounded
        while let Some(res) = in_flight.tasks.try_join_next() {
            log_join_error(res);
        }

        let count = targets.len();
        for (name, channel) in targets {
            let (done, tail) = oneshot::channel();
            let previous = in_flight.tails.insert(name.clone(), tail);
            let event = event.clone();
            let timeout = self.timeout;
            in_flight.tasks.spawn(async move {
                if let Some(previous) = previous {
                    // resolves once the earlier delivery drops its sender
                    let _ = previous.await;
                }
                deliver(name, channel, event, timeout).await;
                drop(done);
            });
        }
        count
    }

    /// Waits for every delivery started so far.
    pub async fn flush(&self) {
        let mut pending = {
            let mut guard = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut guard.tasks)
        };
        while let Some(res) = pending.join_next().await {
            log_join_error(res);
        }
    }

    pub fn pending(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tasks
            .len()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFY_TIMEOUT)
    }
}

async fn deliver(
    name: String,
    channel: Arc<dyn NotificationChannel>,
    event: AlertEvent,
    timeout: Duration,
) {
    match tokio::time::timeout(timeout, channel.send(&event)).await {
        Ok(Ok(())) => {
            tracing::debug!(
                channel = %name,
                rule_id = %event.rule_id,
                transition = %event.transition,
                "Notification delivered"
            );
        }
        Ok(Err(e)) => {
            tracing::error!(
                channel = %name,
                channel_type = channel.channel_type(),
                rule_id = %event.rule_id,
                error = %e,
                "Failed to send notification"
            );
        }
        Err(_) => {
            tracing::warn!(
                channel = %name,
                rule_id = %event.rule_id,
                timeout_ms = timeout.as_millis() as u64,
                "Notification timed out"
            );
        }
    }
}

fn log_join_error(res: Result<(), tokio::task::JoinError>) {
    if let Err(e) = res {
        tracing::error!(error = %e, "Notification task aborted");
    }
}
