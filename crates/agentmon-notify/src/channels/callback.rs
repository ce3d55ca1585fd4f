use crate::NotificationChannel;
use agentmon_common::types::AlertEvent;
use anyhow::Result;
use async_trait::async_trait;

type Callback = dyn Fn(&AlertEvent) -> Result<()> + Send + Sync;

/// Adapts a plain closure into a [`NotificationChannel`]. Intended for
/// short, non-blocking callbacks such as counters or in-process queues.
pub struct FnChannel {
    callback: Box<Callback>,
}

impl FnChannel {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&AlertEvent) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }
}

#[async_trait]
impl NotificationChannel for FnChannel {
    async fn send(&self, event: &AlertEvent) -> Result<()> {
        (self.callback)(event)
    }

    fn channel_type(&self) -> &str {
        "callback"
    }
}
