//! Notification delivery for alert transitions.
//!
//! Alert events are routed by the [`dispatcher::Dispatcher`] to every
//! registered [`NotificationChannel`] whose route accepts the event.
//! Deliveries run as background tasks bounded by a timeout, and a failing
//! channel never affects the others. Built-in channels include a tracing
//! log sink, a generic JSON webhook, Slack, and closure callbacks.

pub mod channels;
pub mod dispatcher;
pub mod error;
pub mod plugin;
pub mod routing;
pub mod utils;


use anyhow::Result;
use agentmon_common::types::AlertEvent;
use async_trait::async_trait;

pub use dispatcher::Dispatcher;
pub use routing::ChannelRoute;

/// A notification sink that receives alert transitions (opened/resolved).
///
/// Implementations are registered in the [`Dispatcher`] under a name, either
/// directly or through a [`plugin::ChannelPlugin`] built from configuration.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Delivers the event through this channel.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails after retries (if applicable).
    /// The dispatcher logs the error; it never reaches the evaluator.
    async fn send(&self, event: &AlertEvent) -> Result<()>;

    /// Returns the channel type name (e.g., `"log"`, `"webhook"`).
    fn channel_type(&self) -> &str;
}
