use crate::error::NotifyError;
use crate::plugin::ChannelPlugin;
use crate::NotificationChannel;
use agentmon_common::types::{AlertEvent, Transition};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Writes alert transitions to the tracing log. Opened alerts are logged at
/// `warn`, resolutions at `info`.
pub struct LogChannel;

#[async_trait]
impl NotificationChannel for LogChannel {
    async fn send(&self, event: &AlertEvent) -> Result<()> {
        match event.transition {
            Transition::Opened => tracing::warn!(
                rule_id = %event.rule_id,
                rule_name = %event.rule_name,
                severity = %event.severity,
                value = event.current_value,
                threshold = event.threshold,
                "ALERT {}",
                event.message
            ),
            Transition::Resolved => tracing::info!(
                rule_id = %event.rule_id,
                rule_name = %event.rule_name,
                value = event.current_value,
                "RESOLVED {}",
                event.message
            ),
        }
        Ok(())
    }

    fn channel_type(&self) -> &str {
        "log"
    }
}

pub struct LogPlugin;

impl ChannelPlugin for LogPlugin {
    fn name(&self) -> &str {
        "log"
    }

    fn validate_config(&self, _config: &Value) -> Result<(), NotifyError> {
        Ok(())
    }

    fn create_channel(&self, _config: &Value) -> Result<Arc<dyn NotificationChannel>, NotifyError> {
        Ok(Arc::new(LogChannel))
    }
}
