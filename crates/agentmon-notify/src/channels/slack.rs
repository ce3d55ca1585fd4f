use crate::error::NotifyError;
use crate::plugin::ChannelPlugin;
use crate::NotificationChannel;
use agentmon_common::types::{AlertEvent, Severity, Transition};
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Slack incoming-webhook channel.
pub struct SlackChannel {
    webhook_url: String,
    channel: Option<String>,
    client: reqwest::Client,
}

impl SlackChannel {
    pub fn new(webhook_url: impl Into<String>, channel: Option<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            channel,
            client: reqwest::Client::new(),
        }
    }

    fn color(event: &AlertEvent) -> &'static str {
        match (event.transition, event.severity) {
            (Transition::Resolved, _) => "#2ecc71",
            (Transition::Opened, Severity::Info) => "#3498db",
            (Transition::Opened, Severity::Warning) => "#f39c12",
            (Transition::Opened, Severity::Critical) => "#e74c3c",
        }
    }

    pub(crate) fn payload(&self, event: &AlertEvent) -> Value {
        let mut payload = json!({
            "attachments": [{
                "color": Self::color(event),
                "title": format!("[{}] {} {}", event.severity, event.rule_name, event.transition),
                "text": event.message,
                "fields": [
                    { "title": "Metric", "value": event.metric_name, "short": true },
                    { "title": "Value", "value": format!("{:.2}", event.current_value), "short": true },
                    { "title": "Threshold", "value": format!("{} {}", event.condition, event.threshold), "short": true },
                ],
                "ts": event.timestamp.timestamp(),
            }]
        });

        if let Some(ref ch) = self.channel {
            payload["channel"] = json!(ch);
        }
        payload
    }
}

#[async_trait]
impl NotificationChannel for SlackChannel {
    async fn send(&self, event: &AlertEvent) -> Result<()> {
        self.client
            .post(&self.webhook_url)
            .json(&self.payload(event))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn channel_type(&self) -> &str {
        "slack"
    }
}

#[derive(Deserialize)]
struct SlackConfig {
    webhook_url: String,
    channel: Option<String>,
}

pub struct SlackPlugin;

impl ChannelPlugin for SlackPlugin {
    fn name(&self) -> &str {
        "slack"
    }

    fn validate_config(&self, config: &Value) -> Result<(), NotifyError> {
        serde_json::from_value::<SlackConfig>(config.clone())
            .map_err(|e| NotifyError::InvalidConfig(format!("slack: {e}")))?;
        Ok(())
    }

    fn create_channel(&self, config: &Value) -> Result<Arc<dyn NotificationChannel>, NotifyError> {
        let cfg: SlackConfig = serde_json::from_value(config.clone())?;
        Ok(Arc::new(SlackChannel::new(cfg.webhook_url, cfg.channel)))
    }

    fn redact_config(&self, config: &Value) -> Value {
        let mut redacted = config.clone();
        if let Some(url) = redacted.get_mut("webhook_url") {
            *url = Value::String("***".to_string());
        }
        redacted
    }
}
