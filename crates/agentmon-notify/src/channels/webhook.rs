use crate::error::NotifyError;
use crate::plugin::ChannelPlugin;
use crate::utils::{truncate_string, MAX_BODY_LENGTH};
use crate::NotificationChannel;
use agentmon_common::types::AlertEvent;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;

/// POSTs each alert transition as JSON to a fixed URL.
pub struct WebhookChannel {
    url: String,
    client: reqwest::Client,
    body_template: Option<String>,
}

impl WebhookChannel {
    pub fn new(url: impl Into<String>, body_template: Option<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            body_template,
        }
    }

    /// Renders the request body. Template placeholders are substituted with
    /// JSON-escaped text, so they belong inside string literals of the
    /// template.
    pub(crate) fn render_body(&self, event: &AlertEvent) -> String {
        if let Some(template) = &self.body_template {
            template
                .replace("{{rule_id}}", &json_escape(&event.rule_id))
                .replace("{{rule_name}}", &json_escape(&event.rule_name))
                .replace("{{metric}}", &json_escape(&event.metric_name))
                .replace("{{transition}}", &event.transition.to_string())
                .replace("{{value}}", &format!("{:.2}", event.current_value))
                .replace("{{threshold}}", &format!("{:.2}", event.threshold))
                .replace("{{severity}}", &event.severity.to_string())
                .replace("{{message}}", &json_escape(&event.message))
                .replace("{{timestamp}}", &event.timestamp.to_rfc3339())
        } else {
            serde_json::json!({
                "rule_id": event.rule_id,
                "rule_name": event.rule_name,
                "metric": event.metric_name,
                "transition": event.transition,
                "condition": event.condition,
                "threshold": event.threshold,
                "value": event.current_value,
                "severity": event.severity,
                "message": event.message,
                "timestamp": event.timestamp.to_rfc3339(),
                "first_triggered_at": event.first_triggered_at.to_rfc3339(),
            })
            .to_string()
        }
    }

    async fn post_once(&self, body: &str) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(self.url.as_str())
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = match resp.text().await {
            Ok(text) => truncate_string(&text, MAX_BODY_LENGTH),
            Err(e) => format!("[Failed to read response body: {e}]"),
        };
        Err(NotifyError::ApiError {
            service: "webhook".to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    async fn send(&self, event: &AlertEvent) -> Result<()> {
        let body = self.render_body(event);
        let mut last_err = None;

        for attempt in 0..MAX_ATTEMPTS {
            match self.post_once(&body).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        rule_id = %event.rule_id,
                        error = %e,
                        "Webhook send failed, retrying"
                    );
                    last_err = Some(e);
                }
            }
            if attempt + 1 < MAX_ATTEMPTS {
                tokio::time::sleep(Duration::from_millis(100 * 2u64.pow(attempt))).await;
            }
        }

        match last_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    fn channel_type(&self) -> &str {
        "webhook"
    }
}

/// Escapes `raw` for use inside a JSON string literal.
fn json_escape(raw: &str) -> String {
    let quoted = Value::String(raw.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

// Plugin

#[derive(Deserialize)]
struct WebhookConfig {
    url: String,
    body_template: Option<String>,
}

fn parse_config(config: &Value) -> Result<WebhookConfig, NotifyError> {
    let parsed: WebhookConfig = serde_json::from_value(config.clone())
        .map_err(|e| NotifyError::InvalidConfig(format!("webhook: {e}")))?;
    if !parsed.url.starts_with("http://") && !parsed.url.starts_with("https://") {
        return Err(NotifyError::InvalidConfig(format!(
            "webhook: url must be http(s), got '{}'",
            parsed.url
        )));
    }
    Ok(parsed)
}

pub struct WebhookPlugin;

impl ChannelPlugin for WebhookPlugin {
    fn name(&self) -> &str {
        "webhook"
    }

    fn validate_config(&self, config: &Value) -> Result<(), NotifyError> {
        parse_config(config).map(|_| ())
    }

    fn create_channel(&self, config: &Value) -> Result<Arc<dyn NotificationChannel>, NotifyError> {
        let cfg = parse_config(config)?;
        Ok(Arc::new(WebhookChannel::new(cfg.url, cfg.body_template)))
    }
}
