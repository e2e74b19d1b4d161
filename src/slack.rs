use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error};
use url::Url;

use crate::alerter::{log_alert, Alerter};
use crate::config::AlerterConfig;
use crate::dedup::fingerprint;
use crate::delivery::DeliveryEngine;
use crate::errors::{AlerterError, Result};
use crate::types::AlertLevel;

/// Client posting alerts to a Slack incoming webhook
///
/// Shares the delivery pipeline of [`DiscordAlerter`](crate::DiscordAlerter):
/// cooldown suppression of repeated identical messages and deferred retries
/// on rate-limiting. Severity affects only the pass-through log verbosity;
/// the Block Kit payload is the same for every level.
#[derive(Clone)]
pub struct SlackAlerter {
    engine: DeliveryEngine,
    env: String,
    service: String,
    skip_log_entry: bool,
}

impl SlackAlerter {
    /// Build a Slack alerter from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the webhook URL, environment label, or service
    /// name is blank, if the webhook URL cannot be parsed, or if the HTTP
    /// client cannot be built.
    pub fn new(config: AlerterConfig) -> Result<Self> {
        if config.webhook_url.is_empty() {
            return Err(AlerterError::MissingConfig("webhook url"));
        }
        if config.env.is_empty() {
            return Err(AlerterError::MissingConfig("env"));
        }
        if config.service.is_empty() {
            return Err(AlerterError::MissingConfig("service"));
        }

        let webhook_url =
            Url::parse(&config.webhook_url).map_err(AlerterError::InvalidWebhookUrl)?;
        let engine = DeliveryEngine::from_config(&config, webhook_url)?;

        Ok(Self {
            engine,
            env: config.env,
            service: config.service,
            skip_log_entry: config.skip_log_entry,
        })
    }

    /// Get the configured webhook URL
    pub fn webhook_url(&self) -> &Url {
        self.engine.webhook_url()
    }

    fn payload_json(&self, message: &str) -> Result<String> {
        let payload = SlackPayload {
            blocks: vec![
                SlackBlock::Header {
                    text: SlackText::PlainText {
                        text: format!("Alert: {} - {}", self.service, self.env),
                        emoji: true,
                    },
                },
                SlackBlock::Divider,
                SlackBlock::Section {
                    text: SlackText::Mrkdwn {
                        text: message.to_owned(),
                    },
                },
            ],
        };

        serde_json::to_string(&payload).map_err(AlerterError::Serialize)
    }
}

#[async_trait]
impl Alerter for SlackAlerter {
    async fn alert_with_level(&self, level: AlertLevel, message: &str) {
        if !self.skip_log_entry {
            log_alert(level, message);
        }

        let cache_key = fingerprint(message).to_string();
        if self.engine.should_suppress(&cache_key).await {
            debug!("alert suppressed by cooldown");
            return;
        }

        let payload = match self.payload_json(message) {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, "failed to form json payload");
                return;
            }
        };

        self.engine.dispatch(cache_key, payload).await;
    }
}

#[derive(Debug, Serialize)]
struct SlackPayload {
    blocks: Vec<SlackBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum SlackBlock {
    Header { text: SlackText },
    Divider,
    Section { text: SlackText },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SlackText {
    PlainText { text: String, emoji: bool },
    Mrkdwn { text: String },
}
