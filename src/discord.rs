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

pub(crate) const DEFAULT_AVATAR_URL: &str = "https://cdn.discordapp.com/embed/avatars/4.png";

/// Client posting alerts to a Discord webhook
///
/// Repeated identical messages are suppressed for the configured cooldown
/// after a successful delivery, and 429 responses trigger a deferred retry
/// on a detached task.
///
/// # Example
///
/// ```rust,no_run
/// use webhook_alerter::{Alerter, AlerterConfig, DiscordAlerter};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = AlerterConfig::new(
///         "https://discord.com/api/webhooks/0000000000/abcdefghijklmnop",
///         "production",
///     )
///     .with_service("api-server")
///     .with_mention_role_id(849690281536389230);
///
///     let alerter = DiscordAlerter::new(config)?;
///     alerter.alert(&format!("disk usage at {}%", 95)).await;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct DiscordAlerter {
    pub(crate) engine: DeliveryEngine,
    pub(crate) env: String,
    pub(crate) username: String,
    pub(crate) avatar_url: String,
    pub(crate) mention_role_id: Option<u64>,
    pub(crate) skip_log_entry: bool,
}

impl DiscordAlerter {
    /// Build a Discord alerter from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the webhook URL or environment label is blank,
    /// if the webhook URL cannot be parsed, or if the HTTP client cannot
    /// be built.
    pub fn new(config: AlerterConfig) -> Result<Self> {
        if config.webhook_url.is_empty() {
            return Err(AlerterError::MissingConfig("webhook url"));
        }
        if config.env.is_empty() {
            return Err(AlerterError::MissingConfig("env"));
        }

        let webhook_url =
            Url::parse(&config.webhook_url).map_err(AlerterError::InvalidWebhookUrl)?;

        let service = if config.service.is_empty() {
            "Alerter".to_string()
        } else {
            config.service.clone()
        };
        let username = config.username.clone().unwrap_or_else(|| service.clone());
        let avatar_url = config
            .avatar_url
            .clone()
            .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string());

        let engine = DeliveryEngine::from_config(&config, webhook_url)?;

        Ok(Self {
            engine,
            env: config.env,
            username,
            avatar_url,
            mention_role_id: config.mention_role_id,
            skip_log_entry: config.skip_log_entry,
        })
    }

    /// Get the configured webhook URL
    pub fn webhook_url(&self) -> &Url {
        self.engine.webhook_url()
    }

    fn payload_json(&self, level: AlertLevel, message: &str) -> Result<String> {
        let mut payload = DiscordPayload {
            username: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
            content: String::new(),
            embeds: vec![Embed {
                author: EmbedAuthor {
                    name: self.username.clone(),
                    icon_url: self.avatar_url.clone(),
                },
                title: format!("Alert - {}", self.env),
                description: message.to_owned(),
                color: level.color(),
                fields: Vec::new(),
            }],
        };

        if level.mentions() {
            if let Some(role_id) = self.mention_role_id {
                payload.content = format!("<@&{role_id}>");
            }
        }

        serde_json::to_string(&payload).map_err(AlerterError::Serialize)
    }
}

#[async_trait]
impl Alerter for DiscordAlerter {
    async fn alert_with_level(&self, level: AlertLevel, message: &str) {
        if !self.skip_log_entry {
            log_alert(level, message);
        }

        let cache_key = fingerprint(message).to_string();
        if self.engine.should_suppress(&cache_key).await {
            debug!("alert suppressed by cooldown");
            return;
        }

        let payload = match self.payload_json(level, message) {
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
pub(crate) struct EmbedAuthor {
    pub(crate) name: String,
    pub(crate) icon_url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmbedField {
    pub(crate) name: String,
    pub(crate) value: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct Embed {
    pub(crate) author: EmbedAuthor,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) fields: Vec<EmbedField>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DiscordPayload {
    pub(crate) username: String,
    pub(crate) avatar_url: String,
    pub(crate) content: String,
    pub(crate) embeds: Vec<Embed>,
}
