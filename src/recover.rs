use tracing::error;

use crate::dedup::fingerprint;
use crate::discord::{DiscordAlerter, DiscordPayload, Embed, EmbedAuthor, EmbedField};
use crate::errors::{AlerterError, Result};

const PANIC_COLOR: u32 = 0xcc0000;

impl DiscordAlerter {
    /// Report a recovered panic to the webhook.
    ///
    /// Crash reports skip the cooldown check so a panic is always delivered.
    /// The serialized payload (stack trace included) serves as the dedup key
    /// for the delivery pipeline's bookkeeping. `request` describes the
    /// request being served when the panic fired, for example
    /// `"GET /orders/42"`.
    ///
    /// Host servers are expected to call this from their own recovery layer
    /// (a panic-catching middleware or task supervisor) and then resume
    /// unwinding or answer the original caller with a 500.
    pub async fn alert_panic(&self, panic_message: &str, backtrace: &str, request: Option<&str>) {
        if !self.skip_log_entry {
            error!(panic = %panic_message, "recovered from panic");
        }

        let payload = match self.panic_payload_json(panic_message, backtrace, request) {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, "failed to form panic payload");
                return;
            }
        };

        let cache_key = fingerprint(&payload).to_string();
        self.engine.dispatch(cache_key, payload).await;
    }

    fn panic_payload_json(
        &self,
        panic_message: &str,
        backtrace: &str,
        request: Option<&str>,
    ) -> Result<String> {
        let mut fields = vec![EmbedField {
            name: "ENV:".to_string(),
            value: self.env.clone(),
        }];
        if let Some(request) = request {
            fields.push(EmbedField {
                name: "Request".to_string(),
                value: request.to_owned(),
            });
        }

        let mut payload = DiscordPayload {
            username: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
            content: String::new(),
            embeds: vec![Embed {
                author: EmbedAuthor {
                    name: self.username.clone(),
                    icon_url: self.avatar_url.clone(),
                },
                title: "Panic Stack Trace".to_string(),
                description: format!("```\npanic: {panic_message}\n{backtrace}\n```"),
                color: PANIC_COLOR,
                fields,
            }],
        };

        if let Some(role_id) = self.mention_role_id {
            payload.content = format!("<@&{role_id}>");
        }

        serde_json::to_string(&payload).map_err(AlerterError::Serialize)
    }
}
