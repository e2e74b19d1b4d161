use std::sync::Arc;
use std::time::Duration;

use reqwest_middleware::ClientWithMiddleware;

use crate::dedup::DedupStore;

/// Default suppression window for repeated identical alerts.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// Default timeout applied to the built-in HTTP client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on deferred retries after provider rate-limiting.
pub const DEFAULT_MAX_RATE_LIMIT_RETRIES: u32 = 5;

/// Configuration consumed by the alerter constructors.
///
/// The webhook URL and environment label are always required; Slack also
/// requires a service name. Everything else has a default. Validation
/// happens in [`DiscordAlerter::new`](crate::DiscordAlerter::new) and
/// [`SlackAlerter::new`](crate::SlackAlerter::new), which fail fast on
/// missing required fields.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use webhook_alerter::AlerterConfig;
///
/// let config = AlerterConfig::new("https://discord.com/api/webhooks/0/abc", "production")
///     .with_service("api-server")
///     .with_mention_role_id(849690281536389230)
///     .with_cooldown(Duration::from_secs(120));
/// ```
#[derive(Clone)]
pub struct AlerterConfig {
    pub(crate) webhook_url: String,
    pub(crate) env: String,
    pub(crate) service: String,
    pub(crate) username: Option<String>,
    pub(crate) avatar_url: Option<String>,
    pub(crate) mention_role_id: Option<u64>,
    pub(crate) cooldown: Duration,
    pub(crate) timeout: Duration,
    pub(crate) skip_log_entry: bool,
    pub(crate) max_rate_limit_retries: u32,
    pub(crate) http_client: Option<ClientWithMiddleware>,
    pub(crate) dedup_store: Option<Arc<dyn DedupStore>>,
}

impl AlerterConfig {
    /// Create a configuration with the required fields.
    pub fn new(webhook_url: impl Into<String>, env: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            env: env.into(),
            service: String::new(),
            username: None,
            avatar_url: None,
            mention_role_id: None,
            cooldown: DEFAULT_COOLDOWN,
            timeout: DEFAULT_TIMEOUT,
            skip_log_entry: false,
            max_rate_limit_retries: DEFAULT_MAX_RATE_LIMIT_RETRIES,
            http_client: None,
            dedup_store: None,
        }
    }

    /// Set the service name shown in payload headers.
    ///
    /// Discord falls back to `"Alerter"` when unset; Slack requires it.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Override the display username (defaults to the service name).
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Override the display avatar URL.
    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    /// Role to ping on error-level alerts.
    pub fn with_mention_role_id(mut self, role_id: u64) -> Self {
        self.mention_role_id = Some(role_id);
        self
    }

    /// Suppression window for repeated identical alerts.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Timeout for the built-in HTTP client. Ignored when a custom client
    /// is supplied.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Skip the log entry normally written for every alert.
    pub fn with_skip_log_entry(mut self, skip: bool) -> Self {
        self.skip_log_entry = skip;
        self
    }

    /// Cap on deferred retries after provider rate-limiting. Zero disables
    /// retries entirely.
    pub fn with_max_rate_limit_retries(mut self, retries: u32) -> Self {
        self.max_rate_limit_retries = retries;
        self
    }

    /// Supply a custom middleware-wrapped HTTP client.
    pub fn with_http_client(mut self, client: ClientWithMiddleware) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Supply a custom dedup store backend (defaults to an in-memory store).
    pub fn with_dedup_store(mut self, store: Arc<dyn DedupStore>) -> Self {
        self.dedup_store = Some(store);
        self
    }
}
