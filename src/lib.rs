//! # Webhook Alerter
//!
//! A Rust client library for posting application alerts to Discord and Slack
//! webhooks.
//!
//! ## Features
//!
//! - Discord and Slack webhook delivery behind one [`Alerter`] trait
//! - Cooldown deduplication: identical messages are suppressed for a
//!   configurable window after a successful delivery
//! - Rate-limit handling: 429 responses schedule a deferred retry on a
//!   detached task, bounded by a configurable cap
//! - Best-effort by design: delivery failures are logged, never surfaced
//!   to the caller
//! - Panic reporting with a stack-trace payload for host-server recovery
//!   layers
//!
//! ## Example
//!
//! ```rust,no_run
//! use webhook_alerter::{Alerter, AlerterConfig, AlertLevel, DiscordAlerter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AlerterConfig::new(
//!         "https://discord.com/api/webhooks/0000000000/abcdefghijklmnop",
//!         "production",
//!     )
//!     .with_service("api-server")
//!     .with_mention_role_id(849690281536389230);
//!
//!     let alerter = DiscordAlerter::new(config)?;
//!
//!     alerter.alert(&format!("disk usage at {}%", 95)).await;
//!     alerter
//!         .alert_with_level(AlertLevel::Info, "nightly backup finished")
//!         .await;
//!     Ok(())
//! }
//! ```

mod alerter;
mod config;
mod dedup;
mod delivery;
mod discord;
mod errors;
mod recover;
mod slack;
mod types;

pub use alerter::{Alerter, LogAlerter};
pub use config::AlerterConfig;
pub use dedup::{fingerprint, DedupStore, MemoryDedupStore};
pub use discord::DiscordAlerter;
pub use errors::{AlerterError, Result};
pub use slack::SlackAlerter;
pub use types::AlertLevel;
