use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::types::AlertLevel;

/// Best-effort alert delivery capability.
///
/// Callers render the message once (for example with `format!`) and hand it
/// off; implementations never surface delivery failures back to the caller,
/// since alerting must not destabilize the host application. The call
/// returns once the initial delivery attempt completes or fails; rate-limit
/// retries continue on a detached task.
#[async_trait]
pub trait Alerter: Send + Sync {
    /// Send `message` at the error level.
    async fn alert(&self, message: &str) {
        self.alert_with_level(AlertLevel::Error, message).await;
    }

    /// Send `message` at the given severity.
    async fn alert_with_level(&self, level: AlertLevel, message: &str);
}

/// Write the pass-through log entry for an alert at its severity.
pub(crate) fn log_alert(level: AlertLevel, message: &str) {
    match level {
        AlertLevel::Debug => debug!(alert = "alert", "{}", message),
        AlertLevel::Info => info!(alert = "alert", "{}", message),
        AlertLevel::Error => error!(alert = "alert", "{}", message),
    }
}

/// Alerter for when the external provider is disabled: offers the
/// [`Alerter`] interface as a no-op (`log_alerts = false`) or as a pure
/// log sink (`log_alerts = true`).
pub struct LogAlerter {
    log_alerts: bool,
}

impl LogAlerter {
    pub fn new(log_alerts: bool) -> Self {
        Self { log_alerts }
    }
}

#[async_trait]
impl Alerter for LogAlerter {
    async fn alert_with_level(&self, level: AlertLevel, message: &str) {
        if self.log_alerts {
            log_alert(level, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_alerter_makes_no_network_calls() {
        let alerter = LogAlerter::new(false);
        alerter.alert("nothing to deliver").await;
    }

    #[tokio::test]
    async fn test_log_alerter_covers_all_levels() {
        let alerter = LogAlerter::new(true);
        alerter.alert_with_level(AlertLevel::Debug, "debug entry").await;
        alerter.alert_with_level(AlertLevel::Info, "info entry").await;
        alerter.alert_with_level(AlertLevel::Error, "error entry").await;
    }

    #[tokio::test]
    async fn test_alerter_is_object_safe() {
        let alerter: Box<dyn Alerter> = Box::new(LogAlerter::new(false));
        alerter.alert("dispatched through a trait object").await;
    }
}
