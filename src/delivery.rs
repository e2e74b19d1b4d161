use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::config::AlerterConfig;
use crate::dedup::{DedupStore, MemoryDedupStore};
use crate::errors::{AlerterError, Result};

/// Outcome of a single webhook POST.
enum SendOutcome {
    Delivered,
    RateLimited(Duration),
    Failed,
}

/// Shared delivery pipeline for all providers: posts payloads, marks the
/// cooldown gate on confirmed delivery, and defers a bounded retry to a
/// detached task when the provider rate-limits.
///
/// Cloning is cheap; clones share the HTTP client and the dedup store.
#[derive(Clone)]
pub(crate) struct DeliveryEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    client: ClientWithMiddleware,
    webhook_url: Url,
    dedup: Arc<dyn DedupStore>,
    cooldown: Duration,
    max_rate_limit_retries: u32,
}

impl DeliveryEngine {
    pub(crate) fn from_config(config: &AlerterConfig, webhook_url: Url) -> Result<Self> {
        let client = match config.http_client.clone() {
            Some(client) => client,
            None => {
                let client = Client::builder()
                    .timeout(config.timeout)
                    .build()
                    .map_err(AlerterError::BuildHttpClient)?;
                ClientBuilder::new(client).build()
            }
        };

        let dedup = config
            .dedup_store
            .clone()
            .unwrap_or_else(|| Arc::new(MemoryDedupStore::new()));

        Ok(Self {
            inner: Arc::new(EngineInner {
                client,
                webhook_url,
                dedup,
                cooldown: config.cooldown,
                max_rate_limit_retries: config.max_rate_limit_retries,
            }),
        })
    }

    pub(crate) fn webhook_url(&self) -> &Url {
        &self.inner.webhook_url
    }

    /// True iff an alert with this cache key was delivered within the
    /// cooldown window.
    pub(crate) async fn should_suppress(&self, cache_key: &str) -> bool {
        self.inner.dedup.contains(cache_key).await
    }

    /// Run one send attempt to completion. On success the cooldown gate is
    /// marked; on rate-limiting a deferred retry is scheduled on a detached
    /// task and this call returns without waiting for it.
    #[instrument(name = "DeliveryEngine::dispatch", skip_all, fields(cache_key = %cache_key))]
    pub(crate) async fn dispatch(&self, cache_key: String, payload: String) {
        match self.send_once(&payload).await {
            SendOutcome::Delivered => self.mark_sent(&cache_key).await,
            SendOutcome::RateLimited(delay) => self.schedule_retry(cache_key, payload, delay),
            SendOutcome::Failed => {}
        }
    }

    /// The gate is marked only here, after a confirmed 2xx. A failed or
    /// still-pending delivery leaves the key absent so the next identical
    /// alert can attempt delivery again.
    async fn mark_sent(&self, cache_key: &str) {
        self.inner.dedup.insert(cache_key, self.inner.cooldown).await;
    }

    /// Deferred re-entry into the send state with the identical payload,
    /// detached from the caller. Each further 429 waits again, up to the
    /// configured cap.
    fn schedule_retry(&self, cache_key: String, payload: String, delay: Duration) {
        let engine = self.clone();
        tokio::spawn(async move {
            let mut delay = delay;
            for attempt in 1..=engine.inner.max_rate_limit_retries {
                tokio::time::sleep(delay).await;
                match engine.send_once(&payload).await {
                    SendOutcome::Delivered => {
                        engine.mark_sent(&cache_key).await;
                        return;
                    }
                    SendOutcome::RateLimited(next_delay) => {
                        debug!(attempt, "alert still rate limited");
                        delay = next_delay;
                    }
                    SendOutcome::Failed => return,
                }
            }
            warn!(
                retries = engine.inner.max_rate_limit_retries,
                "dropping alert, rate limit retries exhausted"
            );
        });
    }

    async fn send_once(&self, payload: &str) -> SendOutcome {
        let response = self
            .inner
            .client
            .post(self.inner.webhook_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_owned())
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "failed to send alert");
                return SendOutcome::Failed;
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("alert delivered");
            SendOutcome::Delivered
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            error!("alerter has been rate limited");
            SendOutcome::RateLimited(retry_after(response.headers()))
        } else {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "unexpected status code");
            SendOutcome::Failed
        }
    }
}

/// Provider-supplied wait before the next attempt, in seconds (integer or
/// fractional). A missing or unparsable header is logged and treated as no
/// wait.
fn retry_after(headers: &HeaderMap) -> Duration {
    let value = match headers.get(RETRY_AFTER) {
        Some(value) => value,
        None => {
            warn!("rate limited without a Retry-After header");
            return Duration::ZERO;
        }
    };

    let parsed = value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok());

    match parsed {
        Some(wait) => wait,
        None => {
            error!(header = ?value, "failed to parse Retry-After header");
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use tokio::time::sleep;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_retry_after_integer_seconds() {
        assert_eq!(retry_after(&headers("2")), Duration::from_secs(2));
    }

    #[test]
    fn test_retry_after_fractional_seconds() {
        assert_eq!(retry_after(&headers("0.5")), Duration::from_millis(500));
    }

    #[test]
    fn test_retry_after_missing_is_zero() {
        assert_eq!(retry_after(&HeaderMap::new()), Duration::ZERO);
    }

    #[test]
    fn test_retry_after_malformed_is_zero() {
        assert_eq!(retry_after(&headers("soon")), Duration::ZERO);
        assert_eq!(retry_after(&headers("-3")), Duration::ZERO);
        assert_eq!(retry_after(&headers("")), Duration::ZERO);
    }

    fn test_engine(uri: &str, max_retries: u32) -> DeliveryEngine {
        let config = AlerterConfig::new(uri, "test").with_max_rate_limit_retries(max_retries);
        let url = Url::parse(uri).unwrap();
        DeliveryEngine::from_config(&config, url).unwrap()
    }

    #[tokio::test]
    async fn test_rate_limit_retries_are_bounded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .mount(&mock_server)
            .await;

        let engine = test_engine(&mock_server.uri(), 2);
        engine.dispatch("key".to_string(), "{}".to_string()).await;

        // initial attempt plus two deferred retries, then give up
        sleep(Duration::from_millis(400)).await;
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
        assert!(!engine.should_suppress("key").await);
    }

    #[tokio::test]
    async fn test_retry_success_marks_cooldown_gate() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let engine = test_engine(&mock_server.uri(), 5);
        engine.dispatch("key".to_string(), "{}".to_string()).await;

        sleep(Duration::from_millis(300)).await;
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
        assert!(engine.should_suppress("key").await);
    }

    #[tokio::test]
    async fn test_transport_error_is_dropped() {
        // nothing is listening on this port
        let engine = test_engine("http://127.0.0.1:9/hook", 5);
        engine.dispatch("key".to_string(), "{}".to_string()).await;

        assert!(!engine.should_suppress("key").await);
    }
}
