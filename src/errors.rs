use thiserror::Error;

/// Result type alias for alerter operations
pub type Result<T> = std::result::Result<T, AlerterError>;

/// Errors surfaced when constructing an alerter.
///
/// Delivery failures are never surfaced: once an alerter is built, alerting
/// is best-effort and failures are logged and dropped.
#[derive(Debug, Error)]
pub enum AlerterError {
    /// A required configuration field was left blank
    #[error("{0} is required")]
    MissingConfig(&'static str),

    /// The webhook URL could not be parsed
    #[error("invalid webhook url: {0}")]
    InvalidWebhookUrl(#[source] url::ParseError),

    /// Failed to build HTTP client
    #[error("failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// Failed to serialize a webhook payload
    #[error("failed to serialize payload: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_display() {
        let error = AlerterError::MissingConfig("webhook url");
        assert_eq!(error.to_string(), "webhook url is required");
    }

    #[test]
    fn test_invalid_webhook_url_display() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let error = AlerterError::InvalidWebhookUrl(parse_err);
        assert!(error.to_string().starts_with("invalid webhook url"));
    }

    #[test]
    fn test_serialize_error_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let error = AlerterError::Serialize(json_err);
        assert!(error.to_string().starts_with("failed to serialize payload"));
    }
}
