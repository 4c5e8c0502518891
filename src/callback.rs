//! Delivery of result envelopes to the caller-supplied response URL

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::CallbackConfig;
use crate::handlers::ResultEnvelope;

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("Failed to serialize envelope: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Callback rejected with status {status}: {reason}")]
    Rejected { status: u16, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Destination for result envelopes
#[async_trait]
pub trait ResponseSink: Send + Sync {
    async fn deliver(&self, url: &str, envelope: &ResultEnvelope) -> Result<(), CallbackError>;
}

/// HTTP client settings for callback delivery
#[derive(Debug, Clone)]
pub struct HttpSinkConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpSinkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("cfntoolkit/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl From<&CallbackConfig> for HttpSinkConfig {
    fn from(config: &CallbackConfig) -> Self {
        Self {
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// PUTs the serialized envelope to the response URL.
///
/// The body is sent with an empty `Content-Type` and an explicit
/// `Content-Length`, matching what pre-signed callback URLs expect.
/// Delivery is attempted once.
pub struct HttpResponseSink {
    client: Client,
}

impl HttpResponseSink {
    pub fn new(config: HttpSinkConfig) -> Result<Self, CallbackError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| CallbackError::RequestFailed(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ResponseSink for HttpResponseSink {
    async fn deliver(&self, url: &str, envelope: &ResultEnvelope) -> Result<(), CallbackError> {
        let url = reqwest::Url::parse(url).map_err(|e| CallbackError::InvalidUrl(e.to_string()))?;
        let body = serde_json::to_vec(envelope)?;
        debug!(%url, bytes = body.len(), "Delivering response");

        let response = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, "")
            .header(CONTENT_LENGTH, body.len())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CallbackError::Timeout
                } else {
                    CallbackError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), "Response URL rejected envelope");
            return Err(CallbackError::Rejected {
                status: status.as_u16(),
                reason,
            });
        }

        info!(status = status.as_u16(), "Response delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_config_from_callback_config() {
        let config = CallbackConfig {
            connect_timeout_ms: 1500,
            request_timeout_ms: 20_000,
            user_agent: "test-agent".to_string(),
        };
        let sink = HttpSinkConfig::from(&config);
        assert_eq!(sink.connect_timeout, Duration::from_millis(1500));
        assert_eq!(sink.request_timeout, Duration::from_secs(20));
        assert_eq!(sink.user_agent, "test-agent");
    }

    #[test]
    fn test_default_user_agent_names_the_crate() {
        assert!(HttpSinkConfig::default().user_agent.starts_with("cfntoolkit/"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_reported() {
        let sink = HttpResponseSink::new(HttpSinkConfig::default()).unwrap();
        let envelope: ResultEnvelope = serde_json::from_value(serde_json::json!({
            "Status": "SUCCESS",
            "PhysicalResourceId": "pid",
            "StackId": "stack",
            "RequestId": "req",
            "LogicalResourceId": "Res"
        }))
        .unwrap();

        let err = sink.deliver("not a url", &envelope).await.unwrap_err();
        assert!(matches!(err, CallbackError::InvalidUrl(_)));
    }
}
