//! Kafka REST proxy broker.
//!
//! Each message becomes one `POST {base}/topics/{topic}` carrying a single
//! JSON record. The payload is embedded as JSON, not base64, so the proxy must
//! accept the `application/vnd.kafka.json.v2+json` embedded format.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::json;

use crate::publish::broker::{BrokerError, BrokerMessage, MessageBroker};

const KAFKA_JSON_V2: &str = "application/vnd.kafka.json.v2+json";

/// Publishes to a Kafka REST proxy.
#[derive(Debug, Clone)]
pub struct RestProxyBroker {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RestProxyBroker {
    /// Creates a broker posting to `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Unreachable`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BrokerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BrokerError::Unreachable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn topic_url(&self, topic: &str) -> String {
        format!("{}/topics/{topic}", self.base_url)
    }
}

#[async_trait]
impl MessageBroker for RestProxyBroker {
    fn name(&self) -> &'static str {
        "rest-proxy"
    }

    async fn send(&self, message: BrokerMessage) -> Result<(), BrokerError> {
        let value: serde_json::Value = serde_json::from_slice(&message.payload)
            .map_err(|e| BrokerError::Rejected(format!("payload is not JSON: {e}")))?;
        let body = json!({
            "records": [{ "key": message.key, "value": value }]
        });
        let body = serde_json::to_vec(&body).map_err(|e| BrokerError::Rejected(e.to_string()))?;

        let response = self
            .client
            .post(self.topic_url(&message.topic))
            .header(CONTENT_TYPE, KAFKA_JSON_V2)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BrokerError::Timeout(self.timeout)
                } else {
                    BrokerError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_default();
            Err(BrokerError::Rejected(format!("{status}: {detail}")))
        }
    }
}
