//! Detached, best-effort event publication.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::task::JoinHandle;
use tracing::{debug, error};
use workforce_core::{encode_record, partition_key, WorkerRecord};

use super::broker::{BrokerError, BrokerMessage, MessageBroker};
use super::config::PublisherConfig;

/// Counter incremented for every event that was not delivered.
pub const PUBLISH_FAILURES: &str = "workforce_publish_failures_total";

/// Why an event was not delivered. Only ever logged and counted.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Broker(#[from] BrokerError),
}

impl PublishError {
    fn reason(&self) -> &'static str {
        match self {
            Self::Serialize(_) => "serialize",
            Self::Broker(BrokerError::Rejected(_)) => "rejected",
            Self::Broker(BrokerError::Unreachable(_)) => "unreachable",
            Self::Broker(BrokerError::Timeout(_)) => "timeout",
        }
    }
}

fn report_failure(topic: &str, key: &str, err: &PublishError) {
    metrics::counter!(PUBLISH_FAILURES, "reason" => err.reason()).increment(1);
    error!(topic, key, error = %err, "event publication failed");
}

/// Hands events to a broker without blocking the caller.
///
/// Every publish runs on its own detached tokio task with a single send
/// attempt bounded by the configured timeout. Dropping the returned
/// [`JoinHandle`] does not cancel the send.
#[derive(Clone)]
pub struct EventPublisher {
    broker: Arc<dyn MessageBroker>,
    topic: String,
    send_timeout: Duration,
}

impl EventPublisher {
    #[must_use]
    pub fn new(broker: Arc<dyn MessageBroker>, config: &PublisherConfig) -> Self {
        Self {
            broker,
            topic: config.topic.clone(),
            send_timeout: config.send_timeout,
        }
    }

    /// Topic registration events go to.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Schedules `payload` for delivery to `topic` under `key`.
    ///
    /// Returns once the task is spawned. Must be called from within a tokio
    /// runtime.
    pub fn publish(&self, topic: &str, key: &str, payload: Bytes) -> JoinHandle<()> {
        let broker = Arc::clone(&self.broker);
        let send_timeout = self.send_timeout;
        let message = BrokerMessage {
            topic: topic.to_string(),
            key: key.to_string(),
            payload,
        };

        tokio::spawn(async move {
            let topic = message.topic.clone();
            let key = message.key.clone();
            let outcome = match tokio::time::timeout(send_timeout, broker.send(message)).await {
                Ok(result) => result,
                Err(_elapsed) => Err(BrokerError::Timeout(send_timeout)),
            };
            match outcome {
                Ok(()) => debug!(topic, key, broker = broker.name(), "event delivered"),
                Err(err) => report_failure(&topic, &key, &PublishError::from(err)),
            }
        })
    }

    /// Publishes `record` to the configured topic keyed by its id.
    ///
    /// Serialization happens on the caller's task; a failure there is reported
    /// like any other publish failure and `None` is returned.
    pub fn publish_registration(&self, record: &WorkerRecord) -> Option<JoinHandle<()>> {
        let key = partition_key(record.id);
        match encode_record(record) {
            Ok(payload) => Some(self.publish(&self.topic, &key, Bytes::from(payload))),
            Err(err) => {
                report_failure(&self.topic, &key, &PublishError::from(err));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use workforce_core::{decode_record, IdentityType, WorkerInput, WorkerStatus};

    use super::*;
    use crate::publish::brokers::InMemoryBroker;

    fn record(id: i32) -> WorkerRecord {
        let input = WorkerInput {
            name: "Kofi".to_string(),
            age: 44,
            phone_number: "+233 20 000 0000".to_string(),
            identity_type: IdentityType::NationalId,
            identity_data: "GHA-000".to_string(),
            address: "Ring Road".to_string(),
            latitude: 5.6,
            longitude: -0.19,
            status: WorkerStatus::Registered,
        };
        WorkerRecord::new(id, input, Utc::now())
    }

    struct FailingBroker;

    #[async_trait]
    impl MessageBroker for FailingBroker {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn send(&self, _message: BrokerMessage) -> Result<(), BrokerError> {
            Err(BrokerError::Unreachable("down".to_string()))
        }
    }

    struct StalledBroker;

    #[async_trait]
    impl MessageBroker for StalledBroker {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn send(&self, _message: BrokerMessage) -> Result<(), BrokerError> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn registration_event_carries_id_key_and_record() {
        let broker = Arc::new(InMemoryBroker::new(16));
        let publisher = EventPublisher::new(broker.clone(), &PublisherConfig::default());
        let original = record(9);

        publisher
            .publish_registration(&original)
            .unwrap()
            .await
            .unwrap();

        let messages = broker.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].topic, "worker-registration");
        assert_eq!(messages[0].key, "9");
        assert_eq!(decode_record(&messages[0].payload).unwrap(), original);
    }

    #[tokio::test]
    async fn custom_topic_is_used() {
        let broker = Arc::new(InMemoryBroker::new(16));
        let config = PublisherConfig {
            topic: "workers.v2".to_string(),
            ..PublisherConfig::default()
        };
        let publisher = EventPublisher::new(broker.clone(), &config);

        publisher.publish_registration(&record(1)).unwrap().await.unwrap();
        assert_eq!(broker.messages()[0].topic, "workers.v2");
    }

    #[tokio::test]
    async fn broker_failure_stays_inside_task() {
        let publisher = EventPublisher::new(Arc::new(FailingBroker), &PublisherConfig::default());
        let handle = publisher.publish("t", "1", Bytes::from_static(b"{}"));
        assert!(handle.await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_broker_is_abandoned_after_timeout() {
        let config = PublisherConfig {
            send_timeout: Duration::from_millis(50),
            ..PublisherConfig::default()
        };
        let publisher = EventPublisher::new(Arc::new(StalledBroker), &config);

        let handle = publisher.publish("t", "1", Bytes::from_static(b"{}"));
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("publish task should finish once the send times out")
            .unwrap();
    }

    #[test]
    fn failure_reasons_are_stable_labels() {
        let err = PublishError::from(BrokerError::Timeout(Duration::from_secs(1)));
        assert_eq!(err.reason(), "timeout");
        let err = PublishError::from(BrokerError::Rejected("400".to_string()));
        assert_eq!(err.reason(), "rejected");
    }
}
