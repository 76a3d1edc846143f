//! Broker abstraction the publisher writes to.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

/// One event on its way to a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerMessage {
    pub topic: String,
    /// Partition/ordering key.
    pub key: String,
    pub payload: Bytes,
}

/// Failure to hand a message to the broker.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// The broker answered but refused the message.
    #[error("broker rejected message: {0}")]
    Rejected(String),
    /// The broker could not be reached.
    #[error("broker unreachable: {0}")]
    Unreachable(String),
    #[error("broker send timed out after {0:?}")]
    Timeout(Duration),
}

/// Outbound message channel.
///
/// Used as `Arc<dyn MessageBroker>`.
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    /// Sends one message. A single attempt; implementations do not retry.
    async fn send(&self, message: BrokerMessage) -> Result<(), BrokerError>;
}
