use async_trait::async_trait;
use tracing::info;

use crate::publish::broker::{BrokerError, BrokerMessage, MessageBroker};

/// Broker that only logs. For deployments without a message bus.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogBroker;

#[async_trait]
impl MessageBroker for LogBroker {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: BrokerMessage) -> Result<(), BrokerError> {
        info!(
            topic = %message.topic,
            key = %message.key,
            payload = %String::from_utf8_lossy(&message.payload),
            "event published"
        );
        Ok(())
    }
}
