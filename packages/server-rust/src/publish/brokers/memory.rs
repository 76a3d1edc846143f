//! In-process broker for tests and single-node runs.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::publish::broker::{BrokerError, BrokerMessage, MessageBroker};

/// Broadcasts every message to live subscribers and keeps a bounded history.
#[derive(Debug)]
pub struct InMemoryBroker {
    sender: broadcast::Sender<BrokerMessage>,
    history: Mutex<VecDeque<BrokerMessage>>,
    capacity: usize,
}

impl InMemoryBroker {
    /// `capacity` bounds both the history and each subscriber's lag.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            history: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Receives every message sent after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BrokerMessage> {
        self.sender.subscribe()
    }

    /// The most recent messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<BrokerMessage> {
        self.history.lock().iter().cloned().collect()
    }
}

#[async_trait]
impl MessageBroker for InMemoryBroker {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn send(&self, message: BrokerMessage) -> Result<(), BrokerError> {
        {
            let mut history = self.history.lock();
            if history.len() == self.capacity {
                history.pop_front();
            }
            history.push_back(message.clone());
        }
        // No subscribers is not an error; the history still has the message.
        let _ = self.sender.send(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn message(key: &str) -> BrokerMessage {
        BrokerMessage {
            topic: "worker-registration".to_string(),
            key: key.to_string(),
            payload: Bytes::from_static(b"{}"),
        }
    }

    #[tokio::test]
    async fn subscribers_receive_sent_messages() {
        let broker = InMemoryBroker::new(8);
        let mut rx = broker.subscribe();

        broker.send(message("1")).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.key, "1");
        assert_eq!(received.topic, "worker-registration");
    }

    #[tokio::test]
    async fn send_without_subscribers_succeeds() {
        let broker = InMemoryBroker::new(8);
        broker.send(message("1")).await.unwrap();
        assert_eq!(broker.messages().len(), 1);
    }

    #[tokio::test]
    async fn history_drops_oldest_beyond_capacity() {
        let broker = InMemoryBroker::new(2);
        for key in ["1", "2", "3"] {
            broker.send(message(key)).await.unwrap();
        }
        let keys: Vec<_> = broker.messages().into_iter().map(|m| m.key).collect();
        assert_eq!(keys, vec!["2", "3"]);
    }
}
