//! Registration event publication.
//!
//! [`EventPublisher`] hands encoded records to a [`MessageBroker`] on detached
//! tasks. Delivery is at most once: failures are logged and counted, never
//! retried and never reported back to the request that triggered them.

pub mod broker;
pub mod brokers;
pub mod config;
pub mod publisher;

pub use broker::{BrokerError, BrokerMessage, MessageBroker};
pub use brokers::{build_broker, InMemoryBroker, LogBroker, RestProxyBroker};
pub use config::{BrokerKind, PublisherConfig};
pub use publisher::{EventPublisher, PublishError};
