//! [`MessageBroker`] implementations.

mod log;
mod memory;
mod rest_proxy;

use std::sync::Arc;

use anyhow::Context;

pub use self::log::LogBroker;
pub use memory::InMemoryBroker;
pub use rest_proxy::RestProxyBroker;

use super::broker::MessageBroker;
use super::config::{BrokerKind, PublisherConfig};

/// Builds the broker selected by `config`.
///
/// # Errors
///
/// Fails if the REST proxy is selected without a URL or its HTTP client
/// cannot be built.
pub fn build_broker(config: &PublisherConfig) -> anyhow::Result<Arc<dyn MessageBroker>> {
    let broker: Arc<dyn MessageBroker> = match config.broker {
        BrokerKind::Memory => Arc::new(InMemoryBroker::new(config.memory_capacity)),
        BrokerKind::Log => Arc::new(LogBroker),
        BrokerKind::RestProxy => {
            let url = config
                .rest_proxy_url
                .as_deref()
                .context("rest-proxy broker requires a proxy url")?;
            Arc::new(RestProxyBroker::new(url, config.send_timeout)?)
        }
    };
    Ok(broker)
}
