use std::time::Duration;

/// Default topic for registration events.
pub const DEFAULT_TOPIC: &str = "worker-registration";

/// Which [`MessageBroker`](super::MessageBroker) receives events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BrokerKind {
    /// In-process broadcast channel.
    Memory,
    /// Kafka REST proxy over HTTP.
    RestProxy,
    /// Events are written to the log and go nowhere else.
    Log,
}

/// Event publication settings.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub topic: String,
    pub broker: BrokerKind,
    /// Base URL of the REST proxy, required for [`BrokerKind::RestProxy`].
    pub rest_proxy_url: Option<String>,
    /// Upper bound on a single broker send.
    pub send_timeout: Duration,
    /// Messages retained by the in-memory broker for inspection.
    pub memory_capacity: usize,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            broker: BrokerKind::Log,
            rest_proxy_url: None,
            send_timeout: Duration::from_secs(5),
            memory_capacity: 1024,
        }
    }
}
