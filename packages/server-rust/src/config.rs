//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or through its `WORKFORCE_*`
//! environment variable. [`Cli::into_config`] turns the parsed arguments into
//! the typed per-module configs.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::network::NetworkConfig;
use crate::publish::{BrokerKind, PublisherConfig};
use crate::service::ServiceConfig;
use crate::storage::{StorageBackend, StorageConfig};

/// Worker registration server.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to bind the HTTP listener to.
    #[arg(long, env = "WORKFORCE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// HTTP port; 0 picks a free one.
    #[arg(short, long, env = "WORKFORCE_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Allowed CORS origins, comma separated.
    #[arg(long, env = "WORKFORCE_CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
    pub cors_origins: Vec<String>,

    /// Upper bound on a single HTTP request, in seconds.
    #[arg(long, env = "WORKFORCE_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// How long shutdown waits for in-flight requests, in seconds.
    #[arg(long, env = "WORKFORCE_DRAIN_TIMEOUT_SECS", default_value_t = 30)]
    pub drain_timeout_secs: u64,

    /// Storage backend for sequences and workers.
    #[arg(long, env = "WORKFORCE_STORAGE", value_enum, default_value_t = StorageBackend::Redb)]
    pub storage: StorageBackend,

    /// Database file for the redb backend.
    #[arg(long, env = "WORKFORCE_REDB_PATH", default_value = "workforce.redb")]
    pub redb_path: PathBuf,

    /// Connection string for the postgres backend.
    #[arg(long, env = "WORKFORCE_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Postgres pool size.
    #[arg(long, env = "WORKFORCE_DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub db_max_connections: u32,

    /// Where registration events go.
    #[arg(long, env = "WORKFORCE_BROKER", value_enum, default_value_t = BrokerKind::Log)]
    pub broker: BrokerKind,

    /// Topic for registration events.
    #[arg(long, env = "WORKFORCE_TOPIC", default_value = crate::publish::config::DEFAULT_TOPIC)]
    pub topic: String,

    /// Base URL of the Kafka REST proxy.
    #[arg(long, env = "WORKFORCE_REST_PROXY_URL")]
    pub rest_proxy_url: Option<String>,

    /// Upper bound on a single broker send, in milliseconds.
    #[arg(long, env = "WORKFORCE_SEND_TIMEOUT_MS", default_value_t = 5000)]
    pub send_timeout_ms: u64,

    /// Counter that worker ids are allocated from.
    #[arg(long, env = "WORKFORCE_SEQUENCE_NAME", default_value = crate::service::config::DEFAULT_SEQUENCE_NAME)]
    pub sequence_name: String,

    /// Operations admitted at once before shedding.
    #[arg(long, env = "WORKFORCE_MAX_CONCURRENT_OPERATIONS", default_value_t = 1000)]
    pub max_concurrent_operations: u32,

    /// Serve Prometheus metrics on this port.
    #[arg(long, env = "WORKFORCE_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Emit logs as JSON lines.
    #[arg(long, env = "WORKFORCE_LOG_JSON")]
    pub log_json: bool,
}

/// Typed configuration for every module.
#[derive(Debug, Clone, Default)]
pub struct WorkforceConfig {
    pub network: NetworkConfig,
    pub storage: StorageConfig,
    pub publisher: PublisherConfig,
    pub service: ServiceConfig,
}

impl Cli {
    #[must_use]
    pub fn into_config(self) -> WorkforceConfig {
        WorkforceConfig {
            network: NetworkConfig {
                host: self.host,
                port: self.port,
                cors_origins: self.cors_origins,
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                drain_timeout: Duration::from_secs(self.drain_timeout_secs),
            },
            storage: StorageConfig {
                backend: self.storage,
                redb_path: self.redb_path,
                postgres_url: self.database_url,
                max_connections: self.db_max_connections,
            },
            publisher: PublisherConfig {
                topic: self.topic,
                broker: self.broker,
                rest_proxy_url: self.rest_proxy_url,
                send_timeout: Duration::from_millis(self.send_timeout_ms),
                ..PublisherConfig::default()
            },
            service: ServiceConfig {
                sequence_name: self.sequence_name,
                max_concurrent_operations: self.max_concurrent_operations,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_module_defaults() {
        let config = Cli::try_parse_from(["workforce-server"]).unwrap().into_config();

        assert_eq!(config.network.port, 8080);
        assert_eq!(config.network.cors_origins, vec!["*"]);
        assert_eq!(config.storage.backend, StorageBackend::Redb);
        assert_eq!(config.publisher.topic, "worker-registration");
        assert_eq!(config.publisher.broker, BrokerKind::Log);
        assert_eq!(config.publisher.send_timeout, Duration::from_secs(5));
        assert_eq!(config.service.sequence_name, "workers_sequence");
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "workforce-server",
            "--port",
            "9000",
            "--storage",
            "postgres",
            "--database-url",
            "postgres://db/workforce",
            "--broker",
            "rest-proxy",
            "--rest-proxy-url",
            "http://proxy:8082",
            "--cors-origins",
            "http://a.test,http://b.test",
            "--topic",
            "workers",
            "--log-json",
        ])
        .unwrap();
        assert!(cli.log_json);

        let config = cli.into_config();
        assert_eq!(config.network.port, 9000);
        assert_eq!(config.network.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(
            config.storage.postgres_url.as_deref(),
            Some("postgres://db/workforce")
        );
        assert_eq!(config.publisher.broker, BrokerKind::RestProxy);
        assert_eq!(config.publisher.topic, "workers");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(Cli::try_parse_from(["workforce-server", "--storage", "mongo"]).is_err());
    }
}
