//! Builds the configured storage backend.
//!
//! [`StorageFactory`] is the dependency injection point for storage: it turns a
//! [`StorageConfig`] into one backend instance shared by the sequence
//! allocator and the record store, so both see the same durability domain.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::storage::engines::HashMapStorage;
use crate::storage::record_store::RecordStore;
use crate::storage::sequence::SequenceStore;

/// Which backend holds sequences and worker documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageBackend {
    /// Process-local maps. Nothing survives a restart.
    Memory,
    /// Embedded single-file database.
    Redb,
    /// Shared database for multi-instance deployments.
    Postgres,
}

/// Storage settings.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Database file for [`StorageBackend::Redb`].
    pub redb_path: PathBuf,
    /// Connection string for [`StorageBackend::Postgres`].
    pub postgres_url: Option<String>,
    /// Pool size for [`StorageBackend::Postgres`].
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            redb_path: PathBuf::from("workforce.redb"),
            postgres_url: None,
            max_connections: 10,
        }
    }
}

/// The two views of one backend.
#[derive(Clone)]
pub struct StorageHandles {
    pub sequences: Arc<dyn SequenceStore>,
    pub records: Arc<dyn RecordStore>,
}

impl StorageHandles {
    /// Wraps a backend that implements both store traits.
    pub fn shared<S>(storage: Arc<S>) -> Self
    where
        S: SequenceStore + RecordStore + 'static,
    {
        Self {
            sequences: storage.clone(),
            records: storage,
        }
    }
}

/// Creates storage handles from a [`StorageConfig`].
pub struct StorageFactory {
    config: StorageConfig,
}

impl StorageFactory {
    #[must_use]
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Opens the configured backend.
    ///
    /// # Errors
    ///
    /// Fails if the backend cannot be opened, a required setting is missing, or
    /// the backend was not compiled in.
    pub async fn create(&self) -> anyhow::Result<StorageHandles> {
        let handles = match self.config.backend {
            StorageBackend::Memory => StorageHandles::shared(Arc::new(HashMapStorage::new())),
            StorageBackend::Redb => self.open_redb()?,
            StorageBackend::Postgres => self.connect_postgres().await?,
        };
        info!(backend = handles.records.backend_name(), "storage backend opened");
        Ok(handles)
    }

    #[cfg(feature = "redb")]
    fn open_redb(&self) -> anyhow::Result<StorageHandles> {
        let storage = crate::storage::engines::RedbStorage::open(&self.config.redb_path)
            .with_context(|| format!("opening {}", self.config.redb_path.display()))?;
        Ok(StorageHandles::shared(Arc::new(storage)))
    }

    #[cfg(not(feature = "redb"))]
    fn open_redb(&self) -> anyhow::Result<StorageHandles> {
        anyhow::bail!("redb backend requested but the `redb` feature is not enabled")
    }

    #[cfg(feature = "postgres")]
    async fn connect_postgres(&self) -> anyhow::Result<StorageHandles> {
        let url = self
            .config
            .postgres_url
            .as_deref()
            .context("postgres backend requires a database url")?;
        let storage =
            crate::storage::engines::PostgresStorage::connect(url, self.config.max_connections)
                .await
                .context("connecting to postgres")?;
        Ok(StorageHandles::shared(Arc::new(storage)))
    }

    #[cfg(not(feature = "postgres"))]
    #[allow(clippy::unused_async)]
    async fn connect_postgres(&self) -> anyhow::Result<StorageHandles> {
        anyhow::bail!("postgres backend requested but the `postgres` feature is not enabled")
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use workforce_core::{IdentityType, WorkerInput, WorkerRecord, WorkerStatus};

    use super::*;

    fn record(id: i32) -> WorkerRecord {
        let input = WorkerInput {
            name: "Lena".to_string(),
            age: 25,
            phone_number: "020 7946 0000".to_string(),
            identity_type: IdentityType::TaxId,
            identity_data: "T-1".to_string(),
            address: "5 Mill Road".to_string(),
            latitude: 1.0,
            longitude: 2.0,
            status: WorkerStatus::Registered,
        };
        WorkerRecord::new(id, input, Utc::now())
    }

    #[tokio::test]
    async fn memory_handles_share_one_backend() {
        let handles = StorageFactory::new(StorageConfig::default())
            .create()
            .await
            .unwrap();

        assert_eq!(handles.records.backend_name(), "memory");
        assert_eq!(handles.sequences.increment("workers_sequence").await.unwrap(), 1);
        handles.records.insert(&record(1)).await.unwrap();
        assert!(handles.records.find_by_id(1).await.unwrap().is_some());
    }

    #[cfg(feature = "redb")]
    #[tokio::test]
    async fn redb_backend_opens_file_at_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::Redb,
            redb_path: dir.path().join("factory.redb"),
            ..StorageConfig::default()
        };

        let handles = StorageFactory::new(config).create().await.unwrap();
        assert_eq!(handles.records.backend_name(), "redb");
        assert!(dir.path().join("factory.redb").exists());
    }

    #[cfg(not(feature = "postgres"))]
    #[tokio::test]
    async fn postgres_without_feature_is_rejected() {
        let config = StorageConfig {
            backend: StorageBackend::Postgres,
            postgres_url: Some("postgres://localhost/workforce".to_string()),
            ..StorageConfig::default()
        };
        assert!(StorageFactory::new(config).create().await.is_err());
    }

    #[cfg(feature = "postgres")]
    #[tokio::test]
    async fn postgres_without_url_is_rejected() {
        let config = StorageConfig {
            backend: StorageBackend::Postgres,
            ..StorageConfig::default()
        };
        assert!(StorageFactory::new(config).create().await.is_err());
    }
}
