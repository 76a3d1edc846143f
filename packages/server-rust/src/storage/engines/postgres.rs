//! Postgres backend for multi-instance deployments.
//!
//! The counter increment is a single `INSERT ... ON CONFLICT DO UPDATE ...
//! RETURNING` statement. Postgres row-locks the counter for the duration of
//! that statement, so concurrent callers from any number of processes each
//! observe a distinct value and a missing counter is created atomically.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;
use workforce_core::{decode_record, encode_record_string, WorkerId, WorkerRecord};

use crate::storage::error::{unavailable, StorageError};
use crate::storage::record_store::RecordStore;
use crate::storage::sequence::SequenceStore;

const CREATE_SEQUENCES: &str = "CREATE TABLE IF NOT EXISTS database_sequences (
    name  TEXT PRIMARY KEY,
    value BIGINT NOT NULL
)";

const CREATE_WORKERS: &str = "CREATE TABLE IF NOT EXISTS workers (
    id       INTEGER PRIMARY KEY,
    document TEXT NOT NULL
)";

const INCREMENT_SEQUENCE: &str = "INSERT INTO database_sequences (name, value) VALUES ($1, 1)
    ON CONFLICT (name) DO UPDATE SET value = database_sequences.value + 1
    RETURNING value";

/// Pooled Postgres sequences and worker documents.
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Connects a pool and creates the tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the database cannot be reached
    /// or the schema cannot be created.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(unavailable)?;

        sqlx::query(CREATE_SEQUENCES)
            .execute(&pool)
            .await
            .map_err(unavailable)?;
        sqlx::query(CREATE_WORKERS)
            .execute(&pool)
            .await
            .map_err(unavailable)?;

        info!(max_connections, "postgres storage ready");
        Ok(Self { pool })
    }

    fn encode(record: &WorkerRecord) -> Result<String, StorageError> {
        Ok(encode_record_string(record)?)
    }
}

#[async_trait]
impl SequenceStore for PostgresStorage {
    async fn increment(&self, name: &str) -> Result<i64, StorageError> {
        sqlx::query_scalar::<_, i64>(INCREMENT_SEQUENCE)
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable)
    }
}

#[async_trait]
impl RecordStore for PostgresStorage {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, record: &WorkerRecord) -> Result<(), StorageError> {
        let result = sqlx::query(
            "INSERT INTO workers (id, document) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(record.id)
        .bind(Self::encode(record)?)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Conflict { id: record.id });
        }
        Ok(())
    }

    async fn find_by_id(&self, id: WorkerId) -> Result<Option<WorkerRecord>, StorageError> {
        let document: Option<String> =
            sqlx::query_scalar("SELECT document FROM workers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unavailable)?;

        Ok(document
            .map(|d| decode_record(d.as_bytes()))
            .transpose()?)
    }

    async fn find_all(&self) -> Result<Vec<WorkerRecord>, StorageError> {
        let documents: Vec<String> =
            sqlx::query_scalar("SELECT document FROM workers ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(unavailable)?;

        documents
            .iter()
            .map(|d| decode_record(d.as_bytes()).map_err(StorageError::from))
            .collect()
    }

    async fn update(
        &self,
        id: WorkerId,
        record: &WorkerRecord,
    ) -> Result<Option<WorkerRecord>, StorageError> {
        let result = sqlx::query("UPDATE workers SET document = $2 WHERE id = $1")
            .bind(id)
            .bind(Self::encode(record)?)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;

        if result.rows_affected() == 0 {
            Ok(None)
        } else {
            Ok(Some(record.clone()))
        }
    }

    async fn delete_by_id(&self, id: WorkerId) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM workers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(result.rows_affected() > 0)
    }
}
