//! Embedded durable backend built on [`redb`].
//!
//! Each counter increment and each insert/update/delete runs inside one redb
//! write transaction. redb admits a single writer per database file, so the
//! read-check-write steps cannot interleave. The file is locked by the
//! owning process: deployments with several server instances sharing one
//! sequence need [`PostgresStorage`](super::PostgresStorage) instead.
//!
//! redb is synchronous; every call hops onto the blocking thread pool.

use std::path::Path;
use std::sync::Arc;

use ::redb::{Database, ReadableTable, TableDefinition};
use async_trait::async_trait;
use workforce_core::{decode_record, encode_record, WorkerId, WorkerRecord};

use crate::storage::error::{unavailable, StorageError};
use crate::storage::record_store::RecordStore;
use crate::storage::sequence::SequenceStore;

const SEQUENCES: TableDefinition<&str, i64> = TableDefinition::new("database_sequences");
const WORKERS: TableDefinition<i32, &[u8]> = TableDefinition::new("workers");

/// File-backed sequences and worker documents.
pub struct RedbStorage {
    db: Arc<Database>,
}

impl RedbStorage {
    /// Opens (or creates) the database at `path` and ensures both tables exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the file cannot be opened or
    /// is locked by another process.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path).map_err(unavailable)?;

        // Read transactions fail on tables that were never created.
        let txn = db.begin_write().map_err(unavailable)?;
        txn.open_table(SEQUENCES).map_err(unavailable)?;
        txn.open_table(WORKERS).map_err(unavailable)?;
        txn.commit().map_err(unavailable)?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Runs `op` against the database on the blocking pool.
    async fn run<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, StorageError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(|e| StorageError::Unavailable(format!("storage task failed: {e}")))?
    }
}

#[async_trait]
impl SequenceStore for RedbStorage {
    async fn increment(&self, name: &str) -> Result<i64, StorageError> {
        let name = name.to_string();
        self.run(move |db| {
            let txn = db.begin_write().map_err(unavailable)?;
            let next = {
                let mut table = txn.open_table(SEQUENCES).map_err(unavailable)?;
                let current = table
                    .get(name.as_str())
                    .map_err(unavailable)?
                    .map_or(0, |v| v.value());
                let next = current + 1;
                table.insert(name.as_str(), next).map_err(unavailable)?;
                next
            };
            txn.commit().map_err(unavailable)?;
            Ok(next)
        })
        .await
    }
}

#[async_trait]
impl RecordStore for RedbStorage {
    fn backend_name(&self) -> &'static str {
        "redb"
    }

    async fn insert(&self, record: &WorkerRecord) -> Result<(), StorageError> {
        let id = record.id;
        let document = encode_record(record)?;
        self.run(move |db| {
            let txn = db.begin_write().map_err(unavailable)?;
            let exists = {
                let mut table = txn.open_table(WORKERS).map_err(unavailable)?;
                let exists = table.get(id).map_err(unavailable)?.is_some();
                if !exists {
                    table.insert(id, document.as_slice()).map_err(unavailable)?;
                }
                exists
            };
            if exists {
                txn.abort().map_err(unavailable)?;
                return Err(StorageError::Conflict { id });
            }
            txn.commit().map_err(unavailable)?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: WorkerId) -> Result<Option<WorkerRecord>, StorageError> {
        self.run(move |db| {
            let txn = db.begin_read().map_err(unavailable)?;
            let table = txn.open_table(WORKERS).map_err(unavailable)?;
            let record = match table.get(id).map_err(unavailable)? {
                Some(document) => Some(decode_record(document.value())?),
                None => None,
            };
            Ok(record)
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<WorkerRecord>, StorageError> {
        self.run(|db| {
            let txn = db.begin_read().map_err(unavailable)?;
            let table = txn.open_table(WORKERS).map_err(unavailable)?;
            let mut records = Vec::new();
            // Keys iterate in ascending order.
            for entry in table.iter().map_err(unavailable)? {
                let (_, document) = entry.map_err(unavailable)?;
                records.push(decode_record(document.value())?);
            }
            Ok(records)
        })
        .await
    }

    async fn update(
        &self,
        id: WorkerId,
        record: &WorkerRecord,
    ) -> Result<Option<WorkerRecord>, StorageError> {
        let document = encode_record(record)?;
        let record = record.clone();
        self.run(move |db| {
            let txn = db.begin_write().map_err(unavailable)?;
            let exists = {
                let mut table = txn.open_table(WORKERS).map_err(unavailable)?;
                let exists = table.get(id).map_err(unavailable)?.is_some();
                if exists {
                    table.insert(id, document.as_slice()).map_err(unavailable)?;
                }
                exists
            };
            if !exists {
                txn.abort().map_err(unavailable)?;
                return Ok(None);
            }
            txn.commit().map_err(unavailable)?;
            Ok(Some(record))
        })
        .await
    }

    async fn delete_by_id(&self, id: WorkerId) -> Result<bool, StorageError> {
        self.run(move |db| {
            let txn = db.begin_write().map_err(unavailable)?;
            let removed = {
                let mut table = txn.open_table(WORKERS).map_err(unavailable)?;
                // Bound so the returned guard drops before `table`.
                let removed = table.remove(id).map_err(unavailable)?.is_some();
                removed
            };
            txn.commit().map_err(unavailable)?;
            Ok(removed)
        })
        .await
    }
}
