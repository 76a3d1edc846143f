//! In-memory backend built on [`DashMap`].
//!
//! Counter increments run while holding the shard lock of the counter's
//! entry, which makes each one an indivisible read-modify-write for every
//! task in the process. Nothing survives a restart.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use workforce_core::{WorkerId, WorkerRecord};

use crate::storage::error::StorageError;
use crate::storage::record_store::RecordStore;
use crate::storage::sequence::SequenceStore;

/// In-memory sequences and worker documents.
pub struct HashMapStorage {
    sequences: DashMap<String, i64>,
    workers: DashMap<WorkerId, WorkerRecord>,
}

impl HashMapStorage {
    /// Creates a new, empty `HashMapStorage`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sequences: DashMap::new(),
            workers: DashMap::new(),
        }
    }

    /// Current value of a sequence, `None` if it was never incremented.
    #[must_use]
    pub fn sequence_value(&self, name: &str) -> Option<i64> {
        self.sequences.get(name).map(|v| *v)
    }

    /// Number of stored workers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

impl Default for HashMapStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SequenceStore for HashMapStorage {
    async fn increment(&self, name: &str) -> Result<i64, StorageError> {
        let mut value = self.sequences.entry(name.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }
}

#[async_trait]
impl RecordStore for HashMapStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, record: &WorkerRecord) -> Result<(), StorageError> {
        match self.workers.entry(record.id) {
            Entry::Occupied(_) => Err(StorageError::Conflict { id: record.id }),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: WorkerId) -> Result<Option<WorkerRecord>, StorageError> {
        Ok(self.workers.get(&id).map(|r| r.clone()))
    }

    async fn find_all(&self) -> Result<Vec<WorkerRecord>, StorageError> {
        let mut records: Vec<WorkerRecord> =
            self.workers.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    async fn update(
        &self,
        id: WorkerId,
        record: &WorkerRecord,
    ) -> Result<Option<WorkerRecord>, StorageError> {
        match self.workers.get_mut(&id) {
            Some(mut existing) => {
                *existing = record.clone();
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: WorkerId) -> Result<bool, StorageError> {
        Ok(self.workers.remove(&id).is_some())
    }
}
