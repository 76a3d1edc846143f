//! Keyed storage for worker documents.

use async_trait::async_trait;
use workforce_core::{WorkerId, WorkerRecord};

use super::error::StorageError;

/// Durable keyed storage for [`WorkerRecord`]s.
///
/// Every call completes (or fails) before returning; callers await
/// persistence before acting on it. Used as `Arc<dyn RecordStore>`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend label for logs and the health endpoint.
    fn backend_name(&self) -> &'static str;

    /// Stores a new record under `record.id`.
    ///
    /// Fails with [`StorageError::Conflict`] if the id is already present;
    /// the existing record is left untouched.
    async fn insert(&self, record: &WorkerRecord) -> Result<(), StorageError>;

    /// Loads a record by id.
    async fn find_by_id(&self, id: WorkerId) -> Result<Option<WorkerRecord>, StorageError>;

    /// Point-in-time snapshot of all records, ordered by ascending id.
    async fn find_all(&self) -> Result<Vec<WorkerRecord>, StorageError>;

    /// Replaces the record stored under `id`.
    ///
    /// Returns `None` (and writes nothing) when no record with that id exists.
    async fn update(
        &self,
        id: WorkerId,
        record: &WorkerRecord,
    ) -> Result<Option<WorkerRecord>, StorageError>;

    /// Deletes a record. Returns whether one was removed.
    async fn delete_by_id(&self, id: WorkerId) -> Result<bool, StorageError>;
}
