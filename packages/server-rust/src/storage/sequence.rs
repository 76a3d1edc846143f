//! Named monotonic sequences used to allocate worker ids.
//!
//! [`SequenceStore`] is the backend primitive: one atomic upsert-increment per
//! call. Atomicity lives in the backend (a DashMap entry lock, a redb write
//! transaction, or a single Postgres statement), never in a process-local
//! mutex, so allocation stays unique across server instances that share a
//! backend. [`SequenceAllocator`] is the thin front the pipeline talks to.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::error::StorageError;

/// Durable counter primitive.
///
/// Used as `Arc<dyn SequenceStore>`.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Atomically increments the counter `name` by one and returns the new value.
    ///
    /// A missing counter is created at 0 first, so the first call returns 1.
    async fn increment(&self, name: &str) -> Result<i64, StorageError>;
}

/// Allocates strictly increasing values from named sequences.
#[derive(Clone)]
pub struct SequenceAllocator {
    store: Arc<dyn SequenceStore>,
}

impl SequenceAllocator {
    #[must_use]
    pub fn new(store: Arc<dyn SequenceStore>) -> Self {
        Self { store }
    }

    /// Returns the next value of `counter_name`.
    ///
    /// # Errors
    ///
    /// [`StorageError::EmptySequenceName`] for an empty name (the store is not
    /// touched), otherwise whatever the backend reports.
    pub async fn next(&self, counter_name: &str) -> Result<i64, StorageError> {
        if counter_name.is_empty() {
            return Err(StorageError::EmptySequenceName);
        }
        let value = self.store.increment(counter_name).await?;
        debug!(sequence = counter_name, value, "sequence value allocated");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::storage::engines::HashMapStorage;

    fn allocator() -> (SequenceAllocator, Arc<HashMapStorage>) {
        let storage = Arc::new(HashMapStorage::new());
        (SequenceAllocator::new(storage.clone()), storage)
    }

    #[tokio::test]
    async fn first_allocation_returns_one() {
        let (allocator, storage) = allocator();
        assert_eq!(storage.sequence_value("workers_sequence"), None);
        assert_eq!(allocator.next("workers_sequence").await.unwrap(), 1);
        assert_eq!(allocator.next("workers_sequence").await.unwrap(), 2);
        assert_eq!(storage.sequence_value("workers_sequence"), Some(2));
    }

    #[tokio::test]
    async fn sequences_are_independent() {
        let (allocator, _) = allocator();
        assert_eq!(allocator.next("a").await.unwrap(), 1);
        assert_eq!(allocator.next("a").await.unwrap(), 2);
        assert_eq!(allocator.next("b").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_name_is_rejected_without_touching_store() {
        let (allocator, storage) = allocator();
        let err = allocator.next("").await.unwrap_err();
        assert!(matches!(err, StorageError::EmptySequenceName));
        assert_eq!(storage.sequence_value(""), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_allocations_are_distinct_and_dense() {
        const N: i64 = 200;
        let (allocator, _) = allocator();

        let handles: Vec<_> = (0..N)
            .map(|_| {
                let allocator = allocator.clone();
                tokio::spawn(async move { allocator.next("x").await.unwrap() })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            assert!(seen.insert(handle.await.unwrap()), "duplicate value");
        }
        assert_eq!(seen.len(), usize::try_from(N).unwrap());
        assert_eq!(seen.iter().copied().max(), Some(N));
        assert_eq!(seen.iter().copied().min(), Some(1));
    }

    struct DownStore;

    #[async_trait]
    impl SequenceStore for DownStore {
        async fn increment(&self, _name: &str) -> Result<i64, StorageError> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn backend_failure_surfaces_as_unavailable() {
        let allocator = SequenceAllocator::new(Arc::new(DownStore));
        let err = allocator.next("workers_sequence").await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
