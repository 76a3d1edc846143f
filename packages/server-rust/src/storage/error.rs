//! Error type shared by every storage backend.

use workforce_core::WorkerId;

/// Failure of a sequence or record store call.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing store could not be reached or rejected the operation.
    /// No partial write is observable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// An insert hit an id that is already stored.
    #[error("worker {id} already exists")]
    Conflict { id: WorkerId },
    /// Sequence names are keys and must be non-empty.
    #[error("sequence name must not be empty")]
    EmptySequenceName,
    /// A stored document could not be encoded or decoded.
    #[error("malformed worker document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Maps any backend error into [`StorageError::Unavailable`].
pub(crate) fn unavailable(err: impl std::fmt::Display) -> StorageError {
    StorageError::Unavailable(err.to_string())
}
