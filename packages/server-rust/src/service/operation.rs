//! Operations accepted by the registration service and their outcomes.

use workforce_core::{ValidationErrors, WorkerId, WorkerInput, WorkerRecord};

use crate::storage::StorageError;

/// A request to the registration service.
#[derive(Debug, Clone)]
pub enum Operation {
    Register { input: WorkerInput },
    GetById { id: WorkerId },
    GetAll,
    UpdateById { id: WorkerId, input: WorkerInput },
    DeleteById { id: WorkerId },
}

impl Operation {
    /// Stable label for spans and metrics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::GetById { .. } => "get_by_id",
            Self::GetAll => "get_all",
            Self::UpdateById { .. } => "update_by_id",
            Self::DeleteById { .. } => "delete_by_id",
        }
    }
}

/// Successful result of an [`Operation`].
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResponse {
    Worker(WorkerRecord),
    Workers(Vec<WorkerRecord>),
    /// Whether a record was removed.
    Deleted(bool),
}

/// Errors returned by operation handlers.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("invalid worker: {0}")]
    Validation(#[from] ValidationErrors),
    /// The request body is not a readable worker payload.
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("worker {id} already exists")]
    Conflict { id: WorkerId },
    #[error("worker {id} not found")]
    NotFound { id: WorkerId },
    #[error("sequence value {value} does not fit a worker id")]
    IdSpaceExhausted { value: i64 },
    #[error("server overloaded, try again later")]
    Overloaded,
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl OperationError {
    /// Stable label for the `outcome` metric dimension.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::MalformedBody(_) => "malformed_body",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::Conflict { .. } => "conflict",
            Self::NotFound { .. } => "not_found",
            Self::IdSpaceExhausted { .. } => "id_space_exhausted",
            Self::Overloaded => "overloaded",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<StorageError> for OperationError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(reason) => Self::StorageUnavailable(reason),
            StorageError::Conflict { id } => Self::Conflict { id },
            other @ (StorageError::EmptySequenceName | StorageError::Malformed(_)) => {
                Self::Internal(other.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_domain_errors() {
        let err = OperationError::from(StorageError::Unavailable("down".to_string()));
        assert!(matches!(err, OperationError::StorageUnavailable(_)));

        let err = OperationError::from(StorageError::Conflict { id: 3 });
        assert!(matches!(err, OperationError::Conflict { id: 3 }));

        let err = OperationError::from(StorageError::EmptySequenceName);
        assert_eq!(err.kind(), "internal");
    }

    #[test]
    fn operation_names_are_snake_case() {
        assert_eq!(Operation::GetAll.name(), "get_all");
        assert_eq!(Operation::DeleteById { id: 1 }.name(), "delete_by_id");
    }
}
