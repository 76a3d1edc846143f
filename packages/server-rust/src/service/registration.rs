//! The registration pipeline: allocate an id, persist, then publish.
//!
//! `register` moves through `IdAllocated -> Persisted -> PublishRequested`.
//! Allocation and persistence failures abort the call and surface to the
//! caller. Publication runs on a detached task and never affects the result.
//! An id whose insert failed is not reclaimed, so gaps in the id sequence are
//! expected.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::Utc;
use tower::Service;
use tracing::{info, warn};
use workforce_core::{WorkerId, WorkerInput, WorkerRecord};

use super::config::ServiceConfig;
use super::operation::{Operation, OperationError, OperationResponse};
use crate::publish::EventPublisher;
use crate::storage::{RecordStore, SequenceAllocator};

/// Counter incremented for every persisted registration.
pub const REGISTRATIONS: &str = "workforce_registrations_total";

/// Orchestrates id allocation, persistence and event publication.
pub struct RegistrationPipeline {
    allocator: SequenceAllocator,
    records: Arc<dyn RecordStore>,
    publisher: EventPublisher,
    sequence_name: String,
}

impl RegistrationPipeline {
    #[must_use]
    pub fn new(
        allocator: SequenceAllocator,
        records: Arc<dyn RecordStore>,
        publisher: EventPublisher,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            allocator,
            records,
            publisher,
            sequence_name: config.sequence_name.clone(),
        }
    }

    /// Registers a validated worker and returns the persisted record.
    ///
    /// # Errors
    ///
    /// - [`OperationError::StorageUnavailable`] if allocation or insert fails;
    ///   no record is created and no event is published
    /// - [`OperationError::IdSpaceExhausted`] once the counter outgrows `i32`
    /// - [`OperationError::Conflict`] if the allocated id is already stored
    pub async fn register(&self, input: WorkerInput) -> Result<WorkerRecord, OperationError> {
        let value = self.allocator.next(&self.sequence_name).await?;
        let id = WorkerId::try_from(value)
            .map_err(|_| OperationError::IdSpaceExhausted { value })?;

        let record = WorkerRecord::new(id, input, Utc::now());
        if let Err(err) = self.records.insert(&record).await {
            warn!(id, error = %err, "insert failed after id allocation");
            return Err(err.into());
        }
        metrics::counter!(REGISTRATIONS).increment(1);
        info!(id, "worker registered");

        self.publisher.publish_registration(&record);
        Ok(record)
    }

    /// # Errors
    ///
    /// [`OperationError::NotFound`] if no record has `id`.
    pub async fn get_by_id(&self, id: WorkerId) -> Result<WorkerRecord, OperationError> {
        self.records
            .find_by_id(id)
            .await?
            .ok_or(OperationError::NotFound { id })
    }

    /// All records in ascending id order.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn get_all(&self) -> Result<Vec<WorkerRecord>, OperationError> {
        Ok(self.records.find_all().await?)
    }

    /// Changes name, phone number and address of an existing worker.
    ///
    /// `id` and `timestamp` are kept and no event is published.
    ///
    /// # Errors
    ///
    /// [`OperationError::NotFound`] if no record has `id`, including when it
    /// is deleted between the read and the write.
    pub async fn update_by_id(
        &self,
        id: WorkerId,
        input: &WorkerInput,
    ) -> Result<WorkerRecord, OperationError> {
        let mut record = self.get_by_id(id).await?;
        record.apply_update(input);
        let updated = self
            .records
            .update(id, &record)
            .await?
            .ok_or(OperationError::NotFound { id })?;
        info!(id, "worker updated");
        Ok(updated)
    }

    /// Returns whether a record was removed.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn delete_by_id(&self, id: WorkerId) -> Result<bool, OperationError> {
        let removed = self.records.delete_by_id(id).await?;
        if removed {
            info!(id, "worker deleted");
        }
        Ok(removed)
    }

    async fn execute(&self, op: Operation) -> Result<OperationResponse, OperationError> {
        match op {
            Operation::Register { input } => {
                self.register(input).await.map(OperationResponse::Worker)
            }
            Operation::GetById { id } => self.get_by_id(id).await.map(OperationResponse::Worker),
            Operation::GetAll => self.get_all().await.map(OperationResponse::Workers),
            Operation::UpdateById { id, input } => self
                .update_by_id(id, &input)
                .await
                .map(OperationResponse::Worker),
            Operation::DeleteById { id } => {
                self.delete_by_id(id).await.map(OperationResponse::Deleted)
            }
        }
    }
}

/// [`RegistrationPipeline`] as the innermost `tower::Service<Operation>`.
#[derive(Clone)]
pub struct RegistrationService {
    pipeline: Arc<RegistrationPipeline>,
}

impl RegistrationService {
    #[must_use]
    pub fn new(pipeline: Arc<RegistrationPipeline>) -> Self {
        Self { pipeline }
    }
}

impl Service<Operation> for RegistrationService {
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = Pin<Box<dyn Future<Output = Result<OperationResponse, OperationError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let pipeline = Arc::clone(&self.pipeline);
        Box::pin(async move { pipeline.execute(op).await })
    }
}
