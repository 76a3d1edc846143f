//! Composes the middleware layers around the registration service.

use tower::util::BoxCloneSyncService;
use tower::ServiceBuilder;

use super::load_shed::LoadShedLayer;
use super::metrics::MetricsLayer;
use crate::service::config::ServiceConfig;
use crate::service::operation::{Operation, OperationError, OperationResponse};
use crate::service::registration::RegistrationService;

/// The type-erased operation stack handlers call into.
pub type OperationService = BoxCloneSyncService<Operation, OperationResponse, OperationError>;

/// Wraps `service` with the middleware stack.
///
/// Layer order (outermost to innermost):
/// 1. `LoadShedLayer`: reject when overloaded, before any work or metrics
/// 2. `MetricsLayer`: span, counter and latency for admitted operations
#[must_use]
pub fn build_operation_pipeline(
    service: RegistrationService,
    config: &ServiceConfig,
) -> OperationService {
    let stack = ServiceBuilder::new()
        .layer(LoadShedLayer::new(config.max_concurrent_operations))
        .layer(MetricsLayer)
        .service(service);
    BoxCloneSyncService::new(stack)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower::ServiceExt;
    use workforce_core::{IdentityType, WorkerInput, WorkerStatus};

    use super::*;
    use crate::publish::{EventPublisher, InMemoryBroker, PublisherConfig};
    use crate::service::registration::RegistrationPipeline;
    use crate::storage::engines::HashMapStorage;
    use crate::storage::SequenceAllocator;

    fn service() -> RegistrationService {
        let storage = Arc::new(HashMapStorage::new());
        let publisher = EventPublisher::new(
            Arc::new(InMemoryBroker::new(8)),
            &PublisherConfig::default(),
        );
        let pipeline = RegistrationPipeline::new(
            SequenceAllocator::new(storage.clone()),
            storage,
            publisher,
            &ServiceConfig::default(),
        );
        RegistrationService::new(Arc::new(pipeline))
    }

    #[tokio::test]
    async fn pipeline_routes_through_to_registration() {
        let pipeline = build_operation_pipeline(service(), &ServiceConfig::default());

        let input = WorkerInput {
            name: "Gus".to_string(),
            age: 33,
            phone_number: "555 0101 222".to_string(),
            identity_type: IdentityType::NationalId,
            identity_data: "N-5".to_string(),
            address: "8 Elm Row".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            status: WorkerStatus::OnDuty,
        };
        let resp = pipeline
            .clone()
            .oneshot(Operation::Register { input })
            .await
            .unwrap();
        assert!(matches!(resp, OperationResponse::Worker(ref r) if r.id == 1));

        let err = pipeline
            .oneshot(Operation::GetById { id: 99 })
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::NotFound { id: 99 }));
    }
}
