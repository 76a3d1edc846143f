//! Wires storage, broker, pipeline and HTTP surface together.

use std::sync::Arc;

use tracing::info;

use crate::config::WorkforceConfig;
use crate::network::NetworkModule;
use crate::publish::{build_broker, EventPublisher};
use crate::service::{build_operation_pipeline, RegistrationPipeline, RegistrationService};
use crate::storage::{SequenceAllocator, StorageFactory};

/// Opens the backend and broker and returns an unbound [`NetworkModule`].
///
/// # Errors
///
/// Fails if the storage backend cannot be opened or the broker cannot be
/// built.
pub async fn build_server(config: WorkforceConfig) -> anyhow::Result<NetworkModule> {
    let storage = StorageFactory::new(config.storage).create().await?;
    let backend = storage.records.backend_name();

    let broker = build_broker(&config.publisher)?;
    info!(broker = broker.name(), topic = %config.publisher.topic, "event broker ready");
    let publisher = EventPublisher::new(broker, &config.publisher);

    let pipeline = RegistrationPipeline::new(
        SequenceAllocator::new(storage.sequences),
        storage.records,
        publisher,
        &config.service,
    );
    let operations =
        build_operation_pipeline(RegistrationService::new(Arc::new(pipeline)), &config.service);

    Ok(NetworkModule::new(config.network, operations, backend))
}
