//! HTTP handlers and the state they share.

pub mod health;
pub mod workers;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use workers::{
    delete_worker_handler, get_all_workers_handler, get_worker_handler, register_worker_handler,
    update_worker_handler,
};

use std::sync::Arc;
use std::time::Instant;

use super::ShutdownController;
use crate::service::OperationService;

/// Shared application state passed to all axum handlers via `State` extraction.
#[derive(Clone)]
pub struct AppState {
    /// The middleware-wrapped registration service.
    pub operations: OperationService,
    pub shutdown: Arc<ShutdownController>,
    /// Storage backend label, reported by `/health`.
    pub backend: &'static str,
    /// Process start, for uptime.
    pub start_time: Instant,
}
