//! Network module with deferred startup lifecycle.
//!
//! `new()` assembles shared state, `start()` binds the TCP listener, and
//! `serve()` accepts connections until the shutdown future resolves.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, put};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::NetworkConfig;
use super::handlers::{
    delete_worker_handler, get_all_workers_handler, get_worker_handler, health_handler,
    liveness_handler, readiness_handler, register_worker_handler, update_worker_handler, AppState,
};
use super::middleware::{build_http_layers, track_in_flight};
use super::shutdown::ShutdownController;
use crate::service::OperationService;

/// Assembles the axum router with all routes and middleware.
///
/// Routes:
/// - `GET /health`, `GET /health/live`, `GET /health/ready`
/// - `PUT /api/worker/registration`
/// - `GET /api/worker/all`
/// - `GET|PUT|DELETE /api/worker/{id}`
///
/// Only the worker API counts towards in-flight requests, so probes keep
/// answering while the server drains.
pub fn build_router(state: AppState, config: &NetworkConfig) -> Router {
    let api = Router::new()
        .route("/api/worker/registration", put(register_worker_handler))
        .route("/api/worker/all", get(get_all_workers_handler))
        .route(
            "/api/worker/{id}",
            get(get_worker_handler)
                .put(update_worker_handler)
                .delete(delete_worker_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state.shutdown),
            track_in_flight,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .merge(api)
        .layer(build_http_layers(config))
        .with_state(state)
}

/// Owns the HTTP listener lifecycle.
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    state: AppState,
}

impl NetworkModule {
    /// Creates the module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, operations: OperationService, backend: &'static str) -> Self {
        let state = AppState {
            operations,
            shutdown: Arc::new(ShutdownController::new()),
            backend,
            start_time: Instant::now(),
        };
        Self {
            config,
            listener: None,
            state,
        }
    }

    /// Shared handle for triggering shutdown or reading health.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.state.shutdown)
    }

    /// Binds the configured address and returns the bound port.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!(host = %self.config.host, port, "listener bound");

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until `shutdown` resolves, then drains.
    ///
    /// After the signal the health state moves to `Draining`, new API
    /// requests get 503, and in-flight ones get up to the drain timeout to
    /// finish.
    ///
    /// # Errors
    ///
    /// Fails if `start()` was not called or the server hits a fatal I/O error.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let Some(listener) = self.listener else {
            anyhow::bail!("start() must be called before serve()");
        };
        let controller = Arc::clone(&self.state.shutdown);
        let router = build_router(self.state, &self.config);

        controller.set_ready();
        info!("serving HTTP");

        let signal_controller = Arc::clone(&controller);
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                signal_controller.trigger_shutdown();
            })
            .await?;

        if controller.wait_for_drain(self.config.drain_timeout).await {
            info!("all requests drained");
        } else {
            warn!(
                in_flight = controller.in_flight_count(),
                "drain timeout expired with requests in flight"
            );
        }
        Ok(())
    }
}
