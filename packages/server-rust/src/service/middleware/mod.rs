//! Tower middleware layers for the operation pipeline.
//!
//! - [`load_shed`]: semaphore-based admission control
//! - [`metrics`]: per-operation span, counter and latency histogram
//! - [`pipeline`]: composes the layers into one cloneable service

pub mod load_shed;
pub mod metrics;
pub mod pipeline;

pub use load_shed::LoadShedLayer;
pub use metrics::MetricsLayer;
pub use pipeline::{build_operation_pipeline, OperationService};
