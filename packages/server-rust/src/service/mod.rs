//! Worker registration service.
//!
//! 1. **Operations** (`operation`): the request/response/error vocabulary
//! 2. **Registration** (`registration`): the allocate, persist, publish pipeline
//! 3. **Middleware** (`middleware`): tower layers (load shedding, metrics)

pub mod config;
pub mod middleware;
pub mod operation;
pub mod registration;

pub use config::ServiceConfig;
pub use middleware::{build_operation_pipeline, OperationService};
pub use operation::{Operation, OperationError, OperationResponse};
pub use registration::{RegistrationPipeline, RegistrationService};
