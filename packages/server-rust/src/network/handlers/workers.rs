//! Worker API endpoints under `/api/worker`.
//!
//! Inputs are validated here, before they reach the registration service.
//! Every handler dispatches one [`Operation`] through the middleware stack.

use axum::extract::{FromRequest, Path, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tower::ServiceExt;
use tracing::{error, warn};
use workforce_core::{validate_draft, WorkerDraft, WorkerId, WorkerInput, WorkerRecord};

use super::AppState;
use crate::service::{Operation, OperationError, OperationResponse};

impl IntoResponse for OperationError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(errors) => {
                let fields = errors.to_field_map();
                warn!(?fields, "validation failed");
                return (StatusCode::BAD_REQUEST, Json(fields)).into_response();
            }
            Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::StorageUnavailable(_) | Self::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
            Self::IdSpaceExhausted { .. } | Self::Internal(_) => {
                error!(error = %self, "request failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal error" })),
                )
                    .into_response();
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// A worker body that parsed and passed field validation.
///
/// Missing and `null` fields are reported per field like any other violation.
/// Only bodies that are not JSON objects of the right shape are rejected as
/// malformed.
pub struct WorkerPayload(pub WorkerInput);

impl<S> FromRequest<S> for WorkerPayload
where
    S: Send + Sync,
{
    type Rejection = OperationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(draft) = Json::<WorkerDraft>::from_request(req, state)
            .await
            .map_err(|rejection| OperationError::MalformedBody(rejection.body_text()))?;
        Ok(Self(validate_draft(draft)?))
    }
}

async fn dispatch(state: &AppState, op: Operation) -> Result<OperationResponse, OperationError> {
    state.operations.clone().oneshot(op).await
}

fn unexpected(resp: &OperationResponse) -> OperationError {
    OperationError::Internal(anyhow::anyhow!("unexpected operation response: {resp:?}"))
}

async fn worker(state: &AppState, op: Operation) -> Result<WorkerRecord, OperationError> {
    match dispatch(state, op).await? {
        OperationResponse::Worker(record) => Ok(record),
        other => Err(unexpected(&other)),
    }
}

/// `PUT /api/worker/registration`
pub async fn register_worker_handler(
    State(state): State<AppState>,
    WorkerPayload(input): WorkerPayload,
) -> Result<(StatusCode, Json<WorkerRecord>), OperationError> {
    let record = worker(&state, Operation::Register { input }).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/worker/{id}`
pub async fn get_worker_handler(
    State(state): State<AppState>,
    Path(id): Path<WorkerId>,
) -> Result<Json<WorkerRecord>, OperationError> {
    worker(&state, Operation::GetById { id }).await.map(Json)
}

/// `GET /api/worker/all`
pub async fn get_all_workers_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<WorkerRecord>>, OperationError> {
    match dispatch(&state, Operation::GetAll).await? {
        OperationResponse::Workers(records) => Ok(Json(records)),
        other => Err(unexpected(&other)),
    }
}

/// `PUT /api/worker/{id}`
pub async fn update_worker_handler(
    State(state): State<AppState>,
    Path(id): Path<WorkerId>,
    WorkerPayload(input): WorkerPayload,
) -> Result<Json<WorkerRecord>, OperationError> {
    worker(&state, Operation::UpdateById { id, input })
        .await
        .map(Json)
}

/// `DELETE /api/worker/{id}`: 204 when removed, 404 otherwise.
pub async fn delete_worker_handler(
    State(state): State<AppState>,
    Path(id): Path<WorkerId>,
) -> Result<StatusCode, OperationError> {
    match dispatch(&state, Operation::DeleteById { id }).await? {
        OperationResponse::Deleted(true) => Ok(StatusCode::NO_CONTENT),
        OperationResponse::Deleted(false) => Err(OperationError::NotFound { id }),
        other => Err(unexpected(&other)),
    }
}
