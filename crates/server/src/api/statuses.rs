use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use signet_core::StatusId;
use signet_workflow::DecisionOutcome;

use super::AppState;
use super::extract::{JsonBody, Path};
use super::schemas::{DecisionRequest, DecisionResponse, ErrorResponse};
use crate::auth::identity::CallerIdentity;
use crate::error::ServerError;

async fn decide(
    state: &AppState,
    identity: &CallerIdentity,
    status_id: i64,
    action: &str,
) -> Result<Json<DecisionResponse>, ServerError> {
    let DecisionOutcome { status, .. } = state
        .engine
        .record_decision(StatusId::new(status_id), action, identity.requester())
        .await?;
    Ok(Json(DecisionResponse {
        detail: format!("Signature status updated to {}.", status.status),
        document_signature_status_id: status.id.get(),
        document_signature_id: status.round_id.get(),
        signature_id: status.signature_id.get(),
        status: status.status,
    }))
}

/// `PATCH /v1/statuses/{id}/{action}` -- approve or reject, action in the path.
#[utoipa::path(
    patch,
    path = "/v1/statuses/{id}/{action}",
    tag = "Decisions",
    summary = "Record decision",
    description = "Records the caller's decision on a status row of their own signature.",
    params(
        ("id" = i64, Path, description = "Status id"),
        ("action" = String, Path, description = "`approve` or `reject`"),
    ),
    responses(
        (status = 200, description = "Status updated", body = DecisionResponse),
        (status = 400, description = "Invalid action", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Status belongs to another signer", body = ErrorResponse),
        (status = 404, description = "Status not found", body = ErrorResponse),
    )
)]
pub async fn decide_from_path(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
    Path((id, action)): Path<(i64, String)>,
) -> Result<impl IntoResponse, ServerError> {
    decide(&state, &identity, id, &action).await
}

/// `PATCH /v1/statuses/{id}` -- approve or reject, action in the JSON body.
#[utoipa::path(
    patch,
    path = "/v1/statuses/{id}",
    tag = "Decisions",
    summary = "Record decision (body)",
    params(("id" = i64, Path, description = "Status id")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Status updated", body = DecisionResponse),
        (status = 400, description = "Invalid action", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Status belongs to another signer", body = ErrorResponse),
        (status = 404, description = "Status not found", body = ErrorResponse),
    )
)]
pub async fn decide_from_body(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
    Path(id): Path<i64>,
    JsonBody(body): JsonBody<DecisionRequest>,
) -> Result<impl IntoResponse, ServerError> {
    decide(&state, &identity, id, &body.action).await
}
