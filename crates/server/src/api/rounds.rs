use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::Deserialize;
use utoipa::IntoParams;

use signet_core::{Completion, RoundId, SignatureId, UserId, VerificationLog};

use super::AppState;
use super::extract::{Path, Query};
use super::schemas::{
    ApprovalQuery, ErrorResponse, MarkFinalResponse, RoundStatusResponse, RoundSummary,
    RoundsByApprovalResponse, RoundsForSignatureResponse, SignedRoundsResponse,
};
use super::urls::MediaUrls;
use crate::auth::identity::CallerIdentity;
use crate::error::ServerError;

/// `POST /v1/rounds/{id}/final` -- promote a draft round.
#[utoipa::path(
    post,
    path = "/v1/rounds/{id}/final",
    tag = "Rounds",
    summary = "Mark round final",
    description = "Moves a draft round opened by the caller to final. Rounds opened by someone else are reported as not found.",
    params(("id" = i64, Path, description = "Round (document signature) id")),
    responses(
        (status = 200, description = "Round is final", body = MarkFinalResponse),
        (status = 400, description = "Round is already final", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Round not found", body = ErrorResponse),
    )
)]
pub async fn mark_final(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServerError> {
    let round = state
        .engine
        .promote_to_final(RoundId::new(id), identity.requester())
        .await?;
    Ok(Json(MarkFinalResponse {
        detail: "DocumentSignature marked as final.".into(),
        document_signature_id: round.id.get(),
        draft: round.draft,
    }))
}

/// `GET /v1/rounds/{id}/status` -- per-signer statuses of a round.
#[utoipa::path(
    get,
    path = "/v1/rounds/{id}/status",
    tag = "Rounds",
    summary = "Round status",
    params(("id" = i64, Path, description = "Round (document signature) id")),
    responses(
        (status = 200, description = "Round status", body = RoundStatusResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Round not found", body = ErrorResponse),
    )
)]
pub async fn round_status(
    State(state): State<AppState>,
    urls: MediaUrls,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServerError> {
    let report = state.engine.round_status(RoundId::new(id)).await?;
    Ok(Json(RoundStatusResponse {
        document_signature_id: report.round.id.get(),
        edited_file_url: urls.file(&report.round.edited_file),
        draft: report.round.draft,
        statuses: report.statuses,
    }))
}

/// `GET /v1/rounds/{id}/completion` -- aggregate approval counts.
#[utoipa::path(
    get,
    path = "/v1/rounds/{id}/completion",
    tag = "Rounds",
    summary = "Round completion",
    description = "A round is fully approved when it is final, has at least one status, and every status is approved.",
    params(("id" = i64, Path, description = "Round (document signature) id")),
    responses(
        (status = 200, description = "Completion", body = Completion),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Round not found", body = ErrorResponse),
    )
)]
pub async fn completion(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServerError> {
    let completion = state.engine.compute_completion(RoundId::new(id)).await?;
    Ok(Json(completion))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompletionBatchQuery {
    /// Comma-separated round ids.
    pub ids: String,
}

/// `GET /v1/rounds/completion?ids=` -- completion of several rounds.
#[utoipa::path(
    get,
    path = "/v1/rounds/completion",
    tag = "Rounds",
    summary = "Batch completion",
    description = "Completion for each requested round, in request order. Fails if any id is unknown.",
    params(CompletionBatchQuery),
    responses(
        (status = 200, description = "Completions", body = Vec<Completion>),
        (status = 400, description = "Malformed id list", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Round not found", body = ErrorResponse),
    )
)]
pub async fn completions(
    State(state): State<AppState>,
    Query(query): Query<CompletionBatchQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let ids = query
        .ids
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<i64>()
                .map(RoundId::new)
                .map_err(|_| ServerError::BadRequest(format!("invalid round id: {v}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let completions = state.engine.compute_completions(&ids).await?;
    Ok(Json(completions))
}

/// `GET /v1/rounds/{id}/logs` -- decisions recorded on a round.
#[utoipa::path(
    get,
    path = "/v1/rounds/{id}/logs",
    tag = "Rounds",
    summary = "Decision log",
    params(("id" = i64, Path, description = "Round (document signature) id")),
    responses(
        (status = 200, description = "Log entries, oldest first", body = Vec<VerificationLog>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Round not found", body = ErrorResponse),
    )
)]
pub async fn decision_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServerError> {
    let log = state.engine.decision_log(RoundId::new(id)).await?;
    Ok(Json(log))
}

/// `GET /v1/rounds?approved=` -- final rounds split by approval.
#[utoipa::path(
    get,
    path = "/v1/rounds",
    tag = "Rounds",
    summary = "Rounds by approval",
    description = "Final rounds that are fully approved (`approved=true`, the default) or not. Drafts are never listed.",
    params(ApprovalQuery),
    responses(
        (status = 200, description = "Rounds", body = RoundsByApprovalResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    )
)]
pub async fn list_rounds(
    State(state): State<AppState>,
    urls: MediaUrls,
    Query(query): Query<ApprovalQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let approved = query.wants_approved();
    let rounds = state.engine.list_rounds_by_approval(approved).await?;
    Ok(Json(RoundsByApprovalResponse {
        status: "success".into(),
        approved,
        documents: RoundSummary::list(&rounds, &urls),
    }))
}

/// `GET /v1/signatures/{id}/rounds` -- final rounds requesting a signature.
#[utoipa::path(
    get,
    path = "/v1/signatures/{id}/rounds",
    tag = "Rounds",
    summary = "Rounds for signature",
    params(("id" = i64, Path, description = "Signature id")),
    responses(
        (status = 200, description = "Rounds, newest first", body = RoundsForSignatureResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Signature not found", body = ErrorResponse),
    )
)]
pub async fn rounds_for_signature(
    State(state): State<AppState>,
    urls: MediaUrls,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServerError> {
    let rounds = state
        .engine
        .list_rounds_for_signature(SignatureId::new(id))
        .await?;
    Ok(Json(RoundsForSignatureResponse {
        status: "success".into(),
        document_signatures: RoundSummary::list(&rounds, &urls),
    }))
}

/// `GET /v1/users/{id}/signed-rounds` -- fully approved rounds a user opened.
#[utoipa::path(
    get,
    path = "/v1/users/{id}/signed-rounds",
    tag = "Reporting",
    summary = "Signed rounds for user",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Rounds", body = SignedRoundsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn signed_rounds(
    State(state): State<AppState>,
    urls: MediaUrls,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServerError> {
    let rounds = state.engine.signed_rounds_for_user(UserId::new(id)).await?;
    Ok(Json(SignedRoundsResponse {
        status: "success".into(),
        signed_documents: RoundSummary::list(&rounds, &urls),
    }))
}
