use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use super::AppState;
use super::schemas::{ErrorResponse, OverviewResponse};
use crate::error::ServerError;

/// `GET /v1/overview` -- dashboard counters.
#[utoipa::path(
    get,
    path = "/v1/overview",
    tag = "Reporting",
    summary = "Overview",
    description = "`total_documents` is the number of final rounds that are fully signed or still pending.",
    responses(
        (status = 200, description = "Counters", body = OverviewResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    )
)]
pub async fn overview(State(state): State<AppState>) -> Result<impl IntoResponse, ServerError> {
    let overview = state.engine.overview().await?;
    Ok(Json(OverviewResponse {
        total_documents: overview.total_documents,
        fully_signed: overview.fully_signed,
        pending: overview.pending,
        users: overview.users,
    }))
}
