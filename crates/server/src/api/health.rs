use axum::Json;
use axum::response::IntoResponse;

use super::schemas::HealthResponse;

/// `GET /health` -- liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    summary = "Health check",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".into(),
    })
}
