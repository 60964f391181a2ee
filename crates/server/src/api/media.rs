use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use super::AppState;
use super::extract::Path;
use super::schemas::ErrorResponse;
use crate::error::ServerError;

/// `GET /media/{key}` -- stream a stored file.
#[utoipa::path(
    get,
    path = "/media/{key}",
    tag = "Files",
    summary = "Download file",
    params(("key" = String, Path, description = "Blob key as returned in file URLs")),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = ErrorResponse),
    )
)]
pub async fn serve_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let blob = state.engine.open_file(&key).await?;
    let filename: String = blob
        .metadata
        .filename
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && *c != '"' && *c != '\\')
        .collect();
    let disposition = format!("inline; filename=\"{filename}\"");
    Ok((
        [
            (header::CONTENT_TYPE, blob.metadata.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        blob.data,
    ))
}
