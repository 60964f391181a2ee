use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use signet_core::{Signature, UserId};

use super::AppState;
use super::extract::Query;
use super::multipart::FormData;
use super::schemas::{
    ErrorResponse, SignatureQuery, SignatureResponse, SignatureUploadForm,
    SignatureUploadResponse,
};
use super::urls::MediaUrls;
use crate::auth::identity::CallerIdentity;
use crate::error::ServerError;

fn signature_response(signature: &Signature, urls: &MediaUrls) -> SignatureResponse {
    SignatureResponse {
        id: signature.id.get(),
        user_id: signature.user_id.get(),
        file_url: urls.file(&signature.file),
        created_at: signature.created_at,
        updated_at: signature.updated_at,
    }
}

/// `POST /v1/signatures` -- upload or replace the caller's signature image.
#[utoipa::path(
    post,
    path = "/v1/signatures",
    tag = "Signatures",
    summary = "Upload signature",
    description = "Stores the caller's signature image. A second upload replaces the file of the existing signature and keeps its id. Only signers may upload.",
    request_body(content = SignatureUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Signature stored", body = SignatureUploadResponse),
        (status = 400, description = "Missing or empty file", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is not a signer", body = ErrorResponse),
    )
)]
pub async fn upload_signature(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
    urls: MediaUrls,
    mut form: FormData,
) -> Result<impl IntoResponse, ServerError> {
    let upload = form.take_file("file")?;

    let view = state
        .engine
        .upload_or_replace_signature(identity.requester(), upload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignatureUploadResponse {
            detail: "Signature uploaded successfully".into(),
            signature_id: view.signature.id.get(),
            signature_file_url: urls.file(&view.signature.file),
        }),
    ))
}

/// `GET /v1/signatures` -- list signatures, newest first.
#[utoipa::path(
    get,
    path = "/v1/signatures",
    tag = "Signatures",
    summary = "List signatures",
    description = "Lists every signature, or only the one owned by `user_id`.",
    params(SignatureQuery),
    responses(
        (status = 200, description = "Signatures", body = Vec<SignatureResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    )
)]
pub async fn list_signatures(
    State(state): State<AppState>,
    urls: MediaUrls,
    Query(query): Query<SignatureQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let signatures = state
        .engine
        .list_signatures(query.user_id.map(UserId::new))
        .await?;
    let body: Vec<SignatureResponse> = signatures
        .iter()
        .map(|s| signature_response(s, &urls))
        .collect();
    Ok(Json(body))
}
