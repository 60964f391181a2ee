use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use signet_core::DocumentId;
use signet_workflow::StartRound;

use super::AppState;
use super::extract::Path;
use super::multipart::FormData;
use super::schemas::{
    AssignSignaturesForm, AssignSignaturesResponse, AssignedSignatureResponse,
    DocumentResponse, DocumentUploadForm, ErrorResponse,
};
use super::urls::MediaUrls;
use crate::auth::identity::CallerIdentity;
use crate::error::ServerError;

/// Rounds start as drafts unless the form says otherwise.
fn is_draft(status: Option<&str>) -> bool {
    status.is_none_or(|s| s.trim().eq_ignore_ascii_case("draft"))
}

/// `POST /v1/documents` -- upload a source document.
#[utoipa::path(
    post,
    path = "/v1/documents",
    tag = "Documents",
    summary = "Upload document",
    description = "Stores a document owned by the caller.",
    request_body(content = DocumentUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document stored", body = DocumentResponse),
        (status = 400, description = "Missing title or file", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    )
)]
pub async fn create_document(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
    urls: MediaUrls,
    mut form: FormData,
) -> Result<impl IntoResponse, ServerError> {
    let upload = form.take_file("file")?;
    let title = form.text("title").unwrap_or_default();

    let document = state
        .engine
        .create_document(identity.requester(), title, upload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DocumentResponse {
            id: document.id.get(),
            title: document.title,
            file_url: urls.file(&document.file),
            owner_id: document.owner_id.get(),
            created_at: document.created_at,
            updated_at: document.updated_at,
        }),
    ))
}

/// `POST /v1/documents/{id}/signatures` -- open a signing round.
#[utoipa::path(
    post,
    path = "/v1/documents/{id}/signatures",
    tag = "Rounds",
    summary = "Assign signatures",
    description = "Opens a signing round over an edited copy of the document and creates one pending status per requested signature. Nothing is created if any signature id is unknown.",
    params(("id" = i64, Path, description = "Document id")),
    request_body(content = AssignSignaturesForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Round created", body = AssignSignaturesResponse),
        (status = 400, description = "Malformed form", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Document or signature not found", body = ErrorResponse),
    )
)]
pub async fn assign_signatures(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
    urls: MediaUrls,
    Path(id): Path<i64>,
    mut form: FormData,
) -> Result<impl IntoResponse, ServerError> {
    let signature_ids = form.signature_ids()?;
    let draft = is_draft(form.text("status"));
    let edited_file = form.take_file("file")?;

    let started = state
        .engine
        .start_signing_round(
            StartRound {
                document_id: DocumentId::new(id),
                signature_ids,
                edited_file,
                draft,
            },
            identity.requester(),
        )
        .await?;

    let assigned_signatures = started
        .assigned
        .iter()
        .map(|a| AssignedSignatureResponse {
            status_id: a.status.id.get(),
            signature_id: a.status.signature_id.get(),
            signature_file_url: urls.file(&a.signature_file),
            status: a.status.status,
        })
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(AssignSignaturesResponse {
            detail: "Signatures assigned successfully".into(),
            document_id: started.round.document_id.get(),
            document_signature_id: started.round.id.get(),
            signer_id: started.round.requester_id.get(),
            edited_file_url: urls.file(&started.round.edited_file),
            draft: started.round.draft,
            assigned_signatures,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::is_draft;

    #[test]
    fn draft_flag() {
        assert!(is_draft(None));
        assert!(is_draft(Some("draft")));
        assert!(is_draft(Some(" Draft ")));
        assert!(!is_draft(Some("final")));
        assert!(!is_draft(Some("")));
    }
}
