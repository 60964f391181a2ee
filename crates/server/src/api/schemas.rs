use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use signet_core::{ApprovalStatus, Round, StatusDetail};

use super::urls::MediaUrls;

/// Error body returned for every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "document 12 not found")]
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

/// Multipart body for `POST /v1/signatures`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct SignatureUploadForm {
    /// Signature image.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignatureUploadResponse {
    #[schema(example = "Signature uploaded successfully")]
    pub detail: String,
    pub signature_id: i64,
    pub signature_file_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignatureResponse {
    pub id: i64,
    pub user_id: i64,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SignatureQuery {
    /// Only return the signature owned by this user.
    pub user_id: Option<i64>,
}

/// Multipart body for `POST /v1/documents`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct DocumentUploadForm {
    pub title: String,
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponse {
    pub id: i64,
    pub title: String,
    pub file_url: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Multipart body for `POST /v1/documents/{id}/signatures`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct AssignSignaturesForm {
    /// Signature id; repeat the field or send a comma-separated list.
    pub signature_id: Vec<String>,
    /// Edited document snapshot.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// `draft` keeps the round out of reporting. Any other value makes it
    /// final. Defaults to `draft`.
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignedSignatureResponse {
    pub status_id: i64,
    pub signature_id: i64,
    pub signature_file_url: String,
    pub status: ApprovalStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignSignaturesResponse {
    #[schema(example = "Signatures assigned successfully")]
    pub detail: String,
    pub document_id: i64,
    pub document_signature_id: i64,
    pub signer_id: i64,
    pub edited_file_url: String,
    pub draft: bool,
    pub assigned_signatures: Vec<AssignedSignatureResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkFinalResponse {
    #[schema(example = "DocumentSignature marked as final.")]
    pub detail: String,
    pub document_signature_id: i64,
    pub draft: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoundStatusResponse {
    pub document_signature_id: i64,
    pub edited_file_url: String,
    pub draft: bool,
    pub statuses: Vec<StatusDetail>,
}

/// A round as shown in list endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoundSummary {
    pub document_signature_id: i64,
    pub edited_file_url: String,
    pub requester_id: i64,
    pub document_id: i64,
    pub draft: bool,
    pub created_at: DateTime<Utc>,
}

impl RoundSummary {
    pub fn new(round: &Round, urls: &MediaUrls) -> Self {
        Self {
            document_signature_id: round.id.get(),
            edited_file_url: urls.file(&round.edited_file),
            requester_id: round.requester_id.get(),
            document_id: round.document_id.get(),
            draft: round.draft,
            created_at: round.created_at,
        }
    }

    pub fn list(rounds: &[Round], urls: &MediaUrls) -> Vec<Self> {
        rounds.iter().map(|r| Self::new(r, urls)).collect()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApprovalQuery {
    /// `true` (default) for fully approved rounds; any other value lists the rest.
    pub approved: Option<String>,
}

impl ApprovalQuery {
    pub fn wants_approved(&self) -> bool {
        self.approved
            .as_deref()
            .is_none_or(|v| v.eq_ignore_ascii_case("true"))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoundsByApprovalResponse {
    #[schema(example = "success")]
    pub status: String,
    pub approved: bool,
    pub documents: Vec<RoundSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoundsForSignatureResponse {
    #[schema(example = "success")]
    pub status: String,
    pub document_signatures: Vec<RoundSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignedRoundsResponse {
    #[schema(example = "success")]
    pub status: String,
    pub signed_documents: Vec<RoundSummary>,
}

/// JSON body for `PATCH /v1/statuses/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DecisionRequest {
    /// `approve` or `reject`.
    #[serde(default)]
    #[schema(example = "approve")]
    pub action: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DecisionResponse {
    #[schema(example = "Signature status updated to approved.")]
    pub detail: String,
    pub document_signature_status_id: i64,
    pub document_signature_id: i64,
    pub signature_id: i64,
    pub status: ApprovalStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OverviewResponse {
    pub total_documents: u64,
    pub fully_signed: u64,
    pub pending: u64,
    pub users: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(approved: Option<&str>) -> ApprovalQuery {
        ApprovalQuery {
            approved: approved.map(str::to_owned),
        }
    }

    #[test]
    fn approval_flag_parsing() {
        assert!(query(None).wants_approved());
        assert!(query(Some("true")).wants_approved());
        assert!(query(Some("TRUE")).wants_approved());
        assert!(!query(Some("false")).wants_approved());
        assert!(!query(Some("yes")).wants_approved());
        assert!(!query(Some("")).wants_approved());
    }
}
