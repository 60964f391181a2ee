#![allow(clippy::needless_for_each)]

use signet_core::{ApprovalStatus, Completion, Decision, StatusDetail, VerificationLog};

use super::schemas::{
    AssignSignaturesForm, AssignSignaturesResponse, AssignedSignatureResponse,
    DecisionRequest, DecisionResponse, DocumentResponse, DocumentUploadForm, ErrorResponse,
    HealthResponse, MarkFinalResponse, OverviewResponse, RoundStatusResponse, RoundSummary,
    RoundsByApprovalResponse, RoundsForSignatureResponse, SignatureResponse,
    SignatureUploadForm, SignatureUploadResponse, SignedRoundsResponse,
};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "Signet API",
        version = "0.1.0",
        description = "HTTP API for the Signet document signature workflow. Upload signatures, open signing rounds, record decisions, and track completion.",
        license(name = "Apache-2.0")
    ),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Signatures", description = "Signature image registry"),
        (name = "Documents", description = "Source document uploads"),
        (name = "Rounds", description = "Signing round lifecycle and status"),
        (name = "Decisions", description = "Signer approve/reject decisions"),
        (name = "Reporting", description = "Read-only aggregates"),
        (name = "Files", description = "Stored file downloads")
    ),
    paths(
        super::health::health,
        super::media::serve_file,
        super::signatures::upload_signature,
        super::signatures::list_signatures,
        super::documents::create_document,
        super::documents::assign_signatures,
        super::rounds::mark_final,
        super::rounds::round_status,
        super::rounds::completion,
        super::rounds::completions,
        super::rounds::decision_log,
        super::rounds::list_rounds,
        super::rounds::rounds_for_signature,
        super::rounds::signed_rounds,
        super::statuses::decide_from_path,
        super::statuses::decide_from_body,
        super::reporting::overview,
    ),
    components(schemas(
        ErrorResponse,
        HealthResponse,
        SignatureUploadForm,
        SignatureUploadResponse,
        SignatureResponse,
        DocumentUploadForm,
        DocumentResponse,
        AssignSignaturesForm,
        AssignSignaturesResponse,
        AssignedSignatureResponse,
        MarkFinalResponse,
        RoundStatusResponse,
        RoundSummary,
        RoundsByApprovalResponse,
        RoundsForSignatureResponse,
        SignedRoundsResponse,
        DecisionRequest,
        DecisionResponse,
        OverviewResponse,
        StatusDetail,
        ApprovalStatus,
        Decision,
        Completion,
        VerificationLog,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/v1/signatures",
            "/v1/documents/{id}/signatures",
            "/v1/rounds/{id}/final",
            "/v1/statuses/{id}/{action}",
            "/v1/overview",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }

    #[test]
    fn query_params_are_described() {
        let doc = ApiDoc::openapi();
        let rounds = doc.paths.paths.get("/v1/rounds").unwrap();
        let params = rounds.get.as_ref().unwrap().parameters.as_ref().unwrap();
        assert!(params.iter().any(|p| p.name == "approved"));
    }
}
