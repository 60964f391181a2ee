use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use signet_blob::BlobError;
use signet_workflow::WorkflowError;

/// Errors that can occur when running the Signet server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A workflow-level error surfaced through the API.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Authentication failed (missing or invalid credentials).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The request body or parameters could not be parsed.
    #[error("{0}")]
    BadRequest(String),
}

impl ServerError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Self::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Self::Workflow(e) => {
                let status = match e {
                    WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
                    WorkflowError::PermissionDenied(_) => StatusCode::FORBIDDEN,
                    WorkflowError::InvalidArgument(_) | WorkflowError::Conflict(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    WorkflowError::Blob(BlobError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
                    WorkflowError::Store(_)
                    | WorkflowError::Blob(_)
                    | WorkflowError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(error = %message, "request failed");
        }
        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use signet_store::StoreError;

    use super::*;

    fn status(e: ServerError) -> StatusCode {
        e.status_and_message().0
    }

    #[test]
    fn workflow_errors_map_to_http_statuses() {
        assert_eq!(
            status(WorkflowError::NotFound("x".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(WorkflowError::PermissionDenied("x".into()).into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status(WorkflowError::InvalidArgument("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(WorkflowError::Conflict("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(WorkflowError::Store(StoreError::Backend("down".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(
                WorkflowError::Blob(BlobError::TooLarge {
                    size: 10,
                    limit: 5
                })
                .into()
            ),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn caller_facing_reason_is_preserved() {
        let (_, message) =
            ServerError::from(WorkflowError::Conflict("document signature is already final".into()))
                .status_and_message();
        assert_eq!(message, "document signature is already final");
    }

    #[test]
    fn auth_and_parse_errors() {
        assert_eq!(
            status(ServerError::Unauthorized("no token".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(ServerError::BadRequest("bad form".into())),
            StatusCode::BAD_REQUEST
        );
    }
}
