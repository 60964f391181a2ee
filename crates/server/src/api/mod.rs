pub mod documents;
pub mod extract;
pub mod health;
pub mod media;
pub mod multipart;
pub mod openapi;
pub mod reporting;
pub mod rounds;
pub mod schemas;
pub mod signatures;
pub mod statuses;
pub mod urls;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use signet_workflow::WorkflowEngine;

use crate::auth::AuthProvider;
use crate::auth::middleware::AuthLayer;

use self::openapi::ApiDoc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The workflow engine every handler delegates to.
    pub engine: Arc<WorkflowEngine>,
    /// Bearer token validation.
    pub auth: Arc<AuthProvider>,
    /// Configured public base URL for file links.
    pub external_url: Option<String>,
    /// Request body limit for multipart uploads.
    pub max_body_bytes: usize,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/media/{*key}", get(media::serve_file));

    let protected = Router::new()
        // Signature registry
        .route(
            "/v1/signatures",
            get(signatures::list_signatures).post(signatures::upload_signature),
        )
        .route(
            "/v1/signatures/{id}/rounds",
            get(rounds::rounds_for_signature),
        )
        // Documents and round creation
        .route("/v1/documents", post(documents::create_document))
        .route(
            "/v1/documents/{id}/signatures",
            post(documents::assign_signatures),
        )
        // Rounds
        .route("/v1/rounds", get(rounds::list_rounds))
        .route("/v1/rounds/completion", get(rounds::completions))
        .route("/v1/rounds/{id}/final", post(rounds::mark_final))
        .route("/v1/rounds/{id}/status", get(rounds::round_status))
        .route("/v1/rounds/{id}/completion", get(rounds::completion))
        .route("/v1/rounds/{id}/logs", get(rounds::decision_log))
        // Decisions
        .route("/v1/statuses/{id}", patch(statuses::decide_from_body))
        .route("/v1/statuses/{id}/{action}", patch(statuses::decide_from_path))
        // Reporting
        .route(
            "/v1/users/{id}/signed-rounds",
            get(rounds::signed_rounds),
        )
        .route("/v1/overview", get(reporting::overview))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(AuthLayer::new(state.auth.clone()));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
