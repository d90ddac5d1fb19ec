//! Router assembly.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{jobs, system, upload};
use crate::state::AppState;

/// Build the full application router.
///
/// `max_upload_bytes` caps request bodies (the upload boundary is the only
/// large one). CORS is permissive: the server fronts a local web UI.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/upload", post(upload::upload))
        .route("/status/{id}", get(jobs::status))
        .route("/transcript/{id}", get(jobs::transcript))
        .route("/retry/{id}", post(jobs::retry))
        .route("/jobs", get(jobs::list))
        .route("/jobs/{id}", delete(jobs::remove))
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
