//! # scribe-server
//!
//! HTTP boundaries over the job engine:
//!
//! - `POST /upload` — submit audio, get a pending job back immediately
//! - `GET /status/{id}` — status, progress, phase message, error/result
//! - `GET /transcript/{id}` — the finished transcript (plain text)
//! - `POST /retry/{id}` — fresh attempt for a terminal job
//! - `GET /jobs`, `DELETE /jobs/{id}` — listing and cleanup
//! - `GET /health`, `GET /metrics` — probes
//!
//! The server only opens after the recovery reconciler has repaired any
//! jobs orphaned by a previous run — the binary enforces that ordering.
//!
//! ## Crate Position
//!
//! Aggregation layer. Depends on: scribe-core, scribe-settings,
//! scribe-store, scribe-transcribe, scribe-engine.

#![deny(unsafe_code)]

pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;

pub use errors::ApiError;
pub use routes::router;
pub use state::AppState;

use std::net::SocketAddr;

use axum::Router;

/// Bind `addr` and serve `app` until `shutdown` resolves.
pub async fn serve(
    app: Router,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "http server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
