//! Job boundaries: status, transcript, retry, listing, deletion.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use scribe_core::{JobRecord, JobStatus};
use scribe_store::JobFilter;

use crate::errors::ApiError;
use crate::state::AppState;

/// Status boundary: `GET /status/{id}`.
///
/// The record itself is the wire shape — status, progress, phase message,
/// and (when terminal) error message or transcript pointer.
#[instrument(skip(state))]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobRecord>, ApiError> {
    Ok(Json(state.store.require(&id)?))
}

/// Transcript fetch: `GET /transcript/{id}`.
///
/// Completed jobs get the transcript as plain text. Anything non-terminal
/// (or failed) gets the status payload instead, so pollers can hit one URL.
#[instrument(skip(state))]
pub async fn transcript(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let job = state.store.require(&id)?;
    if job.status != JobStatus::Completed {
        return Ok(Json(job).into_response());
    }

    match state.artifacts.read_transcript(&id)? {
        Some(text) => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            text,
        )
            .into_response()),
        None => Err(ApiError::ArtifactMissing {
            message: format!("transcript for job {id} no longer exists"),
        }),
    }
}

/// Retry boundary: `POST /retry/{id}`.
///
/// Terminal jobs only; fails fast (without touching the record) when the
/// source audio is gone.
#[instrument(skip(state))]
pub async fn retry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<JobRecord>), ApiError> {
    let job = state.executor.retry(&id)?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

/// Query parameters for [`list`].
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Filter by status (`pending`, `processing`, `completed`, `failed`).
    pub status: Option<String>,
    /// Page size (default 20, max 100).
    pub limit: Option<u32>,
    /// Page offset.
    pub offset: Option<u32>,
}

/// Response shape for [`list`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    /// Jobs matching the filter, newest first.
    pub jobs: Vec<JobRecord>,
    /// Total match count, ignoring pagination.
    pub total: u32,
}

/// Listing boundary: `GET /jobs`.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            JobStatus::parse(raw)
                .ok_or_else(|| ApiError::invalid(format!("unknown status '{raw}'")))?,
        ),
    };
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = query.offset.unwrap_or(0);

    let result = state.store.list(&JobFilter { status }, limit, offset)?;
    Ok(Json(ListResponse {
        jobs: result.jobs,
        total: result.total,
    }))
}

/// Deletion boundary: `DELETE /jobs/{id}`.
///
/// Terminal jobs only — a live attempt still owns its record. Removes the
/// record and both artifacts.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let job = state.store.require(&id)?;
    if !job.status.is_terminal() {
        return Err(ApiError::Conflict {
            message: format!("job {id} is {} and cannot be deleted", job.status),
        });
    }

    let _ = state.store.delete(&id)?;
    state.artifacts.remove(&id)?;
    info!(job_id = %id, "job deleted");
    Ok(StatusCode::NO_CONTENT)
}
