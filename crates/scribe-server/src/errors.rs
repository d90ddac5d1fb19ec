//! API error envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use scribe_engine::EngineError;
use scribe_store::StoreError;

/// Errors returned by the HTTP boundary as a typed JSON envelope:
/// `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unknown job id or other missing resource.
    #[error("{message}")]
    NotFound {
        /// Human-readable detail.
        message: String,
    },

    /// The job's source audio artifact no longer exists.
    #[error("{message}")]
    ArtifactMissing {
        /// Human-readable detail.
        message: String,
    },

    /// Request conflicts with the job's current state (e.g. retrying a
    /// job that is still processing).
    #[error("{message}")]
    Conflict {
        /// Human-readable detail.
        message: String,
    },

    /// Malformed request.
    #[error("{message}")]
    InvalidParams {
        /// Human-readable detail.
        message: String,
    },

    /// Anything else.
    #[error("{message}")]
    Internal {
        /// Human-readable detail.
        message: String,
    },
}

impl ApiError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ArtifactMissing { .. } => "ARTIFACT_MISSING",
            Self::Conflict { .. } => "CONFLICT",
            Self::InvalidParams { .. } => "INVALID_PARAMS",
            Self::Internal { .. } => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } | Self::ArtifactMissing { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::InvalidParams { .. } => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Shorthand for invalid request parameters.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::JobNotFound { id } => Self::NotFound {
                message: format!("job not found: {id}"),
            },
            StoreError::IllegalTransition { id, from, to } => Self::Conflict {
                message: format!("job {id} cannot go from {from} to {to}"),
            },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::ArtifactMissing { job_id } => Self::ArtifactMissing {
                message: format!("source audio for job {job_id} no longer exists"),
            },
            EngineError::Store(store_err) => store_err.into(),
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}
