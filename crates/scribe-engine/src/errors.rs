//! Engine error taxonomy.

use scribe_store::StoreError;
use scribe_transcribe::TranscribeError;

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the job engine's public operations.
///
/// Inside a worker these are caught at the attempt boundary and turned into
/// a failed job record; they never escape to take down the process or other
/// in-flight jobs.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Adapter failure. `ModelUnavailable` inside means construction failed
    /// (nothing decoded); anything else is a per-input failure.
    #[error(transparent)]
    Transcribe(#[from] TranscribeError),

    /// The job's source audio artifact no longer exists.
    #[error("source audio for job {job_id} is missing")]
    ArtifactMissing {
        /// The affected job.
        job_id: String,
    },

    /// Job store failure (includes not-found and illegal transitions).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Filesystem failure outside the stores (temp copies).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_missing_names_the_job() {
        let err = EngineError::ArtifactMissing {
            job_id: "job-9".to_string(),
        };
        assert!(err.to_string().contains("job-9"));
    }

    #[test]
    fn transcribe_errors_convert_transparently() {
        let err: EngineError = TranscribeError::ModelUnavailable("no weights".into()).into();
        assert!(err.to_string().contains("no weights"));
    }
}
