//! Store error types.

use scribe_core::JobStatus;

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by the job store and artifact store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool failure.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Filesystem failure in the artifact store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// No job record with the given id.
    #[error("job not found: {id}")]
    JobNotFound {
        /// The missing job id.
        id: String,
    },

    /// A status change outside the closed transition table was requested.
    #[error("illegal transition: {from} -> {to} for job {id}")]
    IllegalTransition {
        /// The job id.
        id: String,
        /// Current status.
        from: JobStatus,
        /// Requested status.
        to: JobStatus,
    },
}

impl StoreError {
    /// Shorthand used wherever a lookup comes back empty.
    #[must_use]
    pub fn job_not_found(id: &str) -> Self {
        Self::JobNotFound { id: id.to_string() }
    }
}
