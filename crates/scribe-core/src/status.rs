//! Job status and the closed transition table.
//!
//! Every status change in the system goes through [`JobStatus::can_transition`]
//! at the store boundary. Callers cannot invent transitions: a completed job
//! can only become pending again through the explicit retry path, and a
//! processing job can only leave through a terminal state.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a transcription job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted, waiting for a worker to claim it.
    Pending,
    /// A worker owns it and is transcribing.
    Processing,
    /// Transcript written, job done.
    Completed,
    /// Attempt ended in an error (including restart interruption).
    Failed,
}

impl JobStatus {
    /// Whether this status is terminal (no further automatic transitions).
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// SQL string representation (matches the `jobs.status` CHECK constraint).
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse the SQL string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether `self → to` is a legal transition.
    ///
    /// The table is closed:
    ///
    /// - `pending → processing` — a worker claims the job
    /// - `pending → failed` — reconciler, or a claim that cannot start
    /// - `processing → completed | failed` — the owning worker finishes
    /// - `completed | failed → pending` — explicit retry only
    #[must_use]
    pub fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Processing)
                | (Self::Pending, Self::Failed)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
                | (Self::Completed, Self::Pending)
                | (Self::Failed, Self::Pending)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}
