//! The persistent job record and its construction helpers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::JobStatus;

/// One submitted transcription job, as persisted in the job store.
///
/// The record is the single source of truth for job state. While an attempt
/// is live, only the worker that owns that attempt writes the
/// `processing`-phase fields (`progress`, `status_message`); all writes are
/// fenced on `attempt` so a superseded worker cannot clobber a retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    /// Unique ID (prefixed: `job-{uuid}`), client-visible.
    pub id: String,
    /// Original upload filename.
    pub filename: String,
    /// Normalized model name the job transcribes with.
    pub model: String,
    /// Language hint. `None` means auto-detect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Completion estimate in `[0.0, 100.0]`, non-decreasing per attempt.
    pub progress: f64,
    /// Human-readable phase label ("Transcribing…").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    /// Failure detail. Present iff `status == Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Location of the produced transcript. Valid iff `status == Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<String>,
    /// Execution attempt counter, starts at 1 and bumps on retry.
    pub attempt: i64,
    /// Submission timestamp (UTC, RFC 3339 seconds).
    pub created_at: String,
    /// Terminal timestamp. Set iff status is terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

/// Parameters for creating a job record at submission time.
#[derive(Debug, Clone)]
pub struct NewJob {
    /// Original upload filename.
    pub filename: String,
    /// Normalized model name.
    pub model: String,
    /// Optional language hint.
    pub language: Option<String>,
}

/// Generate a fresh job ID (`job-{uuidv7}`, time-ordered).
#[must_use]
pub fn new_job_id() -> String {
    format!("job-{}", Uuid::now_v7())
}

/// Current UTC time as the timestamp string used throughout the store.
#[must_use]
pub fn now_utc() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> JobRecord {
        JobRecord {
            id: new_job_id(),
            filename: "standup.wav".to_string(),
            model: "base".to_string(),
            language: None,
            status: JobStatus::Pending,
            progress: 0.0,
            status_message: None,
            error_message: None,
            transcript_path: None,
            attempt: 1,
            created_at: now_utc(),
            completed_at: None,
        }
    }

    #[test]
    fn job_id_is_prefixed_and_unique() {
        let a = new_job_id();
        let b = new_job_id();
        assert!(a.starts_with("job-"));
        assert_ne!(a, b);
    }

    #[test]
    fn serializes_camel_case_and_skips_none() {
        let job = sample();
        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains("createdAt"));
        assert!(json.contains("\"attempt\":1"));
        // None fields should be skipped entirely
        assert!(!json.contains("errorMessage"));
        assert!(!json.contains("transcriptPath"));
        assert!(!json.contains("completedAt"));
        assert!(!json.contains("language"));
    }

    #[test]
    fn serde_roundtrip() {
        let mut job = sample();
        job.status = JobStatus::Failed;
        job.error_message = Some("decoder exploded".to_string());
        job.completed_at = Some(now_utc());

        let json = serde_json::to_string(&job).unwrap();
        let back: JobRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, job.id);
        assert_eq!(back.status, JobStatus::Failed);
        assert_eq!(back.error_message.as_deref(), Some("decoder exploded"));
    }

    #[test]
    fn now_utc_shape() {
        let ts = now_utc();
        // 2026-08-06T12:00:00Z
        assert_eq!(ts.len(), 20);
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], "T");
    }
}
