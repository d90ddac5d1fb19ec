//! Job record repository — stateless, every method takes `&Connection`.
//!
//! All state changes are single fenced UPDATE statements: the WHERE clause
//! carries the expected status (and, for worker writes, the attempt number),
//! so a stale worker or a racing caller simply matches zero rows instead of
//! clobbering newer state. Row counts come back as booleans.

use rusqlite::{Connection, OptionalExtension, params};

use scribe_core::{JobRecord, JobStatus, NewJob, new_job_id, now_utc};

use crate::errors::{Result, StoreError};

/// Filter for job listings.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Only jobs with this status.
    pub status: Option<JobStatus>,
}

/// Paginated job listing.
#[derive(Debug, Clone)]
pub struct JobListResult {
    /// Jobs matching the filter, newest first.
    pub jobs: Vec<JobRecord>,
    /// Total match count, ignoring pagination.
    pub total: u32,
}

/// Stateless repository for the `jobs` table.
pub struct JobRepo;

impl JobRepo {
    /// Insert a fresh pending record and return it.
    pub fn create(conn: &Connection, new: &NewJob) -> Result<JobRecord> {
        let id = new_job_id();
        let now = now_utc();
        let _ = conn.execute(
            "INSERT INTO jobs (id, filename, model, language, status, progress, status_message, attempt, created_at)
             VALUES (?1, ?2, ?3, ?4, 'pending', 0, 'Queued', 1, ?5)",
            params![id, new.filename, new.model, new.language, now],
        )?;
        Self::get(conn, &id)?.ok_or_else(|| StoreError::job_not_found(&id))
    }

    /// Fetch a record by id.
    pub fn get(conn: &Connection, id: &str) -> Result<Option<JobRecord>> {
        let row = conn
            .query_row(
                "SELECT id, filename, model, language, status, progress, status_message,
                        error_message, transcript_path, attempt, created_at, completed_at
                 FROM jobs WHERE id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// List jobs newest-first with an optional status filter.
    pub fn list(
        conn: &Connection,
        filter: &JobFilter,
        limit: u32,
        offset: u32,
    ) -> Result<JobListResult> {
        let status = filter.status.map(JobStatus::as_sql);

        let total: u32 = conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE (?1 IS NULL OR status = ?1)",
            params![status],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(
            "SELECT id, filename, model, language, status, progress, status_message,
                    error_message, transcript_path, attempt, created_at, completed_at
             FROM jobs
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY created_at DESC, id DESC
             LIMIT ?2 OFFSET ?3",
        )?;
        let jobs = stmt
            .query_map(params![status, limit, offset], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(JobListResult { jobs, total })
    }

    /// Claim a pending job for a worker: `pending → processing`.
    ///
    /// Sets the progress floor (so callers see "accepted, not stalled")
    /// and a phase message. Returns `false` when the job is not pending
    /// or the attempt number no longer matches.
    pub fn claim_processing(
        conn: &Connection,
        id: &str,
        attempt: i64,
        floor: f64,
        message: &str,
    ) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE jobs
             SET status = 'processing', progress = ?3, status_message = ?4, error_message = NULL
             WHERE id = ?1 AND attempt = ?2 AND status = 'pending'",
            params![id, attempt, floor, message],
        )?;
        Ok(changed > 0)
    }

    /// Write a progress update for a live attempt.
    ///
    /// Monotonicity is enforced here, at the write boundary: a value below
    /// the persisted progress updates the message but never lowers the
    /// number, so bursty or re-ordered reports cannot move progress
    /// backwards. Fenced on `attempt` and `status = 'processing'`.
    pub fn update_progress(
        conn: &Connection,
        id: &str,
        attempt: i64,
        progress: f64,
        message: &str,
    ) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE jobs
             SET progress = CASE WHEN ?3 > progress THEN ?3 ELSE progress END,
                 status_message = ?4
             WHERE id = ?1 AND attempt = ?2 AND status = 'processing'",
            params![id, attempt, progress, message],
        )?;
        Ok(changed > 0)
    }

    /// Terminal success: `processing → completed`.
    pub fn complete(
        conn: &Connection,
        id: &str,
        attempt: i64,
        transcript_path: &str,
    ) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE jobs
             SET status = 'completed', progress = 100.0, status_message = 'Done',
                 error_message = NULL, transcript_path = ?3, completed_at = ?4
             WHERE id = ?1 AND attempt = ?2 AND status = 'processing'",
            params![id, attempt, transcript_path, now_utc()],
        )?;
        Ok(changed > 0)
    }

    /// Terminal failure for a live attempt.
    pub fn fail(
        conn: &Connection,
        id: &str,
        attempt: i64,
        error_message: &str,
        status_message: &str,
    ) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE jobs
             SET status = 'failed', error_message = ?3, status_message = ?4, completed_at = ?5
             WHERE id = ?1 AND attempt = ?2 AND status IN ('pending', 'processing')",
            params![id, attempt, error_message, status_message, now_utc()],
        )?;
        Ok(changed > 0)
    }

    /// Reset a terminal job for a fresh attempt: `completed|failed → pending`.
    ///
    /// The only re-entrant transition in the table. Bumps `attempt` so any
    /// straggler writes from the finished attempt land on zero rows, and
    /// clears every attempt-scoped field.
    pub fn reset_for_retry(conn: &Connection, id: &str) -> Result<JobRecord> {
        let current = Self::get(conn, id)?.ok_or_else(|| StoreError::job_not_found(id))?;

        if !current.status.can_transition(JobStatus::Pending) {
            return Err(StoreError::IllegalTransition {
                id: id.to_string(),
                from: current.status,
                to: JobStatus::Pending,
            });
        }

        let _ = conn.execute(
            "UPDATE jobs
             SET status = 'pending', progress = 0, status_message = 'Queued for retry',
                 error_message = NULL, transcript_path = NULL, completed_at = NULL,
                 attempt = attempt + 1
             WHERE id = ?1 AND status = ?2",
            params![id, current.status.as_sql()],
        )?;

        Self::get(conn, id)?.ok_or_else(|| StoreError::job_not_found(id))
    }

    /// Force every non-terminal job to `failed` with a fixed marker message.
    ///
    /// Startup-only: after a restart no worker can still own these rows, so
    /// leaving them non-terminal would look like a hang forever. Progress is
    /// reset to a terminal-consistent zero. Returns the number of rows fixed.
    pub fn recover_interrupted(
        conn: &Connection,
        error_message: &str,
        status_message: &str,
    ) -> Result<usize> {
        let changed = conn.execute(
            "UPDATE jobs
             SET status = 'failed', progress = 0, error_message = ?1,
                 status_message = ?2, completed_at = ?3
             WHERE status IN ('pending', 'processing')",
            params![error_message, status_message, now_utc()],
        )?;
        Ok(changed)
    }

    /// Delete a record. Returns `false` when the id did not exist.
    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let changed = conn.execute("DELETE FROM jobs WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<JobRecord> {
        let status_raw: String = row.get(4)?;
        let status = JobStatus::parse(&status_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                format!("unknown job status: {status_raw}").into(),
            )
        })?;
        Ok(JobRecord {
            id: row.get(0)?,
            filename: row.get(1)?,
            model: row.get(2)?,
            language: row.get(3)?,
            status,
            progress: row.get(5)?,
            status_message: row.get(6)?,
            error_message: row.get(7)?,
            transcript_path: row.get(8)?,
            attempt: row.get(9)?,
            created_at: row.get(10)?,
            completed_at: row.get(11)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
