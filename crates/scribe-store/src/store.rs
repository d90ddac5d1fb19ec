//! Pool-backed `JobStore` facade over [`JobRepo`].
//!
//! Adds SQLITE_BUSY retry with backoff around every operation. Each repo
//! method is a single statement, so SQLite's own atomicity gives us the
//! no-lost-updates guarantee; the retry loop only absorbs lock contention
//! between concurrent worker writes and request-path reads.

use std::path::Path;
use std::time::Duration;

use scribe_core::{JobRecord, NewJob};

use crate::connection::{ConnectionPool, PooledConnection, open_pool};
use crate::errors::{Result, StoreError};
use crate::migrations::run_migrations;
use crate::repository::{JobFilter, JobListResult, JobRepo};

/// Thread-safe handle to the job database.
pub struct JobStore {
    pool: ConnectionPool,
}

impl JobStore {
    const BUSY_MAX_RETRIES: u32 = 16;

    /// Open (or create) the database at `path` and run migrations.
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_pool(open_pool(path)?)
    }

    /// Wrap an existing pool, running migrations first.
    pub fn from_pool(pool: ConnectionPool) -> Result<Self> {
        {
            let conn = pool.get()?;
            run_migrations(&conn)?;
        }
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    /// Retry an operation on SQLITE_BUSY/LOCKED with linear backoff + jitter.
    fn retry_on_busy<T>(&self, mut f: impl FnMut(&PooledConnection) -> Result<T>) -> Result<T> {
        let mut attempts = 0;
        loop {
            let conn = self.conn()?;
            match f(&conn) {
                Ok(value) => return Ok(value),
                Err(err) if Self::is_busy(&err) && attempts < Self::BUSY_MAX_RETRIES => {
                    attempts += 1;
                    let base_ms = u64::from(attempts).saturating_mul(10).min(250);
                    let jitter = rand::random::<u64>() % (base_ms / 2 + 1);
                    std::thread::sleep(Duration::from_millis(base_ms / 2 + jitter));
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn is_busy(err: &StoreError) -> bool {
        match err {
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(code, _)) => matches!(
                code.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }

    /// Insert a fresh pending record.
    pub fn create(&self, new: &NewJob) -> Result<JobRecord> {
        self.retry_on_busy(|conn| JobRepo::create(conn, new))
    }

    /// Fetch a record by id.
    pub fn get(&self, id: &str) -> Result<Option<JobRecord>> {
        self.retry_on_busy(|conn| JobRepo::get(conn, id))
    }

    /// Fetch a record by id, erroring when absent.
    pub fn require(&self, id: &str) -> Result<JobRecord> {
        self.get(id)?.ok_or_else(|| StoreError::job_not_found(id))
    }

    /// List jobs newest-first.
    pub fn list(&self, filter: &JobFilter, limit: u32, offset: u32) -> Result<JobListResult> {
        self.retry_on_busy(|conn| JobRepo::list(conn, filter, limit, offset))
    }

    /// Claim a pending job for a worker attempt.
    pub fn claim_processing(
        &self,
        id: &str,
        attempt: i64,
        floor: f64,
        message: &str,
    ) -> Result<bool> {
        self.retry_on_busy(|conn| JobRepo::claim_processing(conn, id, attempt, floor, message))
    }

    /// Monotonic progress write for a live attempt.
    pub fn update_progress(
        &self,
        id: &str,
        attempt: i64,
        progress: f64,
        message: &str,
    ) -> Result<bool> {
        self.retry_on_busy(|conn| JobRepo::update_progress(conn, id, attempt, progress, message))
    }

    /// Terminal success for a live attempt.
    pub fn complete(&self, id: &str, attempt: i64, transcript_path: &str) -> Result<bool> {
        self.retry_on_busy(|conn| JobRepo::complete(conn, id, attempt, transcript_path))
    }

    /// Terminal failure for a live attempt.
    pub fn fail(
        &self,
        id: &str,
        attempt: i64,
        error_message: &str,
        status_message: &str,
    ) -> Result<bool> {
        self.retry_on_busy(|conn| {
            JobRepo::fail(conn, id, attempt, error_message, status_message)
        })
    }

    /// Reset a terminal job for a fresh attempt.
    pub fn reset_for_retry(&self, id: &str) -> Result<JobRecord> {
        self.retry_on_busy(|conn| JobRepo::reset_for_retry(conn, id))
    }

    /// Force all non-terminal jobs to failed (startup recovery).
    pub fn recover_interrupted(
        &self,
        error_message: &str,
        status_message: &str,
    ) -> Result<usize> {
        self.retry_on_busy(|conn| JobRepo::recover_interrupted(conn, error_message, status_message))
    }

    /// Delete a record.
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.retry_on_busy(|conn| JobRepo::delete(conn, id))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
