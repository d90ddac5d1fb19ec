//! Narrow progress channel from a worker to its job record.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use scribe_store::JobStore;

/// Per-attempt progress writer.
///
/// Clamps values into `[floor, 100)` — 100 is reserved for the terminal
/// completion write — and goes through the store's monotonic guard, so
/// out-of-order or bursty reports can never move the persisted value
/// backwards. Safe to call from the worker while readers poll the record.
pub struct ProgressReporter {
    store: Arc<JobStore>,
    job_id: String,
    attempt: i64,
    floor: f64,
}

impl ProgressReporter {
    /// Reporter for one live attempt.
    #[must_use]
    pub fn new(store: Arc<JobStore>, job_id: String, attempt: i64, floor: f64) -> Self {
        Self {
            store,
            job_id,
            attempt,
            floor,
        }
    }

    /// Write a progress update. Best-effort: store errors are logged, not
    /// propagated — a dropped progress tick must never fail the attempt.
    pub fn report(&self, progress: f64, message: &str) {
        let clamped = progress.clamp(self.floor, 99.9);
        match self
            .store
            .update_progress(&self.job_id, self.attempt, clamped, message)
        {
            Ok(true) => {
                trace!(job_id = %self.job_id, progress = clamped, message, "progress");
            }
            Ok(false) => {
                // Attempt superseded or job no longer processing.
                debug!(job_id = %self.job_id, attempt = self.attempt, "stale progress report dropped");
            }
            Err(e) => {
                warn!(job_id = %self.job_id, error = %e, "failed to write progress");
            }
        }
    }
}
