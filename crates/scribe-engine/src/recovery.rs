//! Startup recovery for jobs orphaned by a crash or restart.
//!
//! Runs exactly once, before the server starts accepting submissions. Any
//! job still `pending` or `processing` at this point has no worker — none
//! survive a restart — so leaving it non-terminal would be indistinguishable
//! from a hang to every caller. Each one is force-failed with a fixed marker
//! message that operators and users can tell apart from an ordinary failure:
//! a retry after this is likely to succeed.

use metrics::counter;
use tracing::{info, warn};

use scribe_store::{JobStore, Result};

/// Error message written to every interrupted job. Fixed and recognizable.
pub const INTERRUPTED_ERROR: &str =
    "Server was restarted before this job finished. Retry to process it again.";

/// Phase label written alongside [`INTERRUPTED_ERROR`].
pub const INTERRUPTED_STATUS: &str = "Interrupted by restart";

/// Force all non-terminal jobs to `failed` with the interrupted marker.
///
/// Returns how many records were repaired.
pub fn recover_interrupted(store: &JobStore) -> Result<usize> {
    let fixed = store.recover_interrupted(INTERRUPTED_ERROR, INTERRUPTED_STATUS)?;
    if fixed > 0 {
        warn!(count = fixed, "reset jobs interrupted by restart to failed");
        counter!("scribe_jobs_recovered_total").increment(fixed as u64);
    } else {
        info!("no interrupted jobs found");
    }
    Ok(fixed)
}

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use scribe_core::{JobStatus, NewJob};

    fn new_job() -> NewJob {
        NewJob {
            filename: "a.wav".to_string(),
            model: "base".to_string(),
            language: None,
        }
    }

    #[test]
    fn repairs_pending_and_processing_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::open(&dir.path().join("jobs.sqlite3")).unwrap();

        let pending = store.create(&new_job()).unwrap();
        let processing = store.create(&new_job()).unwrap();
        store
            .claim_processing(&processing.id, 1, 5.0, "Transcribing")
            .unwrap();
        let done = store.create(&new_job()).unwrap();
        store.claim_processing(&done.id, 1, 5.0, "p").unwrap();
        store.complete(&done.id, 1, "/t.txt").unwrap();

        assert_eq!(recover_interrupted(&store).unwrap(), 2);

        for id in [&pending.id, &processing.id] {
            let job = store.require(id).unwrap();
            assert_eq!(job.status, JobStatus::Failed);
            assert_eq!(job.error_message.as_deref(), Some(INTERRUPTED_ERROR));
            assert_eq!(job.status_message.as_deref(), Some(INTERRUPTED_STATUS));
            assert!(job.completed_at.is_some());
        }
        assert_eq!(store.require(&done.id).unwrap().status, JobStatus::Completed);
    }

    #[test]
    fn interrupted_jobs_are_retryable() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::open(&dir.path().join("jobs.sqlite3")).unwrap();

        let job = store.create(&new_job()).unwrap();
        store.claim_processing(&job.id, 1, 5.0, "p").unwrap();
        recover_interrupted(&store).unwrap();

        let retried = store.reset_for_retry(&job.id).unwrap();
        assert_eq!(retried.status, JobStatus::Pending);
        assert_eq!(retried.attempt, 2);
        assert!(retried.error_message.is_none());
    }

    #[test]
    fn second_run_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::open(&dir.path().join("jobs.sqlite3")).unwrap();

        let job = store.create(&new_job()).unwrap();
        store.claim_processing(&job.id, 1, 5.0, "p").unwrap();

        assert_eq!(recover_interrupted(&store).unwrap(), 1);
        assert_eq!(recover_interrupted(&store).unwrap(), 0);
    }
}
