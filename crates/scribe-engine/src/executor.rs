//! The job executor: one worker per attempt, fire-and-forget from the
//! submission path.
//!
//! Submission creates a pending record, persists the upload, and hands the
//! job to a blocking worker. The worker claims the record, pulls a cached or
//! freshly loaded engine, streams segments while reporting coalesced
//! progress, and writes the terminal state. Errors are converted into a
//! failed record at this boundary — they never escape the worker thread or
//! touch other in-flight jobs.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use scribe_core::text::sanitize_message;
use scribe_core::timecode::format_segment_line;
use scribe_core::{JobRecord, NewJob};
use scribe_store::{ArtifactStore, JobStore};
use scribe_transcribe::{EngineFactory, SpeechEngine};

use crate::cache::ResourceCache;
use crate::errors::{EngineError, Result};
use crate::progress::ProgressReporter;
use crate::tempcopy::TempAudioCopy;

const JOBS_SUBMITTED_TOTAL: &str = "scribe_jobs_submitted_total";
const JOBS_RETRIED_TOTAL: &str = "scribe_jobs_retried_total";
const JOBS_COMPLETED_TOTAL: &str = "scribe_jobs_completed_total";
const JOBS_FAILED_TOTAL: &str = "scribe_jobs_failed_total";
const JOB_DURATION_SECONDS: &str = "scribe_job_duration_seconds";

/// Cache of loaded speech engines, keyed by model name.
pub type EngineCache = ResourceCache<dyn SpeechEngine>;

/// Executor tuning knobs.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Progress written at claim time ("accepted, not stalled").
    pub progress_floor: f64,
    /// Coalesce progress writes to one per this many segments.
    pub progress_every_segments: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            progress_floor: 5.0,
            progress_every_segments: 10,
        }
    }
}

/// Runs job attempts on dedicated blocking workers.
pub struct JobExecutor {
    store: Arc<JobStore>,
    artifacts: Arc<ArtifactStore>,
    factory: Arc<dyn EngineFactory>,
    engines: EngineCache,
    tracker: TaskTracker,
    config: ExecutorConfig,
}

impl JobExecutor {
    /// Build an executor over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<JobStore>,
        artifacts: Arc<ArtifactStore>,
        factory: Arc<dyn EngineFactory>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            store,
            artifacts,
            factory,
            engines: EngineCache::new(),
            tracker: TaskTracker::new(),
            config,
        }
    }

    /// Accept a submission: persist the audio, create a pending record, and
    /// hand the attempt to a worker. Returns the pending record immediately
    /// — the caller never waits on transcription.
    pub fn submit(self: &Arc<Self>, new: NewJob, audio: &[u8]) -> Result<JobRecord> {
        let job = self.store.create(&new)?;

        if let Err(e) = self.artifacts.save_audio(&job.id, &job.filename, audio) {
            let message = sanitize_message(&format!("failed to store upload: {e}"));
            if let Err(fail_err) = self.store.fail(&job.id, job.attempt, &message, "Failed") {
                warn!(job_id = %job.id, error = %fail_err, "could not mark job failed");
            }
            return Err(e.into());
        }

        info!(job_id = %job.id, model = %job.model, "job submitted");
        counter!(JOBS_SUBMITTED_TOTAL).increment(1);
        self.spawn_attempt(job.clone());
        Ok(job)
    }

    /// Start a fresh attempt for a terminal job.
    ///
    /// Fails fast — without touching the record — when the original audio
    /// artifact is gone; rejects non-terminal jobs via the transition table.
    pub fn retry(self: &Arc<Self>, id: &str) -> Result<JobRecord> {
        let job = self.store.require(id)?;

        if self.artifacts.find_audio(&job.id)?.is_none() {
            return Err(EngineError::ArtifactMissing {
                job_id: job.id.clone(),
            });
        }

        let job = self.store.reset_for_retry(&job.id)?;
        info!(job_id = %job.id, attempt = job.attempt, "job retry started");
        counter!(JOBS_RETRIED_TOTAL).increment(1);
        self.spawn_attempt(job.clone());
        Ok(job)
    }

    /// Hand one attempt to a dedicated blocking worker (non-blocking).
    pub fn spawn_attempt(self: &Arc<Self>, job: JobRecord) {
        let this = Arc::clone(self);
        let _ = self.tracker.spawn_blocking(move || this.run_attempt(&job));
    }

    /// Stop accepting tracked work and wait for in-flight attempts.
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// How many attempts are currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    fn run_attempt(&self, job: &JobRecord) {
        let started = Instant::now();
        match self.try_run_attempt(job) {
            Ok(()) => {
                histogram!(JOB_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
                counter!(JOBS_COMPLETED_TOTAL).increment(1);
                info!(job_id = %job.id, attempt = job.attempt,
                      elapsed_s = started.elapsed().as_secs_f64(), "job attempt finished");
            }
            Err(err) => {
                let (error_message, status_message) = describe_failure(&err);
                match self.store.fail(
                    &job.id,
                    job.attempt,
                    &sanitize_message(&error_message),
                    status_message,
                ) {
                    Ok(true) => {}
                    Ok(false) => {
                        debug!(job_id = %job.id, attempt = job.attempt,
                               "attempt superseded before failure write");
                    }
                    Err(store_err) => {
                        warn!(job_id = %job.id, error = %store_err,
                              "could not persist job failure");
                    }
                }
                counter!(JOBS_FAILED_TOTAL).increment(1);
                warn!(job_id = %job.id, attempt = job.attempt, error = %err, "job attempt failed");
            }
        }
    }

    fn try_run_attempt(&self, job: &JobRecord) -> Result<()> {
        let audio = self
            .artifacts
            .find_audio(&job.id)?
            .ok_or_else(|| EngineError::ArtifactMissing {
                job_id: job.id.clone(),
            })?;

        // Private copy for the whole attempt; the guard removes it on every
        // exit path below, success or failure.
        let scratch = TempAudioCopy::create(&audio)?;

        if !self.store.claim_processing(
            &job.id,
            job.attempt,
            self.config.progress_floor,
            "Preparing audio",
        )? {
            debug!(job_id = %job.id, attempt = job.attempt, "claim lost, attempt superseded");
            return Ok(());
        }

        let reporter = ProgressReporter::new(
            Arc::clone(&self.store),
            job.id.clone(),
            job.attempt,
            self.config.progress_floor,
        );

        reporter.report(10.0, &format!("Loading model {}", job.model));
        let engine = self
            .engines
            .get_or_init(&job.model, || self.factory.load(&job.model))?;
        reporter.report(25.0, "Model loaded");

        let language_label = job.language.as_deref().unwrap_or("auto");
        reporter.report(
            30.0,
            &format!("Transcribing on {} ({language_label})", engine.device()),
        );

        let segments = engine.transcribe(scratch.path(), job.language.as_deref())?;

        let mut lines: Vec<String> = Vec::new();
        for (index, segment) in segments.enumerate() {
            // A mid-stream error discards everything accumulated so far.
            let segment = segment?;
            lines.push(format_segment_line(segment.start, segment.end, &segment.text));

            let count = index + 1;
            if self.config.progress_every_segments > 0
                && count % self.config.progress_every_segments == 0
            {
                let progress = (30.0 + count as f64 * 0.5).min(90.0);
                reporter.report(progress, &format!("Processed {count} segments"));
            }
        }

        reporter.report(90.0, "Formatting transcript");
        let transcript = lines.join("\n");
        let path = self.artifacts.write_transcript(&job.id, &transcript)?;

        if !self
            .store
            .complete(&job.id, job.attempt, &path.to_string_lossy())?
        {
            debug!(job_id = %job.id, attempt = job.attempt,
                   "attempt superseded before completion write");
        }
        Ok(())
    }
}

/// Map an attempt error to the persisted (error, phase) message pair.
fn describe_failure(err: &EngineError) -> (String, &'static str) {
    match err {
        EngineError::Transcribe(e) if e.is_unavailable() => {
            (format!("Transcription unavailable: {e}"), "Model unavailable")
        }
        EngineError::Transcribe(e) => (e.to_string(), "Transcription failed"),
        EngineError::ArtifactMissing { .. } => (
            "Source audio file is missing. It may have been deleted.".to_string(),
            "Source missing",
        ),
        EngineError::Store(e) => (format!("Internal storage error: {e}"), "Failed"),
        EngineError::Io(e) => (format!("File error: {e}"), "Failed"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use scribe_core::JobStatus;
    use scribe_store::StoreError;
    use scribe_transcribe::scripted::{ScriptedEngine, ScriptedFactory, three_segments};

    struct Fixture {
        _dir: tempfile::TempDir,
        store: Arc<JobStore>,
        artifacts: Arc<ArtifactStore>,
        factory: Arc<ScriptedFactory>,
        executor: Arc<JobExecutor>,
    }

    fn fixture(factory: ScriptedFactory) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JobStore::open(&dir.path().join("jobs.sqlite3")).unwrap());
        let artifacts = Arc::new(
            ArtifactStore::new(dir.path().join("audio"), dir.path().join("transcripts")).unwrap(),
        );
        let factory = Arc::new(factory);
        let executor = Arc::new(JobExecutor::new(
            Arc::clone(&store),
            Arc::clone(&artifacts),
            Arc::clone(&factory) as Arc<dyn EngineFactory>,
            ExecutorConfig {
                progress_floor: 5.0,
                progress_every_segments: 1,
            },
        ));
        Fixture {
            _dir: dir,
            store,
            artifacts,
            factory,
            executor,
        }
    }

    fn new_job() -> NewJob {
        NewJob {
            filename: "standup.wav".to_string(),
            model: "base".to_string(),
            language: None,
        }
    }

    #[tokio::test]
    async fn completes_a_three_segment_job() {
        let fx = fixture(ScriptedFactory::new(ScriptedEngine::new(three_segments())));

        let job = fx.executor.submit(new_job(), b"fake-wav").unwrap();
        fx.executor.shutdown().await;

        let job = fx.store.require(&job.id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!((job.progress - 100.0).abs() < f64::EPSILON);
        assert!(job.completed_at.is_some());
        assert!(job.error_message.is_none());

        let transcript = fx.artifacts.read_transcript(&job.id).unwrap().unwrap();
        assert_eq!(
            transcript,
            "[00:00:00 --> 00:00:02]  a\n\
             [00:00:02 --> 00:00:05]  b\n\
             [00:00:05 --> 00:00:09]  c"
        );
        assert!(job.transcript_path.unwrap().ends_with(".txt"));
    }

    #[tokio::test]
    async fn submit_returns_a_pending_snapshot_immediately() {
        let fx = fixture(ScriptedFactory::new(ScriptedEngine::new(three_segments())));
        let job = fx.executor.submit(new_job(), b"fake").unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempt, 1);
        fx.executor.shutdown().await;
    }

    #[tokio::test]
    async fn jobs_with_one_model_share_one_engine_load() {
        let fx = fixture(ScriptedFactory::new(ScriptedEngine::new(three_segments())));

        for _ in 0..3 {
            fx.executor.submit(new_job(), b"fake").unwrap();
        }
        fx.executor.shutdown().await;

        assert_eq!(fx.factory.load_count(), 1, "engine constructed once");
        let listed = fx
            .store
            .list(&scribe_store::JobFilter::default(), 10, 0)
            .unwrap();
        assert!(listed.jobs.iter().all(|j| j.status == JobStatus::Completed));
    }

    #[tokio::test]
    async fn load_failure_fails_the_job_and_is_not_cached() {
        let fx = fixture(ScriptedFactory::with_load_failures(
            ScriptedEngine::new(three_segments()),
            1,
        ));

        let job = fx.executor.submit(new_job(), b"fake").unwrap();
        fx.executor.shutdown().await;

        let failed = fx.store.require(&job.id).unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert!(failed.error_message.unwrap().contains("unavailable"));
        assert_eq!(failed.status_message.as_deref(), Some("Model unavailable"));

        // The failure was not cached: the retry loads again and succeeds.
        let retried = fx.executor.retry(&job.id).unwrap();
        assert_eq!(retried.attempt, 2);
        fx.executor.shutdown().await;

        let job = fx.store.require(&job.id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(fx.factory.load_count(), 2);
    }

    #[tokio::test]
    async fn mid_stream_failure_discards_partial_output() {
        let fx = fixture(ScriptedFactory::new(ScriptedEngine::failing_after(
            three_segments(),
            2,
        )));

        let job = fx.executor.submit(new_job(), b"fake").unwrap();
        fx.executor.shutdown().await;

        let job = fx.store.require(&job.id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.completed_at.is_some());
        assert!(job.error_message.unwrap().contains("engine"));
        // No partial transcript was persisted.
        assert!(fx.artifacts.read_transcript(&job.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn retry_with_deleted_artifact_fails_fast_without_mutation() {
        let fx = fixture(ScriptedFactory::new(ScriptedEngine::new(three_segments())));

        let job = fx.executor.submit(new_job(), b"fake").unwrap();
        fx.executor.shutdown().await;
        let before = fx.store.require(&job.id).unwrap();
        assert_eq!(before.status, JobStatus::Completed);

        // Delete just the audio artifact.
        let audio = fx.artifacts.find_audio(&job.id).unwrap().unwrap();
        std::fs::remove_file(audio).unwrap();

        let err = fx.executor.retry(&job.id).unwrap_err();
        assert!(matches!(err, EngineError::ArtifactMissing { .. }));

        // Prior terminal fields untouched.
        let after = fx.store.require(&job.id).unwrap();
        assert_eq!(after.status, JobStatus::Completed);
        assert_eq!(after.attempt, before.attempt);
        assert_eq!(after.completed_at, before.completed_at);
    }

    #[tokio::test]
    async fn retry_produces_a_fresh_terminal_timestamp() {
        let fx = fixture(ScriptedFactory::new(ScriptedEngine::new(three_segments())));

        let job = fx.executor.submit(new_job(), b"fake").unwrap();
        fx.executor.shutdown().await;
        let first = fx.store.require(&job.id).unwrap();

        let retried = fx.executor.retry(&job.id).unwrap();
        assert_eq!(retried.status, JobStatus::Pending);
        fx.executor.shutdown().await;

        let second = fx.store.require(&job.id).unwrap();
        assert_eq!(second.status, JobStatus::Completed);
        assert_eq!(second.attempt, first.attempt + 1);
        assert!(second.completed_at.is_some());
    }

    #[tokio::test]
    async fn retry_rejected_while_processing() {
        let fx = fixture(ScriptedFactory::new(ScriptedEngine::new(three_segments())));

        // Simulate a live attempt without a worker.
        let job = fx.store.create(&new_job()).unwrap();
        fx.artifacts.save_audio(&job.id, "a.wav", b"x").unwrap();
        fx.store.claim_processing(&job.id, 1, 5.0, "p").unwrap();

        let err = fx.executor.retry(&job.id).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Store(StoreError::IllegalTransition { .. })
        ));
    }

    #[tokio::test]
    async fn retry_of_unknown_job_is_not_found() {
        let fx = fixture(ScriptedFactory::new(ScriptedEngine::new(vec![])));
        let err = fx.executor.retry("job-missing").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Store(StoreError::JobNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn attempt_without_artifact_fails_with_source_missing() {
        let fx = fixture(ScriptedFactory::new(ScriptedEngine::new(three_segments())));

        // Record exists but no audio was ever stored.
        let job = fx.store.create(&new_job()).unwrap();
        fx.executor.spawn_attempt(job.clone());
        fx.executor.shutdown().await;

        let job = fx.store.require(&job.id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.status_message.as_deref(), Some("Source missing"));
    }

    #[tokio::test]
    async fn empty_segment_stream_completes_with_empty_transcript() {
        let fx = fixture(ScriptedFactory::new(ScriptedEngine::new(vec![])));

        let job = fx.executor.submit(new_job(), b"silence").unwrap();
        fx.executor.shutdown().await;

        let job = fx.store.require(&job.id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(
            fx.artifacts.read_transcript(&job.id).unwrap().as_deref(),
            Some("")
        );
    }
}
