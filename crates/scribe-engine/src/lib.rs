//! # scribe-engine
//!
//! The job lifecycle engine:
//!
//! - **Executor**: one blocking worker per attempt, fire-and-forget from the
//!   submission path; drives the transcription adapter and writes terminal
//!   state ([`executor::JobExecutor`])
//! - **Resource cache**: keyed, lazily initialized, process-lifetime cache
//!   of loaded speech engines ([`cache::ResourceCache`])
//! - **Progress reporter**: monotonic, rate-limited record updates
//!   ([`progress::ProgressReporter`])
//! - **Recovery**: startup reconciler that force-fails jobs orphaned by a
//!   restart ([`recovery::recover_interrupted`])
//!
//! ## Crate Position
//!
//! Depends on: scribe-core, scribe-store, scribe-transcribe.
//! Depended on by: scribe-server.

#![deny(unsafe_code)]

pub mod cache;
pub mod errors;
pub mod executor;
pub mod progress;
pub mod recovery;
pub mod tempcopy;

pub use cache::ResourceCache;
pub use errors::{EngineError, Result};
pub use executor::{EngineCache, ExecutorConfig, JobExecutor};
pub use progress::ProgressReporter;
pub use recovery::{INTERRUPTED_ERROR, INTERRUPTED_STATUS, recover_interrupted};
pub use tempcopy::TempAudioCopy;
