//! # scribe-transcribe
//!
//! The transcription adapter: a uniform seam over acoustic engines.
//!
//! ```text
//! audio path + language hint → SpeechEngine::transcribe
//! → lazy sequence of (start, end, text) segments
//! ```
//!
//! The engine behind the seam is opaque to the rest of the system. The real
//! backend is whisper.cpp (feature `whisper`); the always-available
//! [`scripted::ScriptedEngine`] drives tests and demos, and
//! [`engine::DisabledEngineFactory`] keeps engine-less builds honest.
//!
//! ## Crate Position
//!
//! Standalone (no scribe crate dependencies).
//! Depended on by: scribe-engine, scribe-server.

#![deny(unsafe_code)]

// Always available (no heavy deps)
pub mod engine;
pub mod model;
pub mod scripted;
pub mod types;

// Feature-gated (requires whisper-rs + hound)
#[cfg(feature = "whisper")]
pub mod whisper;

pub use engine::{DisabledEngineFactory, EngineFactory, SpeechEngine};
pub use types::{ResultExt, Segment, SegmentIter, TranscribeError};
#[cfg(feature = "whisper")]
pub use whisper::{WhisperEngine, WhisperEngineFactory};
