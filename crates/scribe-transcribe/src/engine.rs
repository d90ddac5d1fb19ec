//! The engine seams: `SpeechEngine` and `EngineFactory`.
//!
//! The acoustic engine is an opaque collaborator behind these traits. The
//! job engine never cares which backend produced a segment — only that the
//! sequence is finite and timed the same way on every device.

use std::path::Path;
use std::sync::Arc;

use crate::types::{SegmentIter, TranscribeError};

/// A loaded speech-to-text engine for one model variant.
///
/// Implementations are expensive to construct and shared process-wide, so
/// they must be `Send + Sync`; `transcribe` is a long blocking call and is
/// always invoked from a worker thread.
pub trait SpeechEngine: Send + Sync {
    /// Run inference over the audio file at `audio`.
    ///
    /// `audio` must reference a stable location readable for the whole call
    /// — callers with volatile inputs copy them somewhere private first.
    /// `language` is a hint; `None` means auto-detect. The returned sequence
    /// is finite and not restartable.
    fn transcribe(
        &self,
        audio: &Path,
        language: Option<&str>,
    ) -> Result<SegmentIter, TranscribeError>;

    /// Label of the compute device this engine selected ("cpu", "gpu").
    fn device(&self) -> &str {
        "cpu"
    }
}

/// Constructs [`SpeechEngine`] instances by model name.
///
/// Construction failures surface as [`TranscribeError::ModelUnavailable`]
/// and are never cached by callers.
pub trait EngineFactory: Send + Sync {
    /// Load (or build) the engine for `model`.
    fn load(&self, model: &str) -> Result<Arc<dyn SpeechEngine>, TranscribeError>;
}

/// Factory used when no acoustic backend is compiled in.
///
/// Every load reports the model as unavailable, so jobs fail cleanly with
/// an actionable message instead of the process refusing to start.
pub struct DisabledEngineFactory;

impl EngineFactory for DisabledEngineFactory {
    fn load(&self, model: &str) -> Result<Arc<dyn SpeechEngine>, TranscribeError> {
        Err(TranscribeError::ModelUnavailable(format!(
            "no speech engine compiled in (model '{model}' requested); \
             rebuild with the `whisper` feature"
        )))
    }
}
