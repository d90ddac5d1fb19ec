//! Core types for the transcription adapter.

/// One timed text segment produced by a speech engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Start offset in seconds.
    pub start: f64,
    /// End offset in seconds.
    pub end: f64,
    /// Recognized text. Engines skip pure-silence segments, so this is
    /// never assumed non-empty by anything downstream.
    pub text: String,
}

/// Lazy, finite, non-restartable segment sequence.
///
/// Consuming it drives (or replays) acoustic inference; a fresh
/// [`crate::engine::SpeechEngine::transcribe`] call starts over.
pub type SegmentIter = Box<dyn Iterator<Item = Result<Segment, TranscribeError>> + Send>;

/// Errors from the transcription adapter.
///
/// Model/engine construction failures are distinct from mid-stream decode
/// failures: the former means no progress was made and a degraded path may
/// apply, the latter means partial output must be discarded.
#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    /// The requested model cannot be constructed (file missing, runtime
    /// unsupported, engine compiled out).
    #[error("model not available: {0}")]
    ModelUnavailable(String),

    /// Inference failed while decoding a specific input.
    #[error("transcription engine error: {0}")]
    Engine(String),

    /// The audio payload could not be decoded.
    #[error("audio decode error: {0}")]
    AudioDecode(String),

    /// I/O failure reading the input.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extension trait to reduce `.map_err()` boilerplate when wrapping errors
/// into [`TranscribeError`].
pub trait ResultExt<T> {
    /// Wrap the error as [`TranscribeError::ModelUnavailable`] with `context` prefix.
    fn model(self, context: &str) -> Result<T, TranscribeError>;
    /// Wrap the error as [`TranscribeError::Engine`] with `context` prefix.
    fn engine(self, context: &str) -> Result<T, TranscribeError>;
    /// Wrap the error as [`TranscribeError::AudioDecode`] with `context` prefix.
    fn audio_decode(self, context: &str) -> Result<T, TranscribeError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn model(self, context: &str) -> Result<T, TranscribeError> {
        self.map_err(|e| TranscribeError::ModelUnavailable(format!("{context}: {e}")))
    }
    fn engine(self, context: &str) -> Result<T, TranscribeError> {
        self.map_err(|e| TranscribeError::Engine(format!("{context}: {e}")))
    }
    fn audio_decode(self, context: &str) -> Result<T, TranscribeError> {
        self.map_err(|e| TranscribeError::AudioDecode(format!("{context}: {e}")))
    }
}

impl TranscribeError {
    /// Whether this is a construction-time failure (nothing decoded yet).
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ModelUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_fields() {
        let seg = Segment {
            start: 1.5,
            end: 3.0,
            text: "hello".into(),
        };
        assert_eq!(seg.text, "hello");
        assert!(seg.end > seg.start);
    }

    #[test]
    fn error_display_carries_detail() {
        let e = TranscribeError::ModelUnavailable("ggml-base.bin missing".into());
        assert!(e.to_string().contains("ggml-base.bin missing"));

        let e = TranscribeError::Engine("state.full returned -1".into());
        assert!(e.to_string().contains("state.full"));
    }

    #[test]
    fn result_ext_adds_context() {
        let err: Result<(), &str> = Err("boom");
        assert!(matches!(
            err.model("load ctx"),
            Err(TranscribeError::ModelUnavailable(s)) if s == "load ctx: boom"
        ));

        let err: Result<(), &str> = Err("boom");
        assert!(matches!(
            err.engine("decode"),
            Err(TranscribeError::Engine(s)) if s == "decode: boom"
        ));

        let err: Result<(), &str> = Err("boom");
        assert!(matches!(
            err.audio_decode("wav header"),
            Err(TranscribeError::AudioDecode(s)) if s == "wav header: boom"
        ));
    }

    #[test]
    fn result_ext_ok_passthrough() {
        let ok: Result<i32, &str> = Ok(7);
        assert_eq!(ok.engine("ctx").unwrap(), 7);
    }

    #[test]
    fn only_model_errors_are_unavailable() {
        assert!(TranscribeError::ModelUnavailable("x".into()).is_unavailable());
        assert!(!TranscribeError::Engine("x".into()).is_unavailable());
        assert!(!TranscribeError::AudioDecode("x".into()).is_unavailable());
    }
}
