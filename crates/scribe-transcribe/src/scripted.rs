//! Deterministic in-process engine for tests and demos.
//!
//! Yields a scripted segment sequence for any input, with optional injected
//! failures at load time (to exercise the not-cached-on-failure contract)
//! or mid-stream (to exercise partial-output discard).

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::engine::{EngineFactory, SpeechEngine};
use crate::types::{Segment, SegmentIter, TranscribeError};

/// Engine that replays a fixed segment script.
pub struct ScriptedEngine {
    segments: Vec<Segment>,
    fail_after: Option<usize>,
}

impl ScriptedEngine {
    /// Engine that yields `segments` and finishes cleanly.
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            fail_after: None,
        }
    }

    /// Engine that yields the first `n` segments, then a mid-stream error.
    #[must_use]
    pub fn failing_after(segments: Vec<Segment>, n: usize) -> Self {
        Self {
            segments,
            fail_after: Some(n),
        }
    }
}

impl SpeechEngine for ScriptedEngine {
    fn transcribe(
        &self,
        audio: &Path,
        _language: Option<&str>,
    ) -> Result<SegmentIter, TranscribeError> {
        // Same precondition a real engine has: the input must exist for the
        // duration of the call.
        if !audio.exists() {
            return Err(TranscribeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("audio not found: {}", audio.display()),
            )));
        }

        let mut items: Vec<Result<Segment, TranscribeError>> = match self.fail_after {
            Some(n) => self
                .segments
                .iter()
                .take(n)
                .cloned()
                .map(Ok)
                .collect(),
            None => self.segments.iter().cloned().map(Ok).collect(),
        };
        if self.fail_after.is_some() {
            items.push(Err(TranscribeError::Engine(
                "scripted mid-stream failure".to_string(),
            )));
        }
        Ok(Box::new(items.into_iter()))
    }

    fn device(&self) -> &str {
        "scripted"
    }
}

/// Factory handing out one shared [`ScriptedEngine`] for every model name.
///
/// Counts loads (so tests can assert at-most-one construction per cache key)
/// and can be told to fail its first N loads.
pub struct ScriptedFactory {
    engine: Arc<ScriptedEngine>,
    loads: AtomicUsize,
    fail_first_loads: usize,
}

impl ScriptedFactory {
    /// Factory whose loads always succeed.
    #[must_use]
    pub fn new(engine: ScriptedEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            loads: AtomicUsize::new(0),
            fail_first_loads: 0,
        }
    }

    /// Factory whose first `n` loads fail with `ModelUnavailable`.
    #[must_use]
    pub fn with_load_failures(engine: ScriptedEngine, n: usize) -> Self {
        Self {
            engine: Arc::new(engine),
            loads: AtomicUsize::new(0),
            fail_first_loads: n,
        }
    }

    /// How many loads have been attempted so far.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl EngineFactory for ScriptedFactory {
    fn load(&self, model: &str) -> Result<Arc<dyn SpeechEngine>, TranscribeError> {
        let n = self.loads.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_first_loads {
            return Err(TranscribeError::ModelUnavailable(format!(
                "scripted load failure for '{model}'"
            )));
        }
        Ok(Arc::clone(&self.engine) as Arc<dyn SpeechEngine>)
    }
}

/// Convenience script: the canonical three-segment fixture.
#[must_use]
pub fn three_segments() -> Vec<Segment> {
    vec![
        Segment {
            start: 0.0,
            end: 2.0,
            text: "a".to_string(),
        },
        Segment {
            start: 2.0,
            end: 5.0,
            text: "b".to_string(),
        },
        Segment {
            start: 5.0,
            end: 9.0,
            text: "c".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("in.wav");
        std::fs::write(&path, b"fake").unwrap();
        path
    }

    #[test]
    fn yields_script_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let audio = touch(&dir);
        let engine = ScriptedEngine::new(three_segments());

        let segments: Vec<_> = engine
            .transcribe(&audio, None)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].text, "a");
        assert_eq!(segments[2].text, "c");
    }

    #[test]
    fn missing_audio_is_an_io_error() {
        let engine = ScriptedEngine::new(three_segments());
        let err = engine
            .transcribe(Path::new("/nope/missing.wav"), None)
            .err()
            .unwrap();
        assert!(matches!(err, TranscribeError::Io(_)));
    }

    #[test]
    fn failing_after_yields_prefix_then_error() {
        let dir = tempfile::tempdir().unwrap();
        let audio = touch(&dir);
        let engine = ScriptedEngine::failing_after(three_segments(), 2);

        let mut iter = engine.transcribe(&audio, None).unwrap();
        assert_eq!(iter.next().unwrap().unwrap().text, "a");
        assert_eq!(iter.next().unwrap().unwrap().text, "b");
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }

    #[test]
    fn factory_counts_loads() {
        let factory = ScriptedFactory::new(ScriptedEngine::new(vec![]));
        assert_eq!(factory.load_count(), 0);
        let _ = factory.load("base").unwrap();
        let _ = factory.load("base").unwrap();
        assert_eq!(factory.load_count(), 2);
    }

    #[test]
    fn factory_load_failures_are_transient() {
        let factory = ScriptedFactory::with_load_failures(ScriptedEngine::new(vec![]), 1);
        assert!(factory.load("base").err().unwrap().is_unavailable());
        assert!(factory.load("base").is_ok());
    }
}
