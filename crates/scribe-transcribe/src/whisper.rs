//! whisper.cpp backend via `whisper-rs`.
//!
//! Input contract: 16 kHz WAV (any channel count, int or float samples);
//! multi-channel audio is downmixed to mono before inference. Timestamps
//! come back from whisper.cpp in centiseconds and are converted to seconds
//! here, so the output shape matches every other [`SpeechEngine`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::engine::{EngineFactory, SpeechEngine};
use crate::model::{is_known_model, model_file, normalize_model_name};
use crate::types::{ResultExt, Segment, SegmentIter, TranscribeError};

/// Required input sample rate (whisper.cpp is trained on 16 kHz).
pub const SAMPLE_RATE: u32 = 16_000;

/// A loaded whisper.cpp context for one model variant.
pub struct WhisperEngine {
    ctx: WhisperContext,
    device: &'static str,
}

impl WhisperEngine {
    /// Load the ggml weights at `model_path`.
    ///
    /// `gpu` requests acceleration opportunistically — whisper.cpp falls
    /// back to CPU when no supported device exists, and the output shape is
    /// identical either way.
    pub fn load(model_path: &Path, gpu: bool) -> Result<Self, TranscribeError> {
        if !model_path.is_file() {
            return Err(TranscribeError::ModelUnavailable(format!(
                "model weights not found: {}",
                model_path.display()
            )));
        }

        let context_params = WhisperContextParameters {
            use_gpu: gpu,
            gpu_device: 0,
            ..Default::default()
        };
        let ctx = WhisperContext::new_with_params(&model_path.to_string_lossy(), context_params)
            .model("load whisper context")?;

        let device = if gpu { "gpu" } else { "cpu" };
        info!(model = %model_path.display(), device, "whisper context loaded");
        Ok(Self { ctx, device })
    }
}

impl SpeechEngine for WhisperEngine {
    fn transcribe(
        &self,
        audio: &Path,
        language: Option<&str>,
    ) -> Result<SegmentIter, TranscribeError> {
        let samples = read_wav_mono(audio)?;
        debug!(
            samples = samples.len(),
            seconds = samples.len() as f64 / f64::from(SAMPLE_RATE),
            "decoded audio"
        );

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(language);
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);
        params.set_no_context(true);

        let mut state = self.ctx.create_state().engine("create state")?;
        state.full(params, &samples).engine("run inference")?;

        let num_segments = state.full_n_segments().engine("segment count")?;
        let mut segments: Vec<Result<Segment, TranscribeError>> =
            Vec::with_capacity(num_segments as usize);
        for i in 0..num_segments {
            let Ok(text) = state.full_get_segment_text_lossy(i) else {
                continue;
            };
            let text = text.trim().to_string();
            if text.is_empty() {
                // Pure-silence segments are legitimately absent from output.
                continue;
            }
            let start = state.full_get_segment_t0(i).unwrap_or(0) as f64 / 100.0;
            let end = state.full_get_segment_t1(i).unwrap_or(0) as f64 / 100.0;
            segments.push(Ok(Segment { start, end, text }));
        }
        Ok(Box::new(segments.into_iter()))
    }

    fn device(&self) -> &str {
        self.device
    }
}

/// Factory resolving catalog names to ggml files under `models_dir`.
pub struct WhisperEngineFactory {
    models_dir: PathBuf,
    gpu: bool,
}

impl WhisperEngineFactory {
    /// Create a factory over `models_dir`.
    #[must_use]
    pub fn new(models_dir: impl Into<PathBuf>, gpu: bool) -> Self {
        Self {
            models_dir: models_dir.into(),
            gpu,
        }
    }
}

impl EngineFactory for WhisperEngineFactory {
    fn load(&self, model: &str) -> Result<Arc<dyn SpeechEngine>, TranscribeError> {
        let name = normalize_model_name(model);
        if !is_known_model(&name) {
            return Err(TranscribeError::ModelUnavailable(format!(
                "unknown model variant '{name}'"
            )));
        }
        let path = model_file(&self.models_dir, &name);
        Ok(Arc::new(WhisperEngine::load(&path, self.gpu)?))
    }
}

/// Decode a WAV file to mono f32 samples at [`SAMPLE_RATE`].
fn read_wav_mono(path: &Path) -> Result<Vec<f32>, TranscribeError> {
    let mut reader = hound::WavReader::open(path).audio_decode("open wav")?;
    let spec = reader.spec();

    if spec.sample_rate != SAMPLE_RATE {
        return Err(TranscribeError::AudioDecode(format!(
            "expected {SAMPLE_RATE} Hz input, got {} Hz",
            spec.sample_rate
        )));
    }
    if spec.channels == 0 {
        return Err(TranscribeError::AudioDecode("zero channels".to_string()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .audio_decode("read float samples")?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .audio_decode("read int samples")?
        }
    };

    if spec.channels == 1 {
        return Ok(interleaved);
    }
    let channels = usize::from(spec.channels);
    Ok(interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
