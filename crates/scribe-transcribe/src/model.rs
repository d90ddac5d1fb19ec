//! Model catalog, name normalization, and ggml file resolution.

use std::path::{Path, PathBuf};

/// Known whisper.cpp model variants, smallest first.
pub const MODEL_VARIANTS: &[&str] = &[
    "tiny",
    "tiny.en",
    "base",
    "base.en",
    "small",
    "small.en",
    "medium",
    "medium.en",
    "large-v3-turbo",
    "large-v3",
];

/// Normalize a client-supplied model name to a catalog variant.
///
/// Clients send HuggingFace-style names (`openai/whisper-large-v3`) or
/// prefixed short names (`whisper-base`); both reduce to the bare variant.
#[must_use]
pub fn normalize_model_name(name: &str) -> String {
    let name = name.trim();
    let stripped = name
        .strip_prefix("openai/whisper-")
        .or_else(|| name.strip_prefix("whisper-"))
        .unwrap_or(name);
    stripped.to_string()
}

/// Whether `name` (already normalized) is a catalog variant.
#[must_use]
pub fn is_known_model(name: &str) -> bool {
    MODEL_VARIANTS.contains(&name)
}

/// The ggml weights file for `name` under `models_dir`
/// (whisper.cpp convention: `ggml-<name>.bin`).
#[must_use]
pub fn model_file(models_dir: &Path, name: &str) -> PathBuf {
    models_dir.join(format!("ggml-{name}.bin"))
}

/// Whether the weights for `name` are present on disk.
#[must_use]
pub fn is_model_available(models_dir: &Path, name: &str) -> bool {
    model_file(models_dir, name).is_file()
}
