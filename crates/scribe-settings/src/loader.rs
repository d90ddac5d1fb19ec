//! Settings loading: defaults ← JSON file ← environment.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::ScribeSettings;

/// Default settings file location (`~/.scribe/settings.json`).
#[must_use]
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".scribe").join("settings.json")
}

/// Load settings from the default path with env overrides applied.
pub fn load_settings() -> Result<ScribeSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from `path`, deep-merged over compiled defaults, with
/// `SCRIBE_*` env overrides applied last. A missing file is not an error —
/// defaults (plus env) are returned.
pub fn load_settings_from_path(path: &Path) -> Result<ScribeSettings> {
    let defaults = serde_json::to_value(ScribeSettings::default())?;

    let merged = if path.exists() {
        let raw = std::fs::read_to_string(path)?;
        let file: Value = serde_json::from_str(&raw)?;
        deep_merge(defaults, file)
    } else {
        debug!(?path, "no settings file, using defaults");
        defaults
    };

    let mut settings: ScribeSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursively merge `overlay` into `base`. Objects merge key-by-key;
/// any other overlay value replaces the base value wholesale.
#[must_use]
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                let _ = base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

fn apply_env_overrides(settings: &mut ScribeSettings) {
    if let Ok(port) = std::env::var("SCRIBE_PORT") {
        if let Ok(port) = port.parse() {
            settings.server.port = port;
        }
    }
    if let Ok(dir) = std::env::var("SCRIBE_DATA_DIR") {
        if !dir.is_empty() {
            settings.storage.data_dir = dir;
        }
    }
    if let Ok(model) = std::env::var("SCRIBE_DEFAULT_MODEL") {
        if !model.is_empty() {
            settings.transcription.default_model = model;
        }
    }
    if let Ok(dir) = std::env::var("SCRIBE_MODELS_DIR") {
        if !dir.is_empty() {
            settings.transcription.models_dir = dir;
        }
    }
}
