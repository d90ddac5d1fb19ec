//! # scribe-settings
//!
//! Configuration for the scribe server, loaded from two layers:
//!
//! 1. **Compiled defaults** — [`ScribeSettings::default()`]
//! 2. **User file** — `~/.scribe/settings.json` (deep-merged over defaults)
//!
//! plus `SCRIBE_*` environment overrides on top.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::{ScribeSettings, ServerSettings, StorageSettings, TranscriptionSettings};

use std::sync::{Arc, RwLock};

/// Global settings singleton.
///
/// `RwLock<Option<Arc<..>>>` so the binary can install CLI-overridden
/// settings at startup with [`init_settings`] while library code keeps
/// calling [`get_settings`]. Reads are a shared lock plus `Arc::clone`.
static SETTINGS: RwLock<Option<Arc<ScribeSettings>>> = RwLock::new(None);

/// Get the global settings instance.
///
/// On first call, loads from `~/.scribe/settings.json`; on failure, falls
/// back to compiled defaults. Returns an `Arc` so callers hold a consistent
/// snapshot even if another thread swaps the settings.
pub fn get_settings() -> Arc<ScribeSettings> {
    {
        let guard = SETTINGS.read().expect("settings lock poisoned");
        if let Some(ref s) = *guard {
            return Arc::clone(s);
        }
    }

    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    // Another thread may have initialized while we waited for the write lock.
    if let Some(ref s) = *guard {
        return Arc::clone(s);
    }

    let settings = Arc::new(match load_settings() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            ScribeSettings::default()
        }
    });
    *guard = Some(Arc::clone(&settings));
    settings
}

/// Install a specific settings value, replacing any cached one.
///
/// Called by the binary after applying CLI flag overrides, and by tests.
pub fn init_settings(settings: ScribeSettings) {
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    *guard = Some(Arc::new(settings));
}

#[cfg(test)]
pub(crate) fn reset_settings() {
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    *guard = None;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
