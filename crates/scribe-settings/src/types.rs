//! Settings types with compiled defaults.
//!
//! All types use `camelCase` on the wire and `#[serde(default)]` on every
//! field so a partial settings file only overrides what it names.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn home_dir() -> String {
    std::env::var("HOME").unwrap_or_else(|_| "/tmp".into())
}

fn default_data_dir() -> String {
    format!("{}/.scribe", home_dir())
}

fn default_models_dir() -> String {
    format!("{}/.scribe/models", home_dir())
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8990
}

fn default_max_upload_mb() -> u64 {
    256
}

fn default_model() -> String {
    "base".to_string()
}

fn default_progress_every() -> usize {
    10
}

fn default_true() -> bool {
    true
}

/// Root settings for the scribe server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScribeSettings {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// On-disk layout.
    pub storage: StorageSettings,
    /// Transcription engine settings.
    pub transcription: TranscriptionSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upload size cap in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

/// Filesystem layout. Everything lives under `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// Root data directory (`~/.scribe` by default).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageSettings {
    /// Path of the SQLite job database.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("scribe.sqlite3")
    }

    /// Directory holding uploaded audio artifacts.
    #[must_use]
    pub fn audio_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("audio")
    }

    /// Directory holding produced transcripts.
    #[must_use]
    pub fn transcript_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("transcripts")
    }
}

/// Transcription engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptionSettings {
    /// Model used when a submission does not name one.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Directory of ggml model files.
    #[serde(default = "default_models_dir")]
    pub models_dir: String,
    /// Coalesce progress writes to one per this many segments.
    #[serde(default = "default_progress_every")]
    pub progress_every_segments: usize,
    /// Use GPU acceleration when the engine supports it.
    #[serde(default = "default_true")]
    pub gpu: bool,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            models_dir: default_models_dir(),
            progress_every_segments: default_progress_every(),
            gpu: default_true(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let s = ScribeSettings::default();
        assert_eq!(s.server.host, "127.0.0.1");
        assert_eq!(s.server.port, 8990);
        assert_eq!(s.server.max_upload_mb, 256);
        assert_eq!(s.transcription.default_model, "base");
        assert_eq!(s.transcription.progress_every_segments, 10);
        assert!(s.transcription.gpu);
        assert!(s.storage.data_dir.ends_with(".scribe"));
    }

    #[test]
    fn derived_paths_live_under_data_dir() {
        let s = StorageSettings {
            data_dir: "/srv/scribe".to_string(),
        };
        assert_eq!(s.db_path(), PathBuf::from("/srv/scribe/scribe.sqlite3"));
        assert_eq!(s.audio_dir(), PathBuf::from("/srv/scribe/audio"));
        assert_eq!(s.transcript_dir(), PathBuf::from("/srv/scribe/transcripts"));
    }

    #[test]
    fn partial_json_only_overrides_named_fields() {
        let s: ScribeSettings =
            serde_json::from_str(r#"{"server":{"port":9001}}"#).unwrap();
        assert_eq!(s.server.port, 9001);
        assert_eq!(s.server.host, "127.0.0.1");
        assert_eq!(s.transcription.default_model, "base");
    }

    #[test]
    fn camel_case_on_the_wire() {
        let json = serde_json::to_string(&ScribeSettings::default()).unwrap();
        assert!(json.contains("maxUploadMb"));
        assert!(json.contains("dataDir"));
        assert!(json.contains("defaultModel"));
        assert!(json.contains("progressEverySegments"));
    }
}
