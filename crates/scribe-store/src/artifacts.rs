//! Filesystem artifact store — uploaded audio and produced transcripts.
//!
//! Layout mirrors the job store keys: audio lands as
//! `<audio_dir>/<job_id>_<original_name>` so the original filename survives
//! for retries and downloads, transcripts as `<text_dir>/<job_id>.txt`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::Result;

/// Durable blob storage for job artifacts, keyed by job id.
pub struct ArtifactStore {
    audio_dir: PathBuf,
    text_dir: PathBuf,
}

impl ArtifactStore {
    /// Create the store, ensuring both directories exist.
    pub fn new(audio_dir: impl Into<PathBuf>, text_dir: impl Into<PathBuf>) -> Result<Self> {
        let audio_dir = audio_dir.into();
        let text_dir = text_dir.into();
        std::fs::create_dir_all(&audio_dir)?;
        std::fs::create_dir_all(&text_dir)?;
        Ok(Self {
            audio_dir,
            text_dir,
        })
    }

    /// Persist an uploaded audio payload for `job_id`.
    pub fn save_audio(&self, job_id: &str, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self
            .audio_dir
            .join(format!("{job_id}_{}", sanitize_filename(filename)));
        std::fs::write(&path, bytes)?;
        debug!(job_id, path = %path.display(), size = bytes.len(), "stored audio artifact");
        Ok(path)
    }

    /// Locate the stored audio for `job_id`, if it still exists.
    ///
    /// Prefix scan rather than a recorded path: the audio may have been
    /// deleted out from under us, and retry must detect that cheaply.
    pub fn find_audio(&self, job_id: &str) -> Result<Option<PathBuf>> {
        let prefix = format!("{job_id}_");
        for entry in std::fs::read_dir(&self.audio_dir)? {
            let entry = entry?;
            if entry
                .file_name()
                .to_string_lossy()
                .starts_with(&prefix)
            {
                return Ok(Some(entry.path()));
            }
        }
        Ok(None)
    }

    /// Write the final transcript text for `job_id`.
    pub fn write_transcript(&self, job_id: &str, text: &str) -> Result<PathBuf> {
        let path = self.transcript_path(job_id);
        std::fs::write(&path, text)?;
        Ok(path)
    }

    /// Read the transcript for `job_id`, if present.
    pub fn read_transcript(&self, job_id: &str) -> Result<Option<String>> {
        let path = self.transcript_path(job_id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    /// Where the transcript for `job_id` lives (whether or not written yet).
    #[must_use]
    pub fn transcript_path(&self, job_id: &str) -> PathBuf {
        self.text_dir.join(format!("{job_id}.txt"))
    }

    /// Remove all artifacts for `job_id`. Missing files are not an error.
    pub fn remove(&self, job_id: &str) -> Result<()> {
        if let Some(audio) = self.find_audio(job_id)? {
            std::fs::remove_file(audio)?;
        }
        let transcript = self.transcript_path(job_id);
        if transcript.exists() {
            std::fs::remove_file(transcript)?;
        }
        Ok(())
    }
}

/// Reduce an upload filename to a safe single path component.
fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "upload.bin".to_string()
    } else {
        cleaned
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store =
            ArtifactStore::new(dir.path().join("audio"), dir.path().join("transcripts")).unwrap();
        (dir, store)
    }

    #[test]
    fn save_and_find_audio() {
        let (_dir, store) = store();
        let saved = store.save_audio("job-1", "standup.wav", b"RIFF").unwrap();
        let found = store.find_audio("job-1").unwrap().unwrap();
        assert_eq!(saved, found);
        assert_eq!(std::fs::read(found).unwrap(), b"RIFF");
    }

    #[test]
    fn find_audio_missing_is_none() {
        let (_dir, store) = store();
        assert!(store.find_audio("job-ghost").unwrap().is_none());
    }

    #[test]
    fn job_ids_do_not_collide_on_prefix() {
        let (_dir, store) = store();
        store.save_audio("job-1", "a.wav", b"one").unwrap();
        store.save_audio("job-10", "b.wav", b"ten").unwrap();

        let found = store.find_audio("job-1").unwrap().unwrap();
        assert!(found.file_name().unwrap().to_string_lossy().starts_with("job-1_"));
    }

    #[test]
    fn transcript_roundtrip() {
        let (_dir, store) = store();
        let path = store.write_transcript("job-1", "hello world").unwrap();
        assert!(path.ends_with("job-1.txt"));
        assert_eq!(
            store.read_transcript("job-1").unwrap().as_deref(),
            Some("hello world")
        );
        assert!(store.read_transcript("job-2").unwrap().is_none());
    }

    #[test]
    fn remove_deletes_both_artifacts() {
        let (_dir, store) = store();
        store.save_audio("job-1", "a.wav", b"x").unwrap();
        store.write_transcript("job-1", "y").unwrap();

        store.remove("job-1").unwrap();
        assert!(store.find_audio("job-1").unwrap().is_none());
        assert!(store.read_transcript("job-1").unwrap().is_none());

        // Removing again is fine
        store.remove("job-1").unwrap();
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("demo.wav"), "demo.wav");
        assert_eq!(sanitize_filename("my call (2).m4a"), "my_call__2_.m4a");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(""), "upload.bin");
        assert_eq!(sanitize_filename("..."), "upload.bin");
    }

    #[test]
    fn traversal_attempts_stay_inside_the_store() {
        let (dir, store) = store();
        let saved = store
            .save_audio("job-1", "../../escape.wav", b"x")
            .unwrap();
        assert!(saved.starts_with(dir.path().join("audio")));
    }
}
