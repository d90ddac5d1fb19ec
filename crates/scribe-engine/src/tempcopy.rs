//! Scoped private copy of a job's input audio.
//!
//! Workers never decode the stored artifact in place: another request could
//! delete it mid-read (job deletion), and the artifact directory is not a
//! scratch space. The copy lives in the OS temp dir and is removed when the
//! guard drops, on every exit path of the attempt.

use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

/// Drop-guarded temp copy of an audio file.
pub struct TempAudioCopy {
    path: PathBuf,
}

impl TempAudioCopy {
    /// Copy `source` to a fresh private path, preserving the extension
    /// (decoders sniff the container format from it).
    pub fn create(source: &Path) -> std::io::Result<Self> {
        let suffix = source
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let path = std::env::temp_dir().join(format!("scribe-{}{suffix}", Uuid::now_v7()));
        let _ = std::fs::copy(source, &path)?;
        debug!(source = %source.display(), copy = %path.display(), "created scratch audio copy");
        Ok(Self { path })
    }

    /// Location of the copy.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempAudioCopy {
    fn drop(&mut self) {
        // Cleanup failure leaves at worst an orphan in the temp dir.
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_preserves_content_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("input.wav");
        std::fs::write(&source, b"RIFF-ish").unwrap();

        let copy = TempAudioCopy::create(&source).unwrap();
        assert_eq!(copy.path().extension().unwrap(), "wav");
        assert_eq!(std::fs::read(copy.path()).unwrap(), b"RIFF-ish");
        assert_ne!(copy.path(), source);
    }

    #[test]
    fn drop_removes_the_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("input.wav");
        std::fs::write(&source, b"x").unwrap();

        let copy = TempAudioCopy::create(&source).unwrap();
        let path = copy.path().to_path_buf();
        assert!(path.exists());
        drop(copy);
        assert!(!path.exists());
    }

    #[test]
    fn source_survives_the_guard() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("input.wav");
        std::fs::write(&source, b"x").unwrap();

        drop(TempAudioCopy::create(&source).unwrap());
        assert!(source.exists());
    }

    #[test]
    fn missing_source_is_an_error() {
        assert!(TempAudioCopy::create(Path::new("/nope/gone.wav")).is_err());
    }

    #[test]
    fn extensionless_source_works() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("blob");
        std::fs::write(&source, b"x").unwrap();

        let copy = TempAudioCopy::create(&source).unwrap();
        assert!(copy.path().extension().is_none());
    }
}
