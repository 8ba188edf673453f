//! Recording session owning the completion-port cassette recorder.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::recorder::CompletionRecorder;

/// File name of the completion cassette inside a session directory.
pub const LLM_CASSETTE_FILE: &str = "llm.cassette.yaml";

/// Manages the `CompletionRecorder` for one recording session.
///
/// Cassettes are stored in a timestamped directory under the chosen root.
pub struct RecordingSession {
    /// Recorder for LLM interactions.
    pub llm: Arc<Mutex<CompletionRecorder>>,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Create a new recording session in `<root>/<timestamp>/`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The cassette directory already exists
    /// - The directory cannot be created
    pub fn new_in(root: &Path) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let output_dir = root.join(&timestamp);

        if output_dir.exists() {
            return Err(format!("Cassette directory already exists: {}", output_dir.display()));
        }

        std::fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let recorder = CompletionRecorder::new(
            output_dir.join(LLM_CASSETTE_FILE),
            format!("{timestamp}-llm"),
            get_commit_hash(),
        );

        Ok(Self { llm: Arc::new(Mutex::new(recorder)), output_dir })
    }

    /// Directory the session writes into.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Finish the recorder and write the cassette file to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if a recording adapter is still alive or the
    /// cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.llm)
            .map_err(|_| "Recording adapter for llm still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock for llm poisoned: {e}"))?;
        recorder.finish()?;
        Ok(self.output_dir)
    }
}

/// Get the current git commit hash, or "unknown" with a warning if unavailable.
fn get_commit_hash() -> String {
    let hash = std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string());

    hash.unwrap_or_else(|| {
        tracing::warn!("could not get git commit hash, using 'unknown'");
        "unknown".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::Cassette;

    #[test]
    fn session_creates_output_directory_and_finishes() {
        let root = std::env::temp_dir().join("llm_math_session_test");
        let _ = std::fs::remove_dir_all(&root);

        let session = RecordingSession::new_in(&root).expect("session should start");
        let dir = session.output_dir().to_path_buf();
        assert!(dir.exists(), "Output directory should exist after new_in()");

        let finished = session.finish().expect("finish should succeed");
        assert_eq!(finished, dir);

        let cassette = Cassette::load(&dir.join(LLM_CASSETTE_FILE)).unwrap();
        assert!(cassette.name.ends_with("-llm"));
        assert!(cassette.interactions.is_empty());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn finish_fails_while_adapter_holds_recorder() {
        let root = std::env::temp_dir().join("llm_math_session_busy_test");
        let _ = std::fs::remove_dir_all(&root);

        let session = RecordingSession::new_in(&root).unwrap();
        let _held = Arc::clone(&session.llm);
        let err = session.finish().unwrap_err();
        assert!(err.contains("still has references"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn get_commit_hash_returns_string() {
        assert!(!get_commit_hash().is_empty());
    }
}
