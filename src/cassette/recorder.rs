//! Captures completion calls into a cassette file.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use super::format::{Cassette, Interaction, COMPLETION_METHOD, COMPLETION_PORT};
use crate::ports::{CompletionRequest, CompletionResponse, LlmError};

/// Accumulates completion calls and writes them out as one YAML cassette.
///
/// Each call is stored with the request as its input and the result as
/// `{"ok": response}` or `{"err": message}`, the shape the replaying client
/// reads back.
#[derive(Debug)]
pub struct CompletionRecorder {
    path: PathBuf,
    name: String,
    commit: String,
    interactions: Vec<Interaction>,
}

impl CompletionRecorder {
    /// Creates an empty recorder that will write to `path` on [`finish`](Self::finish).
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, commit: impl Into<String>) -> Self {
        Self { path: path.into(), name: name.into(), commit: commit.into(), interactions: Vec::new() }
    }

    /// Appends one completion call.
    pub fn record_completion(
        &mut self,
        request: &CompletionRequest,
        result: &Result<CompletionResponse, LlmError>,
    ) {
        let output = match result {
            Ok(response) => json!({ "ok": to_recorded_value(response) }),
            Err(e) => json!({ "err": e.to_string() }),
        };
        self.interactions.push(Interaction {
            seq: self.interactions.len() as u64,
            port: COMPLETION_PORT.into(),
            method: COMPLETION_METHOD.into(),
            input: to_recorded_value(request),
            output,
        });
    }

    /// Number of completion calls recorded so far.
    #[must_use]
    pub fn recorded(&self) -> usize {
        self.interactions.len()
    }

    /// Writes the cassette YAML and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be serialized or written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let cassette = Cassette {
            name: self.name,
            recorded_at: Utc::now(),
            commit: self.commit,
            interactions: self.interactions,
        };
        let yaml = serde_yaml::to_string(&cassette)
            .map_err(|e| format!("Failed to serialize cassette: {e}"))?;
        std::fs::write(&self.path, yaml)
            .map_err(|e| format!("Failed to write cassette {}: {e}", self.path.display()))?;
        Ok(self.path)
    }
}

/// Serialization failures become `null` so recording never changes the
/// outcome of the call being recorded.
fn to_recorded_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to serialize recorded completion value");
        Value::Null
    })
}
