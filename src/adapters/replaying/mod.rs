//! Replaying adapters that replay recorded interactions.

pub mod llm;

use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::LlmError;

pub use llm::ReplayingLlmClient;

/// Fetch the recorded output for the next `port::method` call.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, String> {
    let mut guard = replayer.lock().unwrap_or_else(PoisonError::into_inner);
    guard.next_interaction(port, method).map(|interaction| interaction.output.clone())
}

/// Decode a recorded `{"ok": v}` / `{"err": msg}` output into a `Result`.
///
/// Mirror of `CompletionRecorder::record_completion`.
pub(crate) fn replay_result<T: DeserializeOwned>(output: serde_json::Value) -> Result<T, LlmError> {
    if let Some(err) = output.get("err") {
        let msg = err.as_str().unwrap_or("unknown error").to_string();
        return Err(msg.into());
    }
    let value = output.get("ok").cloned().unwrap_or(output);
    serde_json::from_value(value).map_err(|e| format!("malformed cassette output: {e}").into())
}
