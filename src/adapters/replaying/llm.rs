//! Replaying adapter for the `LlmClient` port.

use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::format::{COMPLETION_METHOD, COMPLETION_PORT};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{CompletionFuture, CompletionRequest, CompletionResponse, LlmClient, LlmError};

/// Serves recorded LLM completions from a cassette.
pub struct ReplayingLlmClient {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingLlmClient {
    /// Create a replaying LLM client backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl LlmClient for ReplayingLlmClient {
    fn complete(&self, _request: &CompletionRequest) -> CompletionFuture<'_> {
        let result: Result<CompletionResponse, LlmError> =
            next_output(&self.replayer, COMPLETION_PORT, COMPLETION_METHOD)
                .map_err(Into::into)
                .and_then(replay_result);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use crate::ports::CompletionSettings;

    fn client(outputs: Vec<serde_json::Value>) -> ReplayingLlmClient {
        let interactions = outputs
            .into_iter()
            .zip(0..)
            .map(|(output, seq)| Interaction {
                seq,
                port: "llm".into(),
                method: "complete".into(),
                input: json!({}),
                output,
            })
            .collect();
        let cassette = Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions,
        };
        ReplayingLlmClient::new(CassetteReplayer::new(&cassette))
    }

    fn request() -> CompletionRequest {
        CompletionSettings::deterministic("m").request("Question: 2 + 2\n", &[])
    }

    #[tokio::test]
    async fn serves_recorded_completion() {
        let llm = client(vec![json!({
            "ok": {"text": "```text\n2 + 2\n```", "prompt_tokens": 4, "completion_tokens": 3}
        })]);
        let response = llm.complete(&request()).await.unwrap();
        assert_eq!(response.text, "```text\n2 + 2\n```");
        assert_eq!(response.completion_tokens, 3);
    }

    #[tokio::test]
    async fn serves_recorded_error() {
        let llm = client(vec![json!({"err": "connection refused"})]);
        let err = llm.complete(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
    }

    #[tokio::test]
    async fn exhausted_cassette_is_an_error() {
        let llm = client(vec![]);
        let err = llm.complete(&request()).await.unwrap_err();
        assert!(err.to_string().contains("Cassette exhausted"));
    }

    #[tokio::test]
    async fn malformed_output_is_an_error() {
        let llm = client(vec![json!({"ok": {"nope": true}})]);
        let err = llm.complete(&request()).await.unwrap_err();
        assert!(err.to_string().contains("malformed cassette output"));
    }
}
