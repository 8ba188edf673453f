//! Recording adapter for the `LlmClient` port.

use std::sync::{Arc, Mutex, PoisonError};

use crate::cassette::recorder::CompletionRecorder;
use crate::ports::{CompletionFuture, CompletionRequest, LlmClient};

/// Records LLM interactions while delegating to an inner implementation.
pub struct RecordingLlmClient {
    inner: Box<dyn LlmClient>,
    recorder: Arc<Mutex<CompletionRecorder>>,
}

impl RecordingLlmClient {
    /// Creates a new recording LLM client wrapping the given implementation.
    pub fn new(inner: Box<dyn LlmClient>, recorder: Arc<Mutex<CompletionRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl LlmClient for RecordingLlmClient {
    fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_> {
        let request = request.clone();

        Box::pin(async move {
            let result = self.inner.complete(&request).await;
            self.recorder
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .record_completion(&request, &result);
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::Cassette;
    use crate::ports::{CompletionResponse, CompletionSettings, LlmError};

    struct FixedLlmClient(Result<&'static str, &'static str>);

    impl LlmClient for FixedLlmClient {
        fn complete(&self, _request: &CompletionRequest) -> CompletionFuture<'_> {
            let result: Result<CompletionResponse, LlmError> = self
                .0
                .map(|text| CompletionResponse {
                    text: text.to_string(),
                    prompt_tokens: 3,
                    completion_tokens: 2,
                })
                .map_err(Into::into);
            Box::pin(async move { result })
        }
    }

    #[tokio::test]
    async fn records_success_and_failure() {
        let dir = std::env::temp_dir().join("llm_math_rec_llm_test");
        std::fs::create_dir_all(&dir).unwrap();
        let cassette_path = dir.join("llm.cassette.yaml");

        let recorder = Arc::new(Mutex::new(CompletionRecorder::new(&cassette_path, "test", "abc")));
        let request =
            CompletionSettings::deterministic("m").request("Question: 1 + 1\n", &["```output"]);

        // Scope the adapters so they're dropped before we try to unwrap
        {
            let ok = RecordingLlmClient::new(
                Box::new(FixedLlmClient(Ok("```text\n1 + 1\n```"))),
                Arc::clone(&recorder),
            );
            assert!(ok.complete(&request).await.is_ok());

            let failing = RecordingLlmClient::new(
                Box::new(FixedLlmClient(Err("connection reset"))),
                Arc::clone(&recorder),
            );
            assert!(failing.complete(&request).await.is_err());
        }

        let recorder = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap();
        recorder.finish().unwrap();

        let cassette = Cassette::load(&cassette_path).unwrap();
        assert_eq!(cassette.interactions.len(), 2);
        assert_eq!(cassette.interactions[0].input["prompt"], "Question: 1 + 1\n");
        assert_eq!(cassette.interactions[0].input["temperature"], 0.0);
        assert_eq!(cassette.interactions[0].output["ok"]["text"], "```text\n1 + 1\n```");
        assert_eq!(cassette.interactions[1].output["err"], "connection reset");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
