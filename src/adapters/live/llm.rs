//! Live adapter for the `LlmClient` port using the OpenAI completions API.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::ports::llm::{
    CompletionFuture, CompletionRequest, CompletionResponse, LlmClient, LlmError,
};

/// Live LLM client that calls `{base_url}/completions`.
pub struct LiveLlmClient {
    client: Client,
    api_key: SecretString,
    endpoint: String,
}

impl LiveLlmClient {
    /// Creates a live client from resolved settings.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            client: Client::new(),
            api_key: settings.api_key,
            endpoint: format!("{}/completions", settings.base_url),
        }
    }

    /// The URL requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Request body sent to the completions API.
#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

/// Top-level response from the completions API.
#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

/// A generated choice.
#[derive(Deserialize)]
struct Choice {
    text: String,
}

/// Token usage reported by the API.
#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Error response from the API.
#[derive(Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

/// Detail inside an error response.
#[derive(Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

impl LiveLlmClient {
    async fn send(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = OpenAiRequest {
            model: &request.model,
            prompt: &request.prompt,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stop: (!request.stop.is_empty()).then_some(request.stop.as_slice()),
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            temperature = request.temperature,
            "sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("completion request failed: {e}"))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| format!("failed to read completion response: {e}"))?;
        tracing::debug!(status = status.as_u16(), "completion response received");

        if !status.is_success() {
            let msg = serde_json::from_str::<OpenAiError>(&response_text)
                .map(|e| e.error.message)
                .unwrap_or(response_text);
            return Err(format!("completion API error ({}): {msg}", status.as_u16()).into());
        }

        let api_response: OpenAiResponse = serde_json::from_str(&response_text)
            .map_err(|e| format!("failed to parse completion response: {e}"))?;

        let text = api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or("completion response contained no choices")?;
        let (prompt_tokens, completion_tokens) = api_response
            .usage
            .map_or((0, 0), |usage| (usage.prompt_tokens, usage.completion_tokens));
        tracing::debug!(prompt_tokens, completion_tokens, "completion usage");

        Ok(CompletionResponse { text, prompt_tokens, completion_tokens })
    }
}

impl LlmClient for LiveLlmClient {
    fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_> {
        Box::pin(self.send(request.clone()))
    }
}
