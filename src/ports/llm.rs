//! LLM client port for text completions.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

/// Error type returned by [`LlmClient`] implementations.
pub type LlmError = Box<dyn Error + Send + Sync>;

/// Boxed future type alias used by [`LlmClient`] to keep the trait dyn-compatible.
pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>>;

/// Sampling temperature that minimizes response variance.
pub const DETERMINISTIC_TEMPERATURE: f32 = 0.0;
/// Completion length cap.
pub const DEFAULT_MAX_TOKENS: u32 = 256;

/// Parameters fixed when a client is constructed and reused for every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSettings {
    /// The model identifier (e.g. `"gpt-3.5-turbo-instruct"`).
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
}

impl CompletionSettings {
    /// Settings for `model` at temperature 0. There is no way to pick another
    /// temperature through configuration.
    #[must_use]
    pub fn deterministic(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: DETERMINISTIC_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Builds a request for `prompt` that stops at any of `stop`.
    #[must_use]
    pub fn request(&self, prompt: impl Into<String>, stop: &[&str]) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            prompt: prompt.into(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stop: stop.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// A request to generate a completion from an LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model identifier.
    pub model: String,
    /// The rendered prompt.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
    /// Sequences at which generation stops.
    #[serde(default)]
    pub stop: Vec<String>,
}

/// The response from an LLM completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated text.
    pub text: String,
    /// Number of prompt tokens consumed.
    pub prompt_tokens: u32,
    /// Number of completion tokens generated.
    pub completion_tokens: u32,
}

/// Sends completion requests to a language model.
pub trait LlmClient: Send + Sync {
    /// Generates a completion for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails (network, auth, non-success status).
    fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_settings_use_zero_temperature() {
        let settings = CompletionSettings::deterministic("gpt-3.5-turbo-instruct");
        assert!(settings.temperature.abs() < f32::EPSILON);
        assert_eq!(settings.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn request_carries_settings_and_stop_sequences() {
        let settings = CompletionSettings::deterministic("m");
        let request = settings.request("Question: 1 + 1", &["```output"]);
        assert_eq!(request.model, "m");
        assert_eq!(request.prompt, "Question: 1 + 1");
        assert!(request.temperature.abs() < f32::EPSILON);
        assert_eq!(request.stop, vec!["```output".to_string()]);
    }
}
