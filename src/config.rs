//! Run configuration resolved from the environment.

use secrecy::SecretString;

use crate::error::SolverError;
use crate::ports::llm::CompletionSettings;

/// Environment variable holding the completion API credential.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable overriding the completion API base URL.
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
/// Environment variable overriding the completion model.
pub const MODEL_VAR: &str = "LLM_MATH_MODEL";

/// Default completion API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default completion model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-instruct";

/// Everything needed to construct a live completion client.
#[derive(Debug)]
pub struct Settings {
    /// API credential, redacted in `Debug` output.
    pub api_key: SecretString,
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Per-request completion parameters.
    pub completion: CompletionSettings,
}

impl Settings {
    /// Resolves settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::MissingCredential`] when `OPENAI_API_KEY` is
    /// unset or blank.
    pub fn from_env() -> Result<Self, SolverError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::MissingCredential`] when the credential is
    /// unset or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SolverError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_blank(API_KEY_VAR)
            .ok_or(SolverError::MissingCredential { var: API_KEY_VAR })?;
        let base_url = non_blank(BASE_URL_VAR)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = non_blank(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key: SecretString::from(api_key),
            base_url,
            completion: CompletionSettings::deterministic(model),
        })
    }
}
