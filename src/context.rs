//! Service context bundling the port trait objects.

use std::path::Path;
use std::sync::Arc;

use crate::adapters::live::LiveLlmClient;
use crate::adapters::recording::RecordingLlmClient;
use crate::adapters::replaying::ReplayingLlmClient;
use crate::cassette::format::Cassette;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::session::RecordingSession;
use crate::config::Settings;
use crate::ports::llm::{CompletionSettings, LlmClient};

/// Bundles the completion client with the parameters it is driven with.
///
/// Constructors wire up different adapter implementations (live, replaying,
/// recording).
pub struct ServiceContext {
    /// LLM client for completions.
    pub llm: Box<dyn LlmClient>,
    /// Completion parameters for every request.
    pub completion: CompletionSettings,
}

impl ServiceContext {
    /// Creates a live context that talks to the completion API.
    #[must_use]
    pub fn live(settings: Settings) -> Self {
        let completion = settings.completion.clone();
        Self { llm: Box::new(LiveLlmClient::new(settings)), completion }
    }

    /// Creates a live context whose completions are recorded into `session`.
    ///
    /// This is the developer-only mechanism for capturing cassettes via the
    /// `LLM_MATH_RECORD` env var.
    #[must_use]
    pub fn recording(settings: Settings, session: &RecordingSession) -> Self {
        let completion = settings.completion.clone();
        let live = Box::new(LiveLlmClient::new(settings));
        Self {
            llm: Box::new(RecordingLlmClient::new(live, Arc::clone(&session.llm))),
            completion,
        }
    }

    /// Creates a replaying context from a cassette file.
    ///
    /// No credential is needed; completions come from the cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path, completion: CompletionSettings) -> Result<Self, String> {
        let cassette = Cassette::load(path)?;
        Ok(Self {
            llm: Box::new(ReplayingLlmClient::new(CassetteReplayer::new(&cassette))),
            completion,
        })
    }

    /// Creates a context around an arbitrary client.
    #[must_use]
    pub fn with_llm(llm: Box<dyn LlmClient>, completion: CompletionSettings) -> Self {
        Self { llm, completion }
    }
}
