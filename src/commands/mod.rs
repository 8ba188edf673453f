//! Command dispatch and handlers.

pub mod solve;

use std::env;
use std::path::Path;

use crate::cassette::session::RecordingSession;
use crate::cli::Cli;
use crate::config::{Settings, DEFAULT_MODEL, MODEL_VAR};
use crate::context::ServiceContext;
use crate::ports::llm::CompletionSettings;

/// Directory under which a recording session writes its cassette.
pub const RECORD_VAR: &str = "LLM_MATH_RECORD";
/// Cassette file to replay instead of calling the completion API.
pub const REPLAY_VAR: &str = "LLM_MATH_REPLAY";

/// Dispatch a parsed command line to the solve handler.
///
/// When `LLM_MATH_REPLAY` names a cassette, completions are served from it
/// and no credential is required. Otherwise the credential is validated
/// before anything else happens; when `LLM_MATH_RECORD` is set to a
/// directory, the completion is also recorded to a cassette there.
///
/// # Errors
///
/// Returns an error string if configuration, the async runtime, solving, or
/// writing the recording fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let (ctx, session) = build_context()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;

    let mut stdout = std::io::stdout().lock();
    let result = runtime.block_on(solve::run(&ctx, &cli.question, &mut stdout));

    // Drop context first to release Arc references
    drop(ctx);
    match session {
        Some(session) => settle_recording(result, session),
        None => result,
    }
}

/// Pick the replaying, recording, or live context from the environment.
fn build_context() -> Result<(ServiceContext, Option<RecordingSession>), String> {
    if let Ok(path) = env::var(REPLAY_VAR) {
        let model = env::var(MODEL_VAR).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        tracing::info!(cassette = %path, "replaying completions");
        let ctx =
            ServiceContext::replaying(Path::new(&path), CompletionSettings::deterministic(model))?;
        return Ok((ctx, None));
    }

    let settings = Settings::from_env().map_err(|e| e.to_string())?;

    if let Ok(dir) = env::var(RECORD_VAR) {
        let session = RecordingSession::new_in(Path::new(&dir))?;
        let ctx = ServiceContext::recording(settings, &session);
        return Ok((ctx, Some(session)));
    }

    Ok((ServiceContext::live(settings), None))
}

/// Write the session's cassette whatever the solve outcome, then report.
///
/// A solve failure takes precedence; a cassette that could not be written
/// is only logged in that case.
fn settle_recording(result: Result<(), String>, session: RecordingSession) -> Result<(), String> {
    match (result, session.finish()) {
        (Err(solve_err), Ok(_)) => Err(solve_err),
        (Err(solve_err), Err(finish_err)) => {
            tracing::warn!(error = %finish_err, "failed to save recording");
            Err(solve_err)
        }
        (Ok(()), Ok(output_dir)) => {
            eprintln!("Recording saved to: {}", output_dir.display());
            Ok(())
        }
        (Ok(()), Err(finish_err)) => Err(finish_err),
    }
}
