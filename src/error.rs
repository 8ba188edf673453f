//! Error taxonomy for solving a question.

use thiserror::Error;

/// Errors surfaced by configuration and the math solver.
///
/// None of these are recovered locally; they propagate to the process
/// boundary and end the run with a non-zero exit status.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The API credential environment variable is unset or empty.
    #[error("missing credential: environment variable {var} is not set")]
    MissingCredential {
        /// Name of the missing variable.
        var: &'static str,
    },

    /// The completion call failed (transport, auth, or non-success status).
    #[error("service error: {0}")]
    Service(String),

    /// The model response contained no expression or answer.
    #[error("parse error: unknown format from model: {response}")]
    Parse {
        /// The raw model text.
        response: String,
    },

    /// The extracted expression was malformed, unsupported, or not numeric.
    #[error("evaluation error: {expression:?} could not be evaluated: {reason}")]
    Evaluation {
        /// The expression as extracted from the model response.
        expression: String,
        /// Why evaluation failed.
        reason: String,
    },
}

impl SolverError {
    pub(crate) fn evaluation(expression: &str, reason: impl Into<String>) -> Self {
        Self::Evaluation { expression: expression.to_string(), reason: reason.into() }
    }
}
