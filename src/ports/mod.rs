//! Port traits defining external boundaries.
//!
//! The completion service is the only external system the solver talks to.
//! Implementations live in `src/adapters/`.

pub mod llm;

pub use llm::{
    CompletionFuture, CompletionRequest, CompletionResponse, CompletionSettings, LlmClient,
    LlmError,
};
