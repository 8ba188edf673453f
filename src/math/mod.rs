//! Math-solving delegate: prompt, one completion, extraction, evaluation.

pub mod evaluate;
pub mod extract;
pub mod prompt;

use std::future::Future;
use std::pin::Pin;

use crate::error::SolverError;
use crate::ports::llm::{CompletionSettings, LlmClient};

pub use extract::Step;

/// Boxed future returned by [`MathSolver::solve`].
pub type SolveFuture<'a> = Pin<Box<dyn Future<Output = Result<Solution, SolverError>> + Send + 'a>>;

/// The outcome of solving one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// The question as asked.
    pub question: String,
    /// The model's raw completion text.
    pub completion: String,
    /// How the completion was interpreted.
    pub step: Step,
    /// The final answer text.
    pub answer: String,
}

/// Answers natural-language arithmetic questions.
pub trait MathSolver: Send + Sync {
    /// Solves `question`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Service`] when the completion call fails,
    /// [`SolverError::Parse`] when the response holds no expression or answer,
    /// and [`SolverError::Evaluation`] when the expression cannot be evaluated.
    fn solve<'a>(&'a self, question: &'a str) -> SolveFuture<'a>;
}

/// [`MathSolver`] that asks an [`LlmClient`] for an expression and evaluates it.
pub struct LlmMathSolver<'a> {
    llm: &'a dyn LlmClient,
    settings: CompletionSettings,
}

impl<'a> LlmMathSolver<'a> {
    /// Creates a solver over `llm` that sends every request with `settings`.
    #[must_use]
    pub fn new(llm: &'a dyn LlmClient, settings: CompletionSettings) -> Self {
        Self { llm, settings }
    }

    /// The completion parameters used for every request.
    #[must_use]
    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    async fn run(&self, question: &str) -> Result<Solution, SolverError> {
        let request = self.settings.request(prompt::render(question), &[prompt::STOP_SEQUENCE]);
        let response = self
            .llm
            .complete(&request)
            .await
            .map_err(|e| SolverError::Service(e.to_string()))?;

        let step = extract::parse(&response.text)?;
        let answer = match &step {
            Step::Expression(expression) => {
                tracing::debug!(%expression, "model produced expression");
                evaluate::evaluate(expression)?
            }
            Step::Answer(answer) => {
                tracing::debug!(%answer, "model answered directly");
                answer.clone()
            }
        };

        Ok(Solution {
            question: question.to_string(),
            completion: response.text.trim().to_string(),
            step,
            answer,
        })
    }
}

impl MathSolver for LlmMathSolver<'_> {
    fn solve<'b>(&'b self, question: &'b str) -> SolveFuture<'b> {
        Box::pin(self.run(question))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::ports::llm::{CompletionFuture, CompletionRequest, CompletionResponse, LlmError};

    /// Test double that remembers every request and answers with a fixed result.
    struct CapturingLlmClient {
        reply: Result<&'static str, &'static str>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl CapturingLlmClient {
        fn replying(text: &'static str) -> Self {
            Self { reply: Ok(text), requests: Mutex::new(Vec::new()) }
        }

        fn failing(message: &'static str) -> Self {
            Self { reply: Err(message), requests: Mutex::new(Vec::new()) }
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl LlmClient for CapturingLlmClient {
        fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_> {
            self.requests.lock().unwrap().push(request.clone());
            let result: Result<CompletionResponse, LlmError> = self
                .reply
                .map(|text| CompletionResponse {
                    text: text.to_string(),
                    prompt_tokens: 100,
                    completion_tokens: 10,
                })
                .map_err(Into::into);
            Box::pin(async move { result })
        }
    }

    fn solver(llm: &CapturingLlmClient) -> LlmMathSolver<'_> {
        LlmMathSolver::new(llm, CompletionSettings::deterministic("gpt-3.5-turbo-instruct"))
    }

    #[tokio::test]
    async fn solves_expression_response() {
        let llm = CapturingLlmClient::replying("```text\n12 * 4\n```\n...evaluate(\"12 * 4\")...\n");
        let solution = solver(&llm).solve("What is 12 times 4?").await.unwrap();

        assert_eq!(solution.answer, "48");
        assert_eq!(solution.step, Step::Expression("12 * 4".into()));
        assert_eq!(solution.question, "What is 12 times 4?");
        assert!(solution.completion.starts_with("```text"));
    }

    #[tokio::test]
    async fn passes_direct_answer_through() {
        let llm = CapturingLlmClient::replying("Answer: 3 apples");
        let solution = solver(&llm).solve("How many apples?").await.unwrap();
        assert_eq!(solution.answer, "3 apples");
        assert_eq!(solution.step, Step::Answer("3 apples".into()));
    }

    #[tokio::test]
    async fn sends_one_deterministic_request() {
        let llm = CapturingLlmClient::replying("```text\n1 + 1\n```");
        let _ = solver(&llm).solve("What is 1 plus 1?").await.unwrap();

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert!(request.temperature.abs() < f32::EPSILON);
        assert_eq!(request.model, "gpt-3.5-turbo-instruct");
        assert_eq!(request.stop, vec![prompt::STOP_SEQUENCE.to_string()]);
        assert!(request.prompt.ends_with("Question: What is 1 plus 1?\n"));
    }

    #[tokio::test]
    async fn temperature_is_zero_for_every_question() {
        for question in ["What is 2 + 2?", "Divide 9 by 3", "", "What is 12 times 4?"] {
            let llm = CapturingLlmClient::replying("Answer: 4");
            let _ = solver(&llm).solve(question).await;
            assert!(llm.requests()[0].temperature.abs() < f32::EPSILON, "{question}");
        }
    }

    #[tokio::test]
    async fn transport_failure_is_a_service_error() {
        let llm = CapturingLlmClient::failing("connection refused");
        let err = solver(&llm).solve("What is 12 times 4?").await.unwrap_err();
        assert!(matches!(err, SolverError::Service(ref msg) if msg == "connection refused"));
    }

    #[tokio::test]
    async fn prose_response_is_a_parse_error() {
        let llm = CapturingLlmClient::replying("Math is fun, but I would rather not.");
        let err = solver(&llm).solve("What is 12 times 4?").await.unwrap_err();
        assert!(matches!(err, SolverError::Parse { .. }));
    }

    #[tokio::test]
    async fn bad_expression_is_an_evaluation_error() {
        let llm = CapturingLlmClient::replying("```text\nimport os\n```");
        let err = solver(&llm).solve("Delete everything").await.unwrap_err();
        assert!(matches!(err, SolverError::Evaluation { ref expression, .. } if expression == "import os"));
    }
}
