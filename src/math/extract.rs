//! Interprets the model's text as an expression or a direct answer.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::SolverError;

/// What the model's response asks the solver to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Evaluate this expression to get the answer.
    Expression(String),
    /// The model stated the answer itself.
    Answer(String),
}

fn text_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^```text(.*?)```").expect("valid text block regex"))
}

const ANSWER_PREFIX: &str = "Answer:";

/// Classifies a raw completion.
///
/// A leading ```` ```text ```` block wins; otherwise an `Answer:` marker is
/// accepted (the last one, when it is not at the start).
///
/// # Errors
///
/// Returns [`SolverError::Parse`] when neither form is present or the text
/// block is empty.
pub fn parse(response: &str) -> Result<Step, SolverError> {
    let trimmed = response.trim();
    let parse_error = || SolverError::Parse { response: trimmed.to_string() };

    if let Some(captures) = text_block_regex().captures(trimmed) {
        let expression = captures[1].trim();
        if expression.is_empty() {
            return Err(parse_error());
        }
        return Ok(Step::Expression(expression.to_string()));
    }

    if let Some(rest) = trimmed.strip_prefix(ANSWER_PREFIX) {
        return Ok(Step::Answer(rest.trim().to_string()));
    }

    match trimmed.rsplit_once(ANSWER_PREFIX) {
        Some((_, rest)) if !rest.trim().is_empty() => Ok(Step::Answer(rest.trim().to_string())),
        _ => Err(parse_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_block_yields_expression() {
        let step = parse("```text\n12 * 4\n```\n...evaluate(\"12 * 4\")...\n").unwrap();
        assert_eq!(step, Step::Expression("12 * 4".into()));
    }

    #[test]
    fn leading_whitespace_is_ignored() {
        let step = parse("\n  ```text\n(3 + 5) / 2\n```").unwrap();
        assert_eq!(step, Step::Expression("(3 + 5) / 2".into()));
    }

    #[test]
    fn text_block_must_lead_the_response() {
        let err = parse("Sure! ```text\n1 + 1\n``` is the expression").unwrap_err();
        assert!(matches!(err, SolverError::Parse { .. }));
    }

    #[test]
    fn empty_text_block_is_a_parse_error() {
        assert!(matches!(parse("```text\n   \n```"), Err(SolverError::Parse { .. })));
    }

    #[test]
    fn leading_answer_is_taken_verbatim() {
        assert_eq!(parse("Answer: 42").unwrap(), Step::Answer("42".into()));
    }

    #[test]
    fn last_inline_answer_wins() {
        let step = parse("First guess. Answer: 7. On reflection, Answer: 8").unwrap();
        assert_eq!(step, Step::Answer("8".into()));
    }

    #[test]
    fn prose_is_a_parse_error() {
        let err = parse("I am not sure how to help with that.").unwrap_err();
        match err {
            SolverError::Parse { response } => {
                assert_eq!(response, "I am not sure how to help with that.");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
