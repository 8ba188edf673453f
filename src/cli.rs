//! CLI argument definitions.

use clap::Parser;

/// Top-level CLI parser for `llm-math`.
#[derive(Debug, Parser)]
#[command(
    name = "llm-math",
    version,
    about = "Answer an arithmetic question with a completion model",
    after_help = "Environment:\n  OPENAI_API_KEY    API credential (required)\n  \
                  OPENAI_BASE_URL   completions endpoint base URL\n  \
                  LLM_MATH_MODEL    completion model name"
)]
pub struct Cli {
    /// The natural-language arithmetic question to solve.
    #[arg(value_name = "QUESTION")]
    pub question: String,
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn parses_question() {
        let cli = Cli::parse_from(["llm-math", "What is 12 times 4?"]);
        assert_eq!(cli.question, "What is 12 times 4?");
    }

    #[test]
    fn rejects_missing_question() {
        let err = Cli::try_parse_from(["llm-math"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_extra_positional() {
        assert!(Cli::try_parse_from(["llm-math", "1 + 1", "2 + 2"]).is_err());
    }
}
