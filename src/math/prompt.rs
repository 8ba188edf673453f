//! Few-shot prompt that turns a word problem into a calculator expression.

/// Generation stops here so the model never invents the evaluation result.
pub const STOP_SEQUENCE: &str = "```output";

const PREAMBLE: &str = r#"Translate a math problem into a single-line arithmetic expression that a calculator can evaluate.
Use only numbers, the operators + - * / % ** and parentheses, the functions sqrt, exp, log, log10, sin, cos, tan, abs, and the constants pi and e.
Use the following format:

Question: ${Question with math problem.}
```text
${single line arithmetic expression that solves the problem}
```
...evaluate("${expression}")...
```output
${Output of evaluating the expression}
```
Answer: ${Answer}

Begin.

Question: What is 37593 * 67?
```text
37593 * 67
```
...evaluate("37593 * 67")...
```output
2518731
```
Answer: 2518731

Question: 37593^(1/5)
```text
37593**(1/5)
```
...evaluate("37593**(1/5)")...
```output
8.222831614237718
```
Answer: 8.222831614237718

"#;

/// Renders the prompt for one question.
#[must_use]
pub fn render(question: &str) -> String {
    format!("{PREAMBLE}Question: {question}\n")
}
