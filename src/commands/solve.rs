//! Solve one question and print the chain trace.

use std::io::Write;

use crate::context::ServiceContext;
use crate::math::{LlmMathSolver, MathSolver, Solution};

/// Execute the solve command, writing the verbose trace to `out`.
///
/// # Errors
///
/// Returns an error string if solving fails or `out` cannot be written.
pub async fn run<W: Write>(ctx: &ServiceContext, question: &str, out: &mut W) -> Result<(), String> {
    let write_err = |e: std::io::Error| format!("Failed to write output: {e}");

    writeln!(out, "\n> Entering new math chain...").map_err(write_err)?;
    writeln!(out, "{question}").map_err(write_err)?;

    let solver = LlmMathSolver::new(ctx.llm.as_ref(), ctx.completion.clone());
    let solution = solver.solve(question).await.map_err(|e| e.to_string())?;

    write_solution(out, &solution).map_err(write_err)
}

fn write_solution<W: Write>(out: &mut W, solution: &Solution) -> std::io::Result<()> {
    writeln!(out, "{}", solution.completion)?;
    writeln!(out, "Answer: {}", solution.answer)?;
    writeln!(out, "> Finished chain.")?;
    out.flush()
}
