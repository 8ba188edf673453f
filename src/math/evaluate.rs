//! Restricted arithmetic evaluation backed by `evalexpr`.
//!
//! Only numeric literals, arithmetic operators, parentheses, a fixed set of
//! unary functions and the constants `pi` and `e` are accepted. The context
//! handed to `evalexpr` is immutable, so assignments fail.

use std::sync::OnceLock;

use evalexpr::{
    eval_with_context, Context, ContextWithMutableFunctions, ContextWithMutableVariables,
    EvalexprResult, Function, HashMapContext, Value,
};
use regex::{Captures, Regex};

use crate::error::SolverError;

/// Largest magnitude printed as a plain integer; beyond it a float no longer
/// holds every integer, so results use exponent form.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

const UNARY_FUNCTIONS: &[(&str, fn(f64) -> f64)] = &[
    ("sqrt", f64::sqrt),
    ("exp", f64::exp),
    ("log", f64::ln),
    ("log10", f64::log10),
    ("sin", f64::sin),
    ("cos", f64::cos),
    ("tan", f64::tan),
    ("abs", f64::abs),
];

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[A-Za-z_][A-Za-z0-9_:]*|(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?")
            .expect("valid token regex")
    })
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || "+-*/%^().,_:".contains(c)
}

/// Rewrites `**` to `^`, groups chained powers to the right, and turns
/// integer literals into float literals so that `/` is true division.
fn normalize(expression: &str) -> String {
    let expression = nest_powers(&expression.replace("**", "^"));
    token_regex()
        .replace_all(&expression, |caps: &Captures<'_>| {
            let token = &caps[0];
            let is_identifier = token.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_');
            if is_identifier || token.contains(['.', 'e', 'E']) {
                token.to_string()
            } else {
                format!("{token}.0")
            }
        })
        .into_owned()
}

/// Parenthesizes the right-hand side of every chained `^`, so that
/// `a ^ b ^ c` becomes `a ^ (b ^ c)`. `evalexpr` itself folds `^` to the left.
fn nest_powers(expression: &str) -> String {
    let chars: Vec<char> = expression.chars().collect();
    let mut out = String::with_capacity(expression.len());
    let mut i = 0;
    while i < chars.len() {
        out.push(chars[i]);
        if chars[i] == '^' {
            let end = power_chain_end(&chars, i + 1);
            let rhs: String = chars[i + 1..end].iter().collect();
            let nested = nest_powers(rhs.trim_start());
            out.push_str(&rhs[..rhs.len() - rhs.trim_start().len()]);
            if nested.contains('^') && !is_grouped(&nested) {
                out.push('(');
                out.push_str(&nested);
                out.push(')');
            } else {
                out.push_str(&nested);
            }
            i = end;
        } else {
            i += 1;
        }
    }
    out
}

/// True when the whole of `text` sits inside one pair of parentheses.
fn is_grouped(text: &str) -> bool {
    let chars: Vec<char> = text.trim_end().chars().collect();
    chars.first() == Some(&'(') && matching_paren(&chars, 0) + 1 == chars.len()
}

/// Index one past the last operand of the power chain starting at `start`.
fn power_chain_end(chars: &[char], start: usize) -> usize {
    let mut end = operand_end(chars, start);
    loop {
        let next = skip_whitespace(chars, end);
        if chars.get(next) == Some(&'^') {
            end = operand_end(chars, next + 1);
        } else {
            return end;
        }
    }
}

/// Index one past the operand starting at `start`: an optionally signed
/// number, identifier, function call, or parenthesized group.
fn operand_end(chars: &[char], start: usize) -> usize {
    let mut i = skip_whitespace(chars, start);
    while matches!(chars.get(i), Some('+' | '-')) {
        i = skip_whitespace(chars, i + 1);
    }
    if chars.get(i) == Some(&'(') {
        return matching_paren(chars, i) + 1;
    }

    let word_start = i;
    while let Some(&c) = chars.get(i) {
        let exponent_sign = matches!(c, '+' | '-')
            && chars[word_start].is_ascii_digit()
            && matches!(chars.get(i.wrapping_sub(1)), Some('e' | 'E'));
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':') || exponent_sign {
            i += 1;
        } else {
            break;
        }
    }

    let is_call = i > word_start && !chars[word_start].is_ascii_digit() && chars.get(i) == Some(&'(');
    if is_call {
        matching_paren(chars, i) + 1
    } else {
        i
    }
}

fn skip_whitespace(chars: &[char], mut i: usize) -> usize {
    while chars.get(i).is_some_and(|c| c.is_whitespace()) {
        i += 1;
    }
    i
}

/// Index of the `)` closing the `(` at `open`, or the last index when the
/// group is unbalanced (`evalexpr` reports that case).
fn matching_paren(chars: &[char], open: usize) -> usize {
    let mut depth = 0usize;
    for (offset, &c) in chars[open..].iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return open + offset;
                }
            }
            _ => {}
        }
    }
    chars.len().saturating_sub(1)
}

fn context() -> EvalexprResult<HashMapContext> {
    let mut context = HashMapContext::new();
    context.set_builtin_functions_disabled(true)?;
    context.set_value("pi".into(), Value::Float(std::f64::consts::PI))?;
    context.set_value("e".into(), Value::Float(std::f64::consts::E))?;
    for &(name, function) in UNARY_FUNCTIONS {
        context.set_function(
            name.into(),
            Function::new(move |argument| Ok(Value::Float(function(argument.as_number()?)))),
        )?;
    }
    Ok(context)
}

#[allow(clippy::cast_possible_truncation)]
fn format_number(value: f64) -> String {
    if value.abs() > MAX_EXACT_INTEGER {
        format!("{value:e}")
    } else if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Evaluates `expression` and renders the numeric result.
///
/// # Errors
///
/// Returns [`SolverError::Evaluation`] when the expression is empty, uses a
/// character outside the arithmetic subset, fails to parse or evaluate, or
/// produces a non-numeric or non-finite value.
pub fn evaluate(expression: &str) -> Result<String, SolverError> {
    if expression.trim().is_empty() {
        return Err(SolverError::evaluation(expression, "expression is empty"));
    }
    if let Some(bad) = expression.chars().find(|c| !is_allowed(*c)) {
        return Err(SolverError::evaluation(expression, format!("unsupported character {bad:?}")));
    }

    let normalized = normalize(expression);
    tracing::debug!(%expression, %normalized, "evaluating expression");

    let context = context().map_err(|e| SolverError::evaluation(expression, e.to_string()))?;
    let value = eval_with_context(&normalized, &context)
        .map_err(|e| SolverError::evaluation(expression, e.to_string()))?;

    match value {
        Value::Int(int) => Ok(int.to_string()),
        Value::Float(float) if float.is_finite() => Ok(format_number(float)),
        Value::Float(float) => {
            Err(SolverError::evaluation(expression, format!("result is not finite ({float})")))
        }
        other => Err(SolverError::evaluation(expression, format!("result {other} is not a number"))),
    }
}
