//! # algebrist
//!
//! algebrist is a small, dynamically-typed mathematics expression language.
//! It tokenizes and parses expressions into syntax trees, evaluates them in
//! layered scopes with multiply-dispatched functions, analyses their free
//! variables, orders them canonically, and decides whether two expressions
//! are equivalent by evaluating them at random points.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

/// Defines the structure of parsed expressions.
///
/// This module declares the `Token` and `Tree` types. Every node of a syntax
/// tree is a token (a literal, a name, an operator, a function call, or a
/// list or dictionary constructor) together with its ordered children.
///
/// # Responsibilities
/// - Defines the token tags and their payloads.
/// - Attaches byte offsets to tokens for error reporting.
/// - Renders trees back to surface syntax.
pub mod ast;
/// Provides unified error types for lexing, parsing and evaluation.
///
/// Every failure is classified by kind and carries the byte offset where it
/// happened, together with whatever context (names, arities, argument types)
/// is needed to build a message.
pub mod error;
/// Orchestrates compilation and evaluation of expressions.
///
/// This module ties together the lexer, parser, scopes, evaluator, analyses,
/// value types and the core function library.
///
/// # Responsibilities
/// - Turns source text into syntax trees.
/// - Resolves names and dispatches function calls.
/// - Analyses and compares trees.
pub mod interpreter;
/// General utilities for safe numeric conversion and rounding.
pub mod util;

use crate::{
    error::Error,
    interpreter::{scope::core::Scope, value::core::Value},
};
pub use crate::interpreter::{lexer::tokenize, parser::core::compile, parser::core::parse};

/// Compiles and evaluates `source` in `scope`.
///
/// Empty input evaluates to [`Value::Nothing`].
///
/// # Errors
/// Returns an error if lexing, parsing or evaluation fails.
///
/// # Examples
/// ```
/// use algebrist::{evaluate_str, interpreter::library::core::builtin_scope};
///
/// let mut scope = builtin_scope();
/// scope.set_variable("x", 5.0.into());
/// assert_eq!(evaluate_str("2x + 1", &scope).unwrap(), 11.0.into());
/// assert_eq!(evaluate_str("  ", &scope).unwrap().to_string(), "nothing");
///
/// // No function called `unknown` is registered.
/// assert!(evaluate_str("unknown(1)", &scope).is_err());
/// ```
pub fn evaluate_str(source: &str, scope: &Scope<'_>) -> Result<Value, Error> {
    match compile(source)? {
        Some(tree) => Ok(scope.evaluate(&tree)?),
        None => Ok(Value::Nothing),
    }
}
