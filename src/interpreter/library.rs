/// Entry points for building a scope with the core library.
pub mod core;

/// Arithmetic operators over numbers, strings, lists and vectors.
pub mod arithmetic;

/// Comparison and boolean operators.
pub mod logic;

/// Lazy operators: `if`, `switch`, `and`, `or`, `let`, `map`, `filter`,
/// `isa`, `safe` and `repeat`.
///
/// Each receives its argument trees unevaluated and decides which of them to
/// evaluate, and in which scope.
pub mod control;

/// Constructors, indexing and membership for collections.
pub mod collections;

/// Elementary functions, `random`, and conversion between values and
/// expressions.
pub mod functions;
