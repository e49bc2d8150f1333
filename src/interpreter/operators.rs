//! Static lookup tables describing operators, synonyms and special names.
//!
//! Everything here is immutable and built at compile time with `phf`; the
//! lexer, parser, evaluator and analysis passes all consult the same tables.

use std::f64::consts::{E, PI};

use phf::{phf_map, phf_set};

use crate::interpreter::value::{complex::ComplexNumber, number::Number};

/// Binding strength of each operator. Lower numbers bind tighter.
static PRECEDENCE: phf::Map<&'static str, f64> = phf_map! {
    "fact" => 1.0,
    "not" => 1.0,
    "^" => 2.0,
    "+u" => 2.5,
    "-u" => 2.5,
    "*" => 3.0,
    "/" => 3.0,
    "+" => 4.0,
    "-" => 4.0,
    "|" => 5.0,
    ".." => 5.0,
    "#" => 6.0,
    "except" => 6.5,
    "in" => 6.5,
    "<" => 7.0,
    ">" => 7.0,
    "<=" => 7.0,
    ">=" => 7.0,
    "<>" => 8.0,
    "=" => 8.0,
    "isa" => 9.0,
    "and" => 11.0,
    "or" => 12.0,
    "xor" => 13.0,
    "implies" => 14.0,
};

/// Precedence given to `key: value` pairs, looser than every operator.
pub const KEYPAIR_PRECEDENCE: f64 = 100.0;

static RIGHT_ASSOCIATIVE: phf::Set<&'static str> = phf_set! { "^", "+u", "-u" };

/// Alternative spellings of operators.
static OP_SYNONYMS: phf::Map<&'static str, &'static str> = phf_map! {
    "&" => "and",
    "&&" => "and",
    "∧" => "and",
    "||" => "or",
    "∨" => "or",
    "¬" => "not",
    "==" => "=",
    "!=" => "<>",
    "≠" => "<>",
    "≤" => "<=",
    "≥" => ">=",
    "×" => "*",
    "÷" => "/",
    "∈" => "in",
    "divides" => "|",
    "⟹" => "implies",
};

/// The operator used when an operator appears in prefix position.
static PREFIX_FORMS: phf::Map<&'static str, &'static str> = phf_map! {
    "+" => "+u",
    "-" => "-u",
    "!" => "not",
    "not" => "not",
};

/// The operator used when an operator appears in postfix position.
static POSTFIX_FORMS: phf::Map<&'static str, &'static str> = phf_map! {
    "!" => "fact",
};

/// Alternative spellings of function names.
static FUNCTION_SYNONYMS: phf::Map<&'static str, &'static str> = phf_map! {
    "sqr" => "sqrt",
    "sgn" => "sign",
    "len" => "abs",
    "length" => "abs",
    "gcf" => "gcd",
    "verb" => "verbatim",
};

/// Annotations which may prefix a name, as in `vec:x`.
static ANNOTATIONS: phf::Set<&'static str> = phf_set! {
    "vec", "unit", "dot", "bar", "hat", "m", "matrix", "v", "verb", "op",
    "fn", "sub", "sup", "diff", "partial", "tilde", "prime",
};

/// Operators and functions which receive their arguments unevaluated.
static LAZY_OPS: phf::Set<&'static str> = phf_set! {
    "if", "switch", "and", "or", "let", "map", "filter", "isa", "safe", "repeat",
};

/// How an operator or function binds names in its own arguments.
///
/// Substitution and free-variable analysis consult the same table, so a name
/// bound by `map` is neither replaced by an outer value nor reported as free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// `map(expr, names, collection)` and `filter`: `names` are bound in
    /// `expr`, and only `collection` sees the outer scope.
    Map,
    /// `let(name, value, ..., body)`: each name is bound in the following
    /// values and in the body.
    Let,
    /// Only the first argument is an expression; the rest are left alone.
    FirstOnly,
    /// No argument is an expression.
    Opaque,
}

static BINDINGS: phf::Map<&'static str, Binding> = phf_map! {
    "map" => Binding::Map,
    "filter" => Binding::Map,
    "let" => Binding::Let,
    "isa" => Binding::FirstOnly,
    "safe" => Binding::Opaque,
};

/// Named constants, folded into numbers by the lexer.
static CONSTANTS: phf::Map<&'static str, (f64, f64)> = phf_map! {
    "pi" => (PI, 0.0),
    "π" => (PI, 0.0),
    "e" => (E, 0.0),
    "i" => (0.0, 1.0),
    "infinity" => (f64::INFINITY, 0.0),
    "infty" => (f64::INFINITY, 0.0),
    "∞" => (f64::INFINITY, 0.0),
};

/// Precedence of `op`; unknown operators bind as loosely as comparisons.
#[must_use]
pub fn precedence(op: &str) -> f64 {
    PRECEDENCE.get(op).copied().unwrap_or(7.0)
}

/// Returns `true` for `^` and the unary signs.
#[must_use]
pub fn is_right_associative(op: &str) -> bool {
    RIGHT_ASSOCIATIVE.contains(op)
}

/// Resolves an operator synonym, returning the canonical spelling.
///
/// # Example
/// ```
/// use algebrist::interpreter::operators::canonical_op;
///
/// assert_eq!(canonical_op("&&"), "and");
/// assert_eq!(canonical_op("+"), "+");
/// ```
#[must_use]
pub fn canonical_op(op: &str) -> &str {
    OP_SYNONYMS.get(op).copied().unwrap_or(op)
}

/// The prefix form of `op`, if it has one.
#[must_use]
pub fn prefix_form(op: &str) -> Option<&'static str> {
    PREFIX_FORMS.get(op).copied()
}

/// The postfix form of `op`, if it has one.
#[must_use]
pub fn postfix_form(op: &str) -> Option<&'static str> {
    POSTFIX_FORMS.get(op).copied()
}

/// Resolves a function-name synonym.
#[must_use]
pub fn canonical_function(name: &str) -> &str {
    FUNCTION_SYNONYMS.get(name.to_lowercase().as_str()).copied().unwrap_or(name)
}

/// Returns `true` if `name` can be used as a name annotation.
#[must_use]
pub fn is_annotation(name: &str) -> bool {
    ANNOTATIONS.contains(name)
}

/// Returns `true` if the named operator or function controls the evaluation
/// of its own arguments.
#[must_use]
pub fn is_lazy(name: &str) -> bool {
    LAZY_OPS.contains(name)
}

/// The value of a named constant.
#[must_use]
pub fn constant(name: &str) -> Option<Number> {
    CONSTANTS.get(name).map(|&(re, im)| {
                           if im == 0.0 {
                               Number::Real(re)
                           } else {
                               Number::Complex(ComplexNumber::new(re, im))
                           }
                       })
}

/// The binding behaviour of `name`, if it differs from plain recursion.
#[must_use]
pub fn binding(name: &str) -> Option<Binding> {
    BINDINGS.get(name).copied()
}
