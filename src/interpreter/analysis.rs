/// Free-variable analysis of syntax trees, including the expressions
/// embedded in strings.
pub mod free_vars;

/// A deterministic ordering of syntax trees, used to put terms into a
/// canonical order.
pub mod compare;
