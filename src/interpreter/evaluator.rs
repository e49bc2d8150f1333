/// Core evaluation logic.
///
/// Defines `EvalResult`, `EvalOptions` and the tree walk that dispatches on
/// the tag of each node.
pub mod core;

/// Substitution of bound variables into trees.
///
/// A pure transformation which shares every untouched subtree with its
/// input, with per-operator overrides for constructs that bind names.
pub mod substitute;

/// Function and operator calls.
///
/// Hands unevaluated arguments to lazy operators and picks the first
/// matching overload for everything else.
pub mod dispatch;

/// Interpolation of `{expression}` segments into strings.
pub mod interpolate;
