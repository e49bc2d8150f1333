/// Parser configuration and entry points.
///
/// Defines `ParserOptions`, the `Parser` front end, and the `parse` and
/// `compile` helpers that turn text or tokens into a single syntax tree.
pub mod core;

/// The shunting-yard state machine.
///
/// Holds the output and operator stacks together with the per-bracket
/// argument counters, and implements operator and operand handling.
pub mod shunting;

/// Bracket handling for the shunting-yard parser.
///
/// Closing a bracket finishes a function call, a parenthesised group, a list
/// or dictionary literal, or an index expression, depending on how the
/// bracket was opened.
pub mod brackets;
