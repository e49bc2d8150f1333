/// The lexer module tokenizes source text for further parsing.
///
/// A `logos` lexer produces raw lexemes, and a second pass resolves what
/// depends on context: operator synonyms, prefix and postfix forms, name
/// annotations, constants, and implicit multiplication.
///
/// # Responsibilities
/// - Converts the input text into tokens with byte offsets.
/// - Unescapes string literals.
/// - Reports lexical errors with the text near the failure.
pub mod lexer;
/// Static tables describing operators and special names.
pub mod operators;
/// The parser module builds syntax trees from tokens.
///
/// A shunting-yard parser with per-bracket argument counting, which also
/// handles function calls, list and dictionary literals, and indexing.
///
/// # Responsibilities
/// - Converts tokens into trees whose operator nodes have exactly as many
///   children as their arity.
/// - Validates bracket nesting and operand counts, reporting errors with
///   their position.
pub mod parser;
/// Layered evaluation environments and function descriptors.
///
/// # Responsibilities
/// - Resolves variables, function overloads and rulesets through a chain of
///   frames, honouring deletions.
/// - Describes registered functions: signature, body and randomness.
pub mod scope;
/// The evaluator module computes the value of syntax trees.
///
/// # Responsibilities
/// - Substitutes bound names into trees without mutating them.
/// - Dispatches operators and functions, lazily where the operator asks for
///   it.
/// - Interpolates expressions embedded in strings.
pub mod evaluator;
/// Static analyses of syntax trees.
pub mod analysis;
/// Escaping of strings and splitting of interpolated text.
pub mod text;
/// The value module defines the runtime data types for evaluation.
///
/// # Responsibilities
/// - Defines the `Value` enum and its `Kind` tags.
/// - Implements real and complex numbers, matrices and ranges.
/// - Provides checked extraction of typed payloads.
pub mod value;
/// The core function library, registered through the same interface a host
/// application would use.
pub mod library;
/// Randomised equivalence checking of expressions.
pub mod checking;
