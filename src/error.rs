/// Lexing errors.
///
/// Raised when the tokenizer meets a character sequence it cannot match.
pub mod lex_error;
/// Parsing errors.
///
/// Defines all error types that can occur while turning a token sequence into
/// a syntax tree: unbalanced brackets, missing operators or operands, and
/// inconsistent list/dictionary literals.
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during substitution and
/// evaluation, such as unbound variables, unknown functions, failed overload
/// resolution and malformed matrices.
pub mod runtime_error;

pub use lex_error::LexError;
pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;

/// Any error raised while compiling or evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The source text could not be tokenized.
    Lex(LexError),
    /// The token sequence could not be parsed.
    Parse(ParseError),
    /// Substitution or evaluation failed.
    Runtime(RuntimeError),
}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Self::Lex(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<RuntimeError> for Error {
    fn from(e: RuntimeError) -> Self {
        Self::Runtime(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lex(e) => write!(f, "{e}"),
            Self::Parse(e) => write!(f, "{e}"),
            Self::Runtime(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lex(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Runtime(e) => Some(e),
        }
    }
}
