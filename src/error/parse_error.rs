#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur while parsing a token sequence.
pub enum ParseError {
    /// A bracket was opened and never closed, or closed without being opened.
    UnmatchedBracket {
        /// The offending bracket.
        bracket: char,
        /// Byte offset of the bracket.
        pos:     usize,
    },
    /// Two operands were found next to each other with nothing joining them.
    MissingOperator {
        /// Byte offset of the second operand.
        pos: usize,
    },
    /// An operator or function did not have enough operands.
    ArityMismatch {
        /// The operator or function name.
        name:     String,
        /// The number of operands it needs.
        expected: usize,
        /// The number of operands that were available.
        found:    usize,
        /// Byte offset of the operator.
        pos:      usize,
    },
    /// A list literal mixed plain elements with `key: value` pairs.
    MixedListLiteral {
        /// Byte offset of the opening bracket.
        pos: usize,
    },
    /// A pair of parentheses contained nothing.
    EmptyGroup {
        /// Byte offset of the closing parenthesis.
        pos: usize,
    },
    /// The key of a `key: value` pair was not a string or a name.
    InvalidKey {
        /// Byte offset of the colon.
        pos: usize,
    },
    /// A token appeared somewhere it makes no sense.
    UnexpectedToken {
        /// The token, as written.
        token: String,
        /// Byte offset of the token.
        pos:   usize,
    },
    /// There were no tokens to parse.
    EmptyInput,
}

impl ParseError {
    /// The byte offset the error refers to, if any.
    #[must_use]
    pub const fn pos(&self) -> Option<usize> {
        match self {
            Self::UnmatchedBracket { pos, .. }
            | Self::MissingOperator { pos }
            | Self::ArityMismatch { pos, .. }
            | Self::MixedListLiteral { pos }
            | Self::EmptyGroup { pos }
            | Self::InvalidKey { pos }
            | Self::UnexpectedToken { pos, .. } => Some(*pos),
            Self::EmptyInput => None,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnmatchedBracket { bracket, pos } => {
                write!(f, "Error at position {pos}: Unmatched bracket '{bracket}'.")
            },
            Self::MissingOperator { pos } => {
                write!(f, "Error at position {pos}: Expected an operator between two operands.")
            },
            Self::ArityMismatch { name,
                                  expected,
                                  found,
                                  pos, } => write!(f,
                                                   "Error at position {pos}: '{name}' needs {expected} operand(s) but only {found} were given."),
            Self::MixedListLiteral { pos } => write!(f,
                                                     "Error at position {pos}: A list can not mix plain elements with 'key: value' pairs."),
            Self::EmptyGroup { pos } => {
                write!(f, "Error at position {pos}: Empty brackets.")
            },
            Self::InvalidKey { pos } => write!(f,
                                               "Error at position {pos}: A dictionary key must be a string or a name."),
            Self::UnexpectedToken { token, pos } => {
                write!(f, "Error at position {pos}: Unexpected token '{token}'.")
            },
            Self::EmptyInput => write!(f, "Error: Empty expression."),
        }
    }
}

impl std::error::Error for ParseError {}
