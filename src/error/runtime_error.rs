#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can occur during substitution and evaluation.
pub enum RuntimeError {
    /// A name had no binding and unbound names were not allowed.
    UnboundVariable {
        /// The name of the variable.
        name: String,
        /// Byte offset of the name.
        pos:  usize,
    },
    /// Called a function or operator which is not defined in any scope.
    UnknownFunction {
        /// The name of the function.
        name:       String,
        /// Byte offset of the call.
        pos:        usize,
        /// The call rewritten as an implicit product, such as `x*tan`, when
        /// the name minus its first character is a function accepting the
        /// same arguments.
        suggestion: Option<String>,
    },
    /// No overload of a function accepted the argument types.
    NoMatchingOverload {
        /// The name of the function.
        name:       String,
        /// The types of the arguments that were supplied.
        arguments:  Vec<String>,
        /// Byte offset of the call.
        pos:        usize,
        /// See [`RuntimeError::UnknownFunction`].
        suggestion: Option<String>,
    },
    /// The rows of a matrix did not have matching lengths.
    MalformedMatrix {
        /// What was wrong with the rows.
        details: String,
        /// Byte offset of the construction.
        pos:     usize,
    },
    /// A value had an unexpected or incompatible type.
    TypeError {
        /// Details about the type mismatch.
        details: String,
        /// Byte offset where the error occurred.
        pos:     usize,
    },
    /// An argument was invalid or out of range.
    InvalidArgument {
        /// Details about why the argument is invalid.
        details: String,
        /// Byte offset where the error occurred.
        pos:     usize,
    },
    /// Tried to access a list element outside the allowed bounds.
    IndexOutOfBounds {
        /// The index that was requested.
        index:  i64,
        /// The length of the collection.
        length: usize,
        /// Byte offset where the error occurred.
        pos:    usize,
    },
    /// Tried to use a real number where an integer was required.
    RealIsFractional {
        /// Byte offset where the error occurred.
        pos: usize,
    },
    /// A number was too large to be converted safely.
    LiteralTooLarge {
        /// Byte offset where the error occurred.
        pos: usize,
    },
    /// An expression embedded in a string, or passed to `expression`, did
    /// not compile.
    EmbeddedSyntax {
        /// The embedded source text.
        source:  String,
        /// The compile error message.
        message: String,
        /// Byte offset of the string.
        pos:     usize,
    },
}

impl RuntimeError {
    /// The byte offset the error refers to.
    #[must_use]
    pub const fn pos(&self) -> usize {
        match self {
            Self::UnboundVariable { pos, .. }
            | Self::UnknownFunction { pos, .. }
            | Self::NoMatchingOverload { pos, .. }
            | Self::MalformedMatrix { pos, .. }
            | Self::TypeError { pos, .. }
            | Self::InvalidArgument { pos, .. }
            | Self::IndexOutOfBounds { pos, .. }
            | Self::RealIsFractional { pos }
            | Self::LiteralTooLarge { pos }
            | Self::EmbeddedSyntax { pos, .. } => *pos,
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnboundVariable { name, pos } => {
                write!(f, "Error at position {pos}: Variable '{name}' is not defined.")
            },
            Self::UnknownFunction { name,
                                    pos,
                                    suggestion, } => {
                write!(f, "Error at position {pos}: Unknown function '{name}'.")?;
                if let Some(s) = suggestion {
                    write!(f, " Did you mean '{s}(...)'?")?;
                }
                Ok(())
            },
            Self::NoMatchingOverload { name,
                                       arguments,
                                       pos,
                                       suggestion, } => {
                write!(f,
                       "Error at position {pos}: No definition of '{name}' accepts arguments of type ({}).",
                       arguments.join(", "))?;
                if let Some(s) = suggestion {
                    write!(f, " Did you mean '{s}(...)'?")?;
                }
                Ok(())
            },
            Self::MalformedMatrix { details, pos } => {
                write!(f, "Error at position {pos}: Malformed matrix: {details}.")
            },
            Self::TypeError { details, pos } => {
                write!(f, "Error at position {pos}: Type error: {details}.")
            },
            Self::InvalidArgument { details, pos } => {
                write!(f, "Error at position {pos}: Invalid argument: {details}.")
            },
            Self::IndexOutOfBounds { index, length, pos } => write!(f,
                                                                    "Error at position {pos}: Index {index} is out of bounds for a collection of length {length}."),
            Self::RealIsFractional { pos } => write!(f,
                                                     "Error at position {pos}: Value is fractional and cannot be used as an integer."),
            Self::LiteralTooLarge { pos } => {
                write!(f, "Error at position {pos}: Number is too large.")
            },
            Self::EmbeddedSyntax { source, message, pos } => write!(f,
                                                                     "Error at position {pos}: Could not compile embedded expression '{source}': {message}"),
        }
    }
}

impl std::error::Error for RuntimeError {}
