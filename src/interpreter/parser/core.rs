use std::rc::Rc;

use tracing::debug;

use crate::{
    ast::{Token, Tree},
    error::{Error, ParseError},
    interpreter::{lexer::tokenize, parser::shunting::ShuntingYard},
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Switches which relax the parser's handling of incomplete input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Close any `(` still open at the end of the input instead of failing.
    pub close_missing_brackets: bool,
    /// Fill missing operands with `nothing` instead of failing.
    pub add_missing_arguments:  bool,
}

/// Builds syntax trees from token sequences.
///
/// # Example
/// ```
/// use algebrist::interpreter::{
///     lexer::tokenize,
///     parser::core::{Parser, ParserOptions},
/// };
///
/// let tokens = tokenize("(1+2").unwrap();
/// assert!(Parser::default().parse(&tokens).is_err());
///
/// let lenient = Parser::new(ParserOptions { close_missing_brackets: true,
///                                           ..ParserOptions::default() });
/// assert_eq!(lenient.parse(&tokens).unwrap().to_string(), "1 + 2");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    options: ParserOptions,
}

impl Parser {
    /// Creates a parser with the given options.
    #[must_use]
    pub const fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Parses a token sequence into exactly one tree.
    ///
    /// # Errors
    /// - `EmptyInput` if there are no tokens.
    /// - `UnmatchedBracket`, `MissingOperator`, `ArityMismatch`,
    ///   `MixedListLiteral`, `EmptyGroup`, `InvalidKey` or `UnexpectedToken`
    ///   for malformed input.
    pub fn parse(&self, tokens: &[Token]) -> ParseResult<Rc<Tree>> {
        let mut machine = ShuntingYard::new(self.options);
        for (index, token) in tokens.iter().enumerate() {
            let prev = index.checked_sub(1).and_then(|i| tokens.get(i));
            machine.push(token, prev, tokens.get(index + 1))?;
        }
        let end = tokens.last().map_or(0, |t| t.pos);
        let tree = machine.finish(end)?;
        debug!(tree = %tree, "parsed");
        Ok(tree)
    }
}

/// Parses a token sequence with the default options.
///
/// # Example
/// ```
/// use algebrist::interpreter::{lexer::tokenize, parser::core::parse};
///
/// let tree = parse(&tokenize("1+2*3").unwrap()).unwrap();
/// assert_eq!(tree.call_name(), Some("+"));
/// ```
pub fn parse(tokens: &[Token]) -> ParseResult<Rc<Tree>> {
    Parser::default().parse(tokens)
}

/// Tokenizes and parses `source` with the given options.
///
/// # Returns
/// - `Ok(None)` if `source` contains no tokens (only whitespace or
///   comments).
/// - `Ok(Some(tree))` otherwise.
pub fn compile_with(source: &str, options: ParserOptions) -> Result<Option<Rc<Tree>>, Error> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Ok(None);
    }
    Ok(Some(Parser::new(options).parse(&tokens)?))
}

/// Tokenizes and parses `source` with the default options.
///
/// # Example
/// ```
/// use algebrist::interpreter::parser::core::compile;
///
/// assert!(compile("   ").unwrap().is_none());
/// assert!(compile("x + 1").unwrap().is_some());
/// assert!(compile("x +* 1").is_err());
/// ```
pub fn compile(source: &str) -> Result<Option<Rc<Tree>>, Error> {
    compile_with(source, ParserOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TokenKind;

    fn tree(source: &str) -> Rc<Tree> {
        compile(source).unwrap().unwrap()
    }

    fn parse_error(source: &str) -> ParseError {
        match compile(source) {
            Err(Error::Parse(e)) => e,
            other => panic!("expected a parse error for {source:?}, got {other:?}"),
        }
    }

    fn assert_arity_invariant(tree: &Tree) {
        match &tree.tok.kind {
            TokenKind::Op(op) => assert_eq!(tree.args.len(), op.arity, "{tree}"),
            TokenKind::Function(f) => assert_eq!(tree.args.len(), f.arity, "{tree}"),
            TokenKind::KeyPair(_) => assert_eq!(tree.args.len(), 1),
            _ => {},
        }
        for arg in &tree.args {
            assert_arity_invariant(arg);
        }
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(tree("1+2*3").to_string(), "1 + 2 * 3");
        assert_eq!(tree("(1+2)*3").to_string(), "(1 + 2) * 3");
        assert_eq!(tree("1-2-3").to_string(), "1 - 2 - 3");
        assert_eq!(tree("1-(2-3)").to_string(), "1 - (2 - 3)");
        assert_eq!(tree("2^3^2").to_string(), "2 ^ 3 ^ 2");
        assert_eq!(tree("(2^3)^2").to_string(), "(2 ^ 3) ^ 2");
    }

    #[test]
    fn unary_minus_and_factorial() {
        let t = tree("-x!");
        assert!(t.is_op("-u"));
        assert!(t.args[0].is_op("fact"));

        let t = tree("-x^2");
        assert!(t.is_op("-u"));
        assert!(t.args[0].is_op("^"));

        let t = tree("2^-x");
        assert!(t.is_op("^"));
        assert!(t.args[1].is_op("-u"));
    }

    #[test]
    fn function_calls_record_their_arity() {
        let t = tree("f(1, g(2, 3), h())");
        assert_eq!(t.call_name(), Some("f"));
        assert_eq!(t.args.len(), 3);
        assert_eq!(t.args[1].args.len(), 2);
        assert!(t.args[2].args.is_empty());
    }

    #[test]
    fn lists_dicts_and_indexing() {
        let t = tree("[1, 2, 3]");
        assert!(matches!(t.tok.kind, TokenKind::List));
        assert_eq!(t.args.len(), 3);

        let t = tree("[]");
        assert!(matches!(t.tok.kind, TokenKind::List));
        assert!(t.args.is_empty());

        let t = tree("[\"a\": 1, b: 2]");
        assert!(matches!(t.tok.kind, TokenKind::Dict));
        assert!(matches!(&t.args[1].tok.kind, TokenKind::KeyPair(k) if k == "b"));

        let t = tree("[1, 2][0]");
        assert_eq!(t.call_name(), Some("listval"));
        assert!(matches!(t.args[0].tok.kind, TokenKind::List));

        let t = tree("2 * x[1]");
        assert!(t.is_op("*"));
        assert_eq!(t.args[1].call_name(), Some("listval"));
    }

    #[test]
    fn every_node_has_its_declared_arity() {
        for source in ["1+2*3-4/5^6", "-x! + not y", "f(a, [1, [2, 3]], [\"k\": -1])", "x[1][2] + (a)(b)"] {
            assert_arity_invariant(&tree(source));
        }
    }

    #[test]
    fn malformed_input() {
        assert!(matches!(parse_error("(1+2"), ParseError::UnmatchedBracket { bracket: '(', .. }));
        assert!(matches!(parse_error("1+2)"), ParseError::UnmatchedBracket { bracket: ')', .. }));
        assert!(matches!(parse_error("[1, 2"), ParseError::UnmatchedBracket { bracket: '[', .. }));
        assert!(matches!(parse_error("1 2"), ParseError::MissingOperator { .. }));
        assert!(matches!(parse_error("(1, 2)"), ParseError::MissingOperator { .. }));
        assert!(matches!(parse_error("()"), ParseError::EmptyGroup { .. }));
        assert!(matches!(parse_error("[1, \"a\": 2]"), ParseError::MixedListLiteral { .. }));
        assert!(matches!(parse_error("[1 + 2: 3]"), ParseError::InvalidKey { .. }));
        assert!(matches!(parse_error("1 +"),
                         ParseError::ArityMismatch { expected: 2, found: 1, .. }));
        assert!(matches!(parse_error("1, 2"), ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn lenient_options() {
        let options = ParserOptions { close_missing_brackets: true,
                                      add_missing_arguments:  true, };
        let t = compile_with("f(1, (2", options).unwrap().unwrap();
        assert_eq!(t.to_string(), "f(1, 2)");

        let t = compile_with("1 +", options).unwrap().unwrap();
        assert_eq!(t.to_string(), "1 + nothing");

        assert!(compile_with("[1", options).is_err());
    }
}
