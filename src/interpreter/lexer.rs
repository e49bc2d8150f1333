use logos::Logos;
use tracing::trace;

use crate::{
    ast::{NameToken, OpToken, Punctuation, Token, TokenKind},
    error::LexError,
    interpreter::{
        operators::{canonical_function, canonical_op, constant, is_annotation, postfix_form, prefix_form},
        text::unescape_literal,
        value::core::{StringValue, Value},
    },
};

/// A lexeme as matched by the raw scanner, before any disambiguation.
///
/// The raw scanner knows nothing about context: whether `-` is a sign or a
/// subtraction, whether `e` is a constant, or whether two operands are
/// implicitly multiplied is decided afterwards by [`tokenize`].
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum RawToken {
    /// Numeric literals such as `3`, `3.14` or `.5`.
    #[regex(r"[0-9]+\.[0-9]+", parse_float)]
    #[regex(r"\.[0-9]+", parse_float)]
    #[regex(r"[0-9]+", parse_float)]
    Number(f64),
    /// `true` or `false`.
    #[token("true", parse_bool)]
    #[token("false", parse_bool)]
    Bool(bool),
    /// A string in double or single quotes, already unescaped.
    #[token("\"", lex_string)]
    #[token("'", lex_string)]
    Str(String),
    /// Symbolic, word-like and unicode operators, as written.
    #[token("+", slice)]
    #[token("-", slice)]
    #[token("*", slice)]
    #[token("/", slice)]
    #[token("^", slice)]
    #[token("<", slice)]
    #[token(">", slice)]
    #[token("<=", slice)]
    #[token(">=", slice)]
    #[token("<>", slice)]
    #[token("=", slice)]
    #[token("==", slice)]
    #[token("!=", slice)]
    #[token("!", slice)]
    #[token("&", slice)]
    #[token("&&", slice)]
    #[token("||", slice)]
    #[token("|", slice)]
    #[token("..", slice)]
    #[token("#", slice)]
    #[token("×", slice)]
    #[token("÷", slice)]
    #[token("≤", slice)]
    #[token("≥", slice)]
    #[token("≠", slice)]
    #[token("∧", slice)]
    #[token("∨", slice)]
    #[token("¬", slice)]
    #[token("∈", slice)]
    #[token("⟹", slice)]
    #[token("and", slice)]
    #[token("or", slice)]
    #[token("xor", slice)]
    #[token("not", slice)]
    #[token("isa", slice)]
    #[token("except", slice)]
    #[token("in", slice)]
    #[token("divides", slice)]
    #[token("implies", slice)]
    Op(String),
    /// Identifiers, optionally starting with `$` and ending in primes.
    #[regex(r"\$?[a-zA-Z_][a-zA-Z0-9_]*'*", slice)]
    #[token("π", slice)]
    #[token("∞", slice)]
    Ident(String),
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `,`
    #[token(",")]
    Comma,
    /// `:`
    #[token(":")]
    Colon,
    /// `// Comments.`
    #[token("//", skip_line_comment)]
    Comment,
    /// Spaces, tabs and newlines.
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    Ignored,
}

fn parse_float(lex: &logos::Lexer<RawToken>) -> Option<f64> {
    lex.slice().parse().ok()
}

fn parse_bool(lex: &logos::Lexer<RawToken>) -> Option<bool> {
    match lex.slice() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn slice(lex: &logos::Lexer<RawToken>) -> String {
    lex.slice().to_string()
}

/// Consumes a string body up to the matching quote.
///
/// # Returns
/// - `Some(String)`: The unescaped body, with `\{` and `\}` left escaped.
/// - `None`: If the string is never closed.
fn lex_string(lex: &mut logos::Lexer<RawToken>) -> Option<String> {
    let quote = lex.slice().chars().next()?;
    let rest = lex.remainder();
    let mut escaped = false;

    for (offset, c) in rest.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            let value = unescape_literal(&rest[..offset]);
            lex.bump(offset + c.len_utf8());
            return Some(value);
        }
    }
    None
}

fn skip_line_comment(lex: &mut logos::Lexer<RawToken>) -> logos::Skip {
    let rest = lex.remainder();
    lex.bump(rest.find('\n').unwrap_or(rest.len()));
    logos::Skip
}

type Lexeme = (RawToken, std::ops::Range<usize>);

/// Runs the raw scanner over the whole source.
fn scan(source: &str) -> Result<Vec<Lexeme>, LexError> {
    let mut lexer = RawToken::lexer(source);
    let mut lexemes = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(raw) => lexemes.push((raw, lexer.span())),
            Err(()) => return Err(LexError::at(source, lexer.span().start)),
        }
    }
    Ok(lexemes)
}

/// Reads a name starting at `raw[start]`, absorbing any `annotation:`
/// prefixes written directly against it.
///
/// # Returns
/// The name and the index of the first lexeme after it.
fn read_name(raw: &[Lexeme], start: usize) -> (NameToken, usize) {
    let mut annotations = Vec::new();
    let mut i = start;

    loop {
        if let (Some((RawToken::Ident(ann), ann_span)),
                Some((RawToken::Colon, colon_span)),
                Some((RawToken::Ident(_), name_span))) = (raw.get(i), raw.get(i + 1), raw.get(i + 2))
           && is_annotation(ann)
           && ann_span.end == colon_span.start
           && colon_span.end == name_span.start
        {
            annotations.push(ann.clone());
            i += 2;
        } else {
            break;
        }
    }

    let name = match raw.get(i) {
        Some((RawToken::Ident(name), _)) => name.clone(),
        _ => String::new(),
    };
    (NameToken { name, annotations }, i + 1)
}

/// Returns `true` if an operator following `prev` is in prefix position.
fn in_prefix_position(prev: Option<&Token>) -> bool {
    match prev.map(|t| &t.kind) {
        None | Some(TokenKind::KeyPair(_)) => true,
        Some(TokenKind::Punctuation(p)) => {
            matches!(p, Punctuation::LParen | Punctuation::LBracket | Punctuation::Comma)
        },
        Some(TokenKind::Op(op)) => !op.postfix,
        _ => false,
    }
}

/// Returns `true` if `prev` can be the left factor of an implicit product.
fn ends_operand(prev: &Token) -> bool {
    match &prev.kind {
        TokenKind::Literal(Value::Number(_)) | TokenKind::Name(_) => true,
        TokenKind::Punctuation(Punctuation::RParen | Punctuation::RBracket) => true,
        TokenKind::Op(op) => op.postfix,
        _ => false,
    }
}

/// Returns `true` if `kind` can be the right factor of an implicit product.
const fn starts_operand(kind: &TokenKind) -> bool {
    matches!(kind,
             TokenKind::Literal(Value::Number(_))
             | TokenKind::Name(_)
             | TokenKind::Punctuation(Punctuation::LParen))
}

/// Converts source text into tokens.
///
/// After raw scanning, each lexeme is disambiguated against its neighbours:
/// operator synonyms are resolved, `ann:name` annotations are attached,
/// constants such as `pi` become numbers, operators are given their prefix,
/// postfix or infix form, and `*` is inserted between juxtaposed operands.
///
/// # Errors
/// Returns a [`LexError`] at the first character no lexeme matches, or at
/// the opening quote of an unterminated string.
///
/// # Example
/// ```
/// use algebrist::{ast::TokenKind, interpreter::lexer::tokenize};
///
/// let tokens = tokenize("2x!").unwrap();
/// let names: Vec<String> = tokens.iter()
///                                .map(|t| match &t.kind {
///                                    TokenKind::Op(op) => op.name.clone(),
///                                    _ => t.tag().to_string(),
///                                })
///                                .collect();
/// assert_eq!(names, ["number", "*", "name", "fact"]);
/// ```
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let raw = scan(source)?;
    let mut tokens: Vec<Token> = Vec::with_capacity(raw.len());
    let mut prev_numeral = false;
    let mut i = 0;

    while i < raw.len() {
        let (lexeme, span) = &raw[i];
        let pos = span.start;
        let mut numeral = false;

        let kind = match lexeme {
            RawToken::Number(n) => {
                numeral = true;
                i += 1;
                TokenKind::Literal(Value::from(*n))
            },
            RawToken::Bool(b) => {
                i += 1;
                TokenKind::Literal(Value::Boolean(*b))
            },
            RawToken::Str(s) => {
                i += 1;
                TokenKind::Literal(Value::String(StringValue { value: s.clone(),
                                                               safe:  false, }))
            },
            RawToken::Ident(_) => {
                let (mut name, next) = read_name(&raw, i);
                i = next;
                let called = matches!(raw.get(i), Some((RawToken::LParen, _)));
                if called {
                    name.name = canonical_function(&name.name).to_string();
                    TokenKind::Name(name)
                } else if name.annotations.is_empty()
                          && let Some(n) = constant(&name.key())
                {
                    TokenKind::Literal(Value::Number(n))
                } else {
                    TokenKind::Name(name)
                }
            },
            RawToken::Op(symbol) => {
                i += 1;
                let op = canonical_op(symbol);
                let token = if in_prefix_position(tokens.last()) {
                    prefix_form(op).map_or_else(|| OpToken::infix(op), OpToken::prefix)
                } else {
                    postfix_form(op).map_or_else(|| OpToken::infix(op), OpToken::postfix)
                };
                TokenKind::Op(token)
            },
            RawToken::LParen => {
                i += 1;
                TokenKind::Punctuation(Punctuation::LParen)
            },
            RawToken::RParen => {
                i += 1;
                TokenKind::Punctuation(Punctuation::RParen)
            },
            RawToken::LBracket => {
                i += 1;
                TokenKind::Punctuation(Punctuation::LBracket)
            },
            RawToken::RBracket => {
                i += 1;
                TokenKind::Punctuation(Punctuation::RBracket)
            },
            RawToken::Comma => {
                i += 1;
                TokenKind::Punctuation(Punctuation::Comma)
            },
            RawToken::Colon => {
                i += 1;
                TokenKind::KeyPair(String::new())
            },
            RawToken::Comment | RawToken::Ignored => {
                i += 1;
                continue;
            },
        };

        if let Some(prev) = tokens.last()
           && ends_operand(prev)
           && starts_operand(&kind)
           && !(matches!(prev.kind, TokenKind::Name(_))
                && matches!(kind, TokenKind::Punctuation(Punctuation::LParen)))
           && !(prev_numeral && numeral)
        {
            tokens.push(Token::new(TokenKind::Op(OpToken::infix("*")), pos));
        }

        tokens.push(Token::new(kind, pos));
        prev_numeral = numeral;
    }

    trace!(count = tokens.len(), "tokenized");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(source: &str) -> Vec<String> {
        tokenize(source).unwrap()
                        .into_iter()
                        .filter_map(|t| match t.kind {
                            TokenKind::Op(op) => Some(op.name),
                            _ => None,
                        })
                        .collect()
    }

    #[test]
    fn minus_is_unary_after_operators_and_brackets() {
        assert_eq!(ops("-x"), ["-u"]);
        assert_eq!(ops("1 - -x"), ["-", "-u"]);
        assert_eq!(ops("(-x)"), ["-u"]);
        assert_eq!(ops("[1, -2]"), ["-u"]);
    }

    #[test]
    fn bang_is_factorial_after_operand_and_not_before() {
        assert_eq!(ops("-x!"), ["-u", "fact"]);
        assert_eq!(ops("!x"), ["not"]);
    }

    #[test]
    fn synonyms_are_resolved() {
        assert_eq!(ops("a && b || c"), ["and", "or"]);
        assert_eq!(ops("a == b != c"), ["=", "<>"]);
        assert_eq!(ops("2 divides 4"), ["|"]);
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(ops("2x"), ["*"]);
        assert_eq!(ops("(a)(b)"), ["*"]);
        assert_eq!(ops("x y"), ["*"]);
        assert_eq!(ops("2pi"), ["*"]);
        assert_eq!(ops("f(x)"), Vec::<String>::new());
        assert_eq!(ops("x! y"), ["fact", "*"]);
    }

    #[test]
    fn closing_brackets_multiply_but_indexing_does_not() {
        assert_eq!(ops("[1, 2] x"), ["*"]);
        assert_eq!(ops("[1, 2](x)"), ["*"]);
        assert_eq!(ops("[1, 2][0]"), Vec::<String>::new());
        assert_eq!(ops("xs[0] 2"), ["*"]);
    }

    #[test]
    fn adjacent_numerals_are_not_multiplied() {
        assert_eq!(ops("1 2"), Vec::<String>::new());
    }

    #[test]
    fn constants_fold_unless_called() {
        let tokens = tokenize("pi").unwrap();
        assert!(matches!(tokens[0].kind, TokenKind::Literal(Value::Number(_))));

        let tokens = tokenize("e(1)").unwrap();
        assert!(matches!(&tokens[0].kind, TokenKind::Name(n) if n.name == "e"));
    }

    #[test]
    fn annotations_attach_to_names() {
        let tokens = tokenize("vec:x + dict:y").unwrap();
        let TokenKind::Name(name) = &tokens[0].kind else { panic!("expected a name") };
        assert_eq!(name.annotations, ["vec"]);
        assert_eq!(name.name, "x");
        assert!(matches!(tokens[3].kind, TokenKind::KeyPair(_)));
    }

    #[test]
    fn strings_keep_brace_escapes() {
        let tokens = tokenize(r#""a\"b\{c\}" 'd'"#).unwrap();
        assert!(matches!(&tokens[0].kind,
                         TokenKind::Literal(Value::String(s)) if s.value == "a\"b\\{c\\}"));
        assert!(matches!(&tokens[1].kind,
                         TokenKind::Literal(Value::String(s)) if s.value == "d"));
    }

    #[test]
    fn comments_and_function_synonyms() {
        let tokens = tokenize("sqr(4) // trailing").unwrap();
        assert_eq!(tokens.len(), 4);
        assert!(matches!(&tokens[0].kind, TokenKind::Name(n) if n.name == "sqrt"));
    }

    #[test]
    fn unknown_character_is_reported() {
        let err = tokenize("1 + @foo").unwrap_err();
        assert_eq!(err.pos, 4);
        assert_eq!(err.near, "@foo");

        let err = tokenize("\"open").unwrap_err();
        assert_eq!(err.pos, 0);
    }
}
