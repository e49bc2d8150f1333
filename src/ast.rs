use std::{fmt, rc::Rc};

use crate::interpreter::value::core::Value;

/// A lexical unit together with the byte offset it was read from.
///
/// Tokens are produced by the lexer and become the heads of [`Tree`] nodes
/// once parsed. Substitution creates new tokens (carrying the position of the
/// name they replaced), so a position always points somewhere meaningful in
/// the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The tag and payload of the token.
    pub kind: TokenKind,
    /// Byte offset in the source text.
    pub pos:  usize,
}

/// The tag of a [`Token`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A literal or an already evaluated value.
    Literal(Value),
    /// An identifier which has not been resolved yet.
    Name(NameToken),
    /// A call to a named function.
    Function(FunctionToken),
    /// A prefix, postfix or infix operator.
    Op(OpToken),
    /// A list construction node; its children are the elements.
    List,
    /// A dictionary construction node; its children are key-pair nodes.
    Dict,
    /// A `key: value` pair, with the value as the only child.
    KeyPair(String),
    /// Brackets and commas. Only ever produced by the lexer.
    Punctuation(Punctuation),
}

/// Brackets and separators recognised by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuation {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
}

/// An identifier, possibly carrying display annotations such as `vec:x`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameToken {
    /// The identifier as written (case is preserved for display).
    pub name:        String,
    /// Annotations in the order they were written.
    pub annotations: Vec<String>,
}

impl NameToken {
    /// Creates a name without annotations.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self { name:        name.to_string(),
               annotations: Vec::new(), }
    }
    /// The lower-cased name used for scope lookups.
    #[must_use]
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// A function call head.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionToken {
    /// The function name.
    pub name:  String,
    /// The number of arguments the call was parsed with.
    pub arity: usize,
}

/// An operator head.
///
/// Prefix and postfix forms have their own names (`-u`, `fact`), so `name`
/// alone identifies the operator for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpToken {
    /// The canonical operator name.
    pub name:    String,
    /// `1` for prefix and postfix operators, `2` otherwise.
    pub arity:   usize,
    /// Whether the operator was lexed in prefix position.
    pub prefix:  bool,
    /// Whether the operator was lexed in postfix position.
    pub postfix: bool,
}

impl OpToken {
    /// Creates an infix operator of arity 2.
    #[must_use]
    pub fn infix(name: &str) -> Self {
        Self { name:    name.to_string(),
               arity:   2,
               prefix:  false,
               postfix: false, }
    }
    /// Creates a prefix operator of arity 1.
    #[must_use]
    pub fn prefix(name: &str) -> Self {
        Self { name:    name.to_string(),
               arity:   1,
               prefix:  true,
               postfix: false, }
    }
    /// Creates a postfix operator of arity 1.
    #[must_use]
    pub fn postfix(name: &str) -> Self {
        Self { name:    name.to_string(),
               arity:   1,
               prefix:  false,
               postfix: true, }
    }
}

impl Token {
    /// Creates a token at `pos`.
    #[must_use]
    pub const fn new(kind: TokenKind, pos: usize) -> Self {
        Self { kind, pos }
    }
    /// Returns the operator or function name if this token is one.
    #[must_use]
    pub fn call_name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Op(op) => Some(&op.name),
            TokenKind::Function(f) => Some(&f.name),
            _ => None,
        }
    }
    /// Returns `true` for operator and function heads.
    #[must_use]
    pub const fn is_call(&self) -> bool {
        matches!(self.kind, TokenKind::Op(_) | TokenKind::Function(_))
    }
    /// A short name for the token's tag, used in diagnostics and ordering.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match &self.kind {
            TokenKind::Literal(v) => v.type_name(),
            TokenKind::Name(_) => "name",
            TokenKind::Function(_) => "function",
            TokenKind::Op(_) => "op",
            TokenKind::List => "list",
            TokenKind::Dict => "dict",
            TokenKind::KeyPair(_) => "keypair",
            TokenKind::Punctuation(_) => "punctuation",
        }
    }
}

/// A syntax tree: a head token and its ordered children.
///
/// Children are reference counted so that transformations such as
/// substitution can return new trees which share every untouched subtree
/// with the original.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    /// The operator, function or leaf token.
    pub tok:  Token,
    /// Child trees, empty for leaves.
    pub args: Vec<Rc<Self>>,
}

impl Tree {
    /// Creates a leaf.
    #[must_use]
    pub const fn leaf(tok: Token) -> Self {
        Self { tok,
               args: Vec::new() }
    }
    /// Creates a node with children.
    #[must_use]
    pub const fn node(tok: Token, args: Vec<Rc<Self>>) -> Self {
        Self { tok, args }
    }
    /// Creates a literal leaf holding `value`.
    #[must_use]
    pub const fn literal(value: Value, pos: usize) -> Self {
        Self::leaf(Token::new(TokenKind::Literal(value), pos))
    }
    /// Returns the name if this tree is a bare name leaf.
    #[must_use]
    pub fn as_name(&self) -> Option<&NameToken> {
        match &self.tok.kind {
            TokenKind::Name(n) if self.args.is_empty() => Some(n),
            _ => None,
        }
    }
    /// Returns the operator or function name of this node, if any.
    #[must_use]
    pub fn call_name(&self) -> Option<&str> {
        self.tok.call_name()
    }
    /// Returns `true` if this is an operator node with the given name.
    #[must_use]
    pub fn is_op(&self, name: &str) -> bool {
        matches!(&self.tok.kind, TokenKind::Op(op) if op.name == name)
    }
}

/// Binding strength of an operator when printed; used to decide where
/// brackets are needed.
fn display_precedence(tree: &Tree) -> f64 {
    match &tree.tok.kind {
        TokenKind::Op(op) => crate::interpreter::operators::precedence(&op.name),
        TokenKind::Literal(Value::Number(n)) if n.is_negative() || n.is_complex() => 2.5,
        _ => 0.0,
    }
}

fn fmt_operand(f: &mut fmt::Formatter<'_>, child: &Tree, parent: f64, strict: bool) -> fmt::Result {
    let inner = display_precedence(child);
    let needs_brackets = if strict { inner >= parent } else { inner > parent };
    if needs_brackets && inner > 0.0 {
        write!(f, "({child})")
    } else {
        write!(f, "{child}")
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tok.kind {
            TokenKind::Literal(value) => write!(f, "{}", value.to_source()),
            TokenKind::Name(n) => {
                for annotation in &n.annotations {
                    write!(f, "{annotation}:")?;
                }
                write!(f, "{}", n.name)
            },
            TokenKind::Function(func) => {
                write!(f, "{}(", func.name)?;
                write_joined(f, &self.args)?;
                write!(f, ")")
            },
            TokenKind::List => {
                write!(f, "[")?;
                write_joined(f, &self.args)?;
                write!(f, "]")
            },
            TokenKind::Dict => {
                write!(f, "[")?;
                write_joined(f, &self.args)?;
                write!(f, "]")
            },
            TokenKind::KeyPair(key) => {
                write!(f, "{}: ", crate::interpreter::text::quote(key))?;
                write_joined(f, &self.args)
            },
            TokenKind::Punctuation(p) => write!(f, "{p}"),
            TokenKind::Op(op) => {
                let prec = display_precedence(self);
                let symbol = match op.name.as_str() {
                    "+u" => "+",
                    "-u" => "-",
                    "fact" => "!",
                    other => other,
                };
                match self.args.as_slice() {
                    [operand] if op.postfix => {
                        fmt_operand(f, operand, prec, false)?;
                        write!(f, "{symbol}")
                    },
                    [operand] => {
                        if symbol.chars().all(char::is_alphabetic) {
                            write!(f, "{symbol} ")?;
                        } else {
                            write!(f, "{symbol}")?;
                        }
                        fmt_operand(f, operand, prec, false)
                    },
                    [left, right] => {
                        let right_assoc = crate::interpreter::operators::is_right_associative(&op.name);
                        fmt_operand(f, left, prec, right_assoc)?;
                        write!(f, " {symbol} ")?;
                        fmt_operand(f, right, prec, !right_assoc)
                    },
                    args => {
                        write!(f, "{symbol}(")?;
                        write_joined(f, args)?;
                        write!(f, ")")
                    },
                }
            },
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, args: &[Rc<Tree>]) -> fmt::Result {
    for (index, arg) in args.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{arg}")?;
    }
    Ok(())
}

impl fmt::Display for Punctuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Comma => ",",
        };
        write!(f, "{symbol}")
    }
}
