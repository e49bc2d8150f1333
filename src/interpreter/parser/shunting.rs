use std::rc::Rc;

use crate::{
    ast::{FunctionToken, Punctuation, Token, TokenKind, Tree},
    error::ParseError,
    interpreter::{
        operators::{KEYPAIR_PRECEDENCE, is_right_associative, precedence},
        parser::core::{ParseResult, ParserOptions},
        value::core::Value,
    },
};

/// What a `[` opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketMode {
    /// A list or dictionary literal.
    NewList,
    /// An index into the preceding operand.
    Index,
}

/// The state of the shunting-yard algorithm.
///
/// `numvars`, `olength` and `listmode` are parallel to the open brackets on
/// `stack`: for each one they record the commas seen so far and the length of
/// `output` when it was opened, and for `[` whether it is an index.
#[derive(Debug)]
pub struct ShuntingYard {
    pub(super) options:  ParserOptions,
    pub(super) output:   Vec<Rc<Tree>>,
    pub(super) stack:    Vec<Token>,
    pub(super) numvars:  Vec<usize>,
    pub(super) olength:  Vec<usize>,
    pub(super) listmode: Vec<BracketMode>,
}

/// The binding strength of an entry on the operator stack, or `None` for
/// brackets and pending function calls, which stop the popping of operators.
fn stack_precedence(tok: &Token) -> Option<f64> {
    match &tok.kind {
        TokenKind::Op(op) => Some(precedence(&op.name)),
        TokenKind::KeyPair(_) => Some(KEYPAIR_PRECEDENCE),
        _ => None,
    }
}

/// Returns `true` if a `[` after `prev` indexes into it.
fn ends_operand(prev: Option<&Token>) -> bool {
    match prev.map(|t| &t.kind) {
        Some(TokenKind::Literal(_) | TokenKind::Name(_)) => true,
        Some(TokenKind::Punctuation(p)) => matches!(p, Punctuation::RParen | Punctuation::RBracket),
        Some(TokenKind::Op(op)) => op.postfix,
        _ => false,
    }
}

impl ShuntingYard {
    /// Creates an empty state machine.
    #[must_use]
    pub const fn new(options: ParserOptions) -> Self {
        Self { options,
               output: Vec::new(),
               stack: Vec::new(),
               numvars: Vec::new(),
               olength: Vec::new(),
               listmode: Vec::new() }
    }

    /// Feeds one token to the machine.
    ///
    /// # Parameters
    /// - `tok`: The token to process.
    /// - `prev`: The token before it, used to tell index brackets from list
    ///   literals.
    /// - `next`: The token after it, used to tell function calls from names.
    pub fn push(&mut self, tok: &Token, prev: Option<&Token>, next: Option<&Token>) -> ParseResult<()> {
        match &tok.kind {
            TokenKind::Literal(_) | TokenKind::List | TokenKind::Dict | TokenKind::Function(_) => {
                self.output.push(Rc::new(Tree::leaf(tok.clone())));
            },
            TokenKind::Name(name) => {
                let called = matches!(next.map(|t| &t.kind),
                                      Some(TokenKind::Punctuation(Punctuation::LParen)));
                if called {
                    let func = FunctionToken { name:  name.name.clone(),
                                               arity: 0, };
                    self.stack.push(Token::new(TokenKind::Function(func), tok.pos));
                } else {
                    self.output.push(Rc::new(Tree::leaf(tok.clone())));
                }
            },
            TokenKind::Op(op) => {
                if !op.prefix {
                    self.pop_operators_binding_tighter(&op.name)?;
                }
                self.stack.push(tok.clone());
            },
            TokenKind::KeyPair(_) => self.push_keypair(tok.pos)?,
            TokenKind::Punctuation(p) => match p {
                Punctuation::LParen => self.open_bracket(tok.clone(), None),
                Punctuation::LBracket => {
                    let mode = if ends_operand(prev) {
                        BracketMode::Index
                    } else {
                        BracketMode::NewList
                    };
                    self.open_bracket(tok.clone(), Some(mode));
                },
                Punctuation::Comma => self.comma(tok.pos)?,
                Punctuation::RParen => self.close_paren(tok.pos)?,
                Punctuation::RBracket => self.close_square(tok.pos)?,
            },
        }
        Ok(())
    }

    /// Pops operators which must be applied before `name` is pushed.
    ///
    /// Left-associative operators pop everything of equal or tighter
    /// precedence; right-associative ones only strictly tighter.
    fn pop_operators_binding_tighter(&mut self, name: &str) -> ParseResult<()> {
        let prec = precedence(name);
        let right = is_right_associative(name);
        while let Some(top) = self.stack.last().and_then(stack_precedence) {
            if top < prec || (!right && top == prec) {
                self.pop_to_output()?;
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Pops every operator down to the innermost open bracket.
    pub(super) fn pop_until_bracket(&mut self) -> ParseResult<()> {
        while self.stack.last().and_then(stack_precedence).is_some() {
            self.pop_to_output()?;
        }
        Ok(())
    }

    /// Turns the preceding operand into the key of a `key: value` pair.
    fn push_keypair(&mut self, pos: usize) -> ParseResult<()> {
        self.pop_until_bracket()?;
        let mark = self.olength.last().copied().unwrap_or(0);
        if self.output.len() <= mark {
            return Err(ParseError::InvalidKey { pos });
        }
        let key = match self.output.pop() {
            Some(tree) if tree.args.is_empty() => match &tree.tok.kind {
                TokenKind::Literal(Value::String(s)) => s.value.clone(),
                TokenKind::Name(n) => n.name.clone(),
                _ => return Err(ParseError::InvalidKey { pos }),
            },
            _ => return Err(ParseError::InvalidKey { pos }),
        };
        self.stack.push(Token::new(TokenKind::KeyPair(key), pos));
        Ok(())
    }

    /// Moves the operator on top of the stack to the output, taking its
    /// operands from the end of the output.
    ///
    /// # Errors
    /// `ArityMismatch` if fewer operands are available than the operator
    /// needs, unless missing operands are filled with `nothing`.
    pub(super) fn pop_to_output(&mut self) -> ParseResult<()> {
        let Some(tok) = self.stack.pop() else {
            return Ok(());
        };
        let (name, arity) = match &tok.kind {
            TokenKind::Op(op) => (op.name.clone(), op.arity),
            TokenKind::Function(f) => (f.name.clone(), f.arity),
            TokenKind::KeyPair(key) => (key.clone(), 1),
            _ => return Err(ParseError::UnexpectedToken { token: tok.kind_text(),
                                                          pos:   tok.pos, }),
        };

        let mark = self.olength.last().copied().unwrap_or(0);
        let available = self.output.len().saturating_sub(mark);
        if available < arity {
            if !self.options.add_missing_arguments {
                return Err(ParseError::ArityMismatch { name,
                                                       expected: arity,
                                                       found: available,
                                                       pos: tok.pos });
            }
            for _ in available..arity {
                self.output.push(Rc::new(Tree::literal(Value::Nothing, tok.pos)));
            }
        }

        let args = self.output.split_off(self.output.len() - arity);
        self.output.push(Rc::new(Tree::node(tok, args)));
        Ok(())
    }

    /// Flushes the stack at the end of the input and returns the single
    /// finished tree.
    pub fn finish(mut self, end: usize) -> ParseResult<Rc<Tree>> {
        while let Some(top) = self.stack.last() {
            let pos = top.pos;
            let bracket = match &top.kind {
                TokenKind::Punctuation(Punctuation::LParen) => Some('('),
                TokenKind::Punctuation(Punctuation::LBracket) => Some('['),
                _ => None,
            };
            match bracket {
                Some('(') if self.options.close_missing_brackets => self.close_paren(end)?,
                Some(bracket) => return Err(ParseError::UnmatchedBracket { bracket, pos }),
                None => self.pop_to_output()?,
            }
        }

        match self.output.len() {
            0 => Err(ParseError::EmptyInput),
            1 => self.output.pop().ok_or(ParseError::EmptyInput),
            _ => Err(ParseError::MissingOperator { pos: self.output[1].tok.pos }),
        }
    }
}

impl Token {
    /// The token as it would be written, for diagnostics.
    pub(crate) fn kind_text(&self) -> String {
        match &self.kind {
            TokenKind::Punctuation(p) => p.to_string(),
            TokenKind::KeyPair(_) => ":".to_string(),
            _ => Tree::leaf(self.clone()).to_string(),
        }
    }
}
