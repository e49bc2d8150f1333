use std::rc::Rc;

use crate::{
    ast::{FunctionToken, Punctuation, Token, TokenKind, Tree},
    error::ParseError,
    interpreter::parser::{
        core::ParseResult,
        shunting::{BracketMode, ShuntingYard},
    },
};

impl ShuntingYard {
    /// Pushes an opening bracket and starts counting its arguments.
    ///
    /// `mode` is given for `[` only. Postfix operators waiting on the stack
    /// are applied first so that `x![0]` indexes `x!` rather than `x`.
    pub(super) fn open_bracket(&mut self, tok: Token, mode: Option<BracketMode>) {
        if mode == Some(BracketMode::Index) {
            while matches!(self.stack.last().map(|t| &t.kind), Some(TokenKind::Op(op)) if op.postfix) {
                // A postfix operator always has its operand on the output.
                if self.pop_to_output().is_err() {
                    break;
                }
            }
        }
        self.stack.push(tok);
        self.numvars.push(0);
        self.olength.push(self.output.len());
        if let Some(mode) = mode {
            self.listmode.push(mode);
        }
    }

    /// Finishes the current argument of the innermost bracket.
    pub(super) fn comma(&mut self, pos: usize) -> ParseResult<()> {
        self.pop_until_bracket()?;
        match self.stack.last().map(|t| &t.kind) {
            Some(TokenKind::Punctuation(Punctuation::LParen | Punctuation::LBracket)) => {
                if let Some(commas) = self.numvars.last_mut() {
                    *commas += 1;
                }
                Ok(())
            },
            _ => Err(ParseError::UnexpectedToken { token: ",".to_string(),
                                                   pos }),
        }
    }

    /// Pops operators down to the innermost bracket, which must be `open`,
    /// and removes it.
    ///
    /// # Returns
    /// The bracket token and the number of arguments written inside it.
    fn take_bracket(&mut self, open: Punctuation, close: char, pos: usize) -> ParseResult<(Token, usize)> {
        self.pop_until_bracket()?;
        let bracket = match self.stack.pop() {
            Some(tok) if tok.kind == TokenKind::Punctuation(open) => tok,
            _ => return Err(ParseError::UnmatchedBracket { bracket: close, pos }),
        };
        let commas = self.numvars.pop().unwrap_or(0);
        let mark = self.olength.pop().unwrap_or(0);
        let items = self.output.len().saturating_sub(mark);

        if (items == 0 && commas > 0) || (items > 0 && items < commas + 1) {
            return Err(ParseError::UnexpectedToken { token: ",".to_string(),
                                                     pos });
        }
        if items > commas + 1 {
            let second = self.output.len() - items + commas + 1;
            return Err(ParseError::MissingOperator { pos: self.output[second].tok.pos });
        }
        Ok((bracket, items))
    }

    /// Handles `)`: finishes a function call or a parenthesised group.
    pub(super) fn close_paren(&mut self, pos: usize) -> ParseResult<()> {
        let (bracket, count) = self.take_bracket(Punctuation::LParen, ')', pos)?;

        if let Some(Token { kind: TokenKind::Function(func),
                            .. }) = self.stack.last_mut()
        {
            func.arity = count;
            return self.pop_to_output();
        }

        match count {
            0 => Err(ParseError::EmptyGroup { pos }),
            1 => Ok(()),
            _ => Err(ParseError::MissingOperator { pos: bracket.pos }),
        }
    }

    /// Handles `]`: finishes a list or dictionary literal, or an index.
    pub(super) fn close_square(&mut self, pos: usize) -> ParseResult<()> {
        let (bracket, count) = self.take_bracket(Punctuation::LBracket, ']', pos)?;
        let mode = self.listmode.pop().unwrap_or(BracketMode::NewList);

        match mode {
            BracketMode::Index => {
                match count {
                    0 => return Err(ParseError::EmptyGroup { pos }),
                    1 => {},
                    _ => return Err(ParseError::MissingOperator { pos: bracket.pos }),
                }
                let mark = self.olength.last().copied().unwrap_or(0);
                if self.output.len() < mark + 2 {
                    return Err(ParseError::ArityMismatch { name:     "listval".to_string(),
                                                           expected: 2,
                                                           found:    self.output.len().saturating_sub(mark),
                                                           pos:      bracket.pos, });
                }
                let args = self.output.split_off(self.output.len() - 2);
                let head = FunctionToken { name:  "listval".to_string(),
                                           arity: 2, };
                self.output.push(Rc::new(Tree::node(Token::new(TokenKind::Function(head), bracket.pos), args)));
            },
            BracketMode::NewList => {
                let items = self.output.split_off(self.output.len() - count);
                let pairs = items.iter()
                                 .filter(|item| matches!(item.tok.kind, TokenKind::KeyPair(_)))
                                 .count();
                let kind = if pairs == 0 {
                    TokenKind::List
                } else if pairs == count {
                    TokenKind::Dict
                } else {
                    return Err(ParseError::MixedListLiteral { pos: bracket.pos });
                };
                self.output.push(Rc::new(Tree::node(Token::new(kind, bracket.pos), items)));
            },
        }
        Ok(())
    }
}
