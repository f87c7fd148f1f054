//! Token Cursor
//!
//! Index-based lookahead over an immutable token slice, shared by the
//! document builder and the DTD parser.

use super::tokenizer::{Token, TokenKind};
use crate::error::ParseError;

pub struct TokenCursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> TokenCursor<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        TokenCursor { tokens, pos: 0 }
    }

    /// Index of the current token
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + offset)
    }

    #[inline]
    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    #[inline]
    pub fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    pub fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.tokens.len());
    }

    pub fn skip_whitespace(&mut self) {
        while self.at(TokenKind::Whitespace) {
            self.pos += 1;
        }
    }

    /// Skip whitespace and consume a STRING token
    pub fn expect_string(&mut self, what: &str) -> Result<&'t str, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(token) if token.is(TokenKind::String) => {
                self.pos += 1;
                Ok(token.text.as_str())
            }
            Some(token) => Err(ParseError::structural(
                format!("expected {what}, found {:?}", token.kind),
                self.pos,
            )),
            None => Err(ParseError::truncated(
                format!("expected {what}, found end of input"),
                self.pos,
            )),
        }
    }

    /// Match a `name = value` triple at the cursor, consuming it
    pub fn name_value(&mut self) -> Option<(&'t str, &'t str)> {
        match (self.peek(), self.peek_at(1), self.peek_at(2)) {
            (Some(name), Some(eq), Some(value))
                if name.is(TokenKind::String)
                    && eq.is(TokenKind::Equals)
                    && value.is(TokenKind::String) =>
            {
                self.pos += 3;
                Some((name.text.as_str(), value.text.as_str()))
            }
            _ => None,
        }
    }

    /// Skip to the `>` closing the current declaration
    ///
    /// Nested `<` and `<!` open a level; `>` closes one. The closing `>`
    /// is consumed.
    pub fn skip_declaration(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let mut open = 0usize;
        while let Some(token) = self.next() {
            match token.kind {
                TokenKind::TagOpen | TokenKind::DeclarationStart => open += 1,
                TokenKind::TagClose if open == 0 => return Ok(()),
                TokenKind::TagClose => open -= 1,
                _ => {}
            }
        }
        Err(ParseError::truncated("unterminated declaration", start))
    }

    /// Skip past the token of `kind` closing a construct
    pub fn skip_past(&mut self, kind: TokenKind, what: &str) -> Result<(), ParseError> {
        let start = self.pos;
        while let Some(token) = self.next() {
            if token.kind == kind {
                return Ok(());
            }
        }
        Err(ParseError::truncated(format!("unterminated {what}"), start))
    }

    /// Tokens between the cursor and the matching `]`, consuming both
    ///
    /// The cursor must be on the opening `[`.
    pub fn bracketed(&mut self) -> Result<&'t [Token], ParseError> {
        let start = self.pos;
        self.pos += 1;
        let inner_start = self.pos;
        let mut depth = 0usize;
        let mut in_instruction = false;
        while let Some(token) = self.next() {
            match token.kind {
                TokenKind::PiStart => in_instruction = true,
                TokenKind::PiEnd => in_instruction = false,
                _ if in_instruction => {}
                TokenKind::OpenBracket => depth += 1,
                TokenKind::CloseBracket if depth == 0 => {
                    return Ok(&self.tokens[inner_start..self.pos - 1]);
                }
                TokenKind::CloseBracket => depth -= 1,
                _ => {}
            }
        }
        Err(ParseError::truncated("unterminated internal subset", start))
    }
}
