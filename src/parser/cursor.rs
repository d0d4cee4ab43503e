//! Token consumption primitives and the comma-sequence helper.

use super::Parser;
use crate::common::Span;
use crate::diagnostics::{ParseError, ParseResult};
use crate::lexer::{Token, TokenKind};

impl<'t> Parser<'t> {
    pub(super) fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    pub(super) fn peek(&self) -> TokenKind {
        self.current().kind
    }

    /// Kind of the token `n` places past the next one.
    pub(super) fn peek_n(&self, n: usize) -> TokenKind {
        self.tokens.get(self.pos + n).unwrap_or(&self.eof).kind
    }

    pub(super) fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    pub(super) fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek())
    }

    /// Span of the next token.
    pub(super) fn span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed token.
    pub(super) fn prev_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::point(0),
        }
    }

    /// Span from `start` through the most recently consumed token.
    pub(super) fn span_from(&self, start: Span) -> Span {
        start.merge(self.prev_span())
    }

    pub(super) fn pop(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() && token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    /// Consume the next token if it is `kind`.
    pub(super) fn try_drop(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pop();
            true
        } else {
            false
        }
    }

    pub(super) fn try_pop(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) { Some(self.pop()) } else { None }
    }

    /// Consume a `kind` token or fail naming what was found instead.
    pub(super) fn drop_or_error(&mut self, kind: TokenKind) -> ParseResult<Span> {
        self.pop_or_error(kind).map(|t| t.span)
    }

    pub(super) fn pop_or_error(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.pop())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    pub(super) fn pop_identifier(&mut self) -> ParseResult<Token> {
        self.pop_or_error(TokenKind::Ident)
    }

    /// Error describing the next token as not being `expected`.
    pub(super) fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        let found = self.current();
        ParseError::unexpected(expected, found.describe(), found.span)
    }

    /// Parse `production` repeatedly as a comma-separated sequence ending in
    /// `terminator`. The opening delimiter has already been consumed; the
    /// terminator is consumed here. A single trailing comma is accepted.
    pub(super) fn parse_comma_seq<T>(
        &mut self,
        mut production: impl FnMut(&mut Self) -> ParseResult<T>,
        terminator: TokenKind,
    ) -> ParseResult<Vec<T>> {
        let mut parsed = Vec::new();
        let mut must_end = false;
        loop {
            if self.try_drop(terminator) {
                break;
            }
            if must_end {
                self.drop_or_error(terminator)?;
                break;
            }
            parsed.push(production(self)?);
            must_end = !self.try_drop(TokenKind::Comma);
        }
        Ok(parsed)
    }

    /// Whether every token up to end of input has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.at(TokenKind::Eof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ParseErrorKind;
    use crate::lexer::lex;

    fn idents(src: &str) -> (ParseResult<Vec<String>>, bool) {
        let tokens = lex(src).unwrap();
        let mut parser = Parser::new("m", &tokens);
        parser.drop_or_error(TokenKind::LParen).unwrap();
        let result = parser.parse_comma_seq(|p| p.pop_identifier().map(|t| t.text), TokenKind::RParen);
        (result, parser.is_at_end())
    }

    #[test]
    fn test_comma_seq_shapes() {
        assert_eq!(idents("()").0.unwrap(), Vec::<String>::new());
        assert_eq!(idents("(a)").0.unwrap(), vec!["a"]);
        assert_eq!(idents("(a, b,)").0.unwrap(), vec!["a", "b"]);
        let (result, at_end) = idents("(a, b, c)");
        assert_eq!(result.unwrap(), vec!["a", "b", "c"]);
        assert!(at_end);
    }

    #[test]
    fn test_comma_seq_rejects_double_comma() {
        let err = idents("(a,, b)").0.unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Syntax);
    }

    #[test]
    fn test_comma_seq_rejects_missing_terminator() {
        let err = idents("(a b)").0.unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Syntax);
        assert_eq!(err.span(), Span::new(3, 4));

        let err = idents("(a,").0.unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Syntax);
    }

    #[test]
    fn test_pop_stays_at_eof() {
        let tokens = lex("x").unwrap();
        let mut parser = Parser::new("m", &tokens);
        assert_eq!(parser.pop().kind, TokenKind::Ident);
        assert_eq!(parser.pop().kind, TokenKind::Eof);
        assert_eq!(parser.pop().kind, TokenKind::Eof);
        assert_eq!(parser.prev_span(), Span::new(0, 1));
    }
}
