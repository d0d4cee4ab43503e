//! `#![...]` directives: test markers, quickcheck markers and `cfg` switches.

use super::Parser;
use crate::ast::*;
use crate::bindings::Bindings;
use crate::common::Span;
use crate::diagnostics::{ParseError, ParseResult};
use crate::lexer::TokenKind;
use rustc_hash::FxHashMap;
use tracing::debug;

/// What a directive produced.
pub(super) enum Directive {
    Test(TestFunctionId),
    QuickCheck(QuickCheckId),
    /// A `cfg` directive; only the parser configuration changed.
    Config,
}

impl<'t> Parser<'t> {
    pub(super) fn parse_directive(
        &mut self,
        name_to_fn: &mut FxHashMap<String, FunctionId>,
        bindings: &mut Bindings<'_>,
    ) -> ParseResult<Directive> {
        let start = self.drop_or_error(TokenKind::Hash)?;
        self.drop_or_error(TokenKind::Bang)?;
        self.drop_or_error(TokenKind::LBracket)?;

        // `test` lexes as a keyword; the other directive names are identifiers.
        let name = match self.peek() {
            TokenKind::Test | TokenKind::Ident => self.pop(),
            _ => return Err(self.unexpected("directive name")),
        };

        match name.text.as_str() {
            "test" => {
                self.drop_or_error(TokenKind::RBracket)?;
                self.parse_test_function(name_to_fn, bindings, start)
                    .map(Directive::Test)
            }
            "quickcheck" => {
                let test_count = self.parse_quickcheck_args()?;
                self.drop_or_error(TokenKind::RBracket)?;
                self.parse_quickcheck(name_to_fn, bindings, start, test_count)
                    .map(Directive::QuickCheck)
            }
            "cfg" => {
                self.parse_config_directive()?;
                self.drop_or_error(TokenKind::RBracket)?;
                Ok(Directive::Config)
            }
            other => Err(ParseError::syntax(
                format!("unknown directive `{other}`"),
                name.span,
            )),
        }
    }

    fn parse_test_function(
        &mut self,
        name_to_fn: &mut FxHashMap<String, FunctionId>,
        bindings: &mut Bindings<'_>,
        start: Span,
    ) -> ParseResult<TestFunctionId> {
        if !self.at(TokenKind::Fn) {
            return Err(self.unexpected("`fn` after `#![test]`"));
        }
        let function = self.parse_function(false, bindings)?;
        self.record_function(function, name_to_fn)?;
        debug!(name = %self.module.function_name(function), "parsed test function");
        Ok(self.module.alloc_test_function(TestFunction {
            function,
            span: self.span_from(start),
        }))
    }

    /// Optional `(test_count=N)` after `quickcheck`.
    fn parse_quickcheck_args(&mut self) -> ParseResult<Option<u64>> {
        if !self.try_drop(TokenKind::LParen) {
            return Ok(None);
        }
        let key = self.pop_identifier()?;
        if key.text != "test_count" {
            return Err(ParseError::syntax(
                format!("unknown quickcheck argument `{}`; expected `test_count`", key.text),
                key.span,
            ));
        }
        self.drop_or_error(TokenKind::Eq)?;
        let count = self.pop_or_error(TokenKind::IntLit)?;
        let value = count
            .text
            .replace('_', "")
            .parse::<u64>()
            .map_err(|_| ParseError::malformed(format!("test count `{}` is out of range", count.text), count.span))?;
        self.drop_or_error(TokenKind::RParen)?;
        Ok(Some(value))
    }

    fn parse_quickcheck(
        &mut self,
        name_to_fn: &mut FxHashMap<String, FunctionId>,
        bindings: &mut Bindings<'_>,
        start: Span,
        test_count: Option<u64>,
    ) -> ParseResult<QuickCheckId> {
        if !self.at(TokenKind::Fn) {
            return Err(self.unexpected("`fn` after `#![quickcheck]`"));
        }
        let function = self.parse_function(false, bindings)?;
        self.record_function(function, name_to_fn)?;
        debug!(
            name = %self.module.function_name(function),
            test_count = ?test_count,
            "parsed quickcheck"
        );
        Ok(self.module.alloc_quickcheck(QuickCheck {
            function,
            test_count,
            span: self.span_from(start),
        }))
    }

    /// `cfg(option = bool, ...)`; applies each setting to the parser config.
    fn parse_config_directive(&mut self) -> ParseResult<()> {
        self.drop_or_error(TokenKind::LParen)?;
        let settings = self.parse_comma_seq(
            |p| {
                let option = p.pop_identifier()?;
                p.drop_or_error(TokenKind::Eq)?;
                let value = match p.peek() {
                    TokenKind::True => true,
                    TokenKind::False => false,
                    _ => return Err(p.unexpected("`true` or `false`")),
                };
                p.pop();
                Ok((option, value))
            },
            TokenKind::RParen,
        )?;
        for (option, value) in settings {
            if !self.config.set(&option.text, value) {
                return Err(ParseError::syntax(
                    format!("unknown configuration option `{}`", option.text),
                    option.span,
                ));
            }
            debug!(option = %option.text, value, "applied cfg directive");
        }
        Ok(())
    }
}
