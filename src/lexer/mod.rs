//! Scanner for DSLX source text
//!
//! Produces the token stream consumed by the parser. The stream always ends
//! with a single [`TokenKind::Eof`] token whose span sits at the end of input.

mod tokens;

pub use tokens::{BuiltinType, Token, TokenKind};

use crate::common::Span;
use crate::diagnostics::{ParseError, ParseResult};
use logos::Logos;

/// Tokenize `source`, stopping at the first unrecognized character.
pub fn lex(source: &str) -> ParseResult<Vec<Token>> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = Span::from(lexer.span());
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                span,
                text: lexer.slice().to_string(),
            }),
            Err(()) => {
                return Err(ParseError::UnrecognizedCharacter {
                    text: lexer.slice().to_string(),
                    span: span.into(),
                });
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::point(source.len()),
        text: String::new(),
    });
    tracing::trace!(count = tokens.len(), "lexed source");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("  // comment only\n"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_longest_operator_wins() {
        assert_eq!(
            kinds(">>> >> > ... .. . :: :"),
            vec![
                TokenKind::Sar,
                TokenKind::Shr,
                TokenKind::Gt,
                TokenKind::Ellipsis,
                TokenKind::DotDot,
                TokenKind::Dot,
                TokenKind::ColonColon,
                TokenKind::Colon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unrecognized_character() {
        let err = lex("fn f() { $ }").unwrap_err();
        assert_eq!(err.span(), Span::new(9, 10));
    }
}
