//! Parse errors with source locations
//!
//! Every failure the parser can produce is a [`ParseError`]. Errors carry a
//! miette label so that a caller holding the source text can render a
//! labelled excerpt, while tooling that only wants "where and what" can use
//! [`ParseError::span`] and [`ParseError::message`] separately.

use crate::common::Span;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result alias used throughout the parser.
pub type ParseResult<T> = Result<T, ParseError>;

/// Source file for error reporting
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Arc<str>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Arc::from(content.into()),
        }
    }

    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.to_string())
    }

    /// 1-based line and column of a byte offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let prefix = self.content.get(..offset).unwrap_or(&self.content);
        let line = prefix.matches('\n').count() + 1;
        let col = prefix.rfind('\n').map_or(prefix.len(), |nl| prefix.len() - nl - 1) + 1;
        (line, col)
    }

    /// Attach this file to an error so miette can print the excerpt.
    pub fn report(&self, error: ParseError) -> miette::Report {
        miette::Report::new(error).with_source_code(self.to_named_source())
    }
}

/// Convert our Span to miette's SourceSpan
impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.into(), span.len())
    }
}

/// Coarse classification of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// An expected token or keyword was not found.
    Syntax,
    /// A name reference failed scope resolution.
    UndefinedName,
    /// A grammar path that is deliberately not implemented.
    Unsupported,
    /// A literal failed its local validity check.
    MalformedLiteral,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseErrorKind::Syntax => "syntax error",
            ParseErrorKind::UndefinedName => "undefined name",
            ParseErrorKind::Unsupported => "unsupported",
            ParseErrorKind::MalformedLiteral => "malformed literal",
        };
        f.write_str(s)
    }
}

/// Parser diagnostic
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected}, found {found}")]
    #[diagnostic(code(parse::unexpected_token))]
    UnexpectedToken {
        expected: String,
        found: String,
        #[label("unexpected token here")]
        span: SourceSpan,
    },

    #[error("{message}")]
    #[diagnostic(code(parse::syntax))]
    Syntax {
        message: String,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("cannot find a definition for name `{name}`")]
    #[diagnostic(
        code(parse::undefined_name),
        help("names must be defined before they are referenced")
    )]
    UndefinedName {
        name: String,
        #[label("not found in this scope")]
        span: SourceSpan,
    },

    #[error("{feature} is not supported")]
    #[diagnostic(code(parse::unsupported))]
    Unsupported {
        feature: String,
        #[label("not supported")]
        span: SourceSpan,
    },

    #[error("malformed literal: {message}")]
    #[diagnostic(code(parse::malformed_literal))]
    MalformedLiteral {
        message: String,
        #[label("invalid literal")]
        span: SourceSpan,
    },

    #[error("unrecognized character sequence `{text}`")]
    #[diagnostic(code(parse::unrecognized))]
    UnrecognizedCharacter {
        text: String,
        #[label("not a valid token")]
        span: SourceSpan,
    },
}

impl ParseError {
    pub fn unexpected(expected: impl Into<String>, found: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            span: span.into(),
        }
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        ParseError::Syntax {
            message: message.into(),
            span: span.into(),
        }
    }

    pub fn undefined(name: impl Into<String>, span: Span) -> Self {
        ParseError::UndefinedName {
            name: name.into(),
            span: span.into(),
        }
    }

    pub fn unsupported(feature: impl Into<String>, span: Span) -> Self {
        ParseError::Unsupported {
            feature: feature.into(),
            span: span.into(),
        }
    }

    pub fn malformed(message: impl Into<String>, span: Span) -> Self {
        ParseError::MalformedLiteral {
            message: message.into(),
            span: span.into(),
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::UnexpectedToken { .. }
            | ParseError::Syntax { .. }
            | ParseError::UnrecognizedCharacter { .. } => ParseErrorKind::Syntax,
            ParseError::UndefinedName { .. } => ParseErrorKind::UndefinedName,
            ParseError::Unsupported { .. } => ParseErrorKind::Unsupported,
            ParseError::MalformedLiteral { .. } => ParseErrorKind::MalformedLiteral,
        }
    }

    /// Location of the failure in the source.
    pub fn span(&self) -> Span {
        let span = match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::Syntax { span, .. }
            | ParseError::UndefinedName { span, .. }
            | ParseError::Unsupported { span, .. }
            | ParseError::MalformedLiteral { span, .. }
            | ParseError::UnrecognizedCharacter { span, .. } => *span,
        };
        Span::new(span.offset(), span.offset() + span.len())
    }

    /// Human-readable text without the location.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_round_trips_through_source_span() {
        let err = ParseError::undefined("x", Span::new(10, 11));
        assert_eq!(err.span(), Span::new(10, 11));
        assert_eq!(err.kind(), ParseErrorKind::UndefinedName);
        assert_eq!(err.message(), "cannot find a definition for name `x`");
    }

    #[test]
    fn test_kinds() {
        let span = Span::new(0, 1);
        assert_eq!(ParseError::unexpected("`)`", "`,`", span).kind(), ParseErrorKind::Syntax);
        assert_eq!(ParseError::unsupported("constant references", span).kind(), ParseErrorKind::Unsupported);
        assert_eq!(ParseError::malformed("no digits", span).kind(), ParseErrorKind::MalformedLiteral);
    }

    #[test]
    fn test_line_col() {
        let file = SourceFile::new("m.x", "fn f() {\n  y\n}");
        assert_eq!(file.line_col(0), (1, 1));
        assert_eq!(file.line_col(11), (2, 3));
    }
}
