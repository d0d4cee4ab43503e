//! Token definitions for the DSLX scanner

use crate::common::Span;
use logos::Logos;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A token with its kind, span, and text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    /// Short description used in "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Ident => format!("identifier `{}`", self.text),
            TokenKind::IntLit | TokenKind::HexLit | TokenKind::BinLit => {
                format!("number `{}`", self.text)
            }
            TokenKind::CharLit => format!("character {}", self.text),
            TokenKind::BuiltinType => format!("type `{}`", self.text),
            TokenKind::Eof => "end of file".to_string(),
            kind => format!("`{}`", kind.as_str()),
        }
    }
}

/// Token kinds recognized by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Serialize, Deserialize)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // Keywords
    #[token("fn")]
    Fn,
    #[token("pub")]
    Pub,
    #[token("proc")]
    Proc,
    #[token("next")]
    Next,
    #[token("let")]
    Let,
    #[token("const")]
    Const,
    #[token("in")]
    In,
    #[token("as")]
    As,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("match")]
    Match,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("carry")]
    Carry,
    #[token("struct")]
    Struct,
    #[token("enum")]
    Enum,
    #[token("type")]
    Type,
    #[token("import")]
    Import,
    #[token("test")]
    Test,

    // Boolean literals
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Builtin bit types: `u8`, `s32`, `bits`, `uN`, `sN`, `bool`
    #[regex(r"bits|uN|sN|bool|[us]([1-9]|[1-5][0-9]|6[0-4])", priority = 3)]
    BuiltinType,

    // Literals. Radix literals accept any alphanumeric tail so that bad
    // digits are reported by the parser as malformed literals.
    #[regex(r"[0-9][0-9_]*", priority = 2)]
    IntLit,
    #[regex(r"0x[0-9a-zA-Z_]*")]
    HexLit,
    #[regex(r"0b[0-9a-zA-Z_]*")]
    BinLit,
    #[regex(r"'([^'\\]|\\.)'")]
    CharLit,

    // Identifiers (priority 1 so keywords and _ take precedence)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", priority = 1)]
    Ident,

    // Operators
    #[token("+")]
    Plus,
    #[token("++")]
    PlusPlus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("!")]
    Bang,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    // Compound operators
    #[token("==")]
    EqEq,
    #[token("!=")]
    Ne,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token(">>>")]
    Sar,
    #[token("+:")]
    PlusColon,

    // Arrows
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // Punctuation
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token("::")]
    ColonColon,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("...")]
    Ellipsis,
    #[token("#")]
    Hash,
    #[token("_", priority = 2)]
    Underscore,

    // Special
    Eof,
}

impl TokenKind {
    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Fn
                | TokenKind::Pub
                | TokenKind::Proc
                | TokenKind::Next
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::In
                | TokenKind::As
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::Match
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Carry
                | TokenKind::Struct
                | TokenKind::Enum
                | TokenKind::Type
                | TokenKind::Import
                | TokenKind::Test
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// Tokens that begin a number literal (including booleans and characters).
    pub fn is_number_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::IntLit
                | TokenKind::HexLit
                | TokenKind::BinLit
                | TokenKind::CharLit
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// Get the string representation of the token
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Fn => "fn",
            TokenKind::Pub => "pub",
            TokenKind::Proc => "proc",
            TokenKind::Next => "next",
            TokenKind::Let => "let",
            TokenKind::Const => "const",
            TokenKind::In => "in",
            TokenKind::As => "as",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Match => "match",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Carry => "carry",
            TokenKind::Struct => "struct",
            TokenKind::Enum => "enum",
            TokenKind::Type => "type",
            TokenKind::Import => "import",
            TokenKind::Test => "test",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::BuiltinType => "<builtin type>",
            TokenKind::IntLit => "<int>",
            TokenKind::HexLit => "<hex>",
            TokenKind::BinLit => "<bin>",
            TokenKind::CharLit => "<char>",
            TokenKind::Ident => "<ident>",
            TokenKind::Plus => "+",
            TokenKind::PlusPlus => "++",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Caret => "^",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Bang => "!",
            TokenKind::Eq => "=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::EqEq => "==",
            TokenKind::Ne => "!=",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::Sar => ">>>",
            TokenKind::PlusColon => "+:",
            TokenKind::Arrow => "->",
            TokenKind::FatArrow => "=>",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Colon => ":",
            TokenKind::ColonColon => "::",
            TokenKind::Dot => ".",
            TokenKind::DotDot => "..",
            TokenKind::Ellipsis => "...",
            TokenKind::Hash => "#",
            TokenKind::Underscore => "_",
            TokenKind::Eof => "<eof>",
        }
    }

    /// Form used in "expected X" messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident => "identifier".to_string(),
            TokenKind::BuiltinType => "builtin type".to_string(),
            TokenKind::Eof => "end of file".to_string(),
            kind => format!("`{}`", kind.as_str()),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The builtin bit-vector types named by [`TokenKind::BuiltinType`] tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinType {
    /// `bits[N]`
    Bits,
    /// `uN[N]`
    UN,
    /// `sN[N]`
    SN,
    Bool,
    Unsigned(u8),
    Signed(u8),
}

impl BuiltinType {
    pub fn from_keyword(text: &str) -> Option<Self> {
        match text {
            "bits" => return Some(BuiltinType::Bits),
            "uN" => return Some(BuiltinType::UN),
            "sN" => return Some(BuiltinType::SN),
            "bool" => return Some(BuiltinType::Bool),
            _ => {}
        }
        let (signed, digits) = match text.split_at_checked(1)? {
            ("u", rest) => (false, rest),
            ("s", rest) => (true, rest),
            _ => return None,
        };
        if digits.starts_with('0') {
            return None;
        }
        let width: u8 = digits.parse().ok()?;
        if !(1..=64).contains(&width) {
            return None;
        }
        Some(if signed {
            BuiltinType::Signed(width)
        } else {
            BuiltinType::Unsigned(width)
        })
    }

    /// `bits`, `uN` and `sN` only name a type once a width dimension follows.
    pub fn requires_width(&self) -> bool {
        matches!(self, BuiltinType::Bits | BuiltinType::UN | BuiltinType::SN)
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, BuiltinType::SN | BuiltinType::Signed(_))
    }

    /// Fixed width, if the keyword carries one.
    pub fn bit_width(&self) -> Option<u32> {
        match self {
            BuiltinType::Bool => Some(1),
            BuiltinType::Unsigned(w) | BuiltinType::Signed(w) => Some(u32::from(*w)),
            _ => None,
        }
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltinType::Bits => f.write_str("bits"),
            BuiltinType::UN => f.write_str("uN"),
            BuiltinType::SN => f.write_str("sN"),
            BuiltinType::Bool => f.write_str("bool"),
            BuiltinType::Unsigned(w) => write!(f, "u{w}"),
            BuiltinType::Signed(w) => write!(f, "s{w}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keywords() {
        assert_eq!(BuiltinType::from_keyword("u32"), Some(BuiltinType::Unsigned(32)));
        assert_eq!(BuiltinType::from_keyword("s1"), Some(BuiltinType::Signed(1)));
        assert_eq!(BuiltinType::from_keyword("bits"), Some(BuiltinType::Bits));
        assert_eq!(BuiltinType::from_keyword("u65"), None);
        assert_eq!(BuiltinType::from_keyword("u0"), None);
        assert_eq!(BuiltinType::from_keyword("x8"), None);
    }

    #[test]
    fn test_width_requirements() {
        assert!(BuiltinType::Bits.requires_width());
        assert!(!BuiltinType::Unsigned(8).requires_width());
        assert_eq!(BuiltinType::Bool.bit_width(), Some(1));
        assert!(BuiltinType::SN.is_signed());
        assert_eq!(BuiltinType::Signed(16).to_string(), "s16");
    }
}
