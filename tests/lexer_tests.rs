//! Scanner tests

use dslx_parser::lexer::{BuiltinType, Token, TokenKind, lex};
use dslx_parser::{ParseErrorKind, Span};

fn kinds(src: &str) -> Vec<TokenKind> {
    lex(src).unwrap().into_iter().map(|t| t.kind).collect()
}

fn texts(src: &str) -> Vec<String> {
    lex(src).unwrap().into_iter().map(|t| t.text).collect()
}

#[test]
fn test_keywords() {
    let tokens = kinds("fn pub proc next let const in as if else match for while carry struct enum type import test");
    assert_eq!(tokens.len(), 20);
    assert!(tokens[..19].iter().all(TokenKind::is_keyword));
    assert_eq!(tokens[19], TokenKind::Eof);
}

#[test]
fn test_keyword_prefixes_are_identifiers() {
    assert_eq!(
        kinds("fns letter inner types carry_out"),
        vec![
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_builtin_types() {
    assert_eq!(
        kinds("u1 u8 u64 s32 bits uN sN bool"),
        [vec![TokenKind::BuiltinType; 8], vec![TokenKind::Eof]].concat()
    );
    // Out of range widths and longer names are ordinary identifiers.
    assert_eq!(
        kinds("u65 u0 u32x bitsy"),
        vec![
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_builtin_type_keywords() {
    assert_eq!(BuiltinType::from_keyword("u32"), Some(BuiltinType::Unsigned(32)));
    assert_eq!(BuiltinType::from_keyword("s7"), Some(BuiltinType::Signed(7)));
    assert_eq!(BuiltinType::from_keyword("bits"), Some(BuiltinType::Bits));
    assert_eq!(BuiltinType::from_keyword("foo"), None);
    assert!(BuiltinType::Bits.requires_width());
    assert!(!BuiltinType::Bool.requires_width());
    assert!(BuiltinType::from_keyword("s16").unwrap().is_signed());
    assert_eq!(BuiltinType::Unsigned(12).to_string(), "u12");
}

#[test]
fn test_number_literals() {
    assert_eq!(
        kinds("42 1_000 0xdead_beef 0b1010 'a' '\\n' true false"),
        vec![
            TokenKind::IntLit,
            TokenKind::IntLit,
            TokenKind::HexLit,
            TokenKind::BinLit,
            TokenKind::CharLit,
            TokenKind::CharLit,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Eof,
        ]
    );
    assert!(TokenKind::HexLit.is_number_literal());
    assert!(TokenKind::True.is_number_literal());
    assert!(!TokenKind::Ident.is_number_literal());
}

#[test]
fn test_bad_radix_digits_still_scan() {
    // Digit validation happens in the parser.
    assert_eq!(texts("0xZZ 0b12 0x"), vec!["0xZZ", "0b12", "0x", ""]);
    assert_eq!(
        kinds("0xZZ 0b12"),
        vec![TokenKind::HexLit, TokenKind::BinLit, TokenKind::Eof]
    );
}

#[test]
fn test_operators() {
    assert_eq!(
        kinds("+ ++ +: - -> * / % ^ & && | || ! != = == => < <= << > >= >> >>>"),
        vec![
            TokenKind::Plus,
            TokenKind::PlusPlus,
            TokenKind::PlusColon,
            TokenKind::Minus,
            TokenKind::Arrow,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Caret,
            TokenKind::Amp,
            TokenKind::AmpAmp,
            TokenKind::Pipe,
            TokenKind::PipePipe,
            TokenKind::Bang,
            TokenKind::Ne,
            TokenKind::Eq,
            TokenKind::EqEq,
            TokenKind::FatArrow,
            TokenKind::Lt,
            TokenKind::Le,
            TokenKind::Shl,
            TokenKind::Gt,
            TokenKind::Ge,
            TokenKind::Shr,
            TokenKind::Sar,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_directive_tokens() {
    assert_eq!(
        kinds("#![test]"),
        vec![
            TokenKind::Hash,
            TokenKind::Bang,
            TokenKind::LBracket,
            TokenKind::Test,
            TokenKind::RBracket,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_underscore_and_identifiers() {
    assert_eq!(
        kinds("_ _x x_"),
        vec![TokenKind::Underscore, TokenKind::Ident, TokenKind::Ident, TokenKind::Eof]
    );
}

#[test]
fn test_spans_and_comments() {
    let tokens = lex("let x = u32:1; // trailing\nx").unwrap();
    let spans: Vec<Span> = tokens.iter().map(|t| t.span).collect();
    assert_eq!(
        spans,
        vec![
            Span::new(0, 3),
            Span::new(4, 5),
            Span::new(6, 7),
            Span::new(8, 11),
            Span::new(11, 12),
            Span::new(12, 13),
            Span::new(13, 14),
            Span::new(27, 28),
            Span::new(28, 28),
        ]
    );
}

#[test]
fn test_unrecognized_character() {
    let err = lex("let x = @;").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Syntax);
    assert_eq!(err.span(), Span::new(8, 9));
}

#[test]
fn test_token_descriptions() {
    let tokens = lex("foo u8 7 )").unwrap();
    let described: Vec<String> = tokens.iter().map(Token::describe).collect();
    assert_eq!(
        described,
        vec!["identifier `foo`", "type `u8`", "number `7`", "`)`", "end of file"]
    );
}

#[test]
fn test_tokens_serialize_for_dumps() {
    let tokens = lex("fn").unwrap();
    let json = serde_json::to_value(&tokens[0]).unwrap();
    assert_eq!(json["kind"], "Fn");
    assert_eq!(json["span"]["start"], 0);
    assert_eq!(json["text"], "fn");
}
