//! DSLX front end
//!
//! Parses DSLX, a hardware description language, into an arena-owned AST,
//! resolving every identifier against lexically scoped bindings while the
//! tree is built.
//!
//! # Architecture
//!
//! ```text
//! Source → Lexer → Parser (+ Bindings scope chain) → Module (AST arena)
//! ```
//!
//! # Example
//!
//! ```
//! let module = dslx_parser::parse_module("adder", "fn add(x: u32, y: u32) -> u32 { x + y }")
//!     .expect("valid source");
//! assert!(module.get_function("add").is_some());
//! ```

pub mod ast;
pub mod bindings;
pub mod common;
pub mod config;
pub mod diagnostics;
pub mod lexer;
pub mod parser;

pub use ast::Module;
pub use bindings::{Bindings, BoundNode};
pub use common::Span;
pub use config::ParserConfig;
pub use diagnostics::{ParseError, ParseErrorKind, ParseResult, SourceFile};
pub use parser::Parser;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lex and parse a whole module with the default configuration.
pub fn parse_module(module_name: &str, source: &str) -> ParseResult<Module> {
    parse_module_with_config(module_name, source, ParserConfig::default())
}

pub fn parse_module_with_config(
    module_name: &str,
    source: &str,
    config: ParserConfig,
) -> ParseResult<Module> {
    let tokens = lexer::lex(source)?;
    Parser::new(module_name, &tokens)
        .with_config(config)
        .parse_module()
}

/// Like [`parse_module`], with the source attached to any error for display.
pub fn parse(module_name: &str, source: &str) -> miette::Result<Module> {
    parse_module(module_name, source)
        .map_err(|err| SourceFile::new(module_name, source).report(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_parse_reports_with_source() {
        let report = parse("m", "fn f() -> u32 { y }").unwrap_err();
        assert!(report.to_string().contains("`y`"));
    }
}
