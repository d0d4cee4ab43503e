//! Parser configuration
//!
//! Options can be set up front (from a TOML file or in code) and are also
//! switched by `#![cfg(...)]` directives while a module is being parsed.

use serde::{Deserialize, Serialize};

/// Grammar switches consulted by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// `let x = e;` when true, `let x = e in` when false.
    pub let_terminator_is_semi: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            let_terminator_is_semi: true,
        }
    }
}

impl ParserConfig {
    /// Apply a `name = value` pair from a `cfg` directive. Returns false for
    /// an unknown option name.
    pub fn set(&mut self, name: &str, value: bool) -> bool {
        match name {
            "let_terminator_is_semi" => {
                self.let_terminator_is_semi = value;
                true
            }
            _ => false,
        }
    }
}

/// On-disk configuration (`dslxp --config FILE`).
///
/// ```toml
/// [parser]
/// let_terminator_is_semi = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub parser: ParserConfig,
}

impl ConfigFile {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert!(ParserConfig::default().let_terminator_is_semi);
        let file = ConfigFile::from_toml_str("").unwrap();
        assert_eq!(file.parser, ParserConfig::default());
    }

    #[test]
    fn test_toml_override() {
        let file = ConfigFile::from_toml_str("[parser]\nlet_terminator_is_semi = false\n").unwrap();
        assert!(!file.parser.let_terminator_is_semi);
    }

    #[test]
    fn test_set_unknown_option() {
        let mut config = ParserConfig::default();
        assert!(!config.set("no_such_option", true));
        assert!(config.set("let_terminator_is_semi", false));
        assert!(!config.let_terminator_is_semi);
    }
}
