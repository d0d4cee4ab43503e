//! Patterns: destructuring trees for `let`/`for`, and match-arm patterns.

use super::Parser;
use crate::ast::*;
use crate::bindings::{Bindings, BoundNode};
use crate::diagnostics::{ParseError, ParseResult};
use crate::lexer::TokenKind;

impl<'t> Parser<'t> {
    /// `(a, (b, _), c)`: only names and wildcards at the leaves.
    pub(super) fn parse_name_def_tree(&mut self) -> ParseResult<NameDefTreeId> {
        let start = self.drop_or_error(TokenKind::LParen)?;
        let members = self.parse_comma_seq(
            |p| {
                if p.at(TokenKind::LParen) {
                    p.parse_name_def_tree()
                } else {
                    p.parse_name_def_or_wildcard_leaf()
                }
            },
            TokenKind::RParen,
        )?;
        let span = self.span_from(start);
        Ok(self.module.alloc_name_def_tree(NameDefTree {
            kind: NameDefTreeKind::Nodes(members),
            span,
        }))
    }

    pub(super) fn parse_name_def_or_wildcard_leaf(&mut self) -> ParseResult<NameDefTreeId> {
        let token = self.pop();
        let leaf = match token.kind {
            TokenKind::Underscore => Leaf::Wildcard,
            TokenKind::Ident => Leaf::NameDef(self.module.make_name_def(token.text, token.span)),
            _ => {
                return Err(ParseError::unexpected(
                    "name or `_`",
                    token.describe(),
                    token.span,
                ));
            }
        };
        Ok(self.module.alloc_name_def_tree(NameDefTree {
            kind: NameDefTreeKind::Leaf(leaf),
            span: token.span,
        }))
    }

    /// A match-arm pattern. An identifier that is already bound matches
    /// against that value; an unbound one introduces a new name in `b`.
    pub(super) fn parse_pattern(&mut self, b: &mut Bindings<'_>) -> ParseResult<NameDefTreeId> {
        let start = self.span();
        let leaf = match self.peek() {
            TokenKind::LParen => {
                self.pop();
                let members = self.parse_comma_seq(|p| p.parse_pattern(b), TokenKind::RParen)?;
                let span = self.span_from(start);
                return Ok(self.module.alloc_name_def_tree(NameDefTree {
                    kind: NameDefTreeKind::Nodes(members),
                    span,
                }));
            }
            TokenKind::Underscore => {
                self.pop();
                Leaf::Wildcard
            }
            kind if kind.is_number_literal() => Leaf::Value(self.parse_number(None)?),
            TokenKind::BuiltinType => {
                let type_annotation = self.parse_type_annotation(b)?;
                self.drop_or_error(TokenKind::Colon)?;
                Leaf::Value(self.parse_number(Some(type_annotation))?)
            }
            TokenKind::Ident => {
                let name = self.pop();
                if self.at(TokenKind::ColonColon) {
                    Leaf::Value(self.parse_colon_ref(name, b)?)
                } else if let Some(bound) = b.resolve_node(&name.text) {
                    Leaf::Value(self.make_value_ref(name, bound)?)
                } else {
                    let name_def = self.module.make_name_def(&name.text, name.span);
                    b.add(name.text, BoundNode::NameDef(name_def));
                    Leaf::NameDef(name_def)
                }
            }
            _ => return Err(self.unexpected("pattern")),
        };
        let span = self.span_from(start);
        Ok(self.module.alloc_name_def_tree(NameDefTree {
            kind: NameDefTreeKind::Leaf(leaf),
            span,
        }))
    }
}
