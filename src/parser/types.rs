//! Type annotations: builtin types with dimensions, tuples, and references
//! to named types with parametric arguments and dimensions.

use super::Parser;
use crate::ast::*;
use crate::bindings::{Bindings, BoundNode};
use crate::diagnostics::{ParseError, ParseResult};
use crate::lexer::{BuiltinType, Token, TokenKind};

impl<'t> Parser<'t> {
    pub(super) fn parse_type_annotation(
        &mut self,
        b: &mut Bindings<'_>,
    ) -> ParseResult<TypeAnnotationId> {
        match self.peek() {
            TokenKind::LParen => {
                let start = self.drop_or_error(TokenKind::LParen)?;
                let members =
                    self.parse_comma_seq(|p| p.parse_type_annotation(b), TokenKind::RParen)?;
                let span = self.span_from(start);
                Ok(self.module.alloc_type(TypeAnnotation {
                    kind: TypeAnnotationKind::Tuple { members },
                    span,
                }))
            }
            TokenKind::BuiltinType => {
                let keyword = self.pop();
                let builtin = BuiltinType::from_keyword(&keyword.text).ok_or_else(|| {
                    ParseError::malformed(format!("unknown builtin type `{}`", keyword.text), keyword.span)
                })?;
                let dims = self.parse_dims(b)?;
                if builtin.requires_width() && dims.is_empty() {
                    return Err(ParseError::malformed(
                        format!("`{0}` needs a width dimension, as in `{0}[8]`", keyword.text),
                        keyword.span,
                    ));
                }
                let span = self.span_from(keyword.span);
                Ok(self.module.alloc_type(TypeAnnotation {
                    kind: TypeAnnotationKind::Builtin { builtin, dims },
                    span,
                }))
            }
            TokenKind::Ident => {
                let name = self.pop();
                self.parse_type_ref_annotation(name, b)
            }
            _ => Err(self.unexpected("type")),
        }
    }

    /// The rest of a type whose leading identifier has been consumed.
    pub(super) fn parse_type_ref_annotation(
        &mut self,
        name: Token,
        b: &mut Bindings<'_>,
    ) -> ParseResult<TypeAnnotationId> {
        let type_ref = self.parse_type_ref(name, b)?;
        let parametrics = if self.at(TokenKind::LBracket) && self.takes_parametrics(&type_ref.definition) {
            self.parse_parametrics(b)?
        } else {
            Vec::new()
        };
        let dims = self.parse_dims(b)?;
        let span = self.span_from(type_ref.span);
        Ok(self.module.alloc_type(TypeAnnotation {
            kind: TypeAnnotationKind::TypeRef {
                type_ref,
                parametrics,
                dims,
            },
            span,
        }))
    }

    /// `Name` or `module::Name`, resolved before the qualifier is inspected.
    fn parse_type_ref(&mut self, name: Token, b: &mut Bindings<'_>) -> ParseResult<TypeRef> {
        let bound = b.resolve(&name.text, name.span)?;

        if self.at(TokenKind::ColonColon) {
            let BoundNode::Import(import) = bound else {
                return Err(ParseError::syntax(
                    format!(
                        "`{}` refers to {}; only imported modules can qualify a type",
                        name.text,
                        bound.describe()
                    ),
                    name.span,
                ));
            };
            self.pop();
            let attr = self.pop_identifier()?;
            return Ok(TypeRef {
                text: format!("{}::{}", name.text, attr.text),
                definition: TypeDefinition::ModRef {
                    import,
                    attr: attr.text,
                },
                span: name.span.merge(attr.span),
            });
        }

        let definition = match bound {
            BoundNode::TypeDef(id) => TypeDefinition::TypeDef(id),
            BoundNode::Struct(id) => TypeDefinition::Struct(id),
            BoundNode::Enum(id) => TypeDefinition::Enum(id),
            other => {
                return Err(ParseError::syntax(
                    format!("`{}` refers to {}, not a type", name.text, other.describe()),
                    name.span,
                ));
            }
        };
        Ok(TypeRef {
            text: name.text,
            definition,
            span: name.span,
        })
    }

    /// Only locally defined parametric structs take `[...]` arguments;
    /// for anything else a bracket starts a dimension.
    fn takes_parametrics(&self, definition: &TypeDefinition) -> bool {
        match definition {
            TypeDefinition::Struct(id) => self.module[*id].is_parametric(),
            _ => false,
        }
    }

    fn parse_parametrics(&mut self, b: &mut Bindings<'_>) -> ParseResult<Vec<ExprId>> {
        self.drop_or_error(TokenKind::LBracket)?;
        self.parse_comma_seq(|p| p.parse_dim(b), TokenKind::RBracket)
    }

    /// Zero or more `[dim]` suffixes, outermost first: `uN[2][3]` is three
    /// elements of `uN[2]`, so its dims come back as `[3, 2]`.
    fn parse_dims(&mut self, b: &mut Bindings<'_>) -> ParseResult<Vec<ExprId>> {
        let mut dims = Vec::new();
        while self.try_drop(TokenKind::LBracket) {
            dims.push(self.parse_dim(b)?);
            self.drop_or_error(TokenKind::RBracket)?;
        }
        dims.reverse();
        Ok(dims)
    }

    /// A number, a name, or a `::` reference.
    fn parse_dim(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        match self.peek() {
            kind if kind.is_number_literal() => self.parse_number(None),
            TokenKind::Ident => {
                let name = self.pop();
                if self.at(TokenKind::ColonColon) {
                    return self.parse_colon_ref(name, b);
                }
                let bound = b.resolve(&name.text, name.span)?;
                self.make_value_ref(name, bound)
            }
            _ => Err(self.unexpected("dimension")),
        }
    }
}
