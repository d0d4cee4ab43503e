//! Expression grammar
//!
//! Block-structured expressions (`let`, `match`, `for`, `while`) are chosen
//! by their leading keyword. Everything else goes through the precedence
//! ladder, loosest level first:
//!
//! ```text
//! ternary -> || -> && -> comparison -> | -> ^ -> & -> shift -> + ++ - -> * / % -> as -> term
//! ```

use super::Parser;
use crate::ast::*;
use crate::bindings::{Bindings, BoundNode};
use crate::common::Span;
use crate::diagnostics::{ParseError, ParseResult};
use crate::lexer::{Token, TokenKind};
use tracing::trace;

const STRONG_ARITHMETIC: &[BinopKind] = &[BinopKind::Mul, BinopKind::Div, BinopKind::Mod];
const WEAK_ARITHMETIC: &[BinopKind] = &[BinopKind::Add, BinopKind::Concat, BinopKind::Sub];
const SHIFTS: &[BinopKind] = &[BinopKind::Shll, BinopKind::Shrl, BinopKind::Shra];
const COMPARISONS: &[BinopKind] = &[
    BinopKind::Eq,
    BinopKind::Ne,
    BinopKind::Gt,
    BinopKind::Ge,
    BinopKind::Lt,
    BinopKind::Le,
];

/// One entry between the braces of a struct instance.
enum StructEntry {
    Field(String, ExprId),
    Splat(ExprId, Span),
}

impl<'t> Parser<'t> {
    /// Parse one expression against `bindings`.
    pub fn parse_expression(&mut self, bindings: &mut Bindings<'_>) -> ParseResult<ExprId> {
        match self.peek() {
            TokenKind::For => self.parse_for(bindings),
            TokenKind::While => self.parse_while(bindings),
            TokenKind::Match => self.parse_match(bindings),
            TokenKind::Let | TokenKind::Const => self.parse_let(bindings),
            _ => self.parse_ternary_expression(bindings),
        }
    }

    fn make_binop(&mut self, op: BinopKind, lhs: ExprId, rhs: ExprId) -> ExprId {
        let span = self.module[lhs].span.merge(self.module[rhs].span);
        self.module.make_expr(ExprKind::Binop { op, lhs, rhs }, span)
    }

    fn make_unit(&mut self, span: Span) -> ExprId {
        self.module.make_expr(ExprKind::Tuple { members: Vec::new() }, span)
    }

    // ==================== PRECEDENCE LADDER ====================

    /// `consequent if test else alternate`
    fn parse_ternary_expression(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        let consequent = self.parse_logical_or_expression(b)?;
        if !self.try_drop(TokenKind::If) {
            return Ok(consequent);
        }
        let test = self.parse_logical_or_expression(b)?;
        self.drop_or_error(TokenKind::Else)?;
        let alternate = self.parse_expression(b)?;
        let span = self.module[consequent].span.merge(self.module[alternate].span);
        Ok(self.module.make_expr(
            ExprKind::Ternary {
                test,
                consequent,
                alternate,
            },
            span,
        ))
    }

    /// Fold `operand (op operand)*` to the left for the operators in `ops`.
    fn parse_binop_chain(
        &mut self,
        mut operand: impl FnMut(&mut Self) -> ParseResult<ExprId>,
        ops: &[BinopKind],
    ) -> ParseResult<ExprId> {
        let mut lhs = operand(self)?;
        while let Some(op) = ops.iter().copied().find(|op| self.at(op.token())) {
            self.pop();
            let rhs = operand(self)?;
            lhs = self.make_binop(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_logical_or_expression(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        self.parse_binop_chain(|p| p.parse_logical_and_expression(b), &[BinopKind::LogicalOr])
    }

    fn parse_logical_and_expression(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        self.parse_binop_chain(|p| p.parse_comparison_expression(b), &[BinopKind::LogicalAnd])
    }

    fn parse_comparison_expression(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        self.parse_binop_chain(|p| p.parse_or_expression(b), COMPARISONS)
    }

    fn parse_or_expression(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        self.parse_binop_chain(|p| p.parse_xor_expression(b), &[BinopKind::BitOr])
    }

    fn parse_xor_expression(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        self.parse_binop_chain(|p| p.parse_and_expression(b), &[BinopKind::BitXor])
    }

    fn parse_and_expression(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        self.parse_binop_chain(|p| p.parse_shift_expression(b), &[BinopKind::BitAnd])
    }

    fn parse_shift_expression(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        self.parse_binop_chain(|p| p.parse_weak_arithmetic_expression(b), SHIFTS)
    }

    fn parse_weak_arithmetic_expression(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        self.parse_binop_chain(|p| p.parse_strong_arithmetic_expression(b), WEAK_ARITHMETIC)
    }

    fn parse_strong_arithmetic_expression(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        self.parse_binop_chain(|p| p.parse_cast_as_expression(b), STRONG_ARITHMETIC)
    }

    /// `term (as type)*`
    fn parse_cast_as_expression(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        let mut expr = self.parse_term(b)?;
        while self.try_drop(TokenKind::As) {
            let type_annotation = self.parse_type_annotation(b)?;
            let span = self.module[expr].span.merge(self.module[type_annotation].span);
            expr = self.module.make_expr(
                ExprKind::Cast {
                    type_annotation,
                    expr,
                },
                span,
            );
        }
        Ok(expr)
    }

    // ==================== TERMS ====================

    fn parse_term(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        let head = self.parse_term_head(b)?;
        self.parse_postfix(head, b)
    }

    fn parse_term_head(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        match self.peek() {
            kind if kind.is_number_literal() => self.parse_number(None),
            TokenKind::Ident => self.parse_name_term(b),
            TokenKind::BuiltinType => {
                let type_annotation = self.parse_type_annotation(b)?;
                self.parse_cast_or_struct_instance(type_annotation, b)
            }
            TokenKind::LParen => self.parse_paren_or_tuple(b),
            TokenKind::LBracket => self.parse_array(None, b),
            TokenKind::Minus | TokenKind::Bang => {
                let op_token = self.pop();
                let op = if op_token.kind == TokenKind::Minus {
                    UnopKind::Negate
                } else {
                    UnopKind::Invert
                };
                let operand = self.parse_term(b)?;
                let span = op_token.span.merge(self.module[operand].span);
                Ok(self.module.make_expr(ExprKind::Unop { op, operand }, span))
            }
            TokenKind::Carry => self.parse_carry(),
            TokenKind::LBrace => self.parse_block_expression(b),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// An identifier in term position. What follows depends on what the
    /// name is bound to, so it is resolved before anything else is consumed.
    fn parse_name_term(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        let name = self.pop_identifier()?;
        if self.at(TokenKind::ColonColon) {
            if self.at_mod_struct_instance(&name, b) {
                let struct_ref = self.parse_type_ref_annotation(name, b)?;
                return self.parse_struct_instance(struct_ref, b);
            }
            return self.parse_colon_ref(name, b);
        }
        let bound = b.resolve(&name.text, name.span)?;
        if bound.is_type_definition() {
            let type_annotation = self.parse_type_ref_annotation(name, b)?;
            return self.parse_cast_or_struct_instance(type_annotation, b);
        }
        self.make_value_ref(name, bound)
    }

    /// Whether `m::Name { field: ...` or `m::Name { ..base` follows an imported
    /// module name. The body must open with a field or a splat so that
    /// `while i < m::LIMIT { ... }` still reads as a loop.
    fn at_mod_struct_instance(&self, subject: &Token, b: &Bindings<'_>) -> bool {
        if !matches!(b.resolve_node(&subject.text), Some(BoundNode::Import(_))) {
            return false;
        }
        if self.peek_n(1) != TokenKind::Ident || self.peek_n(2) != TokenKind::LBrace {
            return false;
        }
        match self.peek_n(3) {
            TokenKind::DotDot => true,
            TokenKind::Ident => self.peek_n(4) == TokenKind::Colon,
            _ => false,
        }
    }

    /// Name or constant reference for a token already resolved to `bound`.
    pub(super) fn make_value_ref(&mut self, name: Token, bound: BoundNode) -> ParseResult<ExprId> {
        let kind = match bound {
            BoundNode::NameDef(id) => ExprKind::NameRef {
                identifier: name.text,
                def: AnyNameDef::NameDef(id),
            },
            BoundNode::BuiltinNameDef(builtin) => ExprKind::NameRef {
                identifier: name.text,
                def: AnyNameDef::Builtin(builtin),
            },
            BoundNode::ConstantDef { constant, name_def } => ExprKind::ConstRef {
                identifier: name.text,
                constant,
                name_def,
            },
            BoundNode::Import(_) => {
                return Err(ParseError::syntax(
                    format!("module `{}` can only be used through `::`", name.text),
                    name.span,
                ));
            }
            other => {
                return Err(ParseError::syntax(
                    format!("`{}` refers to {}, not a value", name.text, other.describe()),
                    name.span,
                ));
            }
        };
        Ok(self.module.make_expr(kind, name.span))
    }

    /// `subject::attr`: an enum member or a module member, depending on
    /// what `subject` resolves to.
    pub(super) fn parse_colon_ref(&mut self, subject: Token, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        let bound = b.resolve(&subject.text, subject.span)?;
        self.drop_or_error(TokenKind::ColonColon)?;
        let attr = self.pop_identifier()?;
        let span = subject.span.merge(attr.span);
        let kind = match bound {
            BoundNode::Import(import) => ExprKind::ModRef {
                import,
                attr: attr.text,
            },
            BoundNode::Enum(id) => ExprKind::EnumRef {
                subject: TypeDefinition::Enum(id),
                attr: attr.text,
            },
            BoundNode::TypeDef(id) => ExprKind::EnumRef {
                subject: TypeDefinition::TypeDef(id),
                attr: attr.text,
            },
            other => {
                return Err(ParseError::syntax(
                    format!(
                        "`{}` refers to {}, which has no members reachable with `::`",
                        subject.text,
                        other.describe()
                    ),
                    subject.span,
                ));
            }
        };
        Ok(self.module.make_expr(kind, span))
    }

    /// After a type: `{` starts a struct instance, `:` a typed literal or cast.
    fn parse_cast_or_struct_instance(
        &mut self,
        type_annotation: TypeAnnotationId,
        b: &mut Bindings<'_>,
    ) -> ParseResult<ExprId> {
        let is_type_ref = matches!(
            self.module[type_annotation].kind,
            TypeAnnotationKind::TypeRef { .. }
        );
        match self.peek() {
            TokenKind::LBrace if is_type_ref => self.parse_struct_instance(type_annotation, b),
            TokenKind::Colon => {
                self.pop();
                self.parse_cast_rhs(type_annotation, b)
            }
            _ if is_type_ref => Err(self.unexpected("`:` or `{` after type")),
            _ => Err(self.unexpected("`:` after type")),
        }
    }

    /// `type:number`, `type:[...]` or `type:term`.
    fn parse_cast_rhs(
        &mut self,
        type_annotation: TypeAnnotationId,
        b: &mut Bindings<'_>,
    ) -> ParseResult<ExprId> {
        match self.peek() {
            kind if kind.is_number_literal() => self.parse_number(Some(type_annotation)),
            TokenKind::LBracket => self.parse_array(Some(type_annotation), b),
            _ => {
                let expr = self.parse_term(b)?;
                let span = self.module[type_annotation].span.merge(self.module[expr].span);
                Ok(self.module.make_expr(
                    ExprKind::Cast {
                        type_annotation,
                        expr,
                    },
                    span,
                ))
            }
        }
    }

    /// `(x)` is `x` itself; `()`, `(x,)` and `(x, y)` are tuples.
    fn parse_paren_or_tuple(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        let start = self.drop_or_error(TokenKind::LParen)?;
        if self.try_drop(TokenKind::RParen) {
            let span = self.span_from(start);
            return Ok(self.make_unit(span));
        }

        let first = self.parse_expression(b)?;
        if !self.try_drop(TokenKind::Comma) {
            self.drop_or_error(TokenKind::RParen)?;
            return Ok(first);
        }

        let mut members = vec![first];
        members.extend(self.parse_comma_seq(|p| p.parse_expression(b), TokenKind::RParen)?);
        let span = self.span_from(start);
        Ok(self.module.make_expr(ExprKind::Tuple { members }, span))
    }

    /// `[a, b, c]`, optionally ending in `...` to repeat the last member.
    fn parse_array(
        &mut self,
        type_annotation: Option<TypeAnnotationId>,
        b: &mut Bindings<'_>,
    ) -> ParseResult<ExprId> {
        let open = self.drop_or_error(TokenKind::LBracket)?;
        let start = type_annotation.map_or(open, |t| self.module[t].span);

        let mut members = Vec::new();
        let mut has_ellipsis = false;
        loop {
            if self.try_drop(TokenKind::RBracket) {
                break;
            }
            if let Some(ellipsis) = self.try_pop(TokenKind::Ellipsis) {
                if members.is_empty() {
                    return Err(ParseError::syntax(
                        "`...` must follow at least one array member",
                        ellipsis.span,
                    ));
                }
                has_ellipsis = true;
                self.drop_or_error(TokenKind::RBracket)?;
                break;
            }
            members.push(self.parse_expression(b)?);
            if !self.try_drop(TokenKind::Comma) {
                self.drop_or_error(TokenKind::RBracket)?;
                break;
            }
        }

        let span = self.span_from(start);
        Ok(self.module.make_expr(
            ExprKind::Array {
                type_annotation,
                members,
                has_ellipsis,
            },
            span,
        ))
    }

    /// Invocations, attribute accesses, indexing and slicing.
    fn parse_postfix(&mut self, mut lhs: ExprId, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        loop {
            let start = self.module[lhs].span;
            let kind = match self.peek() {
                TokenKind::LParen => {
                    self.pop();
                    let args = self.parse_comma_seq(|p| p.parse_expression(b), TokenKind::RParen)?;
                    ExprKind::Invocation { callee: lhs, args }
                }
                TokenKind::Dot => {
                    self.pop();
                    let attr = self.pop_identifier()?;
                    ExprKind::Attr {
                        lhs,
                        attr: attr.text,
                    }
                }
                TokenKind::LBracket => {
                    self.pop();
                    let index = self.parse_index_rhs(b)?;
                    ExprKind::Index { lhs, index }
                }
                _ => return Ok(lhs),
            };
            let span = self.span_from(start);
            lhs = self.module.make_expr(kind, span);
        }
    }

    /// Contents of `[...]` after an expression, through the closing bracket.
    fn parse_index_rhs(&mut self, b: &mut Bindings<'_>) -> ParseResult<IndexRhs> {
        let start = if self.at(TokenKind::Colon) {
            None
        } else {
            Some(self.parse_expression(b)?)
        };

        let index = match start {
            Some(start) if self.try_drop(TokenKind::PlusColon) => {
                let width = self.parse_type_annotation(b)?;
                IndexRhs::WidthSlice { start, width }
            }
            _ if self.try_drop(TokenKind::Colon) => {
                let limit = if self.at(TokenKind::RBracket) {
                    None
                } else {
                    Some(self.parse_expression(b)?)
                };
                IndexRhs::Slice { start, limit }
            }
            Some(index) => IndexRhs::Expr(index),
            None => return Err(self.unexpected("index expression")),
        };
        self.drop_or_error(TokenKind::RBracket)?;
        Ok(index)
    }

    fn parse_struct_instance(
        &mut self,
        struct_ref: TypeAnnotationId,
        b: &mut Bindings<'_>,
    ) -> ParseResult<ExprId> {
        let start = self.module[struct_ref].span;
        self.drop_or_error(TokenKind::LBrace)?;
        let entries = self.parse_comma_seq(|p| p.parse_struct_entry(b), TokenKind::RBrace)?;

        let count = entries.len();
        let mut members = Vec::new();
        let mut splatted = None;
        for (i, entry) in entries.into_iter().enumerate() {
            match entry {
                StructEntry::Field(name, expr) => members.push((name, expr)),
                StructEntry::Splat(_, span) if i + 1 != count => {
                    return Err(ParseError::syntax(
                        "`..` splat must be the last member of a struct instance",
                        span,
                    ));
                }
                StructEntry::Splat(expr, _) => splatted = Some(expr),
            }
        }

        let span = self.span_from(start);
        let kind = match splatted {
            Some(splatted) => ExprKind::SplatStructInstance {
                struct_ref,
                members,
                splatted,
            },
            None => ExprKind::StructInstance {
                struct_ref,
                members,
            },
        };
        Ok(self.module.make_expr(kind, span))
    }

    /// `name: expr`, shorthand `name`, or `..expr`.
    fn parse_struct_entry(&mut self, b: &mut Bindings<'_>) -> ParseResult<StructEntry> {
        if let Some(dots) = self.try_pop(TokenKind::DotDot) {
            let expr = self.parse_expression(b)?;
            return Ok(StructEntry::Splat(expr, dots.span));
        }
        let name = self.pop_identifier()?;
        if self.try_drop(TokenKind::Colon) {
            let expr = self.parse_expression(b)?;
            return Ok(StructEntry::Field(name.text, expr));
        }
        let bound = b.resolve(&name.text, name.span)?;
        let field = name.text.clone();
        let expr = self.make_value_ref(name, bound)?;
        Ok(StructEntry::Field(field, expr))
    }

    fn parse_carry(&mut self) -> ParseResult<ExprId> {
        let token = self.pop_or_error(TokenKind::Carry)?;
        match self.loop_stack.last().copied() {
            Some(loop_id) => Ok(self.module.make_expr(ExprKind::Carry { loop_id }, token.span)),
            None => Err(ParseError::syntax(
                "`carry` can only be used inside a `while` loop",
                token.span,
            )),
        }
    }

    // ==================== LITERALS ====================

    pub(super) fn parse_number(
        &mut self,
        type_annotation: Option<TypeAnnotationId>,
    ) -> ParseResult<ExprId> {
        let token = self.pop();
        let (kind, text) = match token.kind {
            TokenKind::IntLit => (NumberKind::Decimal, token.text.replace('_', "")),
            TokenKind::HexLit => (NumberKind::Hex, radix_digits(&token, 16, "hexadecimal")?),
            TokenKind::BinLit => (NumberKind::Binary, radix_digits(&token, 2, "binary")?),
            TokenKind::CharLit => (NumberKind::Character, decode_char(&token)?),
            TokenKind::True | TokenKind::False => (NumberKind::Bool, token.text.clone()),
            _ => return Err(ParseError::unexpected("number", token.describe(), token.span)),
        };
        let span = match type_annotation {
            Some(t) => self.module[t].span.merge(token.span),
            None => token.span,
        };
        Ok(self.module.make_expr(
            ExprKind::Number(Number {
                text,
                kind,
                type_annotation,
            }),
            span,
        ))
    }

    /// Enum member values: a literal, or a constant reference (not supported).
    pub(super) fn parse_num_or_const_ref(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        match self.peek() {
            kind if kind.is_number_literal() => self.parse_number(None),
            TokenKind::BuiltinType => {
                let type_annotation = self.parse_type_annotation(b)?;
                self.drop_or_error(TokenKind::Colon)?;
                self.parse_number(Some(type_annotation))
            }
            TokenKind::Ident => self.parse_const_ref(),
            _ => Err(self.unexpected("number or constant reference")),
        }
    }

    fn parse_const_ref(&mut self) -> ParseResult<ExprId> {
        let name = self.pop_identifier()?;
        Err(ParseError::unsupported(
            format!("constant reference `{}` as an enum value", name.text),
            name.span,
        ))
    }

    // ==================== BLOCK EXPRESSIONS ====================

    /// `{ expr }` in a fresh child scope; `{}` holds the empty tuple.
    pub(super) fn parse_block_expression(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        let start = self.drop_or_error(TokenKind::LBrace)?;
        let body = if let Some(close) = self.try_pop(TokenKind::RBrace) {
            self.make_unit(start.merge(close.span))
        } else {
            let mut block_bindings = b.child();
            trace!(depth = block_bindings.depth(), "entered block scope");
            let body = self.parse_expression(&mut block_bindings)?;
            self.drop_or_error(TokenKind::RBrace)?;
            body
        };
        let span = self.span_from(start);
        Ok(self.module.make_expr(ExprKind::Block { body }, span))
    }

    /// `let pattern (: type)? = rhs; body`. The names the pattern binds are
    /// visible in `body` only. A missing body is the empty tuple.
    fn parse_let(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        let keyword = self.pop();
        let is_const = match keyword.kind {
            TokenKind::Let => false,
            TokenKind::Const => true,
            _ => {
                return Err(ParseError::unexpected(
                    "`let` or `const`",
                    keyword.describe(),
                    keyword.span,
                ));
            }
        };

        let pattern = if self.at(TokenKind::LParen) {
            self.parse_name_def_tree()?
        } else {
            self.parse_name_def_or_wildcard_leaf()?
        };
        let type_annotation = if self.try_drop(TokenKind::Colon) {
            Some(self.parse_type_annotation(b)?)
        } else {
            None
        };
        self.drop_or_error(TokenKind::Eq)?;
        let rhs = self.parse_expression(b)?;

        let terminator = if self.config.let_terminator_is_semi {
            TokenKind::Semi
        } else {
            TokenKind::In
        };
        let terminator_span = self.drop_or_error(terminator)?;

        let mut body_bindings = b.child();
        for name_def in self.module.name_defs_in(pattern) {
            body_bindings.add(
                self.module.identifier(name_def).to_string(),
                BoundNode::NameDef(name_def),
            );
        }
        let body = if self.at_any(&[TokenKind::RBrace, TokenKind::Eof]) {
            self.make_unit(terminator_span)
        } else {
            self.parse_expression(&mut body_bindings)?
        };

        let span = self.span_from(keyword.span);
        Ok(self.module.make_expr(
            ExprKind::Let {
                pattern,
                type_annotation,
                rhs,
                body,
                is_const,
            },
            span,
        ))
    }

    fn parse_match(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        let start = self.drop_or_error(TokenKind::Match)?;
        let matched = self.parse_expression(b)?;
        self.drop_or_error(TokenKind::LBrace)?;
        let arms = self.parse_comma_seq(|p| p.parse_match_arm(b), TokenKind::RBrace)?;
        let span = self.span_from(start);
        Ok(self.module.make_expr(ExprKind::Match { matched, arms }, span))
    }

    /// `pattern (| pattern)* => expr`, in a scope of its own.
    fn parse_match_arm(&mut self, b: &mut Bindings<'_>) -> ParseResult<MatchArm> {
        let start = self.span();
        let mut arm_bindings = b.child();
        let mut patterns = vec![self.parse_pattern(&mut arm_bindings)?];
        while self.try_drop(TokenKind::Pipe) {
            patterns.push(self.parse_pattern(&mut arm_bindings)?);
        }
        self.drop_or_error(TokenKind::FatArrow)?;
        let expr = self.parse_expression(&mut arm_bindings)?;
        Ok(MatchArm {
            patterns,
            expr,
            span: self.span_from(start),
        })
    }

    /// `for names (: type)? in iterable { body }(init)`
    fn parse_for(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        let start = self.drop_or_error(TokenKind::For)?;
        let names = if self.at(TokenKind::LParen) {
            self.parse_name_def_tree()?
        } else {
            self.parse_name_def_or_wildcard_leaf()?
        };
        let type_annotation = if self.try_drop(TokenKind::Colon) {
            Some(self.parse_type_annotation(b)?)
        } else {
            None
        };
        self.drop_or_error(TokenKind::In)?;
        let iterable = self.parse_expression(b)?;

        let mut body_bindings = b.child();
        for name_def in self.module.name_defs_in(names) {
            body_bindings.add(
                self.module.identifier(name_def).to_string(),
                BoundNode::NameDef(name_def),
            );
        }
        let body = self.parse_block_expression(&mut body_bindings)?;
        drop(body_bindings);

        let init = self.parse_loop_init(b)?;
        let span = self.span_from(start);
        Ok(self.module.make_expr(
            ExprKind::For {
                names,
                type_annotation,
                iterable,
                body,
                init,
            },
            span,
        ))
    }

    /// `while test { body }(init)`. `carry` in the test or body refers to
    /// this loop; the initial value is outside it.
    fn parse_while(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        let start = self.drop_or_error(TokenKind::While)?;
        let loop_id = self.module.begin_loop();

        self.loop_stack.push(loop_id);
        let test_and_body = self.parse_while_test_and_body(b);
        self.loop_stack.pop();
        let (test, body) = test_and_body?;

        let init = self.parse_loop_init(b)?;
        let span = self.span_from(start);
        let node = self.module.make_expr(
            ExprKind::While {
                loop_id,
                test,
                body,
                init,
            },
            span,
        );
        self.module.finish_loop(loop_id, node);
        Ok(node)
    }

    fn parse_while_test_and_body(&mut self, b: &mut Bindings<'_>) -> ParseResult<(ExprId, ExprId)> {
        let test = self.parse_expression(b)?;
        let body = self.parse_block_expression(b)?;
        Ok((test, body))
    }

    fn parse_loop_init(&mut self, b: &mut Bindings<'_>) -> ParseResult<ExprId> {
        self.drop_or_error(TokenKind::LParen)?;
        let init = self.parse_expression(b)?;
        self.drop_or_error(TokenKind::RParen)?;
        Ok(init)
    }
}

/// Validate the digits of a `0x`/`0b` literal; returns it without separators.
fn radix_digits(token: &Token, radix: u32, radix_name: &str) -> ParseResult<String> {
    let (prefix, rest) = token.text.split_at_checked(2).unwrap_or((token.text.as_str(), ""));
    let digits: String = rest.chars().filter(|c| *c != '_').collect();
    if digits.is_empty() {
        return Err(ParseError::malformed(
            format!("{radix_name} literal `{}` has no digits", token.text),
            token.span,
        ));
    }
    if let Some(bad) = digits.chars().find(|c| !c.is_digit(radix)) {
        return Err(ParseError::malformed(
            format!("invalid digit `{bad}` in {radix_name} literal `{}`", token.text),
            token.span,
        ));
    }
    Ok(format!("{prefix}{digits}"))
}

/// Decode `'c'` or an escape such as `'\n'` to the character it denotes.
fn decode_char(token: &Token) -> ParseResult<String> {
    let inner = token
        .text
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or_default();
    let mut chars = inner.chars();
    let value = match (chars.next(), chars.next(), chars.next()) {
        (Some('\\'), Some(escape), None) => match escape {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            other => {
                return Err(ParseError::malformed(
                    format!("unknown character escape `\\{other}`"),
                    token.span,
                ));
            }
        },
        (Some(c), None, None) => c,
        _ => {
            return Err(ParseError::malformed(
                "character literal must hold exactly one character",
                token.span,
            ));
        }
    };
    if !value.is_ascii() {
        return Err(ParseError::malformed(
            format!("character literal `{}` is not ASCII", token.text),
            token.span,
        ));
    }
    Ok(value.to_string())
}
