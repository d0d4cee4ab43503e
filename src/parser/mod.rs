//! Parser for DSLX
//!
//! A recursive descent parser that builds a [`Module`] from a token stream.
//! Names are resolved while parsing: every production receives the
//! [`Bindings`] scope it is parsed in, nested constructs parse against a
//! child scope, and each reference is checked against the chain as soon as
//! it is read. There is no error recovery; the first failure is returned.

mod cursor;
mod directive;
mod expr;
mod pattern;
mod types;

use crate::ast::*;
use crate::bindings::{Bindings, BoundNode};
use crate::common::Span;
use crate::config::ParserConfig;
use crate::diagnostics::{ParseError, ParseResult};
use crate::lexer::{Token, TokenKind};
use directive::Directive;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Parser state for one compilation unit.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    /// Returned by the cursor once `tokens` is exhausted.
    eof: Token,
    module: Module,
    config: ParserConfig,
    /// Loops currently being parsed, innermost last.
    loop_stack: Vec<LoopId>,
}

impl<'t> Parser<'t> {
    pub fn new(module_name: impl Into<String>, tokens: &'t [Token]) -> Self {
        let end = tokens.last().map_or(0, |t| t.span.end);
        Self {
            tokens,
            pos: 0,
            eof: Token {
                kind: TokenKind::Eof,
                span: Span::point(end),
                text: String::new(),
            },
            module: Module::new(module_name),
            config: ParserConfig::default(),
            loop_stack: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> ParserConfig {
        self.config
    }

    /// Nodes allocated so far.
    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn into_module(self) -> Module {
        self.module
    }

    /// Number of `while` loops whose parse is in progress.
    pub fn loop_depth(&self) -> usize {
        self.loop_stack.len()
    }

    // ==================== MODULE ====================

    /// Parse a whole module against a fresh root scope holding the builtins.
    pub fn parse_module(self) -> ParseResult<Module> {
        let mut bindings = Bindings::with_builtins();
        self.parse_module_with(&mut bindings)
    }

    /// Parse a whole module, binding its top-level names into `bindings`.
    pub fn parse_module_with(mut self, bindings: &mut Bindings<'_>) -> ParseResult<Module> {
        let span = tracing::debug_span!("parse_module", module = %self.module.name());
        let _enter = span.enter();

        let mut name_to_fn: FxHashMap<String, FunctionId> = FxHashMap::default();
        while !self.is_at_end() {
            self.parse_top_item(bindings, &mut name_to_fn)?;
        }

        debug!(members = self.module.top().len(), "parsed module");
        Ok(self.module)
    }

    // ==================== ITEMS ====================

    fn parse_top_item(
        &mut self,
        bindings: &mut Bindings<'_>,
        name_to_fn: &mut FxHashMap<String, FunctionId>,
    ) -> ParseResult<()> {
        if self.at(TokenKind::Hash) {
            match self.parse_directive(name_to_fn, bindings)? {
                Directive::Test(id) => {
                    let name = self.module.function_name(self.module[id].function).to_string();
                    self.module.add_member(name, ModuleMember::TestFunction(id));
                }
                Directive::QuickCheck(id) => {
                    let name = self.module.function_name(self.module[id].function).to_string();
                    self.module.add_member(name, ModuleMember::QuickCheck(id));
                }
                Directive::Config => {}
            }
            return Ok(());
        }

        let pub_span = self.span();
        let is_public = self.try_drop(TokenKind::Pub);

        match self.peek() {
            TokenKind::Fn => {
                let function = self.parse_function(is_public, bindings)?;
                self.record_function(function, name_to_fn)?;
                let name = self.module.function_name(function).to_string();
                self.module.add_member(name, ModuleMember::Function(function));
            }
            TokenKind::Proc => {
                let proc = self.parse_proc(is_public, bindings)?;
                let name = self.module.identifier(self.module[proc].name_def).to_string();
                self.module.add_member(name, ModuleMember::Proc(proc));
            }
            TokenKind::Struct => {
                let id = self.parse_struct(is_public, bindings)?;
                let name = self.module.identifier(self.module[id].name_def).to_string();
                self.module.add_member(name, ModuleMember::Struct(id));
            }
            TokenKind::Enum => {
                let id = self.parse_enum(is_public, bindings)?;
                let name = self.module.identifier(self.module[id].name_def).to_string();
                self.module.add_member(name, ModuleMember::Enum(id));
            }
            TokenKind::Type => {
                let id = self.parse_type_definition(is_public, bindings)?;
                let name = self.module.identifier(self.module[id].name_def).to_string();
                self.module.add_member(name, ModuleMember::TypeDef(id));
            }
            TokenKind::Const => {
                let id = self.parse_constant(is_public, bindings)?;
                let name = self.module.identifier(self.module[id].name_def).to_string();
                self.module.add_member(name, ModuleMember::Constant(id));
            }
            TokenKind::Import | TokenKind::Test | TokenKind::Hash if is_public => {
                return Err(ParseError::syntax(
                    format!("`pub` cannot be applied to `{}`", self.peek()),
                    pub_span,
                ));
            }
            TokenKind::Import => {
                let id = self.parse_import(bindings)?;
                let name = self.module.identifier(self.module[id].name_def).to_string();
                self.module.add_member(name, ModuleMember::Import(id));
            }
            TokenKind::Test => {
                let id = self.parse_test_construct(bindings)?;
                let name = self.module.identifier(self.module[id].name_def).to_string();
                self.module.add_member(name, ModuleMember::Test(id));
            }
            _ => return Err(self.unexpected("start of a top-level construct")),
        }
        Ok(())
    }

    /// Remember `function` by name, rejecting a second definition.
    fn record_function(
        &self,
        function: FunctionId,
        name_to_fn: &mut FxHashMap<String, FunctionId>,
    ) -> ParseResult<()> {
        let name_def = &self.module[self.module[function].name_def];
        if let Some(previous) = name_to_fn.get(&name_def.identifier) {
            let previous_span = self.module[self.module[*previous].name_def].span;
            return Err(ParseError::syntax(
                format!(
                    "function `{}` is defined in this module multiple times; previously defined at {previous_span}",
                    name_def.identifier
                ),
                name_def.span,
            ));
        }
        name_to_fn.insert(name_def.identifier.clone(), function);
        Ok(())
    }

    // ==================== FUNCTIONS ====================

    /// Parse `fn [parametrics] name(params) -> type { body }`.
    ///
    /// Parametric bindings and parameters are visible in the signature and
    /// body only. The function's own name is bound in `bindings` once the
    /// whole definition has parsed.
    pub fn parse_function(
        &mut self,
        is_public: bool,
        bindings: &mut Bindings<'_>,
    ) -> ParseResult<FunctionId> {
        let start = self.span();
        self.drop_or_error(TokenKind::Fn)?;

        let mut fn_bindings = bindings.child();
        let parametric_bindings = if self.at(TokenKind::LBracket) {
            self.parse_parametric_bindings(&mut fn_bindings)?
        } else {
            Vec::new()
        };
        let name = self.pop_identifier()?;
        let name_def = self.module.make_name_def(&name.text, name.span);
        let params = self.parse_params(&mut fn_bindings)?;
        let return_type = if self.try_drop(TokenKind::Arrow) {
            Some(self.parse_type_annotation(&mut fn_bindings)?)
        } else {
            None
        };
        let body = self.parse_block_expression(&mut fn_bindings)?;
        drop(fn_bindings);

        bindings.add(name.text.clone(), BoundNode::NameDef(name_def));
        let param_count = params.len();
        let function = self.module.alloc_function(Function {
            name_def,
            parametric_bindings,
            params,
            return_type,
            body,
            is_public,
            span: self.span_from(start),
        });
        debug!(name = %name.text, params = param_count, "parsed function");
        Ok(function)
    }

    fn parse_params(&mut self, bindings: &mut Bindings<'_>) -> ParseResult<Vec<Param>> {
        self.drop_or_error(TokenKind::LParen)?;
        self.parse_comma_seq(|p| p.parse_param(bindings), TokenKind::RParen)
    }

    fn parse_param(&mut self, bindings: &mut Bindings<'_>) -> ParseResult<Param> {
        let name = self.pop_identifier()?;
        self.drop_or_error(TokenKind::Colon)?;
        let type_annotation = self.parse_type_annotation(bindings)?;
        let name_def = self.module.make_name_def(&name.text, name.span);
        bindings.add(name.text, BoundNode::NameDef(name_def));
        Ok(Param {
            name_def,
            type_annotation,
            span: self.span_from(name.span),
        })
    }

    /// `[N: u32, M: u32 = N + N]`; each binding is visible to the ones after it.
    fn parse_parametric_bindings(
        &mut self,
        bindings: &mut Bindings<'_>,
    ) -> ParseResult<Vec<ParametricBinding>> {
        self.drop_or_error(TokenKind::LBracket)?;
        self.parse_comma_seq(|p| p.parse_parametric_binding(bindings), TokenKind::RBracket)
    }

    fn parse_parametric_binding(
        &mut self,
        bindings: &mut Bindings<'_>,
    ) -> ParseResult<ParametricBinding> {
        let name = self.pop_identifier()?;
        self.drop_or_error(TokenKind::Colon)?;
        let type_annotation = self.parse_type_annotation(bindings)?;
        let default = if self.try_drop(TokenKind::Eq) {
            Some(self.parse_expression(bindings)?)
        } else {
            None
        };
        let name_def = self.module.make_name_def(&name.text, name.span);
        bindings.add(name.text, BoundNode::NameDef(name_def));
        Ok(ParametricBinding {
            name_def,
            type_annotation,
            default,
            span: self.span_from(name.span),
        })
    }

    /// Parse `proc name(params) { next(params) { body } }`.
    pub fn parse_proc(&mut self, is_public: bool, bindings: &mut Bindings<'_>) -> ParseResult<ProcId> {
        let start = self.span();
        self.drop_or_error(TokenKind::Proc)?;
        let name = self.pop_identifier()?;
        let name_def = self.module.make_name_def(&name.text, name.span);

        let mut proc_bindings = bindings.child();
        let proc_params = self.parse_params(&mut proc_bindings)?;
        self.drop_or_error(TokenKind::LBrace)?;
        self.drop_or_error(TokenKind::Next)?;
        let mut iter_bindings = proc_bindings.child();
        let iter_params = self.parse_params(&mut iter_bindings)?;
        let iter_body = self.parse_block_expression(&mut iter_bindings)?;
        self.drop_or_error(TokenKind::RBrace)?;
        drop(iter_bindings);
        drop(proc_bindings);

        bindings.add(name.text.clone(), BoundNode::NameDef(name_def));
        let proc = self.module.alloc_proc(Proc {
            name_def,
            proc_params,
            iter_params,
            iter_body,
            is_public,
            span: self.span_from(start),
        });
        debug!(name = %name.text, "parsed proc");
        Ok(proc)
    }

    /// Old-style `test name { body }`.
    fn parse_test_construct(&mut self, bindings: &mut Bindings<'_>) -> ParseResult<TestId> {
        let start = self.drop_or_error(TokenKind::Test)?;
        let name = self.pop_identifier()?;
        let name_def = self.module.make_name_def(&name.text, name.span);
        let body = self.parse_block_expression(bindings)?;
        debug!(name = %name.text, "parsed test");
        Ok(self.module.alloc_test(TestConstruct {
            name_def,
            body,
            span: self.span_from(start),
        }))
    }

    // ==================== TYPES & CONSTANTS ====================

    fn parse_struct(&mut self, is_public: bool, bindings: &mut Bindings<'_>) -> ParseResult<StructId> {
        let start = self.span();
        self.drop_or_error(TokenKind::Struct)?;

        let mut struct_bindings = bindings.child();
        let parametric_bindings = if self.at(TokenKind::LBracket) {
            self.parse_parametric_bindings(&mut struct_bindings)?
        } else {
            Vec::new()
        };
        let name = self.pop_identifier()?;
        self.drop_or_error(TokenKind::LBrace)?;
        let members = self.parse_comma_seq(
            |p| p.parse_struct_member(&mut struct_bindings),
            TokenKind::RBrace,
        )?;
        drop(struct_bindings);

        for (i, member) in members.iter().enumerate() {
            if members[..i].iter().any(|m| m.name == member.name) {
                return Err(ParseError::syntax(
                    format!("duplicate member `{}` in struct `{}`", member.name, name.text),
                    member.name_span,
                ));
            }
        }

        let name_def = self.module.make_name_def(&name.text, name.span);
        let id = self.module.alloc_struct(StructDef {
            name_def,
            parametric_bindings,
            members,
            is_public,
            span: self.span_from(start),
        });
        bindings.add(name.text.clone(), BoundNode::Struct(id));
        debug!(name = %name.text, "parsed struct");
        Ok(id)
    }

    fn parse_struct_member(&mut self, bindings: &mut Bindings<'_>) -> ParseResult<StructMember> {
        let name = self.pop_identifier()?;
        self.drop_or_error(TokenKind::Colon)?;
        let type_annotation = self.parse_type_annotation(bindings)?;
        Ok(StructMember {
            name: name.text,
            name_span: name.span,
            type_annotation,
        })
    }

    fn parse_enum(&mut self, is_public: bool, bindings: &mut Bindings<'_>) -> ParseResult<EnumId> {
        let start = self.span();
        self.drop_or_error(TokenKind::Enum)?;
        let name = self.pop_identifier()?;
        self.drop_or_error(TokenKind::Colon)?;
        let type_annotation = self.parse_type_annotation(bindings)?;
        self.drop_or_error(TokenKind::LBrace)?;
        let values = self.parse_comma_seq(|p| p.parse_enum_member(bindings), TokenKind::RBrace)?;

        let name_def = self.module.make_name_def(&name.text, name.span);
        let id = self.module.alloc_enum(EnumDef {
            name_def,
            type_annotation,
            values,
            is_public,
            span: self.span_from(start),
        });
        bindings.add(name.text.clone(), BoundNode::Enum(id));
        debug!(name = %name.text, "parsed enum");
        Ok(id)
    }

    fn parse_enum_member(&mut self, bindings: &mut Bindings<'_>) -> ParseResult<EnumMember> {
        let name = self.pop_identifier()?;
        self.drop_or_error(TokenKind::Eq)?;
        let value = self.parse_num_or_const_ref(bindings)?;
        let name_def = self.module.make_name_def(name.text, name.span);
        Ok(EnumMember { name_def, value })
    }

    /// Parse `type Name = type;` and bind `Name` in `bindings`.
    pub fn parse_type_definition(
        &mut self,
        is_public: bool,
        bindings: &mut Bindings<'_>,
    ) -> ParseResult<TypeDefId> {
        let start = self.span();
        self.drop_or_error(TokenKind::Type)?;
        let name = self.pop_identifier()?;
        self.drop_or_error(TokenKind::Eq)?;
        let type_annotation = self.parse_type_annotation(bindings)?;
        self.drop_or_error(TokenKind::Semi)?;

        let name_def = self.module.make_name_def(&name.text, name.span);
        let id = self.module.alloc_type_def(TypeDef {
            name_def,
            type_annotation,
            is_public,
            span: self.span_from(start),
        });
        bindings.add(name.text.clone(), BoundNode::TypeDef(id));
        debug!(name = %name.text, "parsed type definition");
        Ok(id)
    }

    fn parse_constant(&mut self, is_public: bool, bindings: &mut Bindings<'_>) -> ParseResult<ConstantDefId> {
        let start = self.span();
        self.drop_or_error(TokenKind::Const)?;
        let name = self.pop_identifier()?;
        self.drop_or_error(TokenKind::Eq)?;
        let value = self.parse_expression(bindings)?;
        self.drop_or_error(TokenKind::Semi)?;

        let name_def = self.module.make_name_def(&name.text, name.span);
        let constant = self.module.alloc_constant(ConstantDef {
            name_def,
            value,
            is_public,
            span: self.span_from(start),
        });
        bindings.add(name.text.clone(), BoundNode::ConstantDef { constant, name_def });
        debug!(name = %name.text, "parsed constant");
        Ok(constant)
    }

    // ==================== IMPORTS ====================

    /// `import a.b.c` or `import a.b.c as x`.
    fn parse_import(&mut self, bindings: &mut Bindings<'_>) -> ParseResult<ImportId> {
        let start = self.drop_or_error(TokenKind::Import)?;
        let first = self.pop_identifier()?;
        let mut subject = vec![first.text];
        let mut last_span = first.span;
        while self.try_drop(TokenKind::Dot) {
            let part = self.pop_identifier()?;
            last_span = part.span;
            subject.push(part.text);
        }

        let (bound_name, bound_span, alias) = if self.try_drop(TokenKind::As) {
            let alias = self.pop_identifier()?;
            (alias.text.clone(), alias.span, Some(alias.text))
        } else {
            let last = subject.last().cloned().unwrap_or_default();
            (last, last_span, None)
        };
        self.try_drop(TokenKind::Semi);

        let name_def = self.module.make_name_def(&bound_name, bound_span);
        let id = self.module.alloc_import(Import {
            subject,
            name_def,
            alias,
            span: self.span_from(start),
        });
        bindings.add(bound_name, BoundNode::Import(id));
        debug!(module = %self.module[id].subject.join("."), "parsed import");
        Ok(id)
    }
}
