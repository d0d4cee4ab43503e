//! Lexical scopes consulted and extended while parsing
//!
//! A [`Bindings`] is one scope level: a table of names plus a borrowed
//! reference to the enclosing level. Entering a nested construct creates a
//! child with [`Bindings::child`]; the child is dropped when the construct
//! has been parsed, so insertions never leak into the parent.

use crate::ast::{
    AnyNameDef, ConstantDefId, EnumId, ImportId, NameDefId, StructId, TypeDefId,
};
use crate::common::Span;
use crate::diagnostics::{ParseError, ParseResult};
use rustc_hash::FxHashMap;

/// Builtin functions visible from every module.
pub const BUILTIN_NAMES: &[&str] = &[
    "add_with_carry",
    "and_reduce",
    "assert_eq",
    "assert_lt",
    "bit_slice",
    "clz",
    "concat",
    "ctz",
    "enumerate",
    "map",
    "one_hot",
    "one_hot_sel",
    "or_reduce",
    "range",
    "rev",
    "select",
    "sge",
    "sgt",
    "signex",
    "sle",
    "slice",
    "slt",
    "trace",
    "update",
    "xor_reduce",
];

/// A definition a name can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundNode {
    NameDef(NameDefId),
    BuiltinNameDef(&'static str),
    TypeDef(TypeDefId),
    Struct(StructId),
    Enum(EnumId),
    ConstantDef {
        constant: ConstantDefId,
        name_def: NameDefId,
    },
    Import(ImportId),
}

impl BoundNode {
    /// Noun used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            BoundNode::NameDef(_) => "a value",
            BoundNode::BuiltinNameDef(_) => "a builtin function",
            BoundNode::TypeDef(_) => "a type alias",
            BoundNode::Struct(_) => "a struct",
            BoundNode::Enum(_) => "an enum",
            BoundNode::ConstantDef { .. } => "a constant",
            BoundNode::Import(_) => "an imported module",
        }
    }

    pub fn is_type_definition(&self) -> bool {
        matches!(
            self,
            BoundNode::TypeDef(_) | BoundNode::Struct(_) | BoundNode::Enum(_)
        )
    }
}

/// One scope level in a parent-linked chain.
#[derive(Debug, Default)]
pub struct Bindings<'p> {
    parent: Option<&'p Bindings<'p>>,
    table: FxHashMap<String, BoundNode>,
}

impl Bindings<'static> {
    /// An empty root scope.
    pub fn new() -> Self {
        Self {
            parent: None,
            table: FxHashMap::default(),
        }
    }

    /// A root scope holding the builtin function names.
    pub fn with_builtins() -> Self {
        let mut bindings = Self::new();
        for name in BUILTIN_NAMES {
            bindings.add(*name, BoundNode::BuiltinNameDef(*name));
        }
        bindings
    }
}

impl<'p> Bindings<'p> {
    /// A nested scope whose lookups fall back to `self`.
    pub fn child(&self) -> Bindings<'_> {
        Bindings {
            parent: Some(self),
            table: FxHashMap::default(),
        }
    }

    /// The enclosing scope, `None` at the root.
    pub fn parent(&self) -> Option<&Bindings<'p>> {
        self.parent
    }

    /// Number of enclosing scopes.
    pub fn depth(&self) -> usize {
        self.parent().map_or(0, |p| p.depth() + 1)
    }

    /// Bind `name` in this scope, replacing any binding at this level.
    pub fn add(&mut self, name: impl Into<String>, node: BoundNode) {
        self.table.insert(name.into(), node);
    }

    /// Innermost binding of `name`, walking outwards.
    pub fn resolve_node(&self, name: &str) -> Option<BoundNode> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(node) = current.table.get(name) {
                return Some(*node);
            }
            scope = current.parent();
        }
        None
    }

    /// Like [`resolve_node`](Self::resolve_node), failing with an
    /// undefined-name error at the use site.
    pub fn resolve(&self, name: &str, span: Span) -> ParseResult<BoundNode> {
        self.resolve_node(name)
            .ok_or_else(|| ParseError::undefined(name, span))
    }

    /// Resolve `name` to something usable as a value reference.
    pub fn resolve_name_def(&self, name: &str, span: Span) -> ParseResult<AnyNameDef> {
        match self.resolve(name, span)? {
            BoundNode::NameDef(id) => Ok(AnyNameDef::NameDef(id)),
            BoundNode::BuiltinNameDef(builtin) => Ok(AnyNameDef::Builtin(builtin)),
            BoundNode::ConstantDef { name_def, .. } => Ok(AnyNameDef::NameDef(name_def)),
            other => Err(ParseError::syntax(
                format!("`{name}` refers to {}, not a value", other.describe()),
                span,
            )),
        }
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.resolve_node(name).is_some()
    }

    /// Names bound directly in this scope.
    pub fn local_names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}
