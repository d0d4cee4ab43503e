//! Abstract Syntax Tree for DSLX
//!
//! Every node produced for one compilation unit lives in an arena owned by
//! its [`Module`]. Nodes refer to each other through typed arena handles
//! (`ExprId`, `TypeAnnotationId`, ...), never by ownership, so the tree can
//! carry back-references (a `carry` to its loop, a name reference to its
//! definition) without cycles in the ownership graph.

mod render;

use crate::common::Span;
use crate::lexer::{BuiltinType, TokenKind};
use id_arena::{Arena, Id};
use indexmap::IndexMap;
use std::fmt;
use std::ops::Index;

pub type ExprId = Id<Expr>;
pub type TypeAnnotationId = Id<TypeAnnotation>;
pub type NameDefId = Id<NameDef>;
pub type NameDefTreeId = Id<NameDefTree>;
pub type FunctionId = Id<Function>;
pub type ProcId = Id<Proc>;
pub type TestId = Id<TestConstruct>;
pub type TestFunctionId = Id<TestFunction>;
pub type QuickCheckId = Id<QuickCheck>;
pub type StructId = Id<StructDef>;
pub type EnumId = Id<EnumDef>;
pub type TypeDefId = Id<TypeDef>;
pub type ConstantDefId = Id<ConstantDef>;
pub type ImportId = Id<Import>;

/// Index into the module's loop table; one per `while` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoopId(pub usize);

// ==================== NAMES ====================

/// A binding occurrence of an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameDef {
    pub identifier: String,
    pub span: Span,
}

/// What a value-position name reference resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyNameDef {
    NameDef(NameDefId),
    Builtin(&'static str),
}

/// Target of a type reference or of the subject of an enum reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefinition {
    TypeDef(TypeDefId),
    Struct(StructId),
    Enum(EnumId),
    /// `module::Type`
    ModRef { import: ImportId, attr: String },
}

// ==================== EXPRESSIONS ====================

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number(Number),
    NameRef {
        identifier: String,
        def: AnyNameDef,
    },
    ConstRef {
        identifier: String,
        constant: ConstantDefId,
        name_def: NameDefId,
    },
    /// `Enum::MEMBER` where the subject is an enum or an alias of one.
    EnumRef {
        subject: TypeDefinition,
        attr: String,
    },
    /// `module::member`
    ModRef {
        import: ImportId,
        attr: String,
    },
    Unop {
        op: UnopKind,
        operand: ExprId,
    },
    Binop {
        op: BinopKind,
        lhs: ExprId,
        rhs: ExprId,
    },
    /// `consequent if test else alternate`
    Ternary {
        test: ExprId,
        consequent: ExprId,
        alternate: ExprId,
    },
    Cast {
        type_annotation: TypeAnnotationId,
        expr: ExprId,
    },
    Tuple {
        members: Vec<ExprId>,
    },
    Array {
        type_annotation: Option<TypeAnnotationId>,
        members: Vec<ExprId>,
        has_ellipsis: bool,
    },
    Index {
        lhs: ExprId,
        index: IndexRhs,
    },
    Attr {
        lhs: ExprId,
        attr: String,
    },
    Invocation {
        callee: ExprId,
        args: Vec<ExprId>,
    },
    Let {
        pattern: NameDefTreeId,
        type_annotation: Option<TypeAnnotationId>,
        rhs: ExprId,
        body: ExprId,
        is_const: bool,
    },
    Match {
        matched: ExprId,
        arms: Vec<MatchArm>,
    },
    While {
        loop_id: LoopId,
        test: ExprId,
        body: ExprId,
        init: ExprId,
    },
    /// Value carried by the innermost enclosing `while`.
    Carry {
        loop_id: LoopId,
    },
    For {
        names: NameDefTreeId,
        type_annotation: Option<TypeAnnotationId>,
        iterable: ExprId,
        body: ExprId,
        init: ExprId,
    },
    Block {
        body: ExprId,
    },
    StructInstance {
        struct_ref: TypeAnnotationId,
        members: Vec<(String, ExprId)>,
    },
    /// `Point { x: 1, ..p }`
    SplatStructInstance {
        struct_ref: TypeAnnotationId,
        members: Vec<(String, ExprId)>,
        splatted: ExprId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number {
    /// Literal text with digit separators removed; decoded value for characters.
    pub text: String,
    pub kind: NumberKind,
    pub type_annotation: Option<TypeAnnotationId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Decimal,
    Hex,
    Binary,
    Character,
    Bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexRhs {
    Expr(ExprId),
    /// `x[start:limit]`, either bound optional
    Slice {
        start: Option<ExprId>,
        limit: Option<ExprId>,
    },
    /// `x[start +: u8]`
    WidthSlice {
        start: ExprId,
        width: TypeAnnotationId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchArm {
    pub patterns: Vec<NameDefTreeId>,
    pub expr: ExprId,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnopKind {
    Negate,
    Invert,
}

impl UnopKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnopKind::Negate => "-",
            UnopKind::Invert => "!",
        }
    }
}

/// Binary operators, grouped by precedence level (tightest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinopKind {
    Mul,
    Div,
    Mod,

    Add,
    Concat,
    Sub,

    Shll,
    Shrl,
    Shra,

    BitAnd,
    BitXor,
    BitOr,

    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,

    LogicalAnd,
    LogicalOr,
}

impl BinopKind {
    pub fn token(&self) -> TokenKind {
        match self {
            BinopKind::Mul => TokenKind::Star,
            BinopKind::Div => TokenKind::Slash,
            BinopKind::Mod => TokenKind::Percent,
            BinopKind::Add => TokenKind::Plus,
            BinopKind::Concat => TokenKind::PlusPlus,
            BinopKind::Sub => TokenKind::Minus,
            BinopKind::Shll => TokenKind::Shl,
            BinopKind::Shrl => TokenKind::Shr,
            BinopKind::Shra => TokenKind::Sar,
            BinopKind::BitAnd => TokenKind::Amp,
            BinopKind::BitXor => TokenKind::Caret,
            BinopKind::BitOr => TokenKind::Pipe,
            BinopKind::Eq => TokenKind::EqEq,
            BinopKind::Ne => TokenKind::Ne,
            BinopKind::Gt => TokenKind::Gt,
            BinopKind::Ge => TokenKind::Ge,
            BinopKind::Lt => TokenKind::Lt,
            BinopKind::Le => TokenKind::Le,
            BinopKind::LogicalAnd => TokenKind::AmpAmp,
            BinopKind::LogicalOr => TokenKind::PipePipe,
        }
    }

    pub fn symbol(&self) -> &'static str {
        self.token().as_str()
    }
}

impl fmt::Display for BinopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ==================== TYPES ====================

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub kind: TypeAnnotationKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnotationKind {
    /// `u32`, `bits[8]`, `u8[4][2]`; dims are outermost first, so `u8[4][2]`
    /// stores `[2, 4]`.
    Builtin {
        builtin: BuiltinType,
        dims: Vec<ExprId>,
    },
    Tuple {
        members: Vec<TypeAnnotationId>,
    },
    TypeRef {
        type_ref: TypeRef,
        parametrics: Vec<ExprId>,
        dims: Vec<ExprId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub text: String,
    pub definition: TypeDefinition,
    pub span: Span,
}

// ==================== PATTERNS ====================

/// A pattern that binds one name, ignores a value, matches a value, or
/// destructures a tuple into further patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameDefTree {
    pub kind: NameDefTreeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameDefTreeKind {
    Leaf(Leaf),
    Nodes(Vec<NameDefTreeId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf {
    NameDef(NameDefId),
    Wildcard,
    /// Match-arm value: number, name/constant reference or colon reference.
    Value(ExprId),
}

// ==================== ITEMS ====================

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name_def: NameDefId,
    pub type_annotation: TypeAnnotationId,
    pub span: Span,
}

/// `[N: u32, M: u32 = N + N]`
#[derive(Debug, Clone, PartialEq)]
pub struct ParametricBinding {
    pub name_def: NameDefId,
    pub type_annotation: TypeAnnotationId,
    pub default: Option<ExprId>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name_def: NameDefId,
    pub parametric_bindings: Vec<ParametricBinding>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotationId>,
    pub body: ExprId,
    pub is_public: bool,
    pub span: Span,
}

impl Function {
    pub fn is_parametric(&self) -> bool {
        !self.parametric_bindings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Proc {
    pub name_def: NameDefId,
    pub proc_params: Vec<Param>,
    pub iter_params: Vec<Param>,
    pub iter_body: ExprId,
    pub is_public: bool,
    pub span: Span,
}

/// Old-style `test name { ... }` construct.
#[derive(Debug, Clone, PartialEq)]
pub struct TestConstruct {
    pub name_def: NameDefId,
    pub body: ExprId,
    pub span: Span,
}

/// A function marked with `#![test]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TestFunction {
    pub function: FunctionId,
    pub span: Span,
}

/// A function marked with `#![quickcheck]`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickCheck {
    pub function: FunctionId,
    pub test_count: Option<u64>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructMember {
    pub name: String,
    pub name_span: Span,
    pub type_annotation: TypeAnnotationId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name_def: NameDefId,
    pub parametric_bindings: Vec<ParametricBinding>,
    pub members: Vec<StructMember>,
    pub is_public: bool,
    pub span: Span,
}

impl StructDef {
    pub fn is_parametric(&self) -> bool {
        !self.parametric_bindings.is_empty()
    }

    pub fn member(&self, name: &str) -> Option<&StructMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name_def: NameDefId,
    pub value: ExprId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name_def: NameDefId,
    pub type_annotation: TypeAnnotationId,
    pub values: Vec<EnumMember>,
    pub is_public: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name_def: NameDefId,
    pub type_annotation: TypeAnnotationId,
    pub is_public: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDef {
    pub name_def: NameDefId,
    pub value: ExprId,
    pub is_public: bool,
    pub span: Span,
}

/// `import a.b.c as x`
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub subject: Vec<String>,
    /// Binds the alias if present, otherwise the last subject component.
    pub name_def: NameDefId,
    pub alias: Option<String>,
    pub span: Span,
}

/// A top-level construct of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleMember {
    Function(FunctionId),
    Proc(ProcId),
    Test(TestId),
    TestFunction(TestFunctionId),
    QuickCheck(QuickCheckId),
    TypeDef(TypeDefId),
    Struct(StructId),
    Enum(EnumId),
    Constant(ConstantDefId),
    Import(ImportId),
}

// ==================== MODULE ====================

/// Owner of every node of one parsed compilation unit.
pub struct Module {
    name: String,
    exprs: Arena<Expr>,
    types: Arena<TypeAnnotation>,
    name_defs: Arena<NameDef>,
    name_def_trees: Arena<NameDefTree>,
    functions: Arena<Function>,
    procs: Arena<Proc>,
    tests: Arena<TestConstruct>,
    test_functions: Arena<TestFunction>,
    quickchecks: Arena<QuickCheck>,
    structs: Arena<StructDef>,
    enums: Arena<EnumDef>,
    type_defs: Arena<TypeDef>,
    constants: Arena<ConstantDef>,
    imports: Arena<Import>,
    loops: Vec<Option<ExprId>>,
    top: Vec<ModuleMember>,
    members: IndexMap<String, ModuleMember>,
}

macro_rules! arena_nodes {
    ($($field:ident: $node:ty => $alloc:ident;)*) => {
        $(
            impl Index<Id<$node>> for Module {
                type Output = $node;

                fn index(&self, id: Id<$node>) -> &$node {
                    &self.$field[id]
                }
            }
        )*

        impl Module {
            $(
                pub(crate) fn $alloc(&mut self, node: $node) -> Id<$node> {
                    self.$field.alloc(node)
                }
            )*
        }
    };
}

arena_nodes! {
    exprs: Expr => alloc_expr;
    types: TypeAnnotation => alloc_type;
    name_defs: NameDef => alloc_name_def;
    name_def_trees: NameDefTree => alloc_name_def_tree;
    functions: Function => alloc_function;
    procs: Proc => alloc_proc;
    tests: TestConstruct => alloc_test;
    test_functions: TestFunction => alloc_test_function;
    quickchecks: QuickCheck => alloc_quickcheck;
    structs: StructDef => alloc_struct;
    enums: EnumDef => alloc_enum;
    type_defs: TypeDef => alloc_type_def;
    constants: ConstantDef => alloc_constant;
    imports: Import => alloc_import;
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exprs: Arena::new(),
            types: Arena::new(),
            name_defs: Arena::new(),
            name_def_trees: Arena::new(),
            functions: Arena::new(),
            procs: Arena::new(),
            tests: Arena::new(),
            test_functions: Arena::new(),
            quickchecks: Arena::new(),
            structs: Arena::new(),
            enums: Arena::new(),
            type_defs: Arena::new(),
            constants: Arena::new(),
            imports: Arena::new(),
            loops: Vec::new(),
            top: Vec::new(),
            members: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn make_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.alloc_expr(Expr { kind, span })
    }

    pub(crate) fn make_name_def(&mut self, identifier: impl Into<String>, span: Span) -> NameDefId {
        self.alloc_name_def(NameDef {
            identifier: identifier.into(),
            span,
        })
    }

    /// Record a top-level construct under `name`, in source order.
    pub(crate) fn add_member(&mut self, name: impl Into<String>, member: ModuleMember) {
        self.top.push(member);
        self.members.insert(name.into(), member);
    }

    /// Reserve a slot for a loop whose node is not allocated yet.
    pub(crate) fn begin_loop(&mut self) -> LoopId {
        self.loops.push(None);
        LoopId(self.loops.len() - 1)
    }

    pub(crate) fn finish_loop(&mut self, loop_id: LoopId, node: ExprId) {
        if let Some(slot) = self.loops.get_mut(loop_id.0) {
            *slot = Some(node);
        }
    }

    /// The `while` node a `carry` refers to, once that loop has finished parsing.
    pub fn loop_node(&self, loop_id: LoopId) -> Option<ExprId> {
        self.loops.get(loop_id.0).copied().flatten()
    }

    /// Top-level constructs in source order.
    pub fn top(&self) -> &[ModuleMember] {
        &self.top
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn get_member(&self, name: &str) -> Option<ModuleMember> {
        self.members.get(name).copied()
    }

    /// Function named `name`, including `#![test]` and `#![quickcheck]` ones.
    pub fn get_function(&self, name: &str) -> Option<FunctionId> {
        match self.get_member(name)? {
            ModuleMember::Function(id) => Some(id),
            ModuleMember::TestFunction(id) => Some(self[id].function),
            ModuleMember::QuickCheck(id) => Some(self[id].function),
            _ => None,
        }
    }

    pub fn identifier(&self, name_def: NameDefId) -> &str {
        &self[name_def].identifier
    }

    pub fn function_name(&self, function: FunctionId) -> &str {
        self.identifier(self[function].name_def)
    }

    /// Names of both `test` constructs and `#![test]` functions.
    pub fn test_names(&self) -> Vec<&str> {
        self.top
            .iter()
            .filter_map(|member| match *member {
                ModuleMember::Test(id) => Some(self.identifier(self[id].name_def)),
                ModuleMember::TestFunction(id) => Some(self.function_name(self[id].function)),
                _ => None,
            })
            .collect()
    }

    /// Every name definition bound by a pattern, left to right.
    pub fn name_defs_in(&self, tree: NameDefTreeId) -> Vec<NameDefId> {
        let mut out = Vec::new();
        self.collect_name_defs(tree, &mut out);
        out
    }

    fn collect_name_defs(&self, tree: NameDefTreeId, out: &mut Vec<NameDefId>) {
        match &self[tree].kind {
            NameDefTreeKind::Leaf(Leaf::NameDef(id)) => out.push(*id),
            NameDefTreeKind::Leaf(_) => {}
            NameDefTreeKind::Nodes(children) => {
                for child in children {
                    self.collect_name_defs(*child, out);
                }
            }
        }
    }

    pub fn exprs(&self) -> impl Iterator<Item = (ExprId, &Expr)> {
        self.exprs.iter()
    }

    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &Function)> {
        self.functions.iter()
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .field("exprs", &self.exprs.len())
            .field("types", &self.types.len())
            .finish()
    }
}
