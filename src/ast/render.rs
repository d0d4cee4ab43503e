//! Compact s-expression rendering of parsed nodes, used by the CLI and in
//! tests to compare tree shapes.

use super::*;

impl Module {
    pub fn render_expr(&self, id: ExprId) -> String {
        match &self[id].kind {
            ExprKind::Number(number) => self.render_number(number),
            ExprKind::NameRef { identifier, .. } | ExprKind::ConstRef { identifier, .. } => {
                identifier.clone()
            }
            ExprKind::EnumRef { subject, attr } => {
                format!("{}::{}", self.render_type_definition(subject), attr)
            }
            ExprKind::ModRef { import, attr } => {
                format!("{}::{}", self.identifier(self[*import].name_def), attr)
            }
            ExprKind::Unop { op, operand } => {
                format!("({} {})", op.symbol(), self.render_expr(*operand))
            }
            ExprKind::Binop { op, lhs, rhs } => format!(
                "({} {} {})",
                op.symbol(),
                self.render_expr(*lhs),
                self.render_expr(*rhs)
            ),
            ExprKind::Ternary {
                test,
                consequent,
                alternate,
            } => format!(
                "(if {} {} {})",
                self.render_expr(*test),
                self.render_expr(*consequent),
                self.render_expr(*alternate)
            ),
            ExprKind::Cast {
                type_annotation,
                expr,
            } => format!(
                "(as {} {})",
                self.render_expr(*expr),
                self.render_type(*type_annotation)
            ),
            ExprKind::Tuple { members } => {
                let mut out = String::from("(tuple");
                for member in members {
                    out.push(' ');
                    out.push_str(&self.render_expr(*member));
                }
                out.push(')');
                out
            }
            ExprKind::Array {
                type_annotation,
                members,
                has_ellipsis,
            } => {
                let mut parts: Vec<String> = members.iter().map(|m| self.render_expr(*m)).collect();
                if *has_ellipsis {
                    parts.push("...".to_string());
                }
                let prefix = type_annotation
                    .map(|t| format!("{}:", self.render_type(t)))
                    .unwrap_or_default();
                format!("{prefix}[{}]", parts.join(" "))
            }
            ExprKind::Index { lhs, index } => {
                let lhs = self.render_expr(*lhs);
                match index {
                    IndexRhs::Expr(i) => format!("(index {lhs} {})", self.render_expr(*i)),
                    IndexRhs::Slice { start, limit } => format!(
                        "(slice {lhs} {} {})",
                        self.render_opt(*start),
                        self.render_opt(*limit)
                    ),
                    IndexRhs::WidthSlice { start, width } => format!(
                        "(width_slice {lhs} {} {})",
                        self.render_expr(*start),
                        self.render_type(*width)
                    ),
                }
            }
            ExprKind::Attr { lhs, attr } => format!("(. {} {attr})", self.render_expr(*lhs)),
            ExprKind::Invocation { callee, args } => {
                let mut out = format!("(call {}", self.render_expr(*callee));
                for arg in args {
                    out.push(' ');
                    out.push_str(&self.render_expr(*arg));
                }
                out.push(')');
                out
            }
            ExprKind::Let {
                pattern,
                type_annotation,
                rhs,
                body,
                is_const,
            } => {
                let keyword = if *is_const { "const" } else { "let" };
                let pattern = match type_annotation {
                    Some(t) => format!("{}: {}", self.render_pattern(*pattern), self.render_type(*t)),
                    None => self.render_pattern(*pattern),
                };
                format!(
                    "({keyword} {pattern} {} {})",
                    self.render_expr(*rhs),
                    self.render_expr(*body)
                )
            }
            ExprKind::Match { matched, arms } => {
                let mut out = format!("(match {}", self.render_expr(*matched));
                for arm in arms {
                    let patterns: Vec<String> =
                        arm.patterns.iter().map(|p| self.render_pattern(*p)).collect();
                    out.push_str(&format!(
                        " ({} => {})",
                        patterns.join(" | "),
                        self.render_expr(arm.expr)
                    ));
                }
                out.push(')');
                out
            }
            ExprKind::While {
                test, body, init, ..
            } => format!(
                "(while {} {} {})",
                self.render_expr(*test),
                self.render_expr(*body),
                self.render_expr(*init)
            ),
            ExprKind::Carry { .. } => "carry".to_string(),
            ExprKind::For {
                names,
                iterable,
                body,
                init,
                ..
            } => format!(
                "(for {} {} {} {})",
                self.render_pattern(*names),
                self.render_expr(*iterable),
                self.render_expr(*body),
                self.render_expr(*init)
            ),
            ExprKind::Block { body } => format!("{{{}}}", self.render_expr(*body)),
            ExprKind::StructInstance {
                struct_ref,
                members,
            } => format!(
                "({} {})",
                self.render_type(*struct_ref),
                self.render_fields(members)
            ),
            ExprKind::SplatStructInstance {
                struct_ref,
                members,
                splatted,
            } => format!(
                "({} {} ..{})",
                self.render_type(*struct_ref),
                self.render_fields(members),
                self.render_expr(*splatted)
            ),
        }
    }

    pub fn render_type(&self, id: TypeAnnotationId) -> String {
        match &self[id].kind {
            TypeAnnotationKind::Builtin { builtin, dims } => {
                format!("{builtin}{}", self.render_dims(dims))
            }
            TypeAnnotationKind::Tuple { members } => {
                let members: Vec<String> = members.iter().map(|m| self.render_type(*m)).collect();
                format!("({})", members.join(", "))
            }
            TypeAnnotationKind::TypeRef {
                type_ref,
                parametrics,
                dims,
            } => {
                let mut out = type_ref.text.clone();
                if !parametrics.is_empty() {
                    let args: Vec<String> = parametrics.iter().map(|p| self.render_expr(*p)).collect();
                    out.push_str(&format!("[{}]", args.join(", ")));
                }
                out.push_str(&self.render_dims(dims));
                out
            }
        }
    }

    pub fn render_pattern(&self, id: NameDefTreeId) -> String {
        match &self[id].kind {
            NameDefTreeKind::Leaf(Leaf::NameDef(name_def)) => self.identifier(*name_def).to_string(),
            NameDefTreeKind::Leaf(Leaf::Wildcard) => "_".to_string(),
            NameDefTreeKind::Leaf(Leaf::Value(expr)) => self.render_expr(*expr),
            NameDefTreeKind::Nodes(children) => {
                let children: Vec<String> = children.iter().map(|c| self.render_pattern(*c)).collect();
                format!("({})", children.join(", "))
            }
        }
    }

    /// One-line summary of a top-level construct; bodies are rendered in full.
    pub fn render_member(&self, member: ModuleMember) -> String {
        match member {
            ModuleMember::Function(id) => self.render_function(id),
            ModuleMember::Proc(id) => {
                let proc = &self[id];
                format!(
                    "proc {} next {}",
                    self.identifier(proc.name_def),
                    self.render_expr(proc.iter_body)
                )
            }
            ModuleMember::Test(id) => {
                let test = &self[id];
                format!("test {} {}", self.identifier(test.name_def), self.render_expr(test.body))
            }
            ModuleMember::TestFunction(id) => {
                format!("#![test] {}", self.render_function(self[id].function))
            }
            ModuleMember::QuickCheck(id) => {
                let qc = &self[id];
                match qc.test_count {
                    Some(count) => format!(
                        "#![quickcheck(test_count={count})] {}",
                        self.render_function(qc.function)
                    ),
                    None => format!("#![quickcheck] {}", self.render_function(qc.function)),
                }
            }
            ModuleMember::TypeDef(id) => {
                let td = &self[id];
                format!(
                    "type {} = {}",
                    self.identifier(td.name_def),
                    self.render_type(td.type_annotation)
                )
            }
            ModuleMember::Struct(id) => {
                let s = &self[id];
                let members: Vec<String> = s
                    .members
                    .iter()
                    .map(|m| format!("{}: {}", m.name, self.render_type(m.type_annotation)))
                    .collect();
                format!("struct {} {{{}}}", self.identifier(s.name_def), members.join(", "))
            }
            ModuleMember::Enum(id) => {
                let e = &self[id];
                let values: Vec<String> = e
                    .values
                    .iter()
                    .map(|v| format!("{} = {}", self.identifier(v.name_def), self.render_expr(v.value)))
                    .collect();
                format!(
                    "enum {}: {} {{{}}}",
                    self.identifier(e.name_def),
                    self.render_type(e.type_annotation),
                    values.join(", ")
                )
            }
            ModuleMember::Constant(id) => {
                let c = &self[id];
                format!("const {} = {}", self.identifier(c.name_def), self.render_expr(c.value))
            }
            ModuleMember::Import(id) => {
                let import = &self[id];
                match &import.alias {
                    Some(alias) => format!("import {} as {alias}", import.subject.join(".")),
                    None => format!("import {}", import.subject.join(".")),
                }
            }
        }
    }

    pub fn render_function(&self, id: FunctionId) -> String {
        let function = &self[id];
        let params: Vec<String> = function
            .params
            .iter()
            .map(|p| format!("{}: {}", self.identifier(p.name_def), self.render_type(p.type_annotation)))
            .collect();
        let ret = function
            .return_type
            .map(|t| format!(" -> {}", self.render_type(t)))
            .unwrap_or_default();
        format!(
            "{}fn {}({}){ret} {}",
            if function.is_public { "pub " } else { "" },
            self.identifier(function.name_def),
            params.join(", "),
            self.render_expr(function.body)
        )
    }

    fn render_number(&self, number: &Number) -> String {
        let value = match number.kind {
            NumberKind::Character => format!("'{}'", number.text.escape_default()),
            _ => number.text.clone(),
        };
        match number.type_annotation {
            Some(t) => format!("{}:{value}", self.render_type(t)),
            None => value,
        }
    }

    fn render_type_definition(&self, definition: &TypeDefinition) -> String {
        match definition {
            TypeDefinition::TypeDef(id) => self.identifier(self[*id].name_def).to_string(),
            TypeDefinition::Struct(id) => self.identifier(self[*id].name_def).to_string(),
            TypeDefinition::Enum(id) => self.identifier(self[*id].name_def).to_string(),
            TypeDefinition::ModRef { import, attr } => {
                format!("{}::{attr}", self.identifier(self[*import].name_def))
            }
        }
    }

    fn render_dims(&self, dims: &[ExprId]) -> String {
        // Stored outermost first; printed innermost first, as written.
        dims.iter().rev().map(|d| format!("[{}]", self.render_expr(*d))).collect()
    }

    fn render_fields(&self, members: &[(String, ExprId)]) -> String {
        let fields: Vec<String> = members
            .iter()
            .map(|(name, expr)| format!("{name}: {}", self.render_expr(*expr)))
            .collect();
        fields.join(", ")
    }

    fn render_opt(&self, expr: Option<ExprId>) -> String {
        expr.map(|e| self.render_expr(e)).unwrap_or_else(|| "_".to_string())
    }
}
