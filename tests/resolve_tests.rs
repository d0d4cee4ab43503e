//! Scope resolution tests
//!
//! Names are resolved while parsing, so these go through the parser and
//! inspect what each reference ended up pointing at.

use dslx_parser::ast::*;
use dslx_parser::lexer::lex;
use dslx_parser::{Bindings, BoundNode, ParseError, ParseErrorKind, Parser, Span};

fn parse_source(source: &str) -> Module {
    dslx_parser::parse_module("test", source).unwrap()
}

fn parse_err(source: &str) -> ParseError {
    dslx_parser::parse_module("test", source).unwrap_err()
}

/// Body expression of function `name`, inside its block.
fn body_of(module: &Module, name: &str) -> ExprId {
    let f = module.get_function(name).expect("function exists");
    let ExprKind::Block { body } = module[module[f].body].kind else {
        panic!("function body should be a block");
    };
    body
}

fn name_ref_target(module: &Module, id: ExprId) -> AnyNameDef {
    match &module[id].kind {
        ExprKind::NameRef { def, .. } => *def,
        other => panic!("expected name reference, got {other:?}"),
    }
}

fn param_def(module: &Module, function: &str, index: usize) -> NameDefId {
    let f = module.get_function(function).unwrap();
    module[f].params[index].name_def
}

#[test]
fn test_params_resolve_in_body() {
    let module = parse_source("fn f(x: u32, y: u32) -> u32 { x + y }");
    let body = body_of(&module, "f");
    let ExprKind::Binop { op, lhs, rhs } = module[body].kind else {
        panic!("expected binop");
    };
    assert_eq!(op, BinopKind::Add);
    assert_eq!(name_ref_target(&module, lhs), AnyNameDef::NameDef(param_def(&module, "f", 0)));
    assert_eq!(name_ref_target(&module, rhs), AnyNameDef::NameDef(param_def(&module, "f", 1)));
}

#[test]
fn test_let_shadows_param_then_scope_ends() {
    // The inner block rebinds x; the second tuple member sees the parameter again.
    let module = parse_source("fn f(x: u32) -> (u32, u32) { ({ let x = x + u32:1; x }, x) }");
    let body = body_of(&module, "f");
    let ExprKind::Tuple { members } = &module[body].kind else {
        panic!("expected tuple");
    };
    let param = AnyNameDef::NameDef(param_def(&module, "f", 0));

    let ExprKind::Block { body: inner } = module[members[0]].kind else {
        panic!("expected block");
    };
    let ExprKind::Let {
        pattern, rhs, body: let_body, ..
    } = module[inner].kind
    else {
        panic!("expected let");
    };
    let shadow = module.name_defs_in(pattern)[0];

    // `x + u32:1` on the right-hand side still refers to the parameter.
    let ExprKind::Binop { lhs: rhs_x, .. } = module[rhs].kind else {
        panic!("expected binop");
    };
    assert_eq!(name_ref_target(&module, rhs_x), param);
    assert_eq!(name_ref_target(&module, let_body), AnyNameDef::NameDef(shadow));
    assert_eq!(name_ref_target(&module, members[1]), param);
}

#[test]
fn test_undefined_name_reports_use_site() {
    let src = "fn f(x: u32) -> u32 { x + y }";
    let err = parse_err(src);
    assert_eq!(err.kind(), ParseErrorKind::UndefinedName);
    let y = src.rfind('y').unwrap();
    assert_eq!(err.span(), Span::new(y, y + 1));
    assert!(err.message().contains("`y`"));
}

#[test]
fn test_let_name_not_visible_in_own_rhs() {
    let src = "fn f() -> u32 { let z = z; z }";
    let err = parse_err(src);
    assert_eq!(err.kind(), ParseErrorKind::UndefinedName);
    let rhs = src.find("= z").unwrap() + 2;
    assert_eq!(err.span(), Span::new(rhs, rhs + 1));
}

#[test]
fn test_params_do_not_leak_between_functions() {
    let err = parse_err("fn f(x: u32) -> u32 { x }\nfn g() -> u32 { x }");
    assert_eq!(err.kind(), ParseErrorKind::UndefinedName);
}

#[test]
fn test_earlier_functions_are_visible() {
    let module = parse_source("fn one() -> u32 { u32:1 }\nfn two() -> u32 { one() + one() }");
    let body = body_of(&module, "two");
    let ExprKind::Binop { lhs, .. } = module[body].kind else {
        panic!("expected binop");
    };
    let ExprKind::Invocation { callee, ref args } = module[lhs].kind else {
        panic!("expected invocation");
    };
    assert!(args.is_empty());
    let one = module.get_function("one").unwrap();
    assert_eq!(name_ref_target(&module, callee), AnyNameDef::NameDef(module[one].name_def));
}

#[test]
fn test_function_cannot_reference_itself() {
    let err = parse_err("fn f(x: u32) -> u32 { f(x) }");
    assert_eq!(err.kind(), ParseErrorKind::UndefinedName);
}

#[test]
fn test_builtins_resolve() {
    let module = parse_source("fn f(x: u8) -> u8 { rev(x) }");
    let body = body_of(&module, "f");
    let ExprKind::Invocation { callee, .. } = module[body].kind else {
        panic!("expected invocation");
    };
    assert_eq!(name_ref_target(&module, callee), AnyNameDef::Builtin("rev"));
}

#[test]
fn test_match_arm_names_are_local_to_the_arm() {
    let module = parse_source("fn f(x: u32) -> u32 { match x { y => y, _ => x } }");
    let body = body_of(&module, "f");
    let ExprKind::Match { ref arms, .. } = module[body].kind else {
        panic!("expected match");
    };
    let NameDefTreeKind::Leaf(Leaf::NameDef(y)) = module[arms[0].patterns[0]].kind else {
        panic!("expected binding pattern");
    };
    assert_eq!(name_ref_target(&module, arms[0].expr), AnyNameDef::NameDef(y));

    let err = parse_err("fn f(x: u32) -> u32 { match x { y => y, _ => y } }");
    assert_eq!(err.kind(), ParseErrorKind::UndefinedName);
}

#[test]
fn test_bound_name_in_pattern_matches_value() {
    let module = parse_source("fn f(x: u32, k: u32) -> u32 { match x { k => u32:1, _ => u32:0 } }");
    let body = body_of(&module, "f");
    let ExprKind::Match { ref arms, .. } = module[body].kind else {
        panic!("expected match");
    };
    let NameDefTreeKind::Leaf(Leaf::Value(value)) = module[arms[0].patterns[0]].kind else {
        panic!("an already-bound name should be a value pattern");
    };
    assert_eq!(name_ref_target(&module, value), AnyNameDef::NameDef(param_def(&module, "f", 1)));
}

#[test]
fn test_for_names_visible_in_body_only() {
    let module = parse_source(
        "fn f() -> u32 { for (i, acc): (u32, u32) in range(u32:0, u32:4) { acc + i }(u32:0) }",
    );
    let body = body_of(&module, "f");
    let ExprKind::For {
        names, body: loop_body, ..
    } = module[body].kind
    else {
        panic!("expected for");
    };
    let defs = module.name_defs_in(names);
    let ExprKind::Block { body: inner } = module[loop_body].kind else {
        panic!("expected block");
    };
    let ExprKind::Binop { lhs, rhs, .. } = module[inner].kind else {
        panic!("expected binop");
    };
    assert_eq!(name_ref_target(&module, lhs), AnyNameDef::NameDef(defs[1]));
    assert_eq!(name_ref_target(&module, rhs), AnyNameDef::NameDef(defs[0]));

    let err = parse_err("fn f() -> u32 { for i in range(u32:0, u32:4) { i }(i) }");
    assert_eq!(err.kind(), ParseErrorKind::UndefinedName);
}

#[test]
fn test_carry_resolves_to_innermost_loop() {
    let src = "fn f() -> u32 {
  while carry < u32:4 {
    let inner = while carry < u32:2 { carry + u32:1 }(u32:0);
    inner + carry
  }(u32:0)
}";
    let module = parse_source(src);
    assert_eq!(module.loop_count(), 2);

    let loops: Vec<(LoopId, Span)> = module
        .exprs()
        .filter_map(|(_, e)| match e.kind {
            ExprKind::While { loop_id, .. } => Some((loop_id, e.span)),
            _ => None,
        })
        .collect();
    let outer = loops.iter().find(|(_, span)| span.start == src.find("while").unwrap()).unwrap().0;
    let inner = loops.iter().find(|(id, _)| *id != outer).unwrap().0;

    let carry_at = |offset: usize| -> LoopId {
        module
            .exprs()
            .find_map(|(_, e)| match e.kind {
                ExprKind::Carry { loop_id } if e.span.start == offset => Some(loop_id),
                _ => None,
            })
            .expect("carry node at offset")
    };

    let offsets: Vec<usize> = src.match_indices("carry").map(|(i, _)| i).collect();
    assert_eq!(offsets.len(), 4);
    assert_eq!(carry_at(offsets[0]), outer);
    assert_eq!(carry_at(offsets[1]), inner);
    assert_eq!(carry_at(offsets[2]), inner);
    assert_eq!(carry_at(offsets[3]), outer);

    // Each carry's loop is recorded once the loop has parsed.
    let outer_node = module.loop_node(outer).unwrap();
    assert!(matches!(module[outer_node].kind, ExprKind::While { .. }));
}

#[test]
fn test_carry_outside_loop_is_an_error() {
    let err = parse_err("fn f() -> u32 { carry }");
    assert_eq!(err.kind(), ParseErrorKind::Syntax);
    let err = parse_err("fn f() -> u32 { while u32:1 == u32:1 { u32:0 }(carry) }");
    assert_eq!(err.kind(), ParseErrorKind::Syntax);
}

#[test]
fn test_loop_stack_unwinds_on_error() {
    let tokens = lex("while carry < u32:4 { undefined_name }(u32:0)").unwrap();
    let mut parser = Parser::new("test", &tokens);
    let mut bindings = Bindings::with_builtins();
    let err = parser.parse_expression(&mut bindings).unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::UndefinedName);
    assert_eq!(parser.loop_depth(), 0);
}

#[test]
fn test_loop_stack_balanced_after_success() {
    let tokens = lex("while carry < u32:4 { carry + u32:1 }(u32:0)").unwrap();
    let mut parser = Parser::new("test", &tokens);
    let mut bindings = Bindings::with_builtins();
    parser.parse_expression(&mut bindings).unwrap();
    assert_eq!(parser.loop_depth(), 0);
    assert!(parser.is_at_end());
}

#[test]
fn test_top_level_names_bound_in_supplied_scope() {
    let tokens = lex("const K = u32:3;\ntype Word = u32;\nstruct P { a: Word }\nfn f() -> u32 { K }").unwrap();
    let mut bindings = Bindings::new();
    let module = Parser::new("test", &tokens)
        .parse_module_with(&mut bindings)
        .unwrap();

    assert!(matches!(bindings.resolve_node("K"), Some(BoundNode::ConstantDef { .. })));
    assert!(matches!(bindings.resolve_node("Word"), Some(BoundNode::TypeDef(_))));
    assert!(matches!(bindings.resolve_node("P"), Some(BoundNode::Struct(_))));
    assert!(matches!(bindings.resolve_node("f"), Some(BoundNode::NameDef(_))));

    let body = body_of(&module, "f");
    assert!(matches!(module[body].kind, ExprKind::ConstRef { .. }));
}

#[test]
fn test_type_name_used_as_value_is_rejected() {
    let err = parse_err("type Word = u32;\nfn f() -> u32 { Word }");
    assert_eq!(err.kind(), ParseErrorKind::Syntax);
}

#[test]
fn test_value_name_used_as_type_is_rejected() {
    let err = parse_err("const K = u32:3;\nfn f(x: K) -> u32 { x }");
    assert_eq!(err.kind(), ParseErrorKind::Syntax);
    let err = parse_err("fn f(x: Missing) -> u32 { x }");
    assert_eq!(err.kind(), ParseErrorKind::UndefinedName);
}
