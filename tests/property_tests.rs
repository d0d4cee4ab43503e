//! Property tests for sequence parsing, call arguments and operator associativity.

use dslx_parser::ast::*;
use dslx_parser::lexer::lex;
use dslx_parser::{Bindings, Parser};
use proptest::prelude::*;

/// Operators sharing one precedence level.
const LEVELS: &[&[&str]] = &[
    &["*", "/", "%"],
    &["+", "++", "-"],
    &["<<", ">>", ">>>"],
    &["&"],
    &["^"],
    &["|"],
    &["==", "!=", "<", "<=", ">", ">="],
    &["&&"],
    &["||"],
];

fn parse_expr(text: &str) -> Result<(Module, ExprId), String> {
    let tokens = lex(text).map_err(|e| e.to_string())?;
    let mut parser = Parser::new("prop", &tokens);
    let mut bindings = Bindings::with_builtins();
    let expr = parser
        .parse_expression(&mut bindings)
        .map_err(|e| e.to_string())?;
    if !parser.is_at_end() {
        return Err(format!("trailing input in `{text}`"));
    }
    Ok((parser.into_module(), expr))
}

proptest! {
    #[test]
    fn array_members_keep_source_order(
        values in prop::collection::vec(0u32..10_000, 0..8),
        trailing_comma in any::<bool>(),
    ) {
        let mut text = String::from("[");
        text.push_str(&values.iter().map(u32::to_string).collect::<Vec<_>>().join(", "));
        if trailing_comma && !values.is_empty() {
            text.push(',');
        }
        text.push(']');

        let (module, expr) = parse_expr(&text).map_err(TestCaseError::fail)?;
        let ExprKind::Array { members, has_ellipsis, .. } = &module[expr].kind else {
            return Err(TestCaseError::fail("expected an array"));
        };
        prop_assert!(!has_ellipsis);
        let rendered: Vec<String> = members.iter().map(|m| module.render_expr(*m)).collect();
        let expected: Vec<String> = values.iter().map(u32::to_string).collect();
        prop_assert_eq!(rendered, expected);
    }

    #[test]
    fn invocation_args_keep_source_order(
        values in prop::collection::vec(0u32..10_000, 0..8),
        trailing_comma in any::<bool>(),
    ) {
        let mut text = String::from("rev(");
        text.push_str(&values.iter().map(u32::to_string).collect::<Vec<_>>().join(", "));
        if trailing_comma && !values.is_empty() {
            text.push(',');
        }
        text.push(')');

        let (module, expr) = parse_expr(&text).map_err(TestCaseError::fail)?;
        let ExprKind::Invocation { callee, args } = &module[expr].kind else {
            return Err(TestCaseError::fail("expected an invocation"));
        };
        prop_assert_eq!(module.render_expr(*callee), "rev");
        let rendered: Vec<String> = args.iter().map(|a| module.render_expr(*a)).collect();
        let expected: Vec<String> = values.iter().map(u32::to_string).collect();
        prop_assert_eq!(rendered, expected);
    }

    #[test]
    fn same_level_operators_associate_left(
        level in 0..LEVELS.len(),
        operands in prop::collection::vec(0u32..100, 2..6),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 5),
    ) {
        let ops = LEVELS[level];
        let mut text = operands[0].to_string();
        let mut expected = operands[0].to_string();
        for (i, operand) in operands.iter().enumerate().skip(1) {
            let op = ops[picks[i - 1].index(ops.len())];
            text.push_str(&format!(" {op} {operand}"));
            expected = format!("({op} {expected} {operand})");
        }

        let (module, expr) = parse_expr(&text).map_err(TestCaseError::fail)?;
        prop_assert_eq!(module.render_expr(expr), expected);
    }

    #[test]
    fn redundant_parens_add_no_nodes(depth in 1usize..6, value in 0u32..1000) {
        let text = format!("{}{value}{}", "(".repeat(depth), ")".repeat(depth));
        let (module, expr) = parse_expr(&text).map_err(TestCaseError::fail)?;
        prop_assert_eq!(module.expr_count(), 1);
        prop_assert!(matches!(module[expr].kind, ExprKind::Number(_)));
    }

    #[test]
    fn tuples_keep_arity(arity in 1usize..6, trailing_comma in any::<bool>()) {
        let members: Vec<String> = (0..arity).map(|i| i.to_string()).collect();
        let mut text = format!("({}", members.join(", "));
        if arity == 1 || trailing_comma {
            text.push(',');
        }
        text.push(')');

        let (module, expr) = parse_expr(&text).map_err(TestCaseError::fail)?;
        let ExprKind::Tuple { members: parsed } = &module[expr].kind else {
            return Err(TestCaseError::fail("expected a tuple"));
        };
        prop_assert_eq!(parsed.len(), arity);
    }
}
