//! Whole-module parses through the public entry points.

use dslx_parser::ast::*;
use dslx_parser::{ParseErrorKind, ParserConfig, parse, parse_module, parse_module_with_config};

const ALU: &str = r#"
import std

// Operation select for the ALU.
pub enum Op : u2 {
  ADD = 0,
  SUB = 1,
  AND = 2,
  OR = 3,
}

pub const WIDTH = u32:8;

type Word = bits[8];

pub struct Flags { zero: bool, overflow: bool }

struct [N: u32] Pair { lo: bits[N], hi: bits[N] }

fn apply(op: Op, a: Word, b: Word) -> Word {
  match op {
    Op::ADD => a + b,
    Op::SUB => a - b,
    Op::AND => a & b,
    _ => a | b,
  }
}

pub fn flags(result: Word) -> Flags {
  let zero = result == Word:0;
  Flags { zero, overflow: false }
}

fn split(x: u16) -> Pair[8] {
  Pair[8] { lo: x[0:8], hi: x[8 +: u8] }
}

fn popcount(x: Word) -> u32 {
  for (i, count): (u32, u32) in range(u32:0, WIDTH) {
    count + (x[i +: u1] as u32)
  }(u32:0)
}

fn log_width() -> u32 { std::clog2(WIDTH) }

proc accumulator(step: u8) {
  next(total: u8) { total + step }
}

#![test]
fn apply_test() {
  let _ = assert_eq(apply(Op::ADD, Word:1, Word:2), Word:3);
  ()
}

#![quickcheck(test_count=1000)]
fn popcount_bounded(x: Word) -> bool { popcount(x) <= WIDTH }

test legacy {
  assert_eq(flags(Word:0), Flags { zero: true, overflow: false })
}
"#;

#[test]
fn test_parse_whole_module() {
    let module = parse_module("alu", ALU).unwrap();
    assert_eq!(module.name(), "alu");

    let names: Vec<&str> = module.member_names().collect();
    assert_eq!(
        names,
        [
            "std",
            "Op",
            "WIDTH",
            "Word",
            "Flags",
            "Pair",
            "apply",
            "flags",
            "split",
            "popcount",
            "log_width",
            "accumulator",
            "apply_test",
            "popcount_bounded",
            "legacy",
        ]
    );
    assert_eq!(module.test_names(), ["apply_test", "legacy"]);
    assert!(matches!(module.get_member("popcount_bounded"), Some(ModuleMember::QuickCheck(_))));
    assert_eq!(module.functions().count(), 7);
}

#[test]
fn test_rendered_members() {
    let module = parse_module("alu", ALU).unwrap();

    let render = |name: &str| module.render_member(module.get_member(name).unwrap());
    assert_eq!(render("Word"), "type Word = bits[8]");
    assert_eq!(render("Flags"), "struct Flags {zero: bool, overflow: bool}");
    assert_eq!(render("WIDTH"), "const WIDTH = u32:8");
    assert_eq!(render("std"), "import std");
    assert_eq!(
        render("flags"),
        "pub fn flags(result: Word) -> Flags {(let zero (== result Word:0) (Flags zero: zero, overflow: false))}"
    );
    assert_eq!(
        render("split"),
        "fn split(x: u16) -> Pair[8] {(Pair[8] lo: (slice x 0 8), hi: (width_slice x 8 u8))}"
    );
    assert_eq!(render("log_width"), "fn log_width() -> u32 {(call std::clog2 WIDTH)}");
    assert_eq!(render("accumulator"), "proc accumulator next {(+ total step)}");
}

#[test]
fn test_every_loop_is_recorded() {
    let module = parse_module(
        "loops",
        "fn f() -> u32 { while carry < u32:3 { carry + u32:1 }(u32:0) }\nfn g() -> u32 { while carry < u32:5 { carry }(u32:1) }",
    )
    .unwrap();
    assert_eq!(module.loop_count(), 2);
    for index in 0..module.loop_count() {
        let node = module.loop_node(LoopId(index)).unwrap();
        assert!(matches!(module[node].kind, ExprKind::While { loop_id, .. } if loop_id == LoopId(index)));
    }
}

#[test]
fn test_config_changes_let_terminator() {
    let config = ParserConfig {
        let_terminator_is_semi: false,
    };
    let module = parse_module_with_config("m", "fn f() -> u32 { let x = u32:1 in x }", config).unwrap();
    assert!(module.get_function("f").is_some());

    let err = parse_module("m", "fn f() -> u32 { let x = u32:1 in x }").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Syntax);
}

#[test]
fn test_report_renders_source_context() {
    let err = parse("bad.x", "fn f() -> u32 { missing }").unwrap_err();
    let rendered = format!("{err:?}");
    assert!(rendered.contains("missing"));
    assert!(rendered.contains("bad.x"));
}

#[test]
fn test_first_error_stops_the_parse() {
    let err = parse_module("m", "fn f() -> u32 { a }\nfn g() -> u32 { b }").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::UndefinedName);
    assert!(err.message().contains("`a`"));
}
