//! Programs rejected before execution: resolution errors are reported
//! together and nothing is printed.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use tern_ir::{BinaryOp, ParsedType, ProgramBuilder};
use ternc::{buffer_handler, InterpreterBuilder, ResolveErrorKind, RunError};

#[test]
fn all_errors_are_reported_and_nothing_runs() {
    // fn main() { print("never"); let x = 1; let x = 2; return "a" - 1 }
    let mut b = ProgramBuilder::new();
    let never = b.str("never");
    let print = b.print(never);
    let one = b.num(1.0);
    let first = b.declare("x", one);
    let two = b.num(2.0);
    let second = b.declare("x", two);
    let a = b.str("a");
    let one = b.num(1.0);
    let diff = b.binary(BinaryOp::Sub, a, one);
    let ret = b.ret_value(diff);
    let main = b.fn_decl("main", &[], ParsedType::Num, vec![print, first, second, ret]);
    b.item(main);
    let program = b.finish();

    let handler = buffer_handler();
    let result = ternc::run_with(
        &program,
        InterpreterBuilder::new().print_handler(handler.clone()),
    );

    let Err(RunError::Resolve(errors)) = result else {
        panic!("expected resolution errors, got {result:?}");
    };
    assert_eq!(errors.len(), 2);
    assert!(matches!(
        errors.kinds()[0],
        ResolveErrorKind::Redeclaration { name } if name == "x"
    ));
    assert!(matches!(
        errors.kinds()[1],
        ResolveErrorKind::InvalidBinaryOp { op: BinaryOp::Sub, .. }
    ));
    assert_eq!(handler.get_output(), "");
}

#[test]
fn missing_entry_point() {
    let mut b = ProgramBuilder::new();
    let one = b.num(1.0);
    let ret = b.ret_value(one);
    let other = b.fn_decl("helper", &[], ParsedType::Num, vec![ret]);
    b.item(other);
    let program = b.finish();

    let errors = ternc::resolve(&program).unwrap_err();
    assert_eq!(
        errors.kinds(),
        vec![&ResolveErrorKind::MissingEntryPoint {
            name: "main".to_string()
        }]
    );

    let result = ternc::run(&program);
    assert!(matches!(result, Err(RunError::Resolve(_))));
}

#[test]
fn custom_entry_point_is_required_instead_of_main() {
    let mut b = ProgramBuilder::new();
    let one = b.num(1.0);
    let ret = b.ret_value(one);
    let main = b.fn_decl("main", &[], ParsedType::Num, vec![ret]);
    b.item(main);
    let program = b.finish();

    let result = ternc::run_with(&program, InterpreterBuilder::new().entry_point("start"));
    let Err(RunError::Resolve(errors)) = result else {
        panic!("expected resolution errors, got {result:?}");
    };
    assert_eq!(
        errors.kinds(),
        vec![&ResolveErrorKind::MissingEntryPoint {
            name: "start".to_string()
        }]
    );
}

#[test]
fn resolution_is_deterministic() {
    let mut b = ProgramBuilder::new();
    let x = b.num(2.0);
    let decl = b.declare("x", x);
    let x = b.ident("x");
    let y = b.str("!");
    let sum = b.binary(BinaryOp::Add, x, y);
    let print = b.print(sum);
    let zero = b.num(0.0);
    let ret = b.ret_value(zero);
    let main = b.fn_decl("main", &[], ParsedType::Num, vec![decl, print, ret]);
    b.item(main);
    let program = b.finish();

    let first = ternc::resolve(&program).unwrap();
    let second = ternc::resolve(&program).unwrap();
    assert_eq!(first, second);
}

#[test]
fn cyclic_superclasses_are_rejected_before_running() {
    // class A < B {}  class B < A {}
    let mut b = ProgramBuilder::new();
    let a = b.class("A", Some("B"), vec![]);
    b.item(a);
    let c = b.class("B", Some("A"), vec![]);
    b.item(c);
    let zero = b.num(0.0);
    let ret = b.ret_value(zero);
    let main = b.fn_decl("main", &[], ParsedType::Num, vec![ret]);
    b.item(main);
    let program = b.finish();

    let errors = ternc::resolve(&program).unwrap_err();
    assert_eq!(
        errors.kinds(),
        vec![
            &ResolveErrorKind::CyclicInheritance {
                class: "A".to_string()
            },
            &ResolveErrorKind::CyclicInheritance {
                class: "B".to_string()
            },
        ]
    );
}
