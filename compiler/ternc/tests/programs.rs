//! End-to-end programs: build an AST, resolve it, run it, check the exit
//! code and the printed output.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use tern_ir::{BinaryOp, ParsedType, Program, ProgramBuilder, StmtId};
use ternc::{buffer_handler, EvalErrorKind, InterpreterBuilder, RunError};

fn run(program: &Program) -> (Result<i32, RunError>, String) {
    let handler = buffer_handler();
    let result = ternc::run_with(
        program,
        InterpreterBuilder::new().print_handler(handler.clone()),
    );
    (result, handler.get_output())
}

fn with_main(b: &mut ProgramBuilder, body: Vec<StmtId>) {
    let main = b.fn_decl("main", &[], ParsedType::Num, body);
    b.item(main);
}

fn return_zero(b: &mut ProgramBuilder) -> StmtId {
    let zero = b.num(0.0);
    b.ret_value(zero)
}

/// `(Result<i32, RunError>, String)` has no `PartialEq`; compare the parts.
trait MapOk {
    fn map_ok(self) -> (Option<i32>, String);
}

impl MapOk for (Result<i32, RunError>, String) {
    fn map_ok(self) -> (Option<i32>, String) {
        (self.0.ok(), self.1)
    }
}

fn runtime_error(result: Result<i32, RunError>) -> EvalErrorKind {
    match result {
        Err(RunError::Eval(err)) => err.kind,
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn arithmetic_precedence_exit_code() {
    let mut b = ProgramBuilder::new();
    let one = b.num(1.0);
    let two = b.num(2.0);
    let three = b.num(3.0);
    let product = b.binary(BinaryOp::Mul, two, three);
    let sum = b.binary(BinaryOp::Add, one, product);
    let ret = b.ret_value(sum);
    with_main(&mut b, vec![ret]);

    assert_eq!(run(&b.finish()).0.ok(), Some(7));
}

#[test]
fn string_plus_number_concatenates() {
    let mut b = ProgramBuilder::new();
    let a = b.str("a");
    let one = b.num(1.0);
    let sum = b.binary(BinaryOp::Add, a, one);
    let print = b.print(sum);
    let ret = return_zero(&mut b);
    with_main(&mut b, vec![print, ret]);

    let (result, output) = run(&b.finish());
    assert_eq!(result.ok(), Some(0));
    assert_eq!(output, "a1\n");
}

#[test]
fn closure_counter_keeps_its_state() {
    // fn make_counter() -> fn {
    //     let count = 0
    //     fn inc() -> num { count = count + 1; return count }
    //     return inc
    // }
    let mut b = ProgramBuilder::new();
    let zero = b.num(0.0);
    let decl_count = b.declare("count", zero);
    let count = b.ident("count");
    let one = b.num(1.0);
    let next = b.binary(BinaryOp::Add, count, one);
    let bump = b.assign_var("count", next);
    let count = b.ident("count");
    let ret_count = b.ret_value(count);
    let inc = b.fn_decl("inc", &[], ParsedType::Num, vec![bump, ret_count]);
    let inc_ref = b.ident("inc");
    let ret_inc = b.ret_value(inc_ref);
    let make = b.fn_decl(
        "make_counter",
        &[],
        ParsedType::Fn,
        vec![decl_count, inc, ret_inc],
    );
    b.item(make);

    // let c = make_counter(); print(c()) x3
    let make_call = b.call_named("make_counter", vec![]);
    let decl_c = b.declare("c", make_call);
    let mut body = vec![decl_c];
    for _ in 0..3 {
        let call = b.call_named("c", vec![]);
        body.push(b.print(call));
    }
    body.push(return_zero(&mut b));
    with_main(&mut b, body);

    assert_eq!(run(&b.finish()).1, "1\n2\n3\n");
}

#[test]
fn recursive_factorial() {
    // fn fact(n: num) -> num { if n <= 1 { return 1 } return n * fact(n - 1) }
    let mut b = ProgramBuilder::new();
    let n = b.ident("n");
    let one = b.num(1.0);
    let base = b.binary(BinaryOp::LtEq, n, one);
    let one = b.num(1.0);
    let ret_one = b.ret_value(one);
    let check = b.if_chain(vec![(Some(base), vec![ret_one])]);
    let n = b.ident("n");
    let one = b.num(1.0);
    let smaller = b.binary(BinaryOp::Sub, n, one);
    let recurse = b.call_named("fact", vec![smaller]);
    let n = b.ident("n");
    let product = b.binary(BinaryOp::Mul, n, recurse);
    let ret = b.ret_value(product);
    let fact = b.fn_decl("fact", &[("n", ParsedType::Num)], ParsedType::Num, vec![check, ret]);
    b.item(fact);

    let five = b.num(5.0);
    let call = b.call_named("fact", vec![five]);
    let print = b.print(call);
    let ret = return_zero(&mut b);
    with_main(&mut b, vec![print, ret]);

    assert_eq!(run(&b.finish()).map_ok(), (Some(0), "120\n".to_string()));
}

#[test]
fn inherited_methods_and_super_dispatch() {
    // class Animal {
    //     init(name: str) { this.name = name }
    //     speak() -> str { return this.name + " makes a sound" }
    // }
    // class Dog < Animal {
    //     speak() -> str { return super.speak() + " and barks" }
    // }
    let mut b = ProgramBuilder::new();
    let this = b.this();
    let target = b.field(this, "name");
    let name = b.ident("name");
    let set = b.assign(target, name);
    let init = b.method("init", &[("name", ParsedType::Str)], ParsedType::Void, vec![set]);
    let this = b.this();
    let name = b.field(this, "name");
    let suffix = b.str(" makes a sound");
    let text = b.binary(BinaryOp::Add, name, suffix);
    let ret = b.ret_value(text);
    let speak = b.method("speak", &[], ParsedType::Str, vec![ret]);
    let animal = b.class("Animal", None, vec![init, speak]);
    b.item(animal);

    let parent = b.super_method("speak");
    let parent = b.call(parent, vec![]);
    let suffix = b.str(" and barks");
    let text = b.binary(BinaryOp::Add, parent, suffix);
    let ret = b.ret_value(text);
    let speak = b.method("speak", &[], ParsedType::Str, vec![ret]);
    let dog = b.class("Dog", Some("Animal"), vec![speak]);
    b.item(dog);

    // print(Dog("Rex").speak()); print(Animal("Cat").speak())
    let rex = b.str("Rex");
    let d = b.call_named("Dog", vec![rex]);
    let said = b.method_call(d, "speak", vec![]);
    let print_dog = b.print(said);
    let cat = b.str("Cat");
    let a = b.call_named("Animal", vec![cat]);
    let said = b.method_call(a, "speak", vec![]);
    let print_animal = b.print(said);
    let ret = return_zero(&mut b);
    with_main(&mut b, vec![print_dog, print_animal, ret]);

    assert_eq!(
        run(&b.finish()).map_ok(),
        (
            Some(0),
            "Rex makes a sound and barks\nCat makes a sound\n".to_string()
        )
    );
}

#[test]
fn array_write_read_and_bounds() {
    // let a = [1, 2, 3]; a[1] = 20; print(a[1]); print(a); a[3] = 1
    let mut b = ProgramBuilder::new();
    let elements = [1.0, 2.0, 3.0].map(|n| b.num(n)).to_vec();
    let array = b.array(elements);
    let decl = b.declare("a", array);
    let a = b.ident("a");
    let one = b.num(1.0);
    let slot = b.index(a, one);
    let twenty = b.num(20.0);
    let write = b.assign(slot, twenty);
    let a = b.ident("a");
    let one = b.num(1.0);
    let read = b.index(a, one);
    let print_read = b.print(read);
    let a = b.ident("a");
    let print_all = b.print(a);
    let a = b.ident("a");
    let three = b.num(3.0);
    let slot = b.index(a, three);
    let one = b.num(1.0);
    let oob = b.assign(slot, one);
    let ret = return_zero(&mut b);
    with_main(&mut b, vec![decl, write, print_read, print_all, oob, ret]);

    let (result, output) = run(&b.finish());
    assert_eq!(output, "20\n[1, 20, 3]\n");
    assert_eq!(
        runtime_error(result),
        EvalErrorKind::IndexOutOfBounds { index: 3, len: 3 }
    );
}

#[test]
fn arity_mismatches_are_runtime_errors() {
    let mut b = ProgramBuilder::new();
    let a = b.ident("a");
    let c = b.ident("b");
    let sum = b.binary(BinaryOp::Add, a, c);
    let ret = b.ret_value(sum);
    let f = b.fn_decl(
        "f",
        &[("a", ParsedType::Num), ("b", ParsedType::Num)],
        ParsedType::Num,
        vec![ret],
    );
    b.item(f);
    let one = b.num(1.0);
    let call = b.call_named("f", vec![one]);
    let ret = b.ret_value(call);
    with_main(&mut b, vec![ret]);

    assert_eq!(
        runtime_error(run(&b.finish()).0),
        EvalErrorKind::ArityMismatch {
            name: "f".to_string(),
            expected: 2,
            got: 1,
        }
    );
}

#[test]
fn builtin_arity_is_checked() {
    let mut b = ProgramBuilder::new();
    let call = b.call_named("print", vec![]);
    let stmt = b.expr_stmt(call);
    let ret = return_zero(&mut b);
    with_main(&mut b, vec![stmt, ret]);

    assert_eq!(
        runtime_error(run(&b.finish()).0),
        EvalErrorKind::ArityMismatch {
            name: "print".to_string(),
            expected: 1,
            got: 0,
        }
    );
}

#[test]
fn exit_ends_the_program_with_its_code() {
    // fn quit() { exit(4) }  fn main() { quit(); print("unreachable"); return 0 }
    let mut b = ProgramBuilder::new();
    let four = b.num(4.0);
    let exit = b.call_named("exit", vec![four]);
    let exit = b.expr_stmt(exit);
    let quit = b.fn_decl("quit", &[], ParsedType::Void, vec![exit]);
    b.item(quit);
    let call = b.call_named("quit", vec![]);
    let call = b.expr_stmt(call);
    let text = b.str("unreachable");
    let print = b.print(text);
    let ret = return_zero(&mut b);
    with_main(&mut b, vec![call, print, ret]);

    assert_eq!(run(&b.finish()).map_ok(), (Some(4), String::new()));
}

#[test]
fn caught_errors_continue_execution() {
    let mut b = ProgramBuilder::new();
    let one = b.num(1.0);
    let zero = b.num(0.0);
    let div = b.binary(BinaryOp::Div, one, zero);
    let print_div = b.print(div);
    let e = b.ident("e");
    let print_e = b.print(e);
    let guarded = b.try_catch(vec![print_div], Some("e"), vec![print_e]);
    let after = b.str("after");
    let print_after = b.print(after);
    let ret = return_zero(&mut b);
    with_main(&mut b, vec![guarded, print_after, ret]);

    assert_eq!(
        run(&b.finish()).map_ok(),
        (Some(0), "division by zero\nafter\n".to_string())
    );
}

#[test]
fn entry_without_return_has_no_exit_code() {
    let mut b = ProgramBuilder::new();
    let text = b.str("done");
    let print = b.print(text);
    with_main(&mut b, vec![print]);

    let (result, output) = run(&b.finish());
    assert_eq!(output, "done\n");
    assert_eq!(runtime_error(result), EvalErrorKind::NoExitCode);
}
