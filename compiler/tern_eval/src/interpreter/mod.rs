//! Tree-walking interpreter.
//!
//! Executes a resolved [`Program`](tern_ir::Program): the global statements
//! first, then the entry function, whose first `return` is the exit code.
//!
//! # Frames
//!
//! Runtime frames mirror the resolver's scopes one for one, which is what
//! makes the recorded hop counts valid:
//!
//! | construct                              | frame                         |
//! |----------------------------------------|-------------------------------|
//! | block, `if` branch, `try` body          | one per execution             |
//! | `while` body                           | one per iteration             |
//! | `catch` body                           | one, holding the binding      |
//! | call                                   | one, holding the parameters   |
//! | method access                          | bind frame holding `this`     |
//! | class with a superclass                | one, holding `super`          |
//!
//! Names the resolver left unresolved are looked up in the global frame.

mod builder;
mod call;
mod eval;
mod exec;


use tern_ir::{ExprArena, Name, StmtId, StringInterner};
use tern_resolve::Resolution;

use crate::builtins::builtins;
use crate::call_stack::CallStack;
use crate::errors::{
    invalid_exit_code, missing_entry_point, no_exit_code, ControlAction, EvalError, EvalResult,
};
use crate::heap::HeapRegistry;
use crate::print_handler::SharedPrintHandler;
use crate::{Env, Value};

pub use builder::{InterpreterBuilder, DEFAULT_ENTRY_POINT};

/// Interpreter state for one run of one program.
pub struct Interpreter<'a> {
    arena: &'a ExprArena,
    items: &'a [StmtId],
    interner: &'a StringInterner,
    resolution: &'a Resolution,
    entry_point: Name,
    /// Root frame, seeded with the builtins.
    globals: Env,
    /// Active frame.
    env: Env,
    call_stack: CallStack,
    print_handler: SharedPrintHandler,
    heap: HeapRegistry,
}

impl Interpreter<'_> {
    /// Run the program and return its exit code.
    ///
    /// `exit(n)` anywhere ends the run with `n`. A runtime error that no
    /// `try` caught ends it with that error; output already printed stays
    /// printed.
    #[tracing::instrument(level = "debug", skip_all, fields(items = self.items.len()))]
    pub fn run(&mut self) -> Result<i32, EvalError> {
        self.seed_builtins();
        match self.run_program() {
            Ok(code) | Err(ControlAction::Exit(code)) => {
                tracing::debug!(code, "program finished");
                Ok(code)
            }
            Err(ControlAction::Error(err)) => {
                tracing::debug!(error = %err, "program failed");
                Err(*err)
            }
        }
    }

    fn seed_builtins(&mut self) {
        for builtin in builtins() {
            let name = self.interner.intern(builtin.name());
            self.globals.define(name, Value::Builtin(builtin));
        }
    }

    fn run_program(&mut self) -> EvalResult<i32> {
        let items = self.items;
        for &stmt in items {
            // `return` at top level is rejected by the resolver.
            self.exec_stmt(stmt)?;
        }

        let entry = self.interner.lookup(self.entry_point);
        let Some(Value::Function(main)) = self.globals.get(self.entry_point) else {
            return Err(missing_entry_point(entry).into());
        };
        tracing::debug!(entry, "invoking entry point");

        match self.call_function(&main, Vec::new(), None)? {
            Some(value) => exit_code(&value).map_err(ControlAction::from),
            None => Err(no_exit_code().into()),
        }
    }

    /// Run `f` with `env` as the active frame, restoring the previous frame
    /// afterwards whatever the outcome.
    fn with_env<R>(&mut self, env: Env, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = std::mem::replace(&mut self.env, env);
        let result = f(self);
        self.env = previous;
        result
    }

    /// A new child of the active frame, registered for teardown.
    fn child_frame(&mut self) -> Env {
        let parent = self.env.clone();
        self.new_frame(&parent)
    }

    fn new_frame(&mut self, parent: &Env) -> Env {
        let frame = parent.child();
        self.heap.track_frame(&frame);
        frame
    }
}

/// Numbers truncate; booleans are 0 or 1.
fn exit_code(value: &Value) -> Result<i32, EvalError> {
    match value {
        Value::Number(n) => Ok(n.trunc() as i32),
        Value::Bool(b) => Ok(i32::from(*b)),
        other => Err(invalid_exit_code(other.prim())),
    }
}

impl Drop for Interpreter<'_> {
    fn drop(&mut self) {
        self.heap.clear();
    }
}
