//! Tern Eval - tree-walking interpreter for resolved Tern programs.
//!
//! The second of the two core passes. Given a [`Program`](tern_ir::Program)
//! and the [`Resolution`](tern_resolve::Resolution) computed for it, the
//! [`Interpreter`] runs the global statements, calls the entry function and
//! turns its first `return` into a process exit code.
//!
//! # Usage
//!
//! ```text
//! let resolution = tern_resolve::resolve(&program)?;
//! let code = InterpreterBuilder::new()
//!     .print_handler(buffer_handler())
//!     .build(&program, &resolution)
//!     .run()?;
//! ```

mod builtins;
mod call_stack;
mod callable;
mod environment;
mod errors;
mod heap;
mod interpreter;
mod operators;
mod print_handler;
mod value;

pub use builtins::{builtins, Builtin, BuiltinContext, BuiltinFn};
pub use call_stack::{CallFrame, CallStack, DEFAULT_MAX_CALL_DEPTH};
pub use callable::{ClassValue, FunctionRole, FunctionValue, InstanceValue};
pub use environment::{Env, LocalScope, Scope};
pub use errors::{
    BacktraceFrame, ControlAction, EvalBacktrace, EvalError, EvalErrorKind, EvalResult, Flow,
};
pub use interpreter::{Interpreter, InterpreterBuilder, DEFAULT_ENTRY_POINT};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler, StdoutPrintHandler,
};
pub use value::{ArrayValue, Value};
