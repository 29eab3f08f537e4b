//! `InterpreterBuilder` for configuring an [`Interpreter`].

use tern_ir::Program;
use tern_resolve::Resolution;

use super::Interpreter;
use crate::call_stack::{CallStack, DEFAULT_MAX_CALL_DEPTH};
use crate::heap::HeapRegistry;
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::Env;

/// Default name of the function `run` calls after the global statements.
pub const DEFAULT_ENTRY_POINT: &str = "main";

/// Interpreter options. Independent of any program, so one builder can be
/// prepared up front and handed to [`InterpreterBuilder::build`] together
/// with the program and its resolution.
#[derive(Clone)]
pub struct InterpreterBuilder {
    entry_point: String,
    print_handler: Option<SharedPrintHandler>,
    max_call_depth: usize,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        InterpreterBuilder {
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            print_handler: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Name of the function invoked after the global statements.
    #[must_use]
    pub fn entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }

    /// Destination of `print` and `input` prompts. Defaults to stdout.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Maximum number of nested calls before a stack-overflow error.
    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn entry_point_name(&self) -> &str {
        &self.entry_point
    }

    /// Build an interpreter for `program`. `resolution` must come from
    /// resolving that same program.
    pub fn build<'a>(self, program: &'a Program, resolution: &'a Resolution) -> Interpreter<'a> {
        let interner = &*program.interner;
        let globals = Env::root();
        let mut heap = HeapRegistry::new();
        heap.track_frame(&globals);

        Interpreter {
            arena: &program.arena,
            items: &program.items,
            interner,
            resolution,
            entry_point: interner.intern(&self.entry_point),
            env: globals.clone(),
            globals,
            call_stack: CallStack::new(self.max_call_depth),
            print_handler: self.print_handler.unwrap_or_else(stdout_handler),
            heap,
        }
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
