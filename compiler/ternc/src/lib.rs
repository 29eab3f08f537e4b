//! Tern core entry points.
//!
//! Takes a finished [`Program`] (built by an external front end, or with
//! [`ProgramBuilder`](tern_ir::ProgramBuilder)) through the two core passes:
//!
//! 1. [`resolve`]: scopes, hop counts and operator/call signatures.
//! 2. [`run`]: tree-walking execution, returning the process exit code.
//!
//! Resolution errors are all reported together and nothing runs; a runtime
//! error stops execution at the point it was raised.

use std::sync::Once;

pub use tern_eval::{
    buffer_handler, silent_handler, stdout_handler, EvalError, EvalErrorKind, InterpreterBuilder,
    SharedPrintHandler,
};
pub use tern_ir::Program;
pub use tern_resolve::{Resolution, ResolveError, ResolveErrorKind, ResolveErrors};

/// Why a program did not produce an exit code.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Rejected before execution.
    #[error("{0}")]
    Resolve(#[from] ResolveErrors),
    /// Failed during execution.
    #[error("runtime error: {0}")]
    Eval(#[from] EvalError),
}

/// Resolve `program` for the default entry point `main`.
pub fn resolve(program: &Program) -> Result<Resolution, ResolveErrors> {
    tern_resolve::resolve(program)
}

/// Resolve and run `program` with default options: entry point `main`,
/// output to stdout.
pub fn run(program: &Program) -> Result<i32, RunError> {
    run_with(program, InterpreterBuilder::new())
}

/// Resolve and run `program` with the given interpreter options.
#[tracing::instrument(level = "debug", skip_all, fields(entry = options.entry_point_name()))]
pub fn run_with(program: &Program, options: InterpreterBuilder) -> Result<i32, RunError> {
    let entry = program.interner.intern(options.entry_point_name());
    let resolution = tern_resolve::Resolver::new(program)
        .with_entry_point(entry)
        .resolve()?;
    tracing::debug!(locals = resolution.local_count(), "resolved");

    let mut interpreter = options.build(program, &resolution);
    Ok(interpreter.run()?)
}

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// The library never calls this itself; a front end that parses source and
/// hands the AST to [`run`] calls it once at startup. Does nothing when
/// `RUST_LOG` is unset, and nothing after the first call.
///
/// ```
/// use tern_ir::{ParsedType, ProgramBuilder};
///
/// ternc::init_tracing();
/// ternc::init_tracing();
///
/// let mut b = ProgramBuilder::new();
/// let zero = b.num(0.0);
/// let ret = b.ret_value(zero);
/// let main = b.fn_decl("main", &[], ParsedType::Num, vec![ret]);
/// b.item(main);
/// assert_eq!(ternc::run(&b.finish()).ok(), Some(0));
/// ```
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
