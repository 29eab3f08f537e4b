//! Runtime errors and the interpreter's control channel.
//!
//! Every runtime failure is an [`EvalError`]: a structured [`EvalErrorKind`],
//! the span of the node that failed, and a snapshot of the active calls.
//! Errors are built through the `#[cold]` factory functions at the bottom of
//! this module so call sites stay one line and the message text lives in one
//! place.

use std::fmt;

use tern_ir::Span;
use tern_resolve::Prim;

/// Structured runtime error category.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String },

    #[error("undefined property '{property}' on {class} instance")]
    UndefinedProperty { class: String, property: String },

    #[error("undefined method '{method}' on superclass {class}")]
    UndefinedMethod { class: String, method: String },

    #[error("only instances have properties, found {found}")]
    NotAnInstance { found: Prim },

    #[error("{found} is not callable")]
    NotCallable { found: Prim },

    #[error("{name} expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("{found} is not indexable")]
    NotIndexable { found: Prim },

    #[error("array index must be a number, found {found}")]
    InvalidIndex { found: Prim },

    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: Prim, found: Prim },

    #[error("invalid operand kinds for '{op}': {left} and {right}")]
    InvalidBinaryOp {
        op: &'static str,
        left: Prim,
        right: Prim,
    },

    #[error("invalid operand kind for '{op}': {operand}")]
    InvalidUnaryOp { op: &'static str, operand: Prim },

    #[error("division by zero")]
    DivisionByZero,

    #[error("superclass of {class} must be a class, found {found}")]
    SuperclassNotClass { class: String, found: Prim },

    #[error("maximum call depth of {limit} exceeded")]
    StackOverflow { limit: usize },

    #[error("entry point '{name}' is not defined or not a function")]
    MissingEntryPoint { name: String },

    #[error("entry point returned without producing an exit code")]
    NoExitCode,

    #[error("exit code must be a number or boolean, found {found}")]
    InvalidExitCode { found: Prim },

    #[error("{name}: {message}")]
    Builtin { name: &'static str, message: String },
}

/// One active call at the time an error was raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Function, method or class name.
    pub name: String,
    /// Span of the call expression.
    pub span: Option<Span>,
}

/// Snapshot of the call stack, most recent call first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        EvalBacktrace { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "stack backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            write!(f, "  {i}: {}", frame.name)?;
            if let Some(span) = frame.span {
                write!(f, " at {span}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A runtime error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Node that raised the error, when known.
    pub span: Option<Span>,
    /// Active calls at the error site. Empty errors raised at top level
    /// carry `None`.
    pub backtrace: Option<EvalBacktrace>,
}

impl EvalError {
    #[cold]
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            span: None,
            backtrace: None,
        }
    }

    /// Attach a span unless one is already set; the innermost span wins.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    /// Message bound by `catch`.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(span) = self.span {
            write!(f, " at {span}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

/// Non-local exits threaded through `Result::Err`.
///
/// `return` is not here: it is ordinary data ([`Flow::Return`]) so it can
/// never be caught by `try`.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlAction {
    /// A runtime error; unwinds to the nearest `try` or to `run`.
    Error(Box<EvalError>),
    /// `exit(code)`; unwinds straight to `run`.
    Exit(i32),
}

impl From<EvalError> for ControlAction {
    #[cold]
    fn from(err: EvalError) -> Self {
        ControlAction::Error(Box::new(err))
    }
}

impl ControlAction {
    /// Attach `span` to an error that does not have one yet.
    #[must_use]
    pub fn with_span(self, span: Span) -> Self {
        match self {
            ControlAction::Error(err) => ControlAction::Error(Box::new(err.with_span(span))),
            exit @ ControlAction::Exit(_) => exit,
        }
    }
}

/// Result of evaluating an expression or running a builtin.
pub type EvalResult<T> = Result<T, ControlAction>;

/// Outcome of executing a statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Flow {
    Normal,
    /// A `return` unwinding to the nearest call.
    Return(crate::Value),
}

// Factories

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_property(class: &str, property: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UndefinedProperty {
        class: class.to_string(),
        property: property.to_string(),
    })
}

#[cold]
pub fn undefined_method(class: &str, method: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UndefinedMethod {
        class: class.to_string(),
        method: method.to_string(),
    })
}

#[cold]
pub fn not_an_instance(found: Prim) -> EvalError {
    EvalError::new(EvalErrorKind::NotAnInstance { found })
}

#[cold]
pub fn not_callable(found: Prim) -> EvalError {
    EvalError::new(EvalErrorKind::NotCallable { found })
}

#[cold]
pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::new(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::new(EvalErrorKind::IndexOutOfBounds { index, len })
}

#[cold]
pub fn not_indexable(found: Prim) -> EvalError {
    EvalError::new(EvalErrorKind::NotIndexable { found })
}

#[cold]
pub fn invalid_index(found: Prim) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidIndex { found })
}

#[cold]
pub fn type_mismatch(expected: Prim, found: Prim) -> EvalError {
    EvalError::new(EvalErrorKind::TypeMismatch { expected, found })
}

#[cold]
pub fn invalid_binary_op(op: &'static str, left: Prim, right: Prim) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidBinaryOp { op, left, right })
}

#[cold]
pub fn invalid_unary_op(op: &'static str, operand: Prim) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidUnaryOp { op, operand })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::new(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn superclass_not_class(class: &str, found: Prim) -> EvalError {
    EvalError::new(EvalErrorKind::SuperclassNotClass {
        class: class.to_string(),
        found,
    })
}

#[cold]
pub fn stack_overflow(limit: usize) -> EvalError {
    EvalError::new(EvalErrorKind::StackOverflow { limit })
}

#[cold]
pub fn missing_entry_point(name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::MissingEntryPoint {
        name: name.to_string(),
    })
}

#[cold]
pub fn no_exit_code() -> EvalError {
    EvalError::new(EvalErrorKind::NoExitCode)
}

#[cold]
pub fn invalid_exit_code(found: Prim) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidExitCode { found })
}

#[cold]
pub fn builtin_failure(name: &'static str, message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Builtin {
        name,
        message: message.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages() {
        assert_eq!(
            undefined_variable("x").to_string(),
            "undefined variable 'x'"
        );
        assert_eq!(
            arity_mismatch("f", 2, 1).message(),
            "f expects 2 argument(s), got 1"
        );
        assert_eq!(
            invalid_binary_op("-", Prim::Str, Prim::Num).message(),
            "invalid operand kinds for '-': str and num"
        );
    }

    #[test]
    fn innermost_span_wins() {
        let err = division_by_zero()
            .with_span(Span::new(4, 5))
            .with_span(Span::new(0, 9));
        assert_eq!(err.span, Some(Span::new(4, 5)));
        assert_eq!(err.to_string(), "division by zero at 4..5");
    }

    #[test]
    fn exit_ignores_spans() {
        let action = ControlAction::Exit(3).with_span(Span::new(1, 2));
        assert_eq!(action, ControlAction::Exit(3));
    }

    #[test]
    fn backtrace_display() {
        let backtrace = EvalBacktrace::new(vec![
            BacktraceFrame {
                name: "inner".to_string(),
                span: Some(Span::new(10, 12)),
            },
            BacktraceFrame {
                name: "main".to_string(),
                span: None,
            },
        ]);
        assert_eq!(
            backtrace.to_string(),
            "stack backtrace:\n  0: inner at 10..12\n  1: main\n"
        );
        assert!(EvalBacktrace::default().to_string().is_empty());
    }
}
