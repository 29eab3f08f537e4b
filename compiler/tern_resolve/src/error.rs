//! Resolution errors.
//!
//! All errors are collected during the walk and reported together; any error
//! prevents execution.

use std::fmt;

use tern_ir::{BinaryOp, Span, UnaryOp};

use crate::Prim;

/// What went wrong during resolution.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveErrorKind {
    #[error("`{name}` is already declared in this scope")]
    Redeclaration { name: String },

    #[error("cannot read `{name}` in its own initializer")]
    SelfReference { name: String },

    #[error("operator `{op}` cannot be applied to {left} and {right}")]
    InvalidBinaryOp { op: BinaryOp, left: Prim, right: Prim },

    #[error("operator `{op}` cannot be applied to {operand}")]
    InvalidUnaryOp { op: UnaryOp, operand: Prim },

    #[error("no entry point: expected a top-level function `{name}`")]
    MissingEntryPoint { name: String },

    #[error("entry point `{name}` must take no parameters, found {arity}")]
    EntryPointTakesParams { name: String, arity: usize },

    #[error("`return` outside of a function")]
    ReturnOutsideFunction,

    #[error("`this` outside of a class")]
    ThisOutsideClass,

    #[error("`super` outside of a class")]
    SuperOutsideClass,

    #[error("`super` in class `{class}`, which has no superclass")]
    SuperWithoutSuperclass { class: String },

    #[error("class `{class}` cannot inherit from itself")]
    SelfInheritance { class: String },

    #[error("class `{class}` has a cyclic superclass chain")]
    CyclicInheritance { class: String },

    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
}

/// A resolution error at a source location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveError {
    pub kind: ResolveErrorKind,
    pub span: Span,
}

impl ResolveError {
    #[cold]
    pub fn new(kind: ResolveErrorKind, span: Span) -> Self {
        ResolveError { kind, span }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.span)
    }
}

impl std::error::Error for ResolveError {}

/// Every error found in one program, in discovery order. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveErrors(Vec<ResolveError>);

impl ResolveErrors {
    pub(crate) fn new(errors: Vec<ResolveError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(ResolveErrors(errors))
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolveError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Kinds only, in order. Mostly useful in tests.
    pub fn kinds(&self) -> Vec<&ResolveErrorKind> {
        self.0.iter().map(|e| &e.kind).collect()
    }
}

impl fmt::Display for ResolveErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ResolveErrors {}

impl<'a> IntoIterator for &'a ResolveErrors {
    type Item = &'a ResolveError;
    type IntoIter = std::slice::Iter<'a, ResolveError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
