//! Statement nodes.

use std::fmt;

use crate::{ClassId, ExprId, Name, Span, Spanned, StmtId};

/// Statement node.
#[derive(Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

impl fmt::Debug for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

impl Spanned for Stmt {
    fn span(&self) -> Span {
        self.span
    }
}

/// One arm of an `if` sequence.
///
/// A `None` condition is unconditional and models a trailing `else`.
#[derive(Clone, PartialEq, Debug)]
pub struct Branch {
    pub cond: Option<ExprId>,
    pub body: Box<[StmtId]>,
}

/// Statement kinds.
///
/// `for`, `until` and `unless` arrive already desugared into `While` and `If`.
#[derive(Clone, PartialEq, Debug)]
pub enum StmtKind {
    /// Expression evaluated for its effect.
    Expr(ExprId),

    /// Declaration with initializer. Function declarations use a function
    /// literal as the initializer.
    Let { name: Name, init: ExprId },

    /// Assignment to an `Ident`, `Field` or `Index` expression.
    Assign { target: ExprId, value: ExprId },

    /// Braced block; opens a scope.
    Block(Box<[StmtId]>),

    /// Ordered branch sequence; the first truthy branch runs.
    If { branches: Box<[Branch]> },

    While { cond: ExprId, body: Box<[StmtId]> },

    Return(Option<ExprId>),

    /// Class declaration.
    Class(ClassId),

    /// `try { body } catch (binding) { handler }`
    TryCatch {
        body: Box<[StmtId]>,
        binding: Option<Name>,
        handler: Box<[StmtId]>,
    },
}
