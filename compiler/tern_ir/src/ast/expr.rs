//! Expression nodes.

use std::fmt;

use super::operators::{BinaryOp, UnaryOp};
use crate::{ExprId, FunctionId, Name, Span, Spanned};

/// Expression node.
#[derive(Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

/// Expression kinds.
///
/// Children are arena ids, never boxed nodes.
#[derive(Clone, PartialEq, Debug)]
pub enum ExprKind {
    // Literals
    /// Number literal (the language has a single numeric kind).
    Number(f64),
    /// String literal, interned.
    Str(Name),
    /// `true` / `false`
    Bool(bool),
    /// `none`
    None,

    // References
    /// Variable reference.
    Ident(Name),
    /// `this` inside a method body.
    This,
    /// `super.method` inside a method of a subclass.
    Super { method: Name },

    // Operators
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },

    // Access
    /// Call: `callee(args...)`.
    Call { callee: ExprId, args: Box<[ExprId]> },
    /// Field or method access: `object.name`.
    Field { object: ExprId, name: Name },
    /// Array indexing: `base[index]`.
    Index { base: ExprId, index: ExprId },

    // Constructors
    /// Array literal: `[a, b, c]`.
    Array(Box<[ExprId]>),
    /// Function literal. Named declarations are `Let` statements whose
    /// initializer is a function literal.
    Function(FunctionId),
}

impl ExprKind {
    /// Kinds that may appear on the left of an assignment.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            ExprKind::Ident(_) | ExprKind::Field { .. } | ExprKind::Index { .. }
        )
    }
}
