//! AST node types.
//!
//! The node-kind set is closed: passes dispatch with `match` over
//! [`ExprKind`] and [`StmtKind`] rather than through a visitor trait.

mod expr;
mod items;
mod operators;
mod stmt;

pub use expr::{Expr, ExprKind};
pub use items::{ClassDef, FunctionDef, Param};
pub use operators::{BinaryOp, UnaryOp};
pub use stmt::{Branch, Stmt, StmtKind};

#[cfg(test)]
mod tests;
