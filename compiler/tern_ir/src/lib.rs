//! Tern IR - the AST value model consumed by the Tern core.
//!
//! This crate contains the data structures shared by the resolver and the
//! interpreter:
//! - Spans for source locations
//! - Names for interned identifiers (and interned string literals)
//! - AST nodes (`Expr`, `Stmt`, `FunctionDef`, `ClassDef`)
//! - Arena allocation with `u32` ids for node identity
//! - Builtin signatures, shared by the resolver (global kinds) and the
//!   evaluator (native implementations)
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers and string literals are `Name(u32)`
//! - **Flatten Everything**: no `Box<Expr>`, children are `ExprId(u32)` indices
//! - **Identity is the id**: side tables produced by resolution are keyed by
//!   `ExprId`, so the tree itself is never mutated after construction

mod arena;
pub mod ast;
pub mod builder;
pub mod builtins;
mod ids;
mod interner;
mod name;
mod parsed_type;
mod program;
mod span;

pub use arena::ExprArena;
pub use ast::{
    BinaryOp, Branch, ClassDef, Expr, ExprKind, FunctionDef, Param, Stmt, StmtKind, UnaryOp,
};
pub use builder::ProgramBuilder;
pub use builtins::{BuiltinSig, BUILTIN_SIGNATURES};
pub use ids::{ClassId, ExprId, FunctionId, StmtId};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use parsed_type::ParsedType;
pub use program::Program;
pub use span::Span;

/// Trait for AST nodes that carry a source span.
pub trait Spanned {
    fn span(&self) -> Span;
}
