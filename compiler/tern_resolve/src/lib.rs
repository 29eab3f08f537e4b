//! Tern Resolve - static scope and kind resolution.
//!
//! The first of the two core passes. It walks a [`Program`](tern_ir::Program)
//! once and produces a [`Resolution`]: hop counts for every local use, a
//! [`Kind`] for every expression, an [`OpSig`] for every operator and a
//! [`CallSig`] for every call. The interpreter executes against these tables
//! and never re-derives scoping.
//!
//! # Usage
//!
//! ```text
//! let resolution = tern_resolve::resolve(&program)?;
//! let hops = resolution.hops(ident_expr);
//! ```

mod error;
mod kind;
pub mod ops;
mod resolution;
mod resolver;

pub use error::{ResolveError, ResolveErrorKind, ResolveErrors};
pub use kind::{FnKind, Kind, Prim};
pub use ops::{CallSig, CallTarget, Callee, Coercion, OpSig, Signature};
pub use resolution::Resolution;
pub use resolver::{resolve, Resolver};
