//! Node ids for the flat AST.
//!
//! `ExprId(u32)` instead of `Box<Expr>`: an id is both the handle used to
//! reach a node in the [`ExprArena`](crate::ExprArena) and the node's
//! identity, which is what resolution side tables are keyed on.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create a new id.
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Get the index into the arena.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Get the raw u32 value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Index of an expression in the arena.
    ExprId,
    "Expr"
);
define_id!(
    /// Index of a statement in the arena.
    StmtId,
    "Stmt"
);
define_id!(
    /// Index of a function or method definition in the arena.
    FunctionId,
    "Fn"
);
define_id!(
    /// Index of a class definition in the arena.
    ClassId,
    "Class"
);
