//! The root node handed to the core.

use crate::{ExprArena, SharedInterner, StmtId};

/// A finished AST: the arena, the ordered top-level statements, and the
/// interner every `Name` in the arena belongs to.
#[derive(Clone)]
pub struct Program {
    pub arena: ExprArena,
    pub items: Box<[StmtId]>,
    pub interner: SharedInterner,
}

impl Program {
    pub fn new(arena: ExprArena, items: Vec<StmtId>, interner: SharedInterner) -> Self {
        Program {
            arena,
            items: items.into_boxed_slice(),
            interner,
        }
    }
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("items", &self.items)
            .field("exprs", &self.arena.expr_count())
            .field("stmts", &self.arena.stmt_count())
            .finish_non_exhaustive()
    }
}
