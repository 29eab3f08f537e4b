//! Arena owning every node of one program.

use std::ops::Index;

use crate::{ClassDef, ClassId, Expr, ExprId, FunctionDef, FunctionId, Stmt, StmtId};

/// Contiguous storage for expressions, statements and definitions.
///
/// Nodes are appended by the AST builder and never removed or mutated
/// afterwards; ids handed out by `alloc_*` stay valid for the arena's life.
#[derive(Clone, Default, Debug)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    functions: Vec<FunctionDef>,
    classes: Vec<ClassDef>,
}

fn next_index(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(next_index(self.exprs.len()));
        self.exprs.push(expr);
        id
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::new(next_index(self.stmts.len()));
        self.stmts.push(stmt);
        id
    }

    pub fn alloc_function(&mut self, function: FunctionDef) -> FunctionId {
        let id = FunctionId::new(next_index(self.functions.len()));
        self.functions.push(function);
        id
    }

    pub fn alloc_class(&mut self, class: ClassDef) -> ClassId {
        let id = ClassId::new(next_index(self.classes.len()));
        self.classes.push(class);
        id
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn function(&self, id: FunctionId) -> &FunctionDef {
        &self.functions[id.index()]
    }

    #[inline]
    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.index()]
    }

    /// Number of expressions; side tables indexed by `ExprId` use this size.
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

impl Index<ExprId> for ExprArena {
    type Output = Expr;

    fn index(&self, id: ExprId) -> &Expr {
        self.expr(id)
    }
}

impl Index<StmtId> for ExprArena {
    type Output = Stmt;

    fn index(&self, id: StmtId) -> &Stmt {
        self.stmt(id)
    }
}
