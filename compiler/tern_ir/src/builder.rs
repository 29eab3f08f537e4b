//! Programmatic construction of programs.
//!
//! The concrete-syntax front end lives outside the core; this builder is the
//! interface it (and every test) uses to produce a [`Program`]. Each node gets
//! a distinct, increasing span so errors can point at a unique location.

use std::sync::Arc;

use crate::{
    BinaryOp, Branch, ClassDef, Expr, ExprArena, ExprId, ExprKind, FunctionDef, FunctionId, Name,
    Param, ParsedType, Program, SharedInterner, Span, Stmt, StmtId, StmtKind, StringInterner,
    UnaryOp,
};

/// Incremental builder for a [`Program`].
pub struct ProgramBuilder {
    arena: ExprArena,
    interner: SharedInterner,
    items: Vec<StmtId>,
    cursor: u32,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::with_interner(Arc::new(StringInterner::new()))
    }

    pub fn with_interner(interner: SharedInterner) -> Self {
        ProgramBuilder {
            arena: ExprArena::new(),
            interner,
            items: Vec::new(),
            cursor: 0,
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    fn next_span(&mut self) -> Span {
        let start = self.cursor;
        self.cursor = self.cursor.saturating_add(1);
        Span::new(start, self.cursor)
    }

    fn expr(&mut self, kind: ExprKind) -> ExprId {
        let span = self.next_span();
        self.arena.alloc_expr(Expr::new(kind, span))
    }

    fn stmt(&mut self, kind: StmtKind) -> StmtId {
        let span = self.next_span();
        self.arena.alloc_stmt(Stmt::new(kind, span))
    }

    // Expressions

    pub fn num(&mut self, n: f64) -> ExprId {
        self.expr(ExprKind::Number(n))
    }

    pub fn str(&mut self, s: &str) -> ExprId {
        let name = self.name(s);
        self.expr(ExprKind::Str(name))
    }

    pub fn bool(&mut self, b: bool) -> ExprId {
        self.expr(ExprKind::Bool(b))
    }

    pub fn none(&mut self) -> ExprId {
        self.expr(ExprKind::None)
    }

    pub fn ident(&mut self, s: &str) -> ExprId {
        let name = self.name(s);
        self.expr(ExprKind::Ident(name))
    }

    pub fn this(&mut self) -> ExprId {
        self.expr(ExprKind::This)
    }

    pub fn super_method(&mut self, method: &str) -> ExprId {
        let method = self.name(method);
        self.expr(ExprKind::Super { method })
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.expr(ExprKind::Binary { op, left, right })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Unary { op, operand })
    }

    pub fn call(&mut self, callee: ExprId, args: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Call {
            callee,
            args: args.into_boxed_slice(),
        })
    }

    /// `name(args...)`
    pub fn call_named(&mut self, name: &str, args: Vec<ExprId>) -> ExprId {
        let callee = self.ident(name);
        self.call(callee, args)
    }

    pub fn field(&mut self, object: ExprId, name: &str) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::Field { object, name })
    }

    /// `object.method(args...)`
    pub fn method_call(&mut self, object: ExprId, method: &str, args: Vec<ExprId>) -> ExprId {
        let callee = self.field(object, method);
        self.call(callee, args)
    }

    pub fn index(&mut self, base: ExprId, index: ExprId) -> ExprId {
        self.expr(ExprKind::Index { base, index })
    }

    pub fn array(&mut self, elements: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Array(elements.into_boxed_slice()))
    }

    /// Function definition without a binding; see [`Self::function`] and
    /// [`Self::fn_decl`] for the usual entry points.
    pub fn define_function(
        &mut self,
        name: &str,
        params: &[(&str, ParsedType)],
        ret: ParsedType,
        body: Vec<StmtId>,
    ) -> FunctionId {
        let params = params
            .iter()
            .map(|(name, ty)| Param {
                name: self.interner.intern(name),
                ty: *ty,
            })
            .collect();
        let name = self.name(name);
        let span = self.next_span();
        self.arena.alloc_function(FunctionDef {
            name,
            params,
            ret,
            body: body.into_boxed_slice(),
            span,
        })
    }

    /// Function literal expression.
    pub fn function(
        &mut self,
        name: &str,
        params: &[(&str, ParsedType)],
        ret: ParsedType,
        body: Vec<StmtId>,
    ) -> ExprId {
        let id = self.define_function(name, params, ret, body);
        self.expr(ExprKind::Function(id))
    }

    // Statements

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(StmtKind::Expr(expr))
    }

    /// `print(expr)` as a statement.
    pub fn print(&mut self, expr: ExprId) -> StmtId {
        let call = self.call_named("print", vec![expr]);
        self.expr_stmt(call)
    }

    /// `let name = init`
    pub fn declare(&mut self, name: &str, init: ExprId) -> StmtId {
        let name = self.name(name);
        self.stmt(StmtKind::Let { name, init })
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId) -> StmtId {
        self.stmt(StmtKind::Assign { target, value })
    }

    /// `name = value`
    pub fn assign_var(&mut self, name: &str, value: ExprId) -> StmtId {
        let target = self.ident(name);
        self.assign(target, value)
    }

    pub fn block(&mut self, stmts: Vec<StmtId>) -> StmtId {
        self.stmt(StmtKind::Block(stmts.into_boxed_slice()))
    }

    /// Branch sequence; pass `None` as the last condition for `else`.
    pub fn if_chain(&mut self, branches: Vec<(Option<ExprId>, Vec<StmtId>)>) -> StmtId {
        let branches = branches
            .into_iter()
            .map(|(cond, body)| Branch {
                cond,
                body: body.into_boxed_slice(),
            })
            .collect();
        self.stmt(StmtKind::If { branches })
    }

    pub fn while_loop(&mut self, cond: ExprId, body: Vec<StmtId>) -> StmtId {
        self.stmt(StmtKind::While {
            cond,
            body: body.into_boxed_slice(),
        })
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> StmtId {
        self.stmt(StmtKind::Return(value))
    }

    /// `return value`
    pub fn ret_value(&mut self, value: ExprId) -> StmtId {
        self.ret(Some(value))
    }

    /// `fn name(params) -> ret { body }`, desugared to a `let` binding a
    /// function literal.
    pub fn fn_decl(
        &mut self,
        name: &str,
        params: &[(&str, ParsedType)],
        ret: ParsedType,
        body: Vec<StmtId>,
    ) -> StmtId {
        let literal = self.function(name, params, ret, body);
        self.declare(name, literal)
    }

    /// Method definition for use in [`Self::class`].
    pub fn method(
        &mut self,
        name: &str,
        params: &[(&str, ParsedType)],
        ret: ParsedType,
        body: Vec<StmtId>,
    ) -> FunctionId {
        self.define_function(name, params, ret, body)
    }

    pub fn class(
        &mut self,
        name: &str,
        superclass: Option<&str>,
        methods: Vec<FunctionId>,
    ) -> StmtId {
        let superclass = superclass.map(|s| self.ident(s));
        let name = self.name(name);
        let span = self.next_span();
        let class = self.arena.alloc_class(ClassDef {
            name,
            superclass,
            methods: methods.into_boxed_slice(),
            span,
        });
        self.stmt(StmtKind::Class(class))
    }

    pub fn try_catch(
        &mut self,
        body: Vec<StmtId>,
        binding: Option<&str>,
        handler: Vec<StmtId>,
    ) -> StmtId {
        let binding = binding.map(|b| self.name(b));
        self.stmt(StmtKind::TryCatch {
            body: body.into_boxed_slice(),
            binding,
            handler: handler.into_boxed_slice(),
        })
    }

    // Program

    /// Append a top-level statement.
    pub fn item(&mut self, stmt: StmtId) -> &mut Self {
        self.items.push(stmt);
        self
    }

    pub fn finish(self) -> Program {
        Program::new(self.arena, self.items, self.interner)
    }
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fn_decl_binds_a_function_literal() {
        let mut b = ProgramBuilder::new();
        let one = b.num(1.0);
        let ret = b.ret_value(one);
        let main = b.fn_decl("main", &[], ParsedType::Num, vec![ret]);
        b.item(main);
        let program = b.finish();

        let StmtKind::Let { name, init } = &program.arena[program.items[0]].kind else {
            panic!("expected a let statement");
        };
        assert_eq!(program.interner.lookup(*name), "main");
        let ExprKind::Function(f) = program.arena[*init].kind else {
            panic!("expected a function literal");
        };
        assert_eq!(program.arena.function(f).arity(), 0);
    }

    #[test]
    fn spans_are_distinct() {
        let mut b = ProgramBuilder::new();
        let a = b.num(1.0);
        let c = b.num(2.0);
        let program = b.finish();
        assert_ne!(program.arena[a].span, program.arena[c].span);
    }

    #[test]
    fn class_superclass_is_an_ident() {
        let mut b = ProgramBuilder::new();
        let class = b.class("Dog", Some("Animal"), vec![]);
        b.item(class);
        let program = b.finish();
        let StmtKind::Class(id) = program.arena[program.items[0]].kind else {
            panic!("expected a class statement");
        };
        let superclass = program.arena.class(id).superclass;
        assert!(matches!(
            superclass.map(|e| &program.arena[e].kind),
            Some(ExprKind::Ident(_))
        ));
    }
}
