use tern_ir::{ClassId, ExprId, ExprKind, Name, Span, StmtId, StmtKind};
use tern_stack::ensure_sufficient_stack;

use super::{ClassContext, Resolver};
use crate::{Kind, ResolveErrorKind};

impl Resolver<'_> {
    pub(super) fn resolve_stmt(&mut self, id: StmtId) {
        ensure_sufficient_stack(|| self.resolve_stmt_inner(id));
    }

    fn resolve_stmt_inner(&mut self, id: StmtId) {
        let arena = self.arena;
        let stmt = arena.stmt(id);
        let span = stmt.span;
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.resolve_expr(*expr);
            }
            StmtKind::Let { name, init } => self.resolve_let(*name, *init, span),
            StmtKind::Assign { target, value } => self.resolve_assign(*target, *value),
            StmtKind::Block(body) => self.resolve_scoped(body),
            StmtKind::If { branches } => {
                for branch in branches {
                    if let Some(cond) = branch.cond {
                        self.resolve_expr(cond);
                    }
                    self.resolve_scoped(&branch.body);
                }
            }
            StmtKind::While { cond, body } => {
                self.resolve_expr(*cond);
                self.resolve_scoped(body);
            }
            StmtKind::Return(value) => {
                if self.function_depth == 0 {
                    self.error(ResolveErrorKind::ReturnOutsideFunction, span);
                }
                if let Some(value) = value {
                    self.resolve_expr(*value);
                }
            }
            StmtKind::Class(class) => self.resolve_class(*class),
            StmtKind::TryCatch {
                body,
                binding,
                handler,
            } => {
                self.resolve_scoped(body);
                self.with_scope(|r| {
                    if let Some(binding) = binding {
                        r.bind(*binding, Kind::Str, span);
                    }
                    r.resolve_body(handler);
                });
            }
        }
    }

    /// Statements in a fresh scope.
    fn resolve_scoped(&mut self, body: &[StmtId]) {
        self.with_scope(|r| r.resolve_body(body));
    }

    /// Statements in the current scope.
    pub(super) fn resolve_body(&mut self, body: &[StmtId]) {
        for &stmt in body {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_let(&mut self, name: Name, init: ExprId, span: Span) {
        self.declare(name, span);
        let kind = if let ExprKind::Function(f) = self.arena.expr(init).kind {
            // Known before the body so that recursive calls are typed.
            self.set_pending_kind(name, self.function_kind(f));
            self.resolve_expr(init)
        } else {
            self.resolve_expr(init)
        };
        self.define(name, kind);
    }

    fn resolve_assign(&mut self, target: ExprId, value: ExprId) {
        let value_kind = self.resolve_expr(value);
        let arena = self.arena;
        let target_expr = arena.expr(target);
        let target_kind = match target_expr.kind {
            ExprKind::Ident(name) => self.lookup_for_assign(target, name, &value_kind),
            ExprKind::Field { object, name } => match self.resolve_expr(object) {
                Kind::Instance(class) => self.note_field(class, name, &value_kind),
                _ => Kind::Dynamic,
            },
            ExprKind::Index { base, index } => {
                self.resolve_expr(base);
                self.resolve_expr(index);
                Kind::Dynamic
            }
            _ => {
                self.error(ResolveErrorKind::InvalidAssignmentTarget, target_expr.span);
                self.resolve_expr(target);
                return;
            }
        };
        self.resolution.record_kind(target, target_kind);
    }

    fn resolve_class(&mut self, class: ClassId) {
        let arena = self.arena;
        let def = arena.class(class);
        self.bind(def.name, Kind::Class(class), def.span);

        let superclass = def.superclass.and_then(|expr| {
            let kind = self.resolve_expr(expr);
            if arena.expr(expr).kind == ExprKind::Ident(def.name) {
                let name = self.interner.lookup(def.name).to_owned();
                self.error(ResolveErrorKind::SelfInheritance { class: name }, def.span);
                return None;
            }
            match kind {
                Kind::Class(superclass) => Some(superclass),
                _ => None,
            }
        });
        self.register_class(class, superclass);
        if self.has_cyclic_chain(class) {
            let name = self.interner.lookup(def.name).to_owned();
            self.error(ResolveErrorKind::CyclicInheritance { class: name }, def.span);
        }

        let inherits = def.superclass.is_some();
        self.class_stack.push(ClassContext {
            name: def.name,
            inherits,
        });

        let super_kind = superclass.map_or(Kind::Dynamic, Kind::Class);
        let methods = &def.methods;
        let resolve_methods = |r: &mut Self| {
            r.with_scope(|r| {
                r.bind(Name::THIS, Kind::Instance(class), def.span);
                for &method in methods.iter() {
                    r.resolve_function(method);
                }
            });
        };
        if inherits {
            self.with_scope(|r| {
                r.bind(Name::SUPER, super_kind, def.span);
                resolve_methods(r);
            });
        } else {
            resolve_methods(self);
        }

        self.class_stack.pop();
    }
}
