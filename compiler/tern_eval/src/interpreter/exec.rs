//! Statement execution.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tern_ir::{ClassId, ExprId, ExprKind, Name, StmtId, StmtKind};
use tern_stack::ensure_sufficient_stack;

use super::eval::index_target;
use super::Interpreter;
use crate::callable::{ClassValue, FunctionRole, FunctionValue};
use crate::errors::{
    index_out_of_bounds, not_an_instance, superclass_not_class, undefined_variable,
    ControlAction, EvalResult, Flow,
};
use crate::Value;

impl Interpreter<'_> {
    pub(super) fn exec_stmt(&mut self, id: StmtId) -> EvalResult<Flow> {
        ensure_sufficient_stack(|| self.exec_stmt_inner(id))
    }

    fn exec_stmt_inner(&mut self, id: StmtId) -> EvalResult<Flow> {
        let arena = self.arena;
        let stmt = arena.stmt(id);
        let span = stmt.span;
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval_expr(*expr)?;
                Ok(Flow::Normal)
            }
            StmtKind::Let { name, init } => {
                let value = self.eval_expr(*init)?;
                self.env.define(*name, value);
                Ok(Flow::Normal)
            }
            StmtKind::Assign { target, value } => {
                self.exec_assign(*target, *value)
                    .map_err(|e| e.with_span(span))?;
                Ok(Flow::Normal)
            }
            StmtKind::Block(body) => self.exec_scoped(body),
            StmtKind::If { branches } => {
                for branch in branches {
                    let taken = match branch.cond {
                        Some(cond) => self.eval_expr(cond)?.is_truthy(),
                        None => true,
                    };
                    if taken {
                        return self.exec_scoped(&branch.body);
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::While { cond, body } => {
                while self.eval_expr(*cond)?.is_truthy() {
                    if let Flow::Return(value) = self.exec_scoped(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(*expr)?,
                    None => Value::None,
                };
                Ok(Flow::Return(value))
            }
            StmtKind::Class(class) => {
                self.exec_class(*class).map_err(|e| e.with_span(span))?;
                Ok(Flow::Normal)
            }
            StmtKind::TryCatch {
                body,
                binding,
                handler,
            } => match self.exec_scoped(body) {
                Err(ControlAction::Error(err)) => {
                    tracing::debug!(error = %err, "caught");
                    let frame = self.child_frame();
                    if let Some(binding) = binding {
                        frame.define(*binding, Value::string(&err.message()));
                    }
                    self.with_env(frame, |interp| interp.exec_block(handler))
                }
                other => other,
            },
        }
    }

    /// Statements in the active frame.
    pub(super) fn exec_block(&mut self, body: &[StmtId]) -> EvalResult<Flow> {
        for &stmt in body {
            if let Flow::Return(value) = self.exec_stmt(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    /// Statements in a fresh child frame.
    fn exec_scoped(&mut self, body: &[StmtId]) -> EvalResult<Flow> {
        let frame = self.child_frame();
        self.with_env(frame, |interp| interp.exec_block(body))
    }

    /// The value is evaluated before any part of the target.
    fn exec_assign(&mut self, target: ExprId, value: ExprId) -> EvalResult<()> {
        let value = self.eval_expr(value)?;
        let arena = self.arena;
        let target_expr = arena.expr(target);
        match target_expr.kind {
            ExprKind::Ident(name) => self.assign_variable(target, name, value),
            ExprKind::Field { object, name } => match self.eval_expr(object)? {
                Value::Instance(instance) => {
                    instance.set_field(name, value);
                    Ok(())
                }
                other => Err(not_an_instance(other.prim())
                    .with_span(target_expr.span)
                    .into()),
            },
            ExprKind::Index { base, index } => {
                let base_value = self.eval_expr(base)?;
                let index_value = self.eval_expr(index)?;
                let (array, i) = index_target(&base_value, &index_value)?;
                let slot = usize::try_from(i).ok();
                if !slot.is_some_and(|slot| array.set(slot, value)) {
                    return Err(index_out_of_bounds(i, array.len())
                        .with_span(target_expr.span)
                        .into());
                }
                Ok(())
            }
            // Rejected by the resolver.
            _ => Ok(()),
        }
    }

    fn assign_variable(&mut self, target: ExprId, name: Name, value: Value) -> EvalResult<()> {
        let assigned = match self.resolution.hops(target) {
            Some(hops) => self.env.assign_at(hops, name, value),
            None => self.globals.assign(name, value),
        };
        if assigned {
            Ok(())
        } else {
            Err(undefined_variable(self.interner.lookup(name)).into())
        }
    }

    /// Create a class value and bind it in the active frame.
    fn exec_class(&mut self, id: ClassId) -> EvalResult<()> {
        let arena = self.arena;
        let def = arena.class(id);
        let name = self.interner.lookup(def.name);

        let superclass = match def.superclass {
            None => None,
            Some(expr) => match self.eval_expr(expr)? {
                Value::Class(superclass) => Some(superclass),
                other => {
                    let span = arena.expr(expr).span;
                    return Err(superclass_not_class(name, other.prim())
                        .with_span(span)
                        .into());
                }
            },
        };

        let closure = match &superclass {
            Some(superclass) => {
                let frame = self.child_frame();
                frame.define(Name::SUPER, Value::Class(Rc::clone(superclass)));
                frame
            }
            None => self.env.clone(),
        };

        let mut methods = FxHashMap::default();
        for &method in &*def.methods {
            let method_def = arena.function(method);
            let role = if method_def.name == Name::INIT {
                FunctionRole::Initializer
            } else {
                FunctionRole::Method
            };
            let function = FunctionValue {
                def: method,
                name: self.interner.lookup(method_def.name),
                arity: method_def.arity(),
                closure: closure.clone(),
                role,
            };
            methods.insert(method_def.name, Rc::new(function));
        }

        tracing::trace!(class = name, methods = methods.len(), "define class");
        let class = ClassValue {
            def: id,
            name,
            superclass,
            methods,
        };
        self.env.define(def.name, Value::Class(Rc::new(class)));
        Ok(())
    }
}
