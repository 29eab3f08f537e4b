//! Expression evaluation.

use std::rc::Rc;

use tern_ir::{BinaryOp, ExprId, ExprKind, FunctionId, Name};
use tern_resolve::OpSig;
use tern_stack::ensure_sufficient_stack;

use super::Interpreter;
use crate::callable::{FunctionRole, FunctionValue};
use crate::errors::{
    index_out_of_bounds, invalid_index, not_an_instance, not_indexable, undefined_method,
    undefined_property, undefined_variable, EvalResult,
};
use crate::operators::{evaluate_binary, evaluate_unary};
use crate::{ArrayValue, Value};

/// Annotation used for operator nodes the resolver did not annotate.
static DYNAMIC_OP: OpSig = OpSig::Dynamic;

impl Interpreter<'_> {
    /// Evaluate an expression. Errors raised while evaluating it carry its
    /// span unless an inner node already attached one.
    pub(super) fn eval_expr(&mut self, id: ExprId) -> EvalResult<Value> {
        ensure_sufficient_stack(|| self.eval_expr_inner(id))
            .map_err(|e| e.with_span(self.arena.expr(id).span))
    }

    fn eval_expr_inner(&mut self, id: ExprId) -> EvalResult<Value> {
        let arena = self.arena;
        let expr = arena.expr(id);
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::Str(s) => Ok(Value::string(self.interner.lookup(*s))),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::None => Ok(Value::None),
            ExprKind::Ident(name) => self.read_variable(id, *name),
            ExprKind::This => self.read_variable(id, Name::THIS),
            ExprKind::Super { method } => self.eval_super(id, *method),
            ExprKind::Binary { op, left, right } => self.eval_binary(id, *op, *left, *right),
            ExprKind::Unary { op, operand } => {
                let operand = self.eval_expr(*operand)?;
                Ok(evaluate_unary(*op, self.op_sig(id), operand)?)
            }
            ExprKind::Call { callee, args } => self.eval_call(id, *callee, args, expr.span),
            ExprKind::Field { object, name } => {
                let object = self.eval_expr(*object)?;
                self.get_property(&object, *name)
            }
            ExprKind::Index { base, index } => {
                let base = self.eval_expr(*base)?;
                let index = self.eval_expr(*index)?;
                let (array, i) = index_target(&base, &index)?;
                usize::try_from(i)
                    .ok()
                    .and_then(|i| array.get(i))
                    .ok_or_else(|| index_out_of_bounds(i, array.len()).into())
            }
            ExprKind::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for &element in elements.iter() {
                    values.push(self.eval_expr(element)?);
                }
                let array = ArrayValue::new(values);
                self.heap.track_array(&array);
                Ok(Value::Array(array))
            }
            ExprKind::Function(f) => Ok(self.make_function(*f)),
        }
    }

    fn op_sig(&self, id: ExprId) -> &OpSig {
        self.resolution.op(id).unwrap_or(&DYNAMIC_OP)
    }

    /// Read through the recorded hop count, or from the global frame when
    /// the resolver left the name unresolved.
    fn read_variable(&self, id: ExprId, name: Name) -> EvalResult<Value> {
        let value = match self.resolution.hops(id) {
            Some(hops) => self.env.get_at(hops, name),
            None => self.globals.get(name),
        };
        value.ok_or_else(|| undefined_variable(self.interner.lookup(name)).into())
    }

    /// `and`/`or` skip the right operand when the left one decides the
    /// result.
    fn eval_binary(
        &mut self,
        id: ExprId,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    ) -> EvalResult<Value> {
        let left = self.eval_expr(left)?;
        match (op, &left) {
            (BinaryOp::And, Value::Bool(false)) => return Ok(Value::Bool(false)),
            (BinaryOp::Or, Value::Bool(true)) => return Ok(Value::Bool(true)),
            _ => {}
        }
        let right = self.eval_expr(right)?;
        Ok(evaluate_binary(op, self.op_sig(id), left, right)?)
    }

    /// `super.method`: `super` sits at the recorded hop count and `this` one
    /// frame closer.
    fn eval_super(&mut self, id: ExprId, method: Name) -> EvalResult<Value> {
        let Some(hops) = self.resolution.hops(id).filter(|&h| h > 0) else {
            return Err(undefined_variable("super").into());
        };
        let superclass = self.env.get_at(hops, Name::SUPER);
        let this = self.env.get_at(hops - 1, Name::THIS);
        let (Some(Value::Class(superclass)), Some(this)) = (superclass, this) else {
            return Err(undefined_variable("super").into());
        };
        match superclass.find_method(method) {
            Some(found) => Ok(self.bind_method(&found, this)),
            None => {
                Err(undefined_method(superclass.name, self.interner.lookup(method)).into())
            }
        }
    }

    /// Field first, then a method bound to the instance.
    pub(super) fn get_property(&mut self, object: &Value, name: Name) -> EvalResult<Value> {
        let Value::Instance(instance) = object else {
            return Err(not_an_instance(object.prim()).into());
        };
        if let Some(value) = instance.field(name) {
            return Ok(value);
        }
        match instance.class.find_method(name) {
            Some(method) => Ok(self.bind_method(&method, object.clone())),
            None => Err(undefined_property(instance.class.name, self.interner.lookup(name)).into()),
        }
    }

    pub(super) fn bind_method(&mut self, method: &FunctionValue, this: Value) -> Value {
        let bound = method.bind(this);
        self.heap.track_frame(&bound.closure);
        Value::Function(Rc::new(bound))
    }

    fn make_function(&self, id: FunctionId) -> Value {
        let def = self.arena.function(id);
        Value::Function(Rc::new(FunctionValue {
            def: id,
            name: self.interner.lookup(def.name),
            arity: def.arity(),
            closure: self.env.clone(),
            role: FunctionRole::Function,
        }))
    }
}

/// The array and integer index an index expression refers to. The index is
/// truncated toward zero; bounds are checked by the caller.
pub(super) fn index_target(base: &Value, index: &Value) -> EvalResult<(ArrayValue, i64)> {
    let Value::Array(array) = base else {
        return Err(not_indexable(base.prim()).into());
    };
    let Value::Number(n) = index else {
        return Err(invalid_index(index.prim()).into());
    };
    Ok((array.clone(), n.trunc() as i64))
}
