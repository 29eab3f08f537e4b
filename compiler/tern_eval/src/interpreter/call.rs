//! Calls: user functions, bound methods, constructors and builtins.

use std::rc::Rc;

use tern_ir::{ExprId, Name, ParsedType, Span};
use tern_resolve::{CallSig, Callee, Coercion, Kind, Prim};

use super::Interpreter;
use crate::builtins::{Builtin, BuiltinContext};
use crate::call_stack::CallFrame;
use crate::callable::{ClassValue, FunctionRole, FunctionValue, InstanceValue};
use crate::errors::{arity_mismatch, not_callable, type_mismatch, ControlAction, EvalResult, Flow};
use crate::operators::coerce;
use crate::Value;

fn check_arity(name: &str, expected: usize, got: usize) -> EvalResult<()> {
    if expected == got {
        Ok(())
    } else {
        Err(arity_mismatch(name, expected, got).into())
    }
}

/// Coercions implied by declared parameter annotations.
fn param_coercions(params: impl Iterator<Item = ParsedType>) -> Vec<Coercion> {
    params
        .map(|ty| Coercion::for_param(&Kind::from_parsed(ty)))
        .collect()
}

/// Apply the coercions the resolver recorded for this callee, otherwise the
/// ones derived from its declared parameters.
fn coerce_args(
    args: Vec<Value>,
    recorded: Option<&[Coercion]>,
    declared: impl FnOnce() -> Vec<Coercion>,
) -> EvalResult<Vec<Value>> {
    let derived;
    let coercions = match recorded {
        Some(recorded) if recorded.len() == args.len() => recorded,
        _ => {
            derived = declared();
            &derived[..]
        }
    };
    args.into_iter()
        .zip(coercions.iter().copied())
        .map(|(value, coercion)| {
            let found = value.prim();
            coerce(coercion, value).ok_or_else(|| {
                let expected = match coercion {
                    Coercion::Bool => Prim::Bool,
                    _ => Prim::Num,
                };
                type_mismatch(expected, found).into()
            })
        })
        .collect()
}

impl Interpreter<'_> {
    /// Callee, then arguments left to right, then the call.
    pub(super) fn eval_call(
        &mut self,
        id: ExprId,
        callee: ExprId,
        args: &[ExprId],
        span: Span,
    ) -> EvalResult<Value> {
        let callee = self.eval_expr(callee)?;
        let mut values = Vec::with_capacity(args.len());
        for &arg in args {
            values.push(self.eval_expr(arg)?);
        }
        let resolution = self.resolution;
        self.call_value(callee, values, resolution.call(id), Some(span))
    }

    pub(super) fn call_value(
        &mut self,
        callee: Value,
        args: Vec<Value>,
        sig: Option<&CallSig>,
        span: Option<Span>,
    ) -> EvalResult<Value> {
        match callee {
            Value::Function(function) => {
                check_arity(function.name, function.arity, args.len())?;
                let arena = self.arena;
                let def = arena.function(function.def);
                let recorded = sig.and_then(|s| s.coercions_for(Callee::Function(function.def)));
                let args = coerce_args(args, recorded, || {
                    param_coercions(def.params.iter().map(|p| p.ty))
                })?;
                match self.call_function(&function, args, span)? {
                    Some(value) => Ok(value),
                    // A directly called `init` yields its instance.
                    None if function.role == FunctionRole::Initializer => {
                        Ok(function.closure.get_at(0, Name::THIS).unwrap_or(Value::None))
                    }
                    None => Ok(Value::None),
                }
            }
            Value::Builtin(builtin) => {
                check_arity(builtin.name(), builtin.arity(), args.len())?;
                let recorded = sig.and_then(|s| s.coercions_for(Callee::Builtin(builtin.name())));
                let args = coerce_args(args, recorded, || {
                    param_coercions(builtin.sig.params.iter().copied())
                })?;
                self.call_builtin(builtin, &args)
            }
            Value::Class(class) => self.construct(&class, args, sig, span),
            other => Err(not_callable(other.prim()).into()),
        }
    }

    /// Run a user function body in a new frame under its closure.
    ///
    /// Returns the value of the `return` that completed the call, or `None`
    /// when the body ran to its end.
    #[tracing::instrument(level = "trace", skip_all, fields(function = function.name))]
    pub(super) fn call_function(
        &mut self,
        function: &FunctionValue,
        args: Vec<Value>,
        call_span: Option<Span>,
    ) -> EvalResult<Option<Value>> {
        self.call_stack
            .push(CallFrame {
                name: function.name,
                call_span,
            })
            .map_err(|e| ControlAction::from(self.call_stack.attach_backtrace(e)))?;

        let arena = self.arena;
        let def = arena.function(function.def);
        let frame = self.new_frame(&function.closure);
        for (param, value) in def.params.iter().zip(args) {
            frame.define(param.name, value);
        }

        let result = match self.with_env(frame, |interp| interp.exec_block(&def.body)) {
            Ok(Flow::Return(value)) => Ok(Some(value)),
            Ok(Flow::Normal) => Ok(None),
            Err(ControlAction::Error(err)) => {
                let err = self.call_stack.attach_backtrace(*err);
                Err(ControlAction::Error(Box::new(err)))
            }
            Err(exit) => Err(exit),
        };
        self.call_stack.pop();
        result
    }

    fn call_builtin(&mut self, builtin: &'static Builtin, args: &[Value]) -> EvalResult<Value> {
        tracing::trace!(builtin = builtin.name(), "call builtin");
        let ctx = BuiltinContext {
            print: &self.print_handler,
        };
        let result = (builtin.func)(&ctx, args);
        if let Ok(Value::Array(array)) = &result {
            self.heap.track_array(array);
        }
        result
    }

    /// Create an instance and run `init` on it, if the class chain has one.
    fn construct(
        &mut self,
        class: &Rc<ClassValue>,
        args: Vec<Value>,
        sig: Option<&CallSig>,
        span: Option<Span>,
    ) -> EvalResult<Value> {
        let instance = Rc::new(InstanceValue::new(Rc::clone(class)));
        self.heap.track_instance(&instance);
        let this = Value::Instance(Rc::clone(&instance));

        match class.find_method(Name::INIT) {
            Some(init) => {
                check_arity(class.name, init.arity, args.len())?;
                let arena = self.arena;
                let def = arena.function(init.def);
                let recorded = sig.and_then(|s| s.coercions_for(Callee::Class(class.def)));
                let args = coerce_args(args, recorded, || {
                    param_coercions(def.params.iter().map(|p| p.ty))
                })?;
                let bound = init.bind(this.clone());
                self.heap.track_frame(&bound.closure);
                // The constructor yields the instance whatever `init` returns.
                self.call_function(&bound, args, span)?;
            }
            None => check_arity(class.name, 0, args.len())?,
        }
        Ok(this)
    }
}
