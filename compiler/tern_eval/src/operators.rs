//! Binary and unary operator evaluation.
//!
//! The resolver annotates each operator node with an [`OpSig`]. A static
//! signature is used only while the operands still have the kinds it was
//! selected for; otherwise (a variable changed kind on a path the resolver
//! did not see, or the node was left `Dynamic`) the row is looked up again
//! from the runtime kinds. A missing row is an invalid-operation error.
//!
//! `and`/`or` are not evaluated here; the interpreter short-circuits them
//! before the right operand exists.

use tern_ir::{BinaryOp, UnaryOp};
use tern_resolve::ops::{binary_signature, unary_signature};
use tern_resolve::{Coercion, OpSig, Prim, Signature};

use crate::errors::{division_by_zero, invalid_binary_op, invalid_unary_op, EvalError};
use crate::Value;

/// Apply `coercion`, or `None` when the value does not satisfy it.
pub fn coerce(coercion: Coercion, value: Value) -> Option<Value> {
    match coercion {
        Coercion::Keep => Some(value),
        Coercion::Str => Some(Value::Str(value.to_display_string())),
        Coercion::Num => matches!(value, Value::Number(_)).then_some(value),
        Coercion::Bool => matches!(value, Value::Bool(_)).then_some(value),
    }
}

/// Pick the row to use for operands of these runtime kinds: the annotated
/// one if it was selected for exactly these kinds, otherwise a fresh lookup.
fn select<'a>(
    sig: &'a OpSig,
    operands: &[Prim],
    lookup: impl FnOnce() -> Option<Signature>,
) -> Option<std::borrow::Cow<'a, Signature>> {
    if let OpSig::Static(sig) = sig {
        if sig.matches(operands) {
            return Some(std::borrow::Cow::Borrowed(sig));
        }
    }
    lookup().map(std::borrow::Cow::Owned)
}

pub fn evaluate_binary(
    op: BinaryOp,
    sig: &OpSig,
    left: Value,
    right: Value,
) -> Result<Value, EvalError> {
    let (lp, rp) = (left.prim(), right.prim());
    let row = select(sig, &[lp, rp], || binary_signature(op, lp, rp))
        .ok_or_else(|| invalid_binary_op(op.as_symbol(), lp, rp))?;

    let mismatch = || invalid_binary_op(op.as_symbol(), lp, rp);
    let left = coerce(row.coercions[0], left).ok_or_else(mismatch)?;
    let right = coerce(row.coercions[1], right).ok_or_else(mismatch)?;

    match (op, left, right) {
        (BinaryOp::Add, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => {
            let mut s = String::with_capacity(a.len() + b.len());
            s.push_str(&a);
            s.push_str(&b);
            Ok(Value::string(&s))
        }
        (BinaryOp::Sub, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
        (BinaryOp::Mul, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
        (BinaryOp::Div, Value::Number(a), Value::Number(b)) => {
            if b == 0.0 {
                return Err(division_by_zero());
            }
            Ok(Value::Number(a / b))
        }
        (BinaryOp::Mod, Value::Number(a), Value::Number(b)) => {
            if b == 0.0 {
                return Err(division_by_zero());
            }
            Ok(Value::Number(a % b))
        }
        (BinaryOp::Lt, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),
        (BinaryOp::LtEq, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),
        (BinaryOp::Gt, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),
        (BinaryOp::GtEq, Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),
        (BinaryOp::Eq, a, b) => Ok(Value::Bool(a == b)),
        (BinaryOp::NotEq, a, b) => Ok(Value::Bool(a != b)),
        (BinaryOp::And, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a && b)),
        (BinaryOp::Or, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a || b)),
        _ => Err(mismatch()),
    }
}

pub fn evaluate_unary(op: UnaryOp, sig: &OpSig, operand: Value) -> Result<Value, EvalError> {
    let prim = operand.prim();
    let row = select(sig, &[prim], || unary_signature(op, prim))
        .ok_or_else(|| invalid_unary_op(op.as_symbol(), prim))?;
    let operand = coerce(row.coercions[0], operand)
        .ok_or_else(|| invalid_unary_op(op.as_symbol(), prim))?;

    match (op, operand) {
        (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        _ => Err(invalid_unary_op(op.as_symbol(), prim)),
    }
}
