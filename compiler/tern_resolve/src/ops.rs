//! The operator table and the signatures recorded on operator and call nodes.
//!
//! The same table serves both passes: the resolver consults it with static
//! kinds, and the interpreter consults it with runtime kinds whenever an
//! operand was `Dynamic` (or a static guess turned out wrong).

use smallvec::{smallvec, SmallVec};
use tern_ir::{BinaryOp, ClassId, FunctionId, UnaryOp};

use crate::{Kind, Prim};

/// Conversion applied to an operand or argument before use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Coercion {
    /// Pass the value through.
    Keep,
    /// Require a number.
    Num,
    /// Convert any value to its string form.
    Str,
    /// Require a boolean.
    Bool,
}

impl Coercion {
    /// Coercion for an argument passed to a parameter of kind `param`.
    pub fn for_param(param: &Kind) -> Coercion {
        match param {
            Kind::Str => Coercion::Str,
            _ => Coercion::Keep,
        }
    }
}

/// One row of the operator table: the operand kinds it was selected for,
/// their coercions and the result kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub operands: SmallVec<[Prim; 2]>,
    pub coercions: SmallVec<[Coercion; 2]>,
    pub result: Prim,
}

impl Signature {
    /// Whether this row was selected for exactly these operand kinds.
    pub fn matches(&self, operands: &[Prim]) -> bool {
        self.operands.as_slice() == operands
    }
}

/// Annotation on a `Binary` or `Unary` node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpSig {
    Static(Signature),
    /// An operand kind was unknown; look the row up at run time.
    Dynamic,
}

/// A callable the resolver can name statically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Callee {
    Function(FunctionId),
    /// Constructing an instance of the class.
    Class(ClassId),
    Builtin(&'static str),
}

/// The statically known callee of a call node and the coercions its
/// parameters imply.
#[derive(Clone, Debug, PartialEq)]
pub struct CallTarget {
    pub callee: Callee,
    pub args: Box<[Coercion]>,
}

/// Annotation on a `Call` node.
#[derive(Clone, Debug, PartialEq)]
pub struct CallSig {
    /// `None` when the callee is not statically known; coercions then come
    /// from the runtime callee.
    pub target: Option<CallTarget>,
    pub ret: Kind,
}

impl CallSig {
    pub fn dynamic() -> CallSig {
        CallSig {
            target: None,
            ret: Kind::Dynamic,
        }
    }

    pub fn for_params(callee: Callee, params: &[Kind], ret: Kind) -> CallSig {
        CallSig {
            target: Some(CallTarget {
                callee,
                args: params.iter().map(Coercion::for_param).collect(),
            }),
            ret,
        }
    }

    /// The recorded coercions, if the call really reached `callee`.
    pub fn coercions_for(&self, callee: Callee) -> Option<&[Coercion]> {
        self.target
            .as_ref()
            .filter(|target| target.callee == callee)
            .map(|target| &*target.args)
    }
}

fn row(
    (left, right): (Prim, Prim),
    coercion: Coercion,
    result: Prim,
) -> Option<Signature> {
    Some(Signature {
        operands: smallvec![left, right],
        coercions: smallvec![coercion, coercion],
        result,
    })
}

/// Look up the row for `left op right`. `None` means the combination is a
/// type error.
pub fn binary_signature(op: BinaryOp, left: Prim, right: Prim) -> Option<Signature> {
    use Prim::{Bool, Num, Str};

    let operands = (left, right);
    match (op, left, right) {
        (BinaryOp::Add, Num, Num) => row(operands, Coercion::Num, Num),
        (BinaryOp::Add, Num | Str, Num | Str) => row(operands, Coercion::Str, Str),
        (BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod, Num, Num) => {
            row(operands, Coercion::Num, Num)
        }
        (BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq, Num, Num) => {
            row(operands, Coercion::Num, Bool)
        }
        (BinaryOp::Eq | BinaryOp::NotEq, Num, Num)
        | (BinaryOp::Eq | BinaryOp::NotEq, Str, Str)
        | (BinaryOp::Eq | BinaryOp::NotEq, Bool, Bool) => row(operands, Coercion::Keep, Bool),
        (BinaryOp::And | BinaryOp::Or, Bool, Bool) => row(operands, Coercion::Bool, Bool),
        _ => None,
    }
}

/// Look up the row for `op operand`.
pub fn unary_signature(op: UnaryOp, operand: Prim) -> Option<Signature> {
    let (coercion, result) = match (op, operand) {
        (UnaryOp::Neg, Prim::Num) => (Coercion::Num, Prim::Num),
        (UnaryOp::Not, Prim::Bool) => (Coercion::Bool, Prim::Bool),
        _ => return None,
    };
    Some(Signature {
        operands: smallvec![operand],
        coercions: smallvec![coercion],
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_numbers_stays_numeric() {
        let sig = binary_signature(BinaryOp::Add, Prim::Num, Prim::Num);
        assert_eq!(sig.map(|s| s.result), Some(Prim::Num));
    }

    #[test]
    fn add_with_a_string_concatenates() {
        for (l, r) in [
            (Prim::Str, Prim::Num),
            (Prim::Num, Prim::Str),
            (Prim::Str, Prim::Str),
        ] {
            let sig = binary_signature(BinaryOp::Add, l, r);
            assert_eq!(
                sig,
                Some(Signature {
                    operands: smallvec![l, r],
                    coercions: smallvec![Coercion::Str, Coercion::Str],
                    result: Prim::Str,
                })
            );
        }
    }

    #[test]
    fn arithmetic_rejects_strings() {
        assert!(binary_signature(BinaryOp::Sub, Prim::Str, Prim::Num).is_none());
        assert!(binary_signature(BinaryOp::Lt, Prim::Str, Prim::Str).is_none());
    }

    #[test]
    fn equality_requires_matching_kinds() {
        assert!(binary_signature(BinaryOp::Eq, Prim::Bool, Prim::Bool).is_some());
        assert!(binary_signature(BinaryOp::Eq, Prim::Num, Prim::Str).is_none());
        assert!(binary_signature(BinaryOp::NotEq, Prim::None, Prim::None).is_none());
    }

    #[test]
    fn logical_ops_take_booleans() {
        assert!(binary_signature(BinaryOp::And, Prim::Bool, Prim::Bool).is_some());
        assert!(binary_signature(BinaryOp::Or, Prim::Num, Prim::Bool).is_none());
    }

    #[test]
    fn unary_rows() {
        assert_eq!(
            unary_signature(UnaryOp::Neg, Prim::Num).map(|s| s.result),
            Some(Prim::Num)
        );
        assert!(unary_signature(UnaryOp::Not, Prim::Num).is_none());
        assert!(unary_signature(UnaryOp::Neg, Prim::Bool).is_none());
    }

    #[test]
    fn rows_remember_their_operand_kinds() {
        let sig = binary_signature(BinaryOp::Add, Prim::Str, Prim::Num);
        assert_eq!(sig.as_ref().map(|s| s.matches(&[Prim::Str, Prim::Num])), Some(true));
        assert_eq!(sig.map(|s| s.matches(&[Prim::Num, Prim::Num])), Some(false));
    }

    #[test]
    fn str_params_coerce_their_arguments() {
        let callee = Callee::Function(FunctionId::new(3));
        let sig = CallSig::for_params(callee, &[Kind::Str, Kind::Num], Kind::None);
        assert_eq!(
            sig.coercions_for(callee),
            Some(&[Coercion::Str, Coercion::Keep][..])
        );
    }

    #[test]
    fn recorded_coercions_only_apply_to_their_callee() {
        let sig = CallSig::for_params(Callee::Builtin("print"), &[Kind::Str], Kind::None);
        assert_eq!(sig.coercions_for(Callee::Function(FunctionId::new(0))), None);
        assert_eq!(CallSig::dynamic().coercions_for(Callee::Builtin("print")), None);
    }
}
