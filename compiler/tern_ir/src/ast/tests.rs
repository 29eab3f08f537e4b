use super::*;
use crate::{ExprId, Span};

#[test]
fn binary_op_symbols() {
    assert_eq!(BinaryOp::Add.as_symbol(), "+");
    assert_eq!(BinaryOp::LtEq.as_symbol(), "<=");
    assert_eq!(BinaryOp::And.to_string(), "and");
}

#[test]
fn only_logical_ops_short_circuit() {
    assert!(BinaryOp::And.is_short_circuit());
    assert!(BinaryOp::Or.is_short_circuit());
    assert!(!BinaryOp::Add.is_short_circuit());
    assert!(!BinaryOp::Eq.is_short_circuit());
}

#[test]
fn unary_op_symbols() {
    assert_eq!(UnaryOp::Not.to_string(), "!");
    assert_eq!(UnaryOp::Neg.to_string(), "-");
}

#[test]
fn assignable_expression_kinds() {
    let id = ExprId::new(0);
    assert!(ExprKind::Ident(crate::Name::EMPTY).is_assignable());
    assert!(ExprKind::Index { base: id, index: id }.is_assignable());
    assert!(!ExprKind::Number(1.0).is_assignable());
    assert!(!ExprKind::This.is_assignable());
}

#[test]
fn expr_debug_includes_span() {
    let expr = Expr::new(ExprKind::Bool(true), Span::new(1, 5));
    assert_eq!(format!("{expr:?}"), "Bool(true) @ 1..5");
}
