use tern_ir::{BinaryOp, ExprId, ExprKind, FunctionId, Name, Span, UnaryOp};
use tern_stack::ensure_sufficient_stack;

use super::Resolver;
use crate::ops::{binary_signature, unary_signature};
use crate::{CallSig, Callee, FnKind, Kind, OpSig, ResolveErrorKind};

/// Result kind of an operator whose row is only known at run time.
fn dynamic_result(op: BinaryOp) -> Kind {
    match op {
        // `+` is numeric or string depending on the operands.
        BinaryOp::Add => Kind::Dynamic,
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => Kind::Num,
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq
        | BinaryOp::And
        | BinaryOp::Or => Kind::Bool,
    }
}

impl Resolver<'_> {
    /// Resolve an expression and record its kind.
    pub(super) fn resolve_expr(&mut self, id: ExprId) -> Kind {
        let kind = ensure_sufficient_stack(|| self.infer_expr(id));
        self.resolution.record_kind(id, kind.clone());
        kind
    }

    fn infer_expr(&mut self, id: ExprId) -> Kind {
        let arena = self.arena;
        let expr = arena.expr(id);
        let span = expr.span;
        match &expr.kind {
            ExprKind::Number(_) => Kind::Num,
            ExprKind::Str(_) => Kind::Str,
            ExprKind::Bool(_) => Kind::Bool,
            ExprKind::None => Kind::None,
            ExprKind::Ident(name) => self.lookup(id, *name, span),
            ExprKind::This => self.resolve_this(id, span),
            ExprKind::Super { method } => self.resolve_super(id, *method, span),
            ExprKind::Binary { op, left, right } => {
                self.resolve_binary(id, *op, *left, *right, span)
            }
            ExprKind::Unary { op, operand } => self.resolve_unary(id, *op, *operand, span),
            ExprKind::Call { callee, args } => self.resolve_call(id, *callee, args),
            ExprKind::Field { object, name } => match self.resolve_expr(*object) {
                Kind::Instance(class) => self.member_kind(class, *name),
                _ => Kind::Dynamic,
            },
            ExprKind::Index { base, index } => {
                self.resolve_expr(*base);
                self.resolve_expr(*index);
                Kind::Dynamic
            }
            ExprKind::Array(elements) => {
                for &element in elements.iter() {
                    self.resolve_expr(element);
                }
                Kind::Array
            }
            ExprKind::Function(f) => {
                self.resolve_function(*f);
                self.function_kind(*f)
            }
        }
    }

    fn resolve_this(&mut self, id: ExprId, span: Span) -> Kind {
        if self.class_stack.is_empty() {
            self.error(ResolveErrorKind::ThisOutsideClass, span);
            return Kind::Dynamic;
        }
        self.lookup(id, Name::THIS, span)
    }

    fn resolve_super(&mut self, id: ExprId, method: Name, span: Span) -> Kind {
        let Some(class) = self.class_stack.last().copied() else {
            self.error(ResolveErrorKind::SuperOutsideClass, span);
            return Kind::Dynamic;
        };
        if !class.inherits {
            let class = self.interner.lookup(class.name).to_owned();
            self.error(ResolveErrorKind::SuperWithoutSuperclass { class }, span);
            return Kind::Dynamic;
        }
        match self.lookup(id, Name::SUPER, span) {
            Kind::Class(superclass) => self
                .method_kind(superclass, method)
                .map_or(Kind::Dynamic, |fk| Kind::Fn(Box::new(fk.clone()))),
            _ => Kind::Dynamic,
        }
    }

    fn resolve_binary(
        &mut self,
        id: ExprId,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        span: Span,
    ) -> Kind {
        let left_kind = self.resolve_expr(left);
        let right_kind = self.resolve_expr(right);
        let (Some(l), Some(r)) = (left_kind.prim(), right_kind.prim()) else {
            self.resolution.record_op(id, OpSig::Dynamic);
            return dynamic_result(op);
        };
        match binary_signature(op, l, r) {
            Some(sig) => {
                let result = Kind::from(sig.result);
                self.resolution.record_op(id, OpSig::Static(sig));
                result
            }
            None => {
                self.error(
                    ResolveErrorKind::InvalidBinaryOp {
                        op,
                        left: l,
                        right: r,
                    },
                    span,
                );
                Kind::Dynamic
            }
        }
    }

    fn resolve_unary(&mut self, id: ExprId, op: UnaryOp, operand: ExprId, span: Span) -> Kind {
        let operand_kind = self.resolve_expr(operand);
        let Some(prim) = operand_kind.prim() else {
            self.resolution.record_op(id, OpSig::Dynamic);
            return match op {
                UnaryOp::Neg => Kind::Num,
                UnaryOp::Not => Kind::Bool,
            };
        };
        match unary_signature(op, prim) {
            Some(sig) => {
                let result = Kind::from(sig.result);
                self.resolution.record_op(id, OpSig::Static(sig));
                result
            }
            None => {
                self.error(ResolveErrorKind::InvalidUnaryOp { op, operand: prim }, span);
                Kind::Dynamic
            }
        }
    }

    fn resolve_call(&mut self, id: ExprId, callee: ExprId, args: &[ExprId]) -> Kind {
        let callee_kind = self.resolve_expr(callee);
        for &arg in args {
            self.resolve_expr(arg);
        }

        let sig = match callee_kind {
            Kind::Fn(f) => {
                let FnKind {
                    callee,
                    params,
                    ret,
                } = *f;
                CallSig::for_params(callee, &params, ret)
            }
            Kind::Class(class) => {
                let instance = Kind::Instance(class);
                let callee = Callee::Class(class);
                match self.method_kind(class, Name::INIT) {
                    Some(init) => CallSig::for_params(callee, &init.params, instance),
                    None => CallSig::for_params(callee, &[], instance),
                }
            }
            _ => CallSig::dynamic(),
        };
        let ret = sig.ret.clone();
        self.resolution.record_call(id, sig);
        ret
    }

    /// Resolve a function or method body in its own parameter scope.
    pub(super) fn resolve_function(&mut self, f: FunctionId) {
        let arena = self.arena;
        let def = arena.function(f);
        self.function_depth += 1;
        self.with_scope(|r| {
            for param in &*def.params {
                r.bind(param.name, r.annotation_kind(param.ty), def.span);
            }
            r.resolve_body(&def.body);
        });
        self.function_depth -= 1;
    }
}
