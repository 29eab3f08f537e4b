//! Function and class definitions.

use crate::{ExprId, FunctionId, Name, ParsedType, Span, Spanned, StmtId};

/// A formal parameter.
#[derive(Clone, PartialEq, Debug)]
pub struct Param {
    pub name: Name,
    pub ty: ParsedType,
}

/// Function or method definition.
///
/// Function literals reference one of these by `FunctionId`; the definition
/// is shared by every closure created from the literal.
#[derive(Clone, PartialEq, Debug)]
pub struct FunctionDef {
    pub name: Name,
    pub params: Box<[Param]>,
    pub ret: ParsedType,
    pub body: Box<[StmtId]>,
    pub span: Span,
}

impl FunctionDef {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl Spanned for FunctionDef {
    fn span(&self) -> Span {
        self.span
    }
}

/// Class definition with optional single superclass.
#[derive(Clone, PartialEq, Debug)]
pub struct ClassDef {
    pub name: Name,
    /// Expression naming the superclass (normally an `Ident`).
    pub superclass: Option<ExprId>,
    pub methods: Box<[FunctionId]>,
    pub span: Span,
}

impl Spanned for ClassDef {
    fn span(&self) -> Span {
        self.span
    }
}
