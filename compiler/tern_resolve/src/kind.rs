//! Static kinds computed by the resolver.

use std::fmt;

use tern_ir::{ClassId, ParsedType};

use crate::ops::Callee;

/// What the resolver knows about the value an expression produces.
///
/// `Dynamic` means "unknown until run time"; operators and calls on a
/// `Dynamic` operand are dispatched on the runtime value instead.
#[derive(Clone, Debug, PartialEq)]
pub enum Kind {
    Num,
    Str,
    Bool,
    None,
    /// Arrays are mutable and untyped, so element kinds are not tracked.
    Array,
    Fn(Box<FnKind>),
    /// The class value itself; calling it constructs an `Instance`.
    Class(ClassId),
    Instance(ClassId),
    Dynamic,
}

/// Parameter and return kinds of a callable, and which callable it is.
///
/// Two function values with the same signature are still different kinds,
/// so rebinding a name to another function degrades it to `Dynamic`.
#[derive(Clone, Debug, PartialEq)]
pub struct FnKind {
    pub callee: Callee,
    pub params: Vec<Kind>,
    pub ret: Kind,
}

impl Kind {
    /// Kind of a value declared with the given annotation.
    pub fn from_parsed(ty: ParsedType) -> Kind {
        match ty {
            ParsedType::Num => Kind::Num,
            ParsedType::Str => Kind::Str,
            ParsedType::Bool => Kind::Bool,
            ParsedType::None | ParsedType::Void => Kind::None,
            ParsedType::Array => Kind::Array,
            // A bare `fn` annotation says nothing about the signature, and
            // class names are only meaningful in scope (see the resolver).
            ParsedType::Any | ParsedType::Fn | ParsedType::Named(_) => Kind::Dynamic,
        }
    }

    pub fn function(callee: Callee, params: Vec<Kind>, ret: Kind) -> Kind {
        Kind::Fn(Box::new(FnKind {
            callee,
            params,
            ret,
        }))
    }

    /// The operator-table tag, or `None` for `Dynamic`.
    pub fn prim(&self) -> Option<Prim> {
        Some(match self {
            Kind::Num => Prim::Num,
            Kind::Str => Prim::Str,
            Kind::Bool => Prim::Bool,
            Kind::None => Prim::None,
            Kind::Array => Prim::Array,
            Kind::Fn(_) | Kind::Class(_) => Prim::Callable,
            Kind::Instance(_) => Prim::Instance,
            Kind::Dynamic => return None,
        })
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Kind::Dynamic)
    }
}

impl From<Prim> for Kind {
    fn from(prim: Prim) -> Kind {
        match prim {
            Prim::Num => Kind::Num,
            Prim::Str => Kind::Str,
            Prim::Bool => Kind::Bool,
            Prim::None => Kind::None,
            Prim::Array => Kind::Array,
            Prim::Callable | Prim::Instance => Kind::Dynamic,
        }
    }
}

/// Runtime-visible kind tag. The operator table is keyed on these, and the
/// interpreter computes the same tag from a live value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Prim {
    Num,
    Str,
    Bool,
    None,
    Array,
    Callable,
    Instance,
}

impl Prim {
    pub const fn as_str(self) -> &'static str {
        match self {
            Prim::Num => "num",
            Prim::Str => "str",
            Prim::Bool => "bool",
            Prim::None => "none",
            Prim::Array => "array",
            Prim::Callable => "callable",
            Prim::Instance => "instance",
        }
    }
}

impl fmt::Display for Prim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_ir::{FunctionId, Name};

    #[test]
    fn annotations_map_to_kinds() {
        assert_eq!(Kind::from_parsed(ParsedType::Void), Kind::None);
        assert_eq!(Kind::from_parsed(ParsedType::Any), Kind::Dynamic);
        assert_eq!(
            Kind::from_parsed(ParsedType::Named(Name::from_raw(7))),
            Kind::Dynamic
        );
    }

    #[test]
    fn callables_share_a_prim() {
        let f = Kind::function(
            Callee::Function(FunctionId::new(0)),
            vec![Kind::Num],
            Kind::Str,
        );
        assert_eq!(f.prim(), Some(Prim::Callable));
        assert_eq!(Kind::Class(ClassId::new(0)).prim(), Some(Prim::Callable));
        assert_eq!(Kind::Dynamic.prim(), None);
    }
}
