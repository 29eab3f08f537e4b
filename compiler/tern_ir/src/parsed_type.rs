//! Parsed type annotations.
//!
//! Formals and return types carry the annotation as written; the resolver
//! turns a `ParsedType` into its internal kind.

use std::fmt;

use crate::Name;

/// A type annotation as it appears on a parameter or return position.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum ParsedType {
    Num,
    Str,
    Bool,
    None,
    /// Return position only: the function produces no value.
    Void,
    /// No static constraint.
    Any,
    Array,
    /// Any callable.
    Fn,
    /// Instance of a user class.
    Named(Name),
}

impl fmt::Display for ParsedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedType::Num => f.write_str("num"),
            ParsedType::Str => f.write_str("str"),
            ParsedType::Bool => f.write_str("bool"),
            ParsedType::None => f.write_str("none"),
            ParsedType::Void => f.write_str("void"),
            ParsedType::Any => f.write_str("any"),
            ParsedType::Array => f.write_str("array"),
            ParsedType::Fn => f.write_str("fn"),
            ParsedType::Named(name) => write!(f, "{name:?}"),
        }
    }
}
