//! Signatures of the builtin functions.
//!
//! Single source of truth for the builtin surface: the resolver seeds the
//! global scope from this table and the evaluator pairs each entry with its
//! native implementation. Keeping the table here lets the resolver stay
//! independent of the runtime.

use crate::ParsedType;

/// Name, parameter kinds and return kind of one builtin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuiltinSig {
    pub name: &'static str,
    pub params: &'static [ParsedType],
    pub ret: ParsedType,
}

impl BuiltinSig {
    pub const fn arity(&self) -> usize {
        self.params.len()
    }
}

const fn sig(name: &'static str, params: &'static [ParsedType], ret: ParsedType) -> BuiltinSig {
    BuiltinSig { name, params, ret }
}

/// Every builtin, in registration order.
pub static BUILTIN_SIGNATURES: &[BuiltinSig] = &[
    // Time
    sig("clock", &[], ParsedType::Num),
    sig("sleep", &[ParsedType::Num], ParsedType::Void),
    // Process
    sig("exit", &[ParsedType::Num], ParsedType::Void),
    sig("shell", &[ParsedType::Str], ParsedType::Str),
    // Numeric and radix conversion
    sig("int", &[ParsedType::Num], ParsedType::Num),
    sig("hex", &[ParsedType::Num], ParsedType::Str),
    sig("bin", &[ParsedType::Num], ParsedType::Str),
    sig("dec", &[ParsedType::Str], ParsedType::Num),
    // Console I/O
    sig("print", &[ParsedType::Str], ParsedType::Void),
    sig("input", &[ParsedType::Str], ParsedType::Str),
    // Arrays
    sig("range", &[ParsedType::Num], ParsedType::Array),
    // Network
    sig("ping", &[ParsedType::Str], ParsedType::Num),
];

/// Find a builtin signature by name.
pub fn lookup(name: &str) -> Option<&'static BuiltinSig> {
    BUILTIN_SIGNATURES.iter().find(|sig| sig.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names_are_unique() {
        let mut names: Vec<_> = BUILTIN_SIGNATURES.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BUILTIN_SIGNATURES.len());
    }

    #[test]
    fn lookup_print() {
        let print = lookup("print");
        assert_eq!(print.map(BuiltinSig::arity), Some(1));
        assert_eq!(print.map(|s| s.params[0]), Some(ParsedType::Str));
    }

    #[test]
    fn lookup_unknown() {
        assert!(lookup("printf").is_none());
    }
}
