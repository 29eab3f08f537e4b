//! Runtime values.
//!
//! Heap values are built through the factory methods on [`Value`]
//! (`Value::string`, `Value::array`, ...). Strings are immutable and shared;
//! arrays are shared and mutable in place.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tern_resolve::Prim;

use crate::builtins::Builtin;
use crate::callable::{ClassValue, FunctionValue, InstanceValue};

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Number(f64),
    Str(Rc<str>),
    Bool(bool),
    None,
    Function(Rc<FunctionValue>),
    Class(Rc<ClassValue>),
    Instance(Rc<InstanceValue>),
    Builtin(&'static Builtin),
    Array(ArrayValue),
}

impl Value {
    pub fn string(s: &str) -> Value {
        Value::Str(Rc::from(s))
    }

    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(ArrayValue::new(elements))
    }

    /// The operator-table tag for this value.
    pub fn prim(&self) -> Prim {
        match self {
            Value::Number(_) => Prim::Num,
            Value::Str(_) => Prim::Str,
            Value::Bool(_) => Prim::Bool,
            Value::None => Prim::None,
            Value::Array(_) => Prim::Array,
            Value::Function(_) | Value::Class(_) | Value::Builtin(_) => Prim::Callable,
            Value::Instance(_) => Prim::Instance,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.prim().as_str()
    }

    /// `false`, `none`, `0`, `""` and `[]` are falsy; everything else is
    /// truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::None => false,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Function(_) | Value::Class(_) | Value::Instance(_) | Value::Builtin(_) => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The string form used by `print` and string coercion.
    pub fn to_display_string(&self) -> Rc<str> {
        match self {
            Value::Str(s) => Rc::clone(s),
            other => Rc::from(other.to_string()),
        }
    }
}

/// Integral numbers print without a fractional part.
pub(crate) fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => fmt_number(*n, f),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::None => f.write_str("none"),
            Value::Function(func) => write!(f, "<fn {}>", func.name),
            Value::Class(class) => write!(f, "<class {}>", class.name),
            Value::Instance(instance) => write!(f, "<{} instance>", instance.class.name),
            Value::Builtin(builtin) => write!(f, "<builtin {}>", builtin.sig.name),
            Value::Array(array) => array.fmt_nested(f, &mut Vec::new()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s:?}"),
            other => write!(f, "{other}"),
        }
    }
}

/// Numbers, strings, booleans and `none` compare by value; everything else
/// by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::None, Value::None) => true,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => std::ptr::eq(*a, *b),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Shared, mutable, fixed-length sequence of values.
#[derive(Clone)]
pub struct ArrayValue(Rc<RefCell<Vec<Value>>>);

impl ArrayValue {
    pub fn new(elements: Vec<Value>) -> Self {
        ArrayValue(Rc::new(RefCell::new(elements)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    /// Replace the element at `index`. Returns `false` when out of bounds.
    #[must_use]
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.0.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn ptr_eq(&self, other: &ArrayValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<Vec<Value>>> {
        Rc::downgrade(&self.0)
    }

    /// Strings are quoted inside arrays; an array that contains itself prints
    /// as `[...]` at the point of recursion.
    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>, seen: &mut Vec<*const ()>) -> fmt::Result {
        let id = Rc::as_ptr(&self.0).cast::<()>();
        if seen.contains(&id) {
            return f.write_str("[...]");
        }
        seen.push(id);
        f.write_str("[")?;
        for (i, element) in self.0.borrow().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match element {
                Value::Str(s) => write!(f, "{s:?}")?,
                Value::Array(inner) => inner.fmt_nested(f, seen)?,
                other => write!(f, "{other}")?,
            }
        }
        seen.pop();
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_print_without_fraction() {
        assert_eq!(Value::Number(7.0).to_string(), "7");
        assert_eq!(Value::Number(-3.0).to_string(), "-3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn scalars_display() {
        assert_eq!(Value::None.to_string(), "none");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::string("hi").to_string(), "hi");
    }

    #[test]
    fn arrays_quote_their_strings() {
        let inner = Value::array(vec![Value::Bool(false)]);
        let array = Value::array(vec![Value::Number(1.0), Value::string("a"), inner]);
        assert_eq!(array.to_string(), r#"[1, "a", [false]]"#);
    }

    #[test]
    fn self_containing_array_terminates() {
        let array = ArrayValue::new(vec![Value::None]);
        assert!(array.set(0, Value::Array(array.clone())));
        assert_eq!(Value::Array(array.clone()).to_string(), "[[...]]");
        // Break the cycle so the test does not leak.
        assert!(array.set(0, Value::None));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(!Value::array(vec![]).is_truthy());
        assert!(!Value::None.is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
        assert!(Value::string("0").is_truthy());
    }

    #[test]
    fn arrays_are_fixed_length() {
        let array = ArrayValue::new(vec![Value::None; 2]);
        assert!(array.set(1, Value::Number(3.0)));
        assert!(!array.set(2, Value::Number(3.0)));
        assert_eq!(array.get(1), Some(Value::Number(3.0)));
        assert_eq!(array.len(), 2);
    }

    #[test]
    fn equality_is_by_value_for_scalars_and_identity_otherwise() {
        assert_eq!(Value::string("a"), Value::string("a"));
        let a = Value::array(vec![]);
        assert_eq!(a, a.clone());
        assert_ne!(a, Value::array(vec![]));
    }
}
