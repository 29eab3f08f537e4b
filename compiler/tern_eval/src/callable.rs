//! User functions, classes and instances.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tern_ir::{ClassId, FunctionId, Name};

use crate::{Env, Value};

/// How a function value behaves when called.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunctionRole {
    Function,
    Method,
    /// A class's `init`: yields `this` unless it returns explicitly.
    Initializer,
}

/// A function literal closed over the frame it was evaluated in.
pub struct FunctionValue {
    pub def: FunctionId,
    pub name: &'static str,
    pub arity: usize,
    pub closure: Env,
    pub role: FunctionRole,
}

impl FunctionValue {
    /// A copy of this method whose closure is a new frame defining `this`.
    pub fn bind(&self, this: Value) -> FunctionValue {
        let frame = self.closure.child();
        frame.define(Name::THIS, this);
        FunctionValue {
            def: self.def,
            name: self.name,
            arity: self.arity,
            closure: frame,
            role: self.role,
        }
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("name", &self.name)
            .field("def", &self.def)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// A class: name, optional parent and methods. Immutable once created.
pub struct ClassValue {
    pub def: ClassId,
    pub name: &'static str,
    pub superclass: Option<Rc<ClassValue>>,
    pub methods: FxHashMap<Name, Rc<FunctionValue>>,
}

impl ClassValue {
    /// Look `name` up on this class, then along the superclass chain.
    pub fn find_method(&self, name: Name) -> Option<Rc<FunctionValue>> {
        let mut class = self;
        loop {
            if let Some(method) = class.methods.get(&name) {
                return Some(Rc::clone(method));
            }
            class = class.superclass.as_deref()?;
        }
    }
}

impl fmt::Debug for ClassValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassValue")
            .field("name", &self.name)
            .field("superclass", &self.superclass.as_ref().map(|s| s.name))
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// An object: its class plus a mutable field map.
pub struct InstanceValue {
    pub class: Rc<ClassValue>,
    fields: RefCell<FxHashMap<Name, Value>>,
}

impl InstanceValue {
    pub fn new(class: Rc<ClassValue>) -> Self {
        InstanceValue {
            class,
            fields: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn field(&self, name: Name) -> Option<Value> {
        self.fields.borrow().get(&name).cloned()
    }

    pub fn set_field(&self, name: Name, value: Value) {
        self.fields.borrow_mut().insert(name, value);
    }

    /// Drop every field; used to break cycles on teardown.
    pub(crate) fn clear_fields(&self) {
        let fields = std::mem::take(&mut *self.fields.borrow_mut());
        drop(fields);
    }
}

impl fmt::Debug for InstanceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceValue")
            .field("class", &self.class.name)
            .field("fields", &self.fields.borrow().len())
            .finish()
    }
}
