//! Runtime environment chain.
//!
//! Each frame is a `Name -> Value` map with an optional parent. Frames are
//! shared (`Rc<RefCell<_>>`) because closures, bound methods and class bodies
//! keep the frame they were created in alive after it is exited.
//!
//! The resolver computes how many parents separate a use from its binding;
//! [`Env::get_at`] and [`Env::assign_at`] follow exactly that many links.
//! [`Env::get`] and [`Env::assign`] search outward and are only used for
//! names the resolver left to global lookup.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use tern_ir::Name;

use crate::Value;

/// Single-threaded shared, mutable cell.
///
/// All frame allocations go through [`LocalScope::new`]; the interpreter keeps
/// a weak handle ([`LocalScope::downgrade`]) to every frame it creates so it
/// can clear them on teardown.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    pub fn downgrade(&self) -> Weak<RefCell<T>> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn upgrade(weak: &Weak<RefCell<T>>) -> Option<Self> {
        weak.upgrade().map(LocalScope)
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// One frame of bindings.
#[derive(Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Value>,
    parent: Option<Env>,
}

/// Handle to a frame.
pub type Env = LocalScope<Scope>;

impl Scope {
    pub fn with_parent(parent: Env) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// Values can be cyclic through closures; never recurse into them here.
impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("bindings", &self.bindings.len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

impl LocalScope<Scope> {
    /// A frame with no parent.
    pub fn root() -> Env {
        LocalScope::new(Scope::default())
    }

    /// A fresh frame whose parent is `self`.
    #[must_use]
    pub fn child(&self) -> Env {
        LocalScope::new(Scope::with_parent(self.clone()))
    }

    pub fn parent(&self) -> Option<Env> {
        self.borrow().parent.clone()
    }

    /// Insert or overwrite a binding in this frame.
    #[inline]
    pub fn define(&self, name: Name, value: Value) {
        self.borrow_mut().bindings.insert(name, value);
    }

    /// Search this frame and then its ancestors.
    pub fn get(&self, name: Name) -> Option<Value> {
        let mut frame = self.clone();
        loop {
            let parent = {
                let scope = frame.borrow();
                if let Some(value) = scope.bindings.get(&name) {
                    return Some(value.clone());
                }
                scope.parent.clone()?
            };
            frame = parent;
        }
    }

    /// The frame `hops` parents up; `0` is `self`.
    pub fn ancestor(&self, hops: usize) -> Option<Env> {
        let mut frame = self.clone();
        for _ in 0..hops {
            frame = frame.parent()?;
        }
        Some(frame)
    }

    /// Read `name` from exactly the frame `hops` parents up.
    #[inline]
    pub fn get_at(&self, hops: usize, name: Name) -> Option<Value> {
        let frame = self.ancestor(hops)?;
        let scope = frame.borrow();
        scope.bindings.get(&name).cloned()
    }

    /// Overwrite an existing binding in exactly the frame `hops` parents up.
    /// Returns `false` when that frame has no such binding.
    #[must_use]
    pub fn assign_at(&self, hops: usize, name: Name, value: Value) -> bool {
        let Some(frame) = self.ancestor(hops) else {
            return false;
        };
        let mut scope = frame.borrow_mut();
        match scope.bindings.get_mut(&name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Overwrite the nearest existing binding of `name`. Returns `false` when
    /// no frame in the chain binds it.
    #[must_use]
    pub fn assign(&self, name: Name, value: Value) -> bool {
        let mut frame = self.clone();
        loop {
            let parent = {
                let mut scope = frame.borrow_mut();
                if let Some(slot) = scope.bindings.get_mut(&name) {
                    *slot = value;
                    return true;
                }
                match scope.parent.clone() {
                    Some(parent) => parent,
                    None => return false,
                }
            };
            frame = parent;
        }
    }

    /// Drop every binding and the parent link.
    ///
    /// Breaks reference cycles through closures when the interpreter shuts
    /// down. The values are moved out before they are dropped so that
    /// destructors never run under this frame's borrow.
    pub fn clear(&self) {
        let (bindings, parent) = {
            let mut scope = self.borrow_mut();
            (std::mem::take(&mut scope.bindings), scope.parent.take())
        };
        drop(bindings);
        drop(parent);
    }
}
