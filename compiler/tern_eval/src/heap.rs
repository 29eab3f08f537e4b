//! Weak registry of everything that can sit on a reference cycle.
//!
//! Closures capture frames, frames hold closures, instances hold bound
//! methods, arrays can contain themselves. `Rc` alone never frees such
//! cycles, so the interpreter registers every frame, instance and array it
//! creates here and clears the survivors when it is dropped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::callable::InstanceValue;
use crate::environment::Scope;
use crate::{ArrayValue, Env, Value};

const MIN_PRUNE_THRESHOLD: usize = 1024;

pub(crate) struct HeapRegistry {
    frames: Vec<Weak<RefCell<Scope>>>,
    instances: Vec<Weak<InstanceValue>>,
    arrays: Vec<Weak<RefCell<Vec<Value>>>>,
    prune_at: usize,
}

impl HeapRegistry {
    pub(crate) fn new() -> Self {
        HeapRegistry {
            frames: Vec::new(),
            instances: Vec::new(),
            arrays: Vec::new(),
            prune_at: MIN_PRUNE_THRESHOLD,
        }
    }

    pub(crate) fn track_frame(&mut self, frame: &Env) {
        self.frames.push(frame.downgrade());
        self.maybe_prune();
    }

    pub(crate) fn track_instance(&mut self, instance: &Rc<InstanceValue>) {
        self.instances.push(Rc::downgrade(instance));
        self.maybe_prune();
    }

    pub(crate) fn track_array(&mut self, array: &ArrayValue) {
        self.arrays.push(array.downgrade());
        self.maybe_prune();
    }

    /// Number of registered entries, live or dead.
    pub(crate) fn len(&self) -> usize {
        self.frames.len() + self.instances.len() + self.arrays.len()
    }

    /// Drop dead entries once the registry has doubled since the last prune.
    fn maybe_prune(&mut self) {
        if self.len() < self.prune_at {
            return;
        }
        self.frames.retain(|w| w.strong_count() > 0);
        self.instances.retain(|w| w.strong_count() > 0);
        self.arrays.retain(|w| w.strong_count() > 0);
        self.prune_at = (self.len() * 2).max(MIN_PRUNE_THRESHOLD);
        tracing::trace!(live = self.len(), next = self.prune_at, "pruned heap registry");
    }

    /// Empty every surviving frame, instance and array.
    pub(crate) fn clear(&mut self) {
        let frames = std::mem::take(&mut self.frames);
        let instances = std::mem::take(&mut self.instances);
        let arrays = std::mem::take(&mut self.arrays);
        let mut cleared = 0usize;

        for frame in frames.iter().filter_map(Env::upgrade) {
            frame.clear();
            cleared += 1;
        }
        for instance in instances.iter().filter_map(Weak::upgrade) {
            instance.clear_fields();
            cleared += 1;
        }
        for array in arrays.iter().filter_map(Weak::upgrade) {
            let elements = std::mem::take(&mut *array.borrow_mut());
            drop(elements);
            cleared += 1;
        }
        tracing::debug!(cleared, "cleared heap registry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_releases_parents_kept_by_children() {
        let mut heap = HeapRegistry::new();
        let frame = Env::root();
        heap.track_frame(&frame);
        let child = frame.child();
        heap.track_frame(&child);
        let weak = frame.downgrade();
        drop(frame);

        assert!(weak.upgrade().is_some());
        heap.clear();
        assert!(weak.upgrade().is_none());
        assert!(child.parent().is_none());
    }

    #[test]
    fn clear_breaks_self_containing_arrays() {
        let mut heap = HeapRegistry::new();
        let array = ArrayValue::new(vec![Value::None]);
        heap.track_array(&array);
        assert!(array.set(0, Value::Array(array.clone())));
        let weak = array.downgrade();
        drop(array);

        assert!(weak.upgrade().is_some());
        heap.clear();
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn prune_drops_dead_entries() {
        let mut heap = HeapRegistry::new();
        for _ in 0..MIN_PRUNE_THRESHOLD {
            let dead = Env::root();
            heap.track_frame(&dead);
        }
        assert!(heap.len() < MIN_PRUNE_THRESHOLD);
    }
}
