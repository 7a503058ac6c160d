//! Heap objects and the handles that reach them

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Value;
use crate::gc::Heap;
use crate::types::{Type, TypeKind};

const UNREGISTERED: usize = usize::MAX;

/// A heap-allocated value.
///
/// `ref_count` counts scope slots holding the object. The collector reads
/// it from its own thread, so it is atomic. The payload is only ever locked
/// by the evaluator thread.
pub struct Object {
    ref_count: AtomicUsize,
    slot: AtomicUsize,
    value: RwLock<Value>,
}

impl Object {
    /// Number of scope slots currently binding this object.
    pub fn ref_count(&self) -> usize {
        self.ref_count.load(Ordering::Acquire)
    }

    /// Record one more scope slot binding this object.
    pub(crate) fn retain(&self) {
        self.ref_count.fetch_add(1, Ordering::AcqRel);
    }

    /// Record one less scope slot binding this object. Never wraps below zero.
    pub(crate) fn release(&self) {
        let _ = self
            .ref_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }

    /// Index of this object in the collector's table, if registered.
    pub fn slot(&self) -> Option<usize> {
        match self.slot.load(Ordering::Acquire) {
            UNREGISTERED => None,
            n => Some(n),
        }
    }

    pub(crate) fn set_slot(&self, slot: Option<usize>) {
        self.slot
            .store(slot.unwrap_or(UNREGISTERED), Ordering::Release);
    }

    /// Lock the payload for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Value> {
        self.value.read()
    }

    /// Lock the payload for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, Value> {
        self.value.write()
    }

    /// Runtime kind of the payload.
    pub fn kind(&self) -> TypeKind {
        self.read().kind()
    }

    /// Runtime type of the payload.
    pub fn type_of(&self) -> Type {
        self.read().type_of()
    }
}

/// Shared handle to a heap [`Object`].
///
/// Cloning the handle aliases the object. Use [`ObjectRef::clone_in`] for
/// an independent copy.
#[derive(Clone)]
pub struct ObjectRef(Arc<Object>);

impl ObjectRef {
    /// Wrap a value in a fresh, unregistered object. Use [`Heap::alloc`]
    /// to create objects the collector knows about.
    pub(crate) fn detached(value: Value) -> Self {
        ObjectRef(Arc::new(Object {
            ref_count: AtomicUsize::new(0),
            slot: AtomicUsize::new(UNREGISTERED),
            value: RwLock::new(value),
        }))
    }

    /// Whether both handles reach the same object.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles, the collector's table included.
    pub(crate) fn handle_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Deep copy: sequences copy every element recursively, functions are
    /// copied shallowly. Every new object is registered with `heap`.
    pub fn clone_in(&self, heap: &Heap) -> ObjectRef {
        let copy = match &*self.read() {
            Value::None => Value::None,
            Value::Bool(b) => Value::Bool(*b),
            Value::Int(n) => Value::Int(*n),
            Value::Float(n) => Value::Float(*n),
            Value::Char(c) => Value::Char(*c),
            Value::String(s) => Value::String(s.clone()),
            Value::Tuple(items) => Value::Tuple(items.iter().map(|x| x.clone_in(heap)).collect()),
            Value::Vector(items) => {
                Value::Vector(items.iter().map(|x| x.clone_in(heap)).collect())
            }
            Value::Range(r) => Value::Range(*r),
            Value::Function(f) => Value::Function(f.clone()),
        };
        heap.alloc(copy)
    }
}

impl Deref for ObjectRef {
    type Target = Object;

    fn deref(&self) -> &Object {
        &self.0
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.read() == *other.read()
    }
}

impl PartialEq<Value> for ObjectRef {
    fn eq(&self, other: &Value) -> bool {
        *self.read() == *other
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.read(), f)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.read(), f)
    }
}
