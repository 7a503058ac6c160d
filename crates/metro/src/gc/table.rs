//! Object table and the allocation handle

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::value::{ObjectRef, Value};

/// Result of one sweep pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepStats {
    /// Occupied slots looked at
    pub scanned: usize,

    /// Objects removed from the table
    pub freed: usize,
}

/// Slots of object handles. Vacated slots are reused before the table grows.
#[derive(Default)]
pub(crate) struct ObjectTable {
    slots: Vec<Option<ObjectRef>>,
    vacant: Vec<usize>,
}

impl ObjectTable {
    fn insert(&mut self, object: ObjectRef) -> usize {
        match self.vacant.pop() {
            Some(index) => {
                self.slots[index] = Some(object);
                index
            }
            None => {
                self.slots.push(Some(object));
                self.slots.len() - 1
            }
        }
    }

    fn take(&mut self, index: usize) -> Option<ObjectRef> {
        let object = self.slots.get_mut(index)?.take()?;
        object.set_slot(None);
        self.vacant.push(index);
        Some(object)
    }

    fn len(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }
}

pub(crate) struct Shared {
    table: Mutex<ObjectTable>,
    pause_depth: AtomicUsize,
    sweep_limit: Option<usize>,
}

/// Cloneable allocation handle onto one collector's object table.
///
/// Every object the evaluator or a builtin creates goes through
/// [`Heap::alloc`], which registers it for sweeping.
#[derive(Clone)]
pub struct Heap {
    shared: Arc<Shared>,
}

impl Heap {
    pub(crate) fn new(sweep_limit: Option<usize>) -> Self {
        Self {
            shared: Arc::new(Shared {
                table: Mutex::new(ObjectTable::default()),
                pause_depth: AtomicUsize::new(0),
                sweep_limit,
            }),
        }
    }

    /// Allocate a heap object and register it with the table.
    pub fn alloc(&self, value: Value) -> ObjectRef {
        let object = ObjectRef::detached(value);
        let mut table = self.shared.table.lock();
        let slot = table.insert(object.clone());
        object.set_slot(Some(slot));
        object
    }

    /// Unregister an object. Returns whether it was in the table.
    pub fn remove(&self, object: &ObjectRef) -> bool {
        let Some(slot) = object.slot() else {
            return false;
        };

        let mut table = self.shared.table.lock();
        let registered = matches!(table.slots.get(slot), Some(Some(o)) if o.ptr_eq(object));
        if registered {
            table.take(slot);
        }
        registered
    }

    /// Whether the object is registered with this table.
    pub fn contains(&self, object: &ObjectRef) -> bool {
        let Some(slot) = object.slot() else {
            return false;
        };
        let table = self.shared.table.lock();
        matches!(table.slots.get(slot), Some(Some(o)) if o.ptr_eq(object))
    }

    /// Number of registered objects.
    pub fn live_objects(&self) -> usize {
        self.shared.table.lock().len()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Pausing
    // ═══════════════════════════════════════════════════════════════════

    pub(crate) fn pause(&self) {
        self.shared.pause_depth.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn resume(&self) {
        let _ = self.shared.pause_depth.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |n| n.checked_sub(1),
        );
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.shared.pause_depth.load(Ordering::Acquire) > 0
    }

    // ═══════════════════════════════════════════════════════════════════
    // Sweeping
    // ═══════════════════════════════════════════════════════════════════

    /// One sweep pass. Skipped entirely while paused.
    ///
    /// An object is freed when no scope binds it (`ref_count == 0`) and the
    /// table holds its only handle. Both are checked under the table lock,
    /// and handles can only be made from existing handles, so a freed object
    /// is unreachable.
    pub(crate) fn sweep(&self) -> SweepStats {
        if self.is_paused() {
            return SweepStats::default();
        }

        let limit = self.shared.sweep_limit.unwrap_or(usize::MAX);
        let mut stats = SweepStats::default();
        let mut freed = Vec::new();

        {
            let mut table = self.shared.table.lock();
            for index in 0..table.slots.len() {
                if stats.freed >= limit {
                    break;
                }
                let Some(object) = &table.slots[index] else {
                    continue;
                };
                stats.scanned += 1;
                if object.ref_count() == 0 && object.handle_count() == 1 {
                    if let Some(object) = table.take(index) {
                        freed.push(object);
                        stats.freed += 1;
                    }
                }
            }
        }

        // Dropped outside the lock; children become collectable next pass.
        drop(freed);
        stats
    }

    /// Unregister every object regardless of counts.
    pub(crate) fn clear(&self) -> usize {
        let drained: Vec<ObjectRef> = {
            let mut table = self.shared.table.lock();
            let ObjectTable { slots, vacant } = &mut *table;
            vacant.clear();
            slots.drain(..).flatten().collect()
        };
        for object in &drained {
            object.set_slot(None);
        }
        drained.len()
    }
}
