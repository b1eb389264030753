//! Resource arena
//!
//! Index-keyed ownership of the transient resources created while a batch is
//! translated: the cloned policy, its filter expression, the operation list
//! and the function-argument list of each record. A record's resources live
//! in the slot with the record's index, so teardown never depends on how far
//! translation got. Everything is released in a single pass by
//! [`ResourceArena::release_all`], which is idempotent and also runs on drop.

use crate::core::expression::FilterExpression;
use crate::core::policy::RecordPolicy;
use crate::core::types::{Operation, Value};
use crate::utils::error::{ClientError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::trace;

/// Kind of a tracked resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Policy,
    Expression,
    Operations,
    Arguments,
}

/// Owner of a tracked resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotId {
    /// Resources of the record at this index
    Record(usize),
    /// Resources of the batch-level policy
    Batch,
}

/// A resource handed to the arena
#[derive(Debug)]
pub enum Resource {
    Policy(RecordPolicy),
    Expression(FilterExpression),
    Operations(Vec<Operation>),
    Arguments(Vec<Value>),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Policy(_) => ResourceKind::Policy,
            Resource::Expression(_) => ResourceKind::Expression,
            Resource::Operations(_) => ResourceKind::Operations,
            Resource::Arguments(_) => ResourceKind::Arguments,
        }
    }
}

/// Notified whenever the arena takes ownership of or releases a resource
#[cfg_attr(test, mockall::automock)]
pub trait ResourceObserver: Send + Sync {
    fn on_acquire(&self, id: u64, slot: SlotId, kind: ResourceKind);
    fn on_release(&self, id: u64, slot: SlotId, kind: ResourceKind);
}

/// Observer that ignores every event
#[derive(Debug, Default)]
pub struct NoopObserver;

impl ResourceObserver for NoopObserver {
    fn on_acquire(&self, _id: u64, _slot: SlotId, _kind: ResourceKind) {}
    fn on_release(&self, _id: u64, _slot: SlotId, _kind: ResourceKind) {}
}

/// Observer that reports leaks and double releases
#[derive(Debug, Default)]
pub struct LeakDetector {
    inner: Mutex<LeakDetectorState>,
}

#[derive(Debug, Default)]
struct LeakDetectorState {
    live: HashMap<u64, (SlotId, ResourceKind)>,
    acquired: usize,
    released: usize,
    double_releases: usize,
}

impl LeakDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquired(&self) -> usize {
        self.inner.lock().acquired
    }

    pub fn released(&self) -> usize {
        self.inner.lock().released
    }

    /// Resources acquired and not yet released
    pub fn live(&self) -> usize {
        self.inner.lock().live.len()
    }

    pub fn double_releases(&self) -> usize {
        self.inner.lock().double_releases
    }

    /// Acquired resources of one kind
    pub fn live_of(&self, kind: ResourceKind) -> usize {
        self.inner
            .lock()
            .live
            .values()
            .filter(|(_, k)| *k == kind)
            .count()
    }

    /// Every acquired resource was released exactly once
    pub fn is_balanced(&self) -> bool {
        let state = self.inner.lock();
        state.live.is_empty() && state.double_releases == 0 && state.acquired == state.released
    }
}

impl ResourceObserver for LeakDetector {
    fn on_acquire(&self, id: u64, slot: SlotId, kind: ResourceKind) {
        let mut state = self.inner.lock();
        state.acquired += 1;
        state.live.insert(id, (slot, kind));
    }

    fn on_release(&self, id: u64, _slot: SlotId, _kind: ResourceKind) {
        let mut state = self.inner.lock();
        if state.live.remove(&id).is_some() {
            state.released += 1;
        } else {
            state.double_releases += 1;
        }
    }
}

/// A resource owned by the arena; releasing it notifies the observer
pub struct Tracked<T> {
    id: u64,
    slot: SlotId,
    kind: ResourceKind,
    value: T,
    observer: Arc<dyn ResourceObserver>,
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        trace!(id = self.id, slot = ?self.slot, kind = ?self.kind, "releasing resource");
        self.observer.on_release(self.id, self.slot, self.kind);
    }
}

/// The resources owned on behalf of one record (or of the batch itself)
#[derive(Default)]
pub struct ArenaSlot {
    policy: Option<Tracked<RecordPolicy>>,
    expression: Option<Tracked<FilterExpression>>,
    operations: Option<Tracked<Vec<Operation>>>,
    arguments: Option<Tracked<Vec<Value>>>,
}

impl ArenaSlot {
    pub fn policy(&self) -> Option<&RecordPolicy> {
        self.policy.as_deref()
    }

    pub fn expression(&self) -> Option<&FilterExpression> {
        self.expression.as_deref()
    }

    pub fn operations(&self) -> Option<&[Operation]> {
        self.operations.as_deref().map(Vec::as_slice)
    }

    pub fn arguments(&self) -> Option<&[Value]> {
        self.arguments.as_deref().map(Vec::as_slice)
    }

    fn holds(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Policy => self.policy.is_some(),
            ResourceKind::Expression => self.expression.is_some(),
            ResourceKind::Operations => self.operations.is_some(),
            ResourceKind::Arguments => self.arguments.is_some(),
        }
    }

    fn count(&self) -> usize {
        [
            ResourceKind::Policy,
            ResourceKind::Expression,
            ResourceKind::Operations,
            ResourceKind::Arguments,
        ]
        .into_iter()
        .filter(|kind| self.holds(*kind))
        .count()
    }

    /// Release everything in this slot, returning how many resources went
    fn clear(&mut self) -> usize {
        let released = self.count();
        self.expression.take();
        self.policy.take();
        self.operations.take();
        self.arguments.take();
        released
    }
}

/// Per-call table of resource slots, one per record plus one for the batch
pub struct ResourceArena {
    slots: Vec<ArenaSlot>,
    batch_slot: ArenaSlot,
    next_id: u64,
    released: bool,
    observer: Arc<dyn ResourceObserver>,
}

impl ResourceArena {
    /// Create an arena with one empty slot per record
    pub fn with_capacity(records: usize, observer: Arc<dyn ResourceObserver>) -> Self {
        let mut slots = Vec::with_capacity(records);
        slots.resize_with(records, ArenaSlot::default);
        Self {
            slots,
            batch_slot: ArenaSlot::default(),
            next_id: 0,
            released: false,
            observer,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Register `resource` under record slot `index`
    ///
    /// Each slot owns at most one resource of each kind; registering a second
    /// one is refused and the refused resource is never tracked.
    pub fn acquire(&mut self, index: usize, resource: Resource) -> Result<()> {
        self.acquire_in(SlotId::Record(index), resource)
    }

    /// Register a resource owned by the batch-level policy
    pub fn acquire_for_batch(&mut self, resource: Resource) -> Result<()> {
        self.acquire_in(SlotId::Batch, resource)
    }

    fn acquire_in(&mut self, slot_id: SlotId, resource: Resource) -> Result<()> {
        if self.released {
            return Err(ClientError::internal("resource arena already released"));
        }

        let kind = resource.kind();
        let id = self.next_id;
        let observer = Arc::clone(&self.observer);

        let slot = match slot_id {
            SlotId::Record(index) => self.slots.get_mut(index).ok_or_else(|| {
                ClientError::internal(format!("arena slot {} out of range", index))
            })?,
            SlotId::Batch => &mut self.batch_slot,
        };

        if slot.holds(kind) {
            return Err(ClientError::internal(format!(
                "arena slot {:?} already owns a {:?} resource",
                slot_id, kind
            )));
        }

        self.next_id += 1;
        observer.on_acquire(id, slot_id, kind);
        trace!(id, slot = ?slot_id, ?kind, "acquired resource");

        macro_rules! track {
            ($value:expr) => {
                Some(Tracked {
                    id,
                    slot: slot_id,
                    kind,
                    value: $value,
                    observer,
                })
            };
        }

        match resource {
            Resource::Policy(p) => slot.policy = track!(p),
            Resource::Expression(e) => slot.expression = track!(e),
            Resource::Operations(ops) => slot.operations = track!(ops),
            Resource::Arguments(args) => slot.arguments = track!(args),
        }
        Ok(())
    }

    pub fn slot(&self, index: usize) -> Option<&ArenaSlot> {
        self.slots.get(index)
    }

    pub fn batch_slot(&self) -> &ArenaSlot {
        &self.batch_slot
    }

    /// Operation list of a slot, for filling in place after registration
    pub fn operations_mut(&mut self, index: usize) -> Option<&mut Vec<Operation>> {
        self.slots
            .get_mut(index)
            .and_then(|slot| slot.operations.as_deref_mut())
    }

    /// Argument list of a slot, for filling in place after registration
    pub fn arguments_mut(&mut self, index: usize) -> Option<&mut Vec<Value>> {
        self.slots
            .get_mut(index)
            .and_then(|slot| slot.arguments.as_deref_mut())
    }

    /// Resources currently owned across all slots
    pub fn live_resources(&self) -> usize {
        self.slots.iter().map(ArenaSlot::count).sum::<usize>() + self.batch_slot.count()
    }

    /// Release every registered resource, tolerating partially filled slots
    ///
    /// Returns the number of resources released by this call; calling it
    /// again releases nothing.
    pub fn release_all(&mut self) -> usize {
        let mut released: usize = self.slots.iter_mut().map(ArenaSlot::clear).sum();
        released += self.batch_slot.clear();
        if !self.released {
            trace!(released, slots = self.slots.len(), "resource arena released");
        }
        self.released = true;
        released
    }
}

impl Drop for ResourceArena {
    fn drop(&mut self) {
        self.release_all();
    }
}
