use alloc::collections::BinaryHeap;
use core::cmp::Ordering;
use tracing::{debug, error};

use crate::{
    any::TypeInfo,
    errors::LifecycleErrorKind,
    utils::thread_safety::{same_data, RcThreadSafety, SendSafety, SyncSafety},
};

/// Component with a startup step, run after all its fields are injected.
pub trait Initiated: SendSafety + SyncSafety {
    /// Lower orders run first.
    fn initiation_order(&self) -> i32 {
        0
    }

    /// # Errors
    /// Any error aborts the scan or registration that triggered it.
    fn initiate(&self) -> anyhow::Result<()>;
}

/// Component with a teardown step, run by [`crate::Container::destroy`].
pub trait Destructible: SendSafety + SyncSafety {
    /// Lower orders run first.
    fn destruction_order(&self) -> i32 {
        0
    }

    /// # Errors
    /// Any error aborts the remaining destructions.
    fn destroy(&self) -> anyhow::Result<()>;
}

struct Scheduled<T: ?Sized> {
    order: i32,
    seq: u64,
    type_info: TypeInfo,
    item: RcThreadSafety<T>,
}

impl<T: ?Sized> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.seq == other.seq
    }
}

impl<T: ?Sized> Eq for Scheduled<T> {}

impl<T: ?Sized> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// `BinaryHeap` is a max-heap, so the smallest (order, seq) pair must compare as the greatest.
impl<T: ?Sized> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.order.cmp(&self.order).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue of lifecycle callbacks, ascending by declared order,
/// insertion order among equal orders.
pub(crate) struct Schedule<T: ?Sized> {
    heap: BinaryHeap<Scheduled<T>>,
    seq: u64,
}

impl<T: ?Sized> Default for Schedule<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Schedule<T> {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }

    pub(crate) fn push(&mut self, order: i32, type_info: TypeInfo, item: RcThreadSafety<T>) {
        self.heap.push(Scheduled {
            order,
            seq: self.seq,
            type_info,
            item,
        });
        self.seq += 1;
    }

    pub(crate) fn pop(&mut self) -> Option<(TypeInfo, RcThreadSafety<T>)> {
        self.heap.pop().map(|scheduled| (scheduled.type_info, scheduled.item))
    }

    /// Removes the entry holding the same data as `item`.
    pub(crate) fn remove<U: ?Sized>(&mut self, item: &RcThreadSafety<U>) -> Option<(TypeInfo, RcThreadSafety<T>)> {
        let mut entries = core::mem::take(&mut self.heap).into_vec();
        let removed = entries
            .iter()
            .position(|scheduled| same_data(&scheduled.item, item))
            .map(|index| entries.swap_remove(index));
        self.heap = BinaryHeap::from(entries);
        removed.map(|scheduled| (scheduled.type_info, scheduled.item))
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    #[cfg(test)]
    #[inline]
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Runs every initializer in order, stopping at the first failure.
pub(crate) fn initiate_all(mut schedule: Schedule<dyn Initiated>) -> Result<(), LifecycleErrorKind> {
    while let Some((type_info, initiated)) = schedule.pop() {
        initiate(type_info, &*initiated)?;
    }
    Ok(())
}

pub(crate) fn initiate(type_info: TypeInfo, initiated: &dyn Initiated) -> Result<(), LifecycleErrorKind> {
    initiated.initiate().map_err(|source| {
        let err = LifecycleErrorKind::Initiation { type_info, source };
        error!("{}", err);
        err
    })?;
    debug!(component = type_info.name, "Initiated");
    Ok(())
}

/// Runs every destructor in order. The first failure aborts the remaining ones.
pub(crate) fn destroy_all(mut schedule: Schedule<dyn Destructible>) -> Result<(), LifecycleErrorKind> {
    while let Some((type_info, destructible)) = schedule.pop() {
        destroy(type_info, &*destructible)?;
    }
    Ok(())
}

pub(crate) fn destroy(type_info: TypeInfo, destructible: &dyn Destructible) -> Result<(), LifecycleErrorKind> {
    destructible.destroy().map_err(|source| {
        let err = LifecycleErrorKind::Destruction { type_info, source };
        error!("{}", err);
        err
    })?;
    debug!(component = type_info.name, "Destroyed");
    Ok(())
}
