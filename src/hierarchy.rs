use alloc::vec::Vec;
use core::marker::PhantomData;

use crate::{
    any::{Instance, TypeInfo},
    utils::thread_safety::{RcThreadSafety, SendSafety, SyncSafety},
};

/// Converts an instance of a type into an instance of one of its supertypes.
#[cfg(feature = "thread_safe")]
pub(crate) type Cast = RcThreadSafety<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;
#[cfg(not(feature = "thread_safe"))]
pub(crate) type Cast = RcThreadSafety<dyn Fn(&Instance) -> Option<Instance>>;

/// Directed edge of the supertype graph.
#[derive(Clone)]
pub(crate) struct Edge {
    pub(crate) target: TypeInfo,
    pub(crate) cast: Cast,
}

/// Collects the supertypes a type can be resolved as.
///
/// Every edge carries the upcast used to turn a provided instance into the supertype, e.g.
/// ```rust,ignore
/// fn supertypes(supertypes: &mut Supertypes<Self>) {
///     supertypes.add::<dyn UserRepo>(|this| this);
/// }
/// ```
pub struct Supertypes<T: ?Sized> {
    edges: Vec<Edge>,
    _marker: PhantomData<fn(&T)>,
}

impl<T> Supertypes<T>
where
    T: ?Sized + SendSafety + SyncSafety + 'static,
{
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            edges: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn add<U>(&mut self, upcast: fn(RcThreadSafety<T>) -> RcThreadSafety<U>) -> &mut Self
    where
        U: ?Sized + SendSafety + SyncSafety + 'static,
    {
        let target = TypeInfo::of::<U>();
        if target != TypeInfo::of::<T>() && self.edges.iter().all(|edge| edge.target != target) {
            self.edges.push(Edge {
                target,
                cast: RcThreadSafety::new(move |instance: &Instance| {
                    instance.downcast::<T>().map(|value| Instance::new(upcast(value)))
                }),
            });
        }
        self
    }

    #[inline]
    #[must_use]
    pub(crate) fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
}

/// Applies a chain of casts built by the supertype walk.
pub(crate) fn apply(instance: Instance, casts: &[Cast]) -> Option<Instance> {
    casts.iter().try_fold(instance, |instance, cast| cast(&instance))
}

#[cfg(test)]
mod tests {
    use super::{apply, Supertypes};
    use crate::{
        any::{Instance, TypeInfo},
        utils::thread_safety::RcThreadSafety,
    };

    trait Named: Send + Sync {
        fn name(&self) -> &str;
    }

    struct Users;

    impl Named for Users {
        fn name(&self) -> &str {
            "users"
        }
    }

    #[test]
    fn test_edges_deduplicated() {
        let mut supertypes = Supertypes::<Users>::new();
        supertypes
            .add::<dyn Named>(|this| this)
            .add::<dyn Named>(|this| this)
            .add::<Users>(|this| this);

        let edges = supertypes.into_edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target, TypeInfo::of::<dyn Named>());
    }

    #[test]
    fn test_apply_casts() {
        let mut supertypes = Supertypes::<Users>::new();
        supertypes.add::<dyn Named>(|this| this);
        let casts: alloc::vec::Vec<_> = supertypes.into_edges().into_iter().map(|edge| edge.cast).collect();

        let instance = apply(Instance::new(RcThreadSafety::new(Users)), &casts).unwrap();
        assert!(instance.is::<dyn Named>());
        assert_eq!(instance.downcast::<dyn Named>().unwrap().name(), "users");

        let wrong = Instance::new(RcThreadSafety::new(1u8));
        assert!(apply(wrong, &casts).is_none());
    }
}
