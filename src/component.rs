use alloc::{borrow::Cow, vec::Vec};

use crate::{
    any::{Instance, TypeInfo},
    config::Capabilities,
    factory::Methods,
    fields::Injectable,
    hierarchy::{Edge, Supertypes},
    lifecycle::{Destructible, Initiated},
    property::Property,
    provider::Provider,
    utils::thread_safety::RcThreadSafety,
};

/// Type managed by the container.
///
/// Every method has a default, so a plain component only needs empty impls:
/// ```rust,ignore
/// impl Injectable for Pool {}
/// impl Component for Pool {}
/// ```
/// A component opts into extra roles by returning itself from the matching `as_*` method.
pub trait Component: Injectable + 'static {
    /// Roles announced to scanners, see [`crate::Scanner`].
    const CAPABILITIES: Capabilities = Capabilities::SINGLETON;

    /// Provider name used to pick between several components of one type.
    /// `None` means the snake_case type name.
    fn name(&self) -> Option<Cow<'static, str>> {
        None
    }

    fn is_default(&self) -> bool {
        false
    }

    /// Declares the types the component can also be resolved as.
    fn supertypes(supertypes: &mut Supertypes<Self>)
    where
        Self: Sized,
    {
        let _ = supertypes;
    }

    fn as_initiated(self: RcThreadSafety<Self>) -> Option<RcThreadSafety<dyn Initiated>>
    where
        Self: Sized,
    {
        None
    }

    fn as_destructible(self: RcThreadSafety<Self>) -> Option<RcThreadSafety<dyn Destructible>>
    where
        Self: Sized,
    {
        None
    }

    /// Methods exposed as providers of their return types.
    fn as_factory(self: RcThreadSafety<Self>) -> Option<Methods>
    where
        Self: Sized,
    {
        None
    }

    fn as_provider(self: RcThreadSafety<Self>) -> Option<RcThreadSafety<dyn Provider>>
    where
        Self: Sized,
    {
        None
    }

    fn as_property(self: RcThreadSafety<Self>) -> Option<RcThreadSafety<dyn Property>>
    where
        Self: Sized,
    {
        None
    }
}

pub(crate) fn supertype_edges<T: Component>() -> Vec<Edge> {
    let mut supertypes = Supertypes::<T>::new();
    T::supertypes(&mut supertypes);
    supertypes.into_edges()
}

/// Type-erased view of a built component with all its roles.
pub(crate) struct Parts {
    pub(crate) instance: Instance,
    pub(crate) name: Cow<'static, str>,
    pub(crate) is_default: bool,
    pub(crate) supertypes: Vec<Edge>,
    pub(crate) injectable: RcThreadSafety<dyn Injectable>,
    pub(crate) initiated: Option<RcThreadSafety<dyn Initiated>>,
    pub(crate) destructible: Option<RcThreadSafety<dyn Destructible>>,
    pub(crate) factory: Option<Methods>,
    pub(crate) provider: Option<RcThreadSafety<dyn Provider>>,
    pub(crate) property: Option<RcThreadSafety<dyn Property>>,
}

impl Parts {
    #[must_use]
    pub(crate) fn new<T: Component>(component: RcThreadSafety<T>) -> Self {
        let type_info = TypeInfo::of::<T>();
        Self {
            instance: Instance::new(component.clone()),
            name: component.name().unwrap_or_else(|| Cow::Owned(type_info.default_name())),
            is_default: component.is_default(),
            supertypes: supertype_edges::<T>(),
            injectable: component.clone(),
            initiated: component.clone().as_initiated(),
            destructible: component.clone().as_destructible(),
            factory: component.clone().as_factory(),
            provider: component.clone().as_provider(),
            property: component.as_property(),
        }
    }

    #[inline]
    #[must_use]
    pub(crate) const fn type_info(&self) -> TypeInfo {
        self.instance.type_info()
    }
}

#[cfg(test)]
mod tests {
    use super::{Component, Parts};
    use crate::{
        any::TypeInfo,
        fields::Injectable,
        hierarchy::Supertypes,
        lifecycle::Initiated,
        utils::thread_safety::RcThreadSafety,
    };

    use alloc::borrow::Cow;

    trait Clock: Send + Sync {}

    struct Plain;

    impl Injectable for Plain {}
    impl Component for Plain {}

    struct SystemClock;

    impl Clock for SystemClock {}
    impl Injectable for SystemClock {}

    impl Initiated for SystemClock {
        fn initiate(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    impl Component for SystemClock {
        fn name(&self) -> Option<Cow<'static, str>> {
            Some(Cow::Borrowed("utc"))
        }

        fn is_default(&self) -> bool {
            true
        }

        fn supertypes(supertypes: &mut Supertypes<Self>) {
            supertypes.add::<dyn Clock>(|this| this);
        }

        fn as_initiated(self: RcThreadSafety<Self>) -> Option<RcThreadSafety<dyn Initiated>> {
            Some(self)
        }
    }

    #[test]
    fn test_plain_parts() {
        let parts = Parts::new(RcThreadSafety::new(Plain));

        assert_eq!(parts.type_info(), TypeInfo::of::<Plain>());
        assert_eq!(parts.name, "plain");
        assert!(!parts.is_default);
        assert!(parts.supertypes.is_empty());
        assert!(parts.initiated.is_none());
        assert!(parts.destructible.is_none());
        assert!(parts.factory.is_none());
        assert!(parts.provider.is_none());
        assert!(parts.property.is_none());
    }

    #[test]
    fn test_capable_parts() {
        let parts = Parts::new(RcThreadSafety::new(SystemClock));

        assert_eq!(parts.name, "utc");
        assert!(parts.is_default);
        assert_eq!(parts.supertypes.len(), 1);
        assert_eq!(parts.supertypes[0].target, TypeInfo::of::<dyn Clock>());
        assert!(parts.initiated.is_some());
    }
}
