use alloc::{borrow::Cow, vec::Vec};
use core::marker::PhantomData;
use tracing::error;

use crate::{
    any::{Instance, TypeInfo},
    errors::ResolveErrorKind,
    hierarchy::{apply, Cast},
    site::Request,
    utils::thread_safety::{RcThreadSafety, SendSafety, SyncSafety},
    Container,
};

/// Supplies instances of one declared type on demand.
pub trait Provider: SendSafety + SyncSafety {
    /// Declared type of provided instances.
    fn type_info(&self) -> TypeInfo;

    /// Name matched against site names when several providers share a type.
    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(self.type_info().default_name())
    }

    /// Whether the provider wins when no site name matches.
    fn is_default(&self) -> bool {
        false
    }

    /// # Errors
    /// Fails if the instance can't be supplied for the request.
    fn provide(&self, container: &Container, request: Request<'_>) -> Result<Instance, ResolveErrorKind>;
}

/// Provider always returning the same shared instance.
pub struct SingletonProvider {
    instance: Instance,
    name: Cow<'static, str>,
    is_default: bool,
}

impl SingletonProvider {
    #[inline]
    #[must_use]
    pub fn new(instance: Instance, name: impl Into<Cow<'static, str>>, is_default: bool) -> Self {
        Self {
            instance,
            name: name.into(),
            is_default,
        }
    }

    #[must_use]
    pub fn of<T>(value: RcThreadSafety<T>) -> Self
    where
        T: ?Sized + SendSafety + SyncSafety + 'static,
    {
        let instance = Instance::new(value);
        let name = instance.type_info().default_name();
        Self::new(instance, name, false)
    }

    #[inline]
    #[must_use]
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

impl Provider for SingletonProvider {
    fn type_info(&self) -> TypeInfo {
        self.instance.type_info()
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.name.as_ref())
    }

    fn is_default(&self) -> bool {
        self.is_default
    }

    fn provide(&self, _container: &Container, _request: Request<'_>) -> Result<Instance, ResolveErrorKind> {
        Ok(self.instance.clone())
    }
}

/// Provider backed by a closure, see [`provider_fn`].
pub struct FnProvider<T: ?Sized, F> {
    f: F,
    name: Option<Cow<'static, str>>,
    is_default: bool,
    _marker: PhantomData<fn() -> RcThreadSafety<T>>,
}

/// Wraps a closure into a provider of `T`.
/// The closure is called on every request, nothing is cached.
#[inline]
#[must_use]
pub fn provider_fn<T, F>(f: F) -> FnProvider<T, F>
where
    T: ?Sized + SendSafety + SyncSafety + 'static,
    F: Fn(&Container, Request<'_>) -> Result<RcThreadSafety<T>, ResolveErrorKind> + SendSafety + SyncSafety,
{
    FnProvider {
        f,
        name: None,
        is_default: false,
        _marker: PhantomData,
    }
}

impl<T: ?Sized, F> FnProvider<T, F> {
    #[inline]
    #[must_use]
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

impl<T, F> Provider for FnProvider<T, F>
where
    T: ?Sized + SendSafety + SyncSafety + 'static,
    F: Fn(&Container, Request<'_>) -> Result<RcThreadSafety<T>, ResolveErrorKind> + SendSafety + SyncSafety,
{
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn name(&self) -> Cow<'_, str> {
        match &self.name {
            Some(name) => Cow::Borrowed(name.as_ref()),
            None => Cow::Owned(TypeInfo::of::<T>().default_name()),
        }
    }

    fn is_default(&self) -> bool {
        self.is_default
    }

    fn provide(&self, container: &Container, request: Request<'_>) -> Result<Instance, ResolveErrorKind> {
        (self.f)(container, request).map(Instance::new)
    }
}

/// Registration of a provider under one of its supertypes.
/// Keeps the name and default flag of the wrapped provider.
pub(crate) struct UpcastProvider {
    inner: RcThreadSafety<dyn Provider>,
    target: TypeInfo,
    casts: Vec<Cast>,
}

impl UpcastProvider {
    #[inline]
    #[must_use]
    pub(crate) fn new(inner: RcThreadSafety<dyn Provider>, target: TypeInfo, casts: Vec<Cast>) -> Self {
        Self { inner, target, casts }
    }
}

impl Provider for UpcastProvider {
    fn type_info(&self) -> TypeInfo {
        self.target
    }

    fn name(&self) -> Cow<'_, str> {
        self.inner.name()
    }

    fn is_default(&self) -> bool {
        self.inner.is_default()
    }

    fn provide(&self, container: &Container, request: Request<'_>) -> Result<Instance, ResolveErrorKind> {
        let instance = self.inner.provide(container, request)?;
        let actual = instance.type_info();
        match apply(instance, &self.casts) {
            Some(instance) => Ok(instance),
            None => {
                let err = ResolveErrorKind::IncorrectType {
                    expected: self.target,
                    actual,
                };
                error!("{}", err);
                Err(err)
            }
        }
    }
}

/// Makes the container itself injectable.
pub(crate) struct ContainerProvider;

impl Provider for ContainerProvider {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<Container>()
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed("container")
    }

    fn provide(&self, container: &Container, _request: Request<'_>) -> Result<Instance, ResolveErrorKind> {
        Ok(Instance::new(RcThreadSafety::new(container.clone())))
    }
}
