use alloc::{borrow::Cow, boxed::Box, vec::Vec};
use tracing::{debug, debug_span, error};

use crate::{
    any::{Instance, TypeInfo},
    config::Modifiers,
    dependency_resolver::{Dependencies, DependencyResolver},
    errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
    provider::Provider,
    service::{service_fn, BoxCloneService, Service as _},
    site::{Request, Site},
    utils::thread_safety::{RcThreadSafety, SendSafety, SyncSafety},
    Container,
};

/// Method of a factory component: a closure taking the factory and dependency resolvers.
pub trait FactoryMethod<S, Deps>: Clone + SendSafety + SyncSafety + 'static
where
    S: ?Sized,
    Deps: Dependencies,
{
    type Provides: 'static;
    type Error: Into<InstantiateErrorKind>;

    /// # Errors
    /// Fails if the method fails.
    fn call(&self, factory: &S, dependencies: Deps) -> Result<Self::Provides, Self::Error>;
}

macro_rules! impl_factory_method {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, S, Response, Err, $($ty,)*> FactoryMethod<S, ($($ty,)*)> for F
        where
            F: Fn(&S, $($ty,)*) -> Result<Response, Err> + Clone + SendSafety + SyncSafety + 'static,
            S: ?Sized,
            Response: 'static,
            Err: Into<InstantiateErrorKind>,
            $( $ty: DependencyResolver, )*
        {
            type Provides = Response;
            type Error = Err;

            #[inline]
            fn call(&self, factory: &S, ($($ty,)*): ($($ty,)*)) -> Result<Self::Provides, Self::Error> {
                self(factory, $($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_factory_method);

type BoxedCall = BoxCloneService<(Container, Option<Instance>), Instance, ResolveErrorKind>;

#[derive(Clone)]
struct Method {
    name: Cow<'static, str>,
    modifiers: Modifiers,
    type_info: TypeInfo,
    call: BoxedCall,
}

/// Factory methods exposed by a component, see [`crate::Component::as_factory`].
#[derive(Clone, Default)]
pub struct Methods {
    methods: Vec<Method>,
}

impl Methods {
    #[inline]
    #[must_use]
    pub fn of<S>(factory: RcThreadSafety<S>) -> MethodsBuilder<S>
    where
        S: ?Sized + SendSafety + SyncSafety + 'static,
    {
        MethodsBuilder {
            owner: Instance::new(factory.clone()),
            factory,
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.methods.iter().map(|method| method.name.as_ref()).collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Providers of the methods passing `exposed`.
    pub(crate) fn providers(&self, is_default: bool, exposed: impl Fn(&str, Modifiers) -> bool) -> Vec<MethodProvider> {
        self.methods
            .iter()
            .filter(|method| exposed(&method.name, method.modifiers))
            .map(|method| MethodProvider {
                method: method.clone(),
                is_default,
            })
            .collect()
    }
}

pub struct MethodsBuilder<S: ?Sized> {
    factory: RcThreadSafety<S>,
    owner: Instance,
    methods: Vec<Method>,
}

impl<S> MethodsBuilder<S>
where
    S: ?Sized + SendSafety + SyncSafety + 'static,
{
    /// Exposes a public method providing its return type.
    #[inline]
    #[must_use]
    pub fn method<M, Deps>(self, name: impl Into<Cow<'static, str>>, method: M) -> Self
    where
        M: FactoryMethod<S, Deps, Error = InstantiateErrorKind>,
        M::Provides: SendSafety + SyncSafety,
        Deps: Dependencies,
    {
        self.method_with(name, Modifiers::PUBLIC, method)
    }

    /// Methods returning `()` are skipped.
    #[must_use]
    pub fn method_with<M, Deps>(self, name: impl Into<Cow<'static, str>>, modifiers: Modifiers, method: M) -> Self
    where
        M: FactoryMethod<S, Deps, Error = InstantiateErrorKind>,
        M::Provides: SendSafety + SyncSafety,
        Deps: Dependencies,
    {
        self.push::<M, Deps, M::Provides>(name.into(), modifiers, method, |product| RcThreadSafety::new(product))
    }

    /// Exposes a method returning a shared value, e.g. `RcThreadSafety<dyn Trait>`.
    #[must_use]
    pub fn shared<M, Deps, U>(self, name: impl Into<Cow<'static, str>>, method: M) -> Self
    where
        M: FactoryMethod<S, Deps, Provides = RcThreadSafety<U>, Error = InstantiateErrorKind>,
        U: ?Sized + SendSafety + SyncSafety + 'static,
        Deps: Dependencies,
    {
        self.push::<M, Deps, U>(name.into(), Modifiers::PUBLIC, method, |product| product)
    }

    fn push<M, Deps, U>(
        mut self,
        name: Cow<'static, str>,
        modifiers: Modifiers,
        method: M,
        into_shared: fn(M::Provides) -> RcThreadSafety<U>,
    ) -> Self
    where
        M: FactoryMethod<S, Deps, Error = InstantiateErrorKind>,
        U: ?Sized + SendSafety + SyncSafety + 'static,
        Deps: Dependencies,
    {
        let type_info = TypeInfo::of::<U>();
        if type_info == TypeInfo::of::<()>() {
            debug!(method = name.as_ref(), "Method returns nothing, skipped");
            return self;
        }

        let sites: RcThreadSafety<[Site]> = Deps::type_infos()
            .into_iter()
            .enumerate()
            .map(|(index, type_info)| Site::method_parameter(name.clone(), index, type_info))
            .collect::<Vec<_>>()
            .into();
        let factory = self.factory.clone();
        let owner = self.owner.clone();

        let call = BoxCloneService::new(service_fn({
            move |(container, requester): (Container, Option<Instance>)| {
                let dependencies = match Deps::resolve(&container, Some(&owner), requester.as_ref(), &sites) {
                    Ok(dependencies) => dependencies,
                    Err(err) => {
                        let err = ResolveErrorKind::Construction {
                            type_info,
                            source: InstantiatorErrorKind::Deps(Box::new(err)),
                        };
                        error!("{}", err);
                        return Err(err);
                    }
                };
                match method.call(&factory, dependencies) {
                    Ok(product) => Ok(Instance::new(into_shared(product))),
                    Err(err) => {
                        let err = ResolveErrorKind::Construction {
                            type_info,
                            source: InstantiatorErrorKind::Factory(err),
                        };
                        error!("{}", err);
                        Err(err)
                    }
                }
            }
        }));

        self.methods.push(Method {
            name,
            modifiers,
            type_info,
            call,
        });
        self
    }

    #[inline]
    #[must_use]
    pub fn build(self) -> Methods {
        Methods { methods: self.methods }
    }
}

/// Provider calling a factory method on every request. Products are never cached.
pub(crate) struct MethodProvider {
    method: Method,
    is_default: bool,
}

impl Provider for MethodProvider {
    fn type_info(&self) -> TypeInfo {
        self.method.type_info
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.method.name.as_ref())
    }

    fn is_default(&self) -> bool {
        self.is_default
    }

    fn provide(&self, container: &Container, request: Request<'_>) -> Result<Instance, ResolveErrorKind> {
        let span = debug_span!("factory_method", method = self.method.name.as_ref());
        let _guard = span.enter();

        self.method.call.clone().call((container.clone(), request.owner.cloned()))
    }
}
