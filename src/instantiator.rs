use crate::{
    dependency_resolver::{Dependencies, DependencyResolver},
    errors::InstantiateErrorKind,
    utils::thread_safety::{SendSafety, SyncSafety},
};

/// Construction recipe of a component: a closure taking dependency resolvers.
///
/// ```rust,ignore
/// |Inject(repo): Inject<dyn UserRepo>| Ok(UserService::new(repo))
/// ```
pub trait Instantiator<Deps>: Clone + SendSafety + SyncSafety + 'static
where
    Deps: Dependencies,
{
    type Provides: 'static;
    type Error: Into<InstantiateErrorKind>;

    /// # Errors
    /// Fails if the build step fails.
    fn instantiate(&mut self, dependencies: Deps) -> Result<Self::Provides, Self::Error>;
}

macro_rules! impl_instantiator {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, Response, Err, $($ty,)*> Instantiator<($($ty,)*)> for F
        where
            F: FnMut($($ty,)*) -> Result<Response, Err> + Clone + SendSafety + SyncSafety + 'static,
            Response: 'static,
            Err: Into<InstantiateErrorKind>,
            $( $ty: DependencyResolver, )*
        {
            type Provides = Response;
            type Error = Err;

            #[inline]
            fn instantiate(&mut self, ($($ty,)*): ($($ty,)*)) -> Result<Self::Provides, Self::Error> {
                self($($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_instantiator);

/// Instantiator returning clones of a value created outside the container.
#[inline]
#[must_use]
pub fn instance<T>(value: T) -> impl Instantiator<(), Provides = T, Error = InstantiateErrorKind>
where
    T: Clone + SendSafety + SyncSafety + 'static,
{
    move || Ok(value.clone())
}
