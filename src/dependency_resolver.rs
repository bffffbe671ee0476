use alloc::{vec, vec::Vec};

use crate::{
    any::{Instance, TypeInfo},
    errors::ResolveErrorKind,
    site::Site,
    Container,
};

/// Everything a resolver knows about the parameter it fills.
#[derive(Clone, Copy)]
pub struct Resolution<'a> {
    pub container: &'a Container,
    /// Component the dependency is resolved for, passed to providers.
    pub owner: Option<&'a Instance>,
    /// Component on whose behalf a factory method runs.
    pub requester: Option<&'a Instance>,
    pub site: &'a Site,
}

pub trait DependencyResolver: Sized {
    /// Whether the value comes from a registry lookup.
    /// Resolvers that don't look anything up never hold back construction.
    const LOOKUP: bool = true;

    /// # Errors
    /// Fails if the dependency can't be provided.
    fn resolve(resolution: &Resolution<'_>) -> Result<Self, ResolveErrorKind>;

    #[must_use]
    fn type_info() -> TypeInfo;
}

/// Ordered parameter list of a recipe or a factory method.
pub trait Dependencies: Sized {
    /// Declared types of all parameters.
    #[must_use]
    fn type_infos() -> Vec<TypeInfo>;

    /// Declared types that must be registered before the recipe can run.
    #[must_use]
    fn required() -> Vec<TypeInfo>;

    /// # Errors
    /// Fails on the first parameter that can't be resolved, or if `sites` is shorter than the parameter list.
    fn resolve(container: &Container, owner: Option<&Instance>, requester: Option<&Instance>, sites: &[Site]) -> Result<Self, ResolveErrorKind>;
}

macro_rules! impl_dependencies {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case, unused_mut)]
        impl<$($ty,)*> Dependencies for ($($ty,)*)
        where
            $( $ty: DependencyResolver, )*
        {
            #[inline]
            fn type_infos() -> Vec<TypeInfo> {
                vec![$($ty::type_info(),)*]
            }

            #[inline]
            fn required() -> Vec<TypeInfo> {
                let mut required = Vec::new();
                $(
                    if $ty::LOOKUP {
                        required.push($ty::type_info());
                    }
                )*
                required
            }

            #[inline]
            #[allow(unused_variables)]
            fn resolve(container: &Container, owner: Option<&Instance>, requester: Option<&Instance>, sites: &[Site]) -> Result<Self, ResolveErrorKind> {
                let mut sites = sites.iter();
                Ok(($(
                    {
                        let site = sites.next().ok_or(ResolveErrorKind::MissingSite)?;
                        $ty::resolve(&Resolution { container, owner, requester, site })?
                    },
                )*))
            }
        }
    };
}

all_the_tuples!(impl_dependencies);
