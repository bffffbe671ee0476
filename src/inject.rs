use tracing::error;

use crate::{
    any::{Instance, TypeInfo},
    dependency_resolver::{DependencyResolver, Resolution},
    errors::ResolveErrorKind,
    site::Request,
    utils::thread_safety::{RcThreadSafety, SendSafety, SyncSafety},
};

/// Shared dependency looked up in the container.
///
/// In a factory method, a parameter of the requester's own type, or of one of its registered
/// supertypes, receives the requester itself.
pub struct Inject<Dep: ?Sized>(pub RcThreadSafety<Dep>);

impl<Dep> DependencyResolver for Inject<Dep>
where
    Dep: ?Sized + SendSafety + SyncSafety + 'static,
{
    fn resolve(resolution: &Resolution<'_>) -> Result<Self, ResolveErrorKind> {
        if let Some(requester) = resolution.requester {
            let shared = requester.downcast::<Dep>().or_else(|| {
                resolution
                    .container
                    .upcast(requester, TypeInfo::of::<Dep>())
                    .and_then(|instance| instance.downcast::<Dep>())
            });
            if let Some(requester) = shared {
                return Ok(Self(requester));
            }
        }

        let instance = resolution
            .container
            .resolve(TypeInfo::of::<Dep>(), Request::new(resolution.owner, Some(resolution.site)))?;
        match instance.downcast::<Dep>() {
            Some(dependency) => Ok(Self(dependency)),
            None => {
                let err = ResolveErrorKind::IncorrectType {
                    expected: TypeInfo::of::<Dep>(),
                    actual: instance.type_info(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    fn type_info() -> TypeInfo {
        TypeInfo::of::<Dep>()
    }
}

/// Component on whose behalf a factory method runs, whatever its type.
/// Empty outside factory methods.
pub struct Requester(pub Option<Instance>);

impl DependencyResolver for Requester {
    const LOOKUP: bool = false;

    fn resolve(resolution: &Resolution<'_>) -> Result<Self, ResolveErrorKind> {
        Ok(Self(resolution.requester.cloned()))
    }

    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>()
    }
}
