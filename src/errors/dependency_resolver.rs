use alloc::{borrow::Cow, boxed::Box, string::String};

use super::{instantiate::InstantiateErrorKind, instantiator::InstantiatorErrorKind, lifecycle::LifecycleErrorKind};
use crate::any::TypeInfo;

fn owner_name(owner: Option<&TypeInfo>) -> &'static str {
    owner.map_or("<none>", |owner| owner.name)
}

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Unknown component type: {}", type_info.name)]
    UnknownType { type_info: TypeInfo },
    #[error(
        "Ambiguous dependency: '{}' requested '{}', found multiple providers and no default one",
        owner_name(owner.as_ref()), type_info.name,
    )]
    Ambiguous { type_info: TypeInfo, owner: Option<TypeInfo> },
    #[error("No construction recipe registered for: {}", type_info.name)]
    NoRecipe { type_info: TypeInfo },
    #[error("No property registered under key '{key}'")]
    NoProperty { key: String },
    #[error("Incorrect provided type. Actual: {}, expected: {}", actual.name, expected.name)]
    IncorrectType { expected: TypeInfo, actual: TypeInfo },
    #[error("Dependency site descriptors don't match the recipe arity")]
    MissingSite,
    #[error("Unable to create an instance of: {}", type_info.name)]
    Construction {
        type_info: TypeInfo,
        #[source]
        source: InstantiatorErrorKind<Box<ResolveErrorKind>, InstantiateErrorKind>,
    },
    #[error("Unable to inject field '{site}' of component: {}", owner.name)]
    Injection {
        owner: TypeInfo,
        site: Cow<'static, str>,
        #[source]
        source: Box<ResolveErrorKind>,
    },
    #[error(transparent)]
    Lifecycle(#[from] LifecycleErrorKind),
}
