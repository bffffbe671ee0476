use alloc::vec::Vec;

use super::{dependency_resolver::ResolveErrorKind, lifecycle::LifecycleErrorKind, type_names};
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum ScanErrorKind {
    #[error("Scanner isn't set, nothing to scan")]
    NoScanner,
    #[error(
        "Unknown or circular dependencies detected after {passes} passes. Unable to create instances of: {}",
        type_names(type_infos),
    )]
    Unresolvable { type_infos: Vec<TypeInfo>, passes: usize },
    #[error(transparent)]
    Resolve(#[from] ResolveErrorKind),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleErrorKind),
}
