mod container;
mod dependency_resolver;
mod instantiate;
mod instantiator;
mod lifecycle;

pub use container::ScanErrorKind;
pub use dependency_resolver::ResolveErrorKind;
pub use instantiate::InstantiateErrorKind;
pub use instantiator::InstantiatorErrorKind;
pub use lifecycle::LifecycleErrorKind;

use alloc::string::String;

use crate::any::TypeInfo;

pub(crate) fn type_names(type_infos: &[TypeInfo]) -> String {
    let mut names = String::new();
    for (index, type_info) in type_infos.iter().enumerate() {
        if index > 0 {
            names.push_str(", ");
        }
        names.push_str(type_info.name);
    }
    names
}
