use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum LifecycleErrorKind {
    #[error("Unable to initiate component: {}", type_info.name)]
    Initiation {
        type_info: TypeInfo,
        #[source]
        source: anyhow::Error,
    },
    #[error("Unable to destroy component: {}", type_info.name)]
    Destruction {
        type_info: TypeInfo,
        #[source]
        source: anyhow::Error,
    },
}
