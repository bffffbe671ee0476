use alloc::{string::String, vec::Vec};
use core::{
    any::{type_name, TypeId},
    cmp::Ordering,
    fmt::{self, Debug, Formatter},
};

use crate::utils::thread_safety::{RcAnyThreadSafety, RcThreadSafety, SendSafety, SyncSafety};

/// Declared type of a dependency site or a provider.
/// Compared by [`TypeId`] only, the name is kept for messages and default provider names.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    /// Type name without module path, generic arguments and `dyn` markers.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let name = self.name.strip_prefix("dyn ").unwrap_or(self.name);
        let name = name.split(|ch| ch == '<' || ch == ' ').next().unwrap_or(name);
        name.rsplit("::").next().unwrap_or(name)
    }

    /// Name used by providers that don't declare one: `HttpClient` becomes `http_client`.
    #[must_use]
    pub fn default_name(&self) -> String {
        let chars: Vec<char> = self.short_name().chars().collect();
        let mut name = String::with_capacity(chars.len() + 4);
        for (index, ch) in chars.iter().copied().enumerate() {
            if ch.is_uppercase() {
                if index > 0 {
                    let prev = chars[index - 1];
                    let next_is_lower = chars.get(index + 1).is_some_and(|next| next.is_lowercase());
                    if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                        name.push('_');
                    }
                }
                name.extend(ch.to_lowercase());
            } else {
                name.push(ch);
            }
        }
        name
    }

    /// Value kinds that are never injected into fields.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        [
            TypeId::of::<()>(),
            TypeId::of::<bool>(),
            TypeId::of::<char>(),
            TypeId::of::<i8>(),
            TypeId::of::<i16>(),
            TypeId::of::<i32>(),
            TypeId::of::<i64>(),
            TypeId::of::<i128>(),
            TypeId::of::<isize>(),
            TypeId::of::<u8>(),
            TypeId::of::<u16>(),
            TypeId::of::<u32>(),
            TypeId::of::<u64>(),
            TypeId::of::<u128>(),
            TypeId::of::<usize>(),
            TypeId::of::<f32>(),
            TypeId::of::<f64>(),
        ]
        .contains(&self.id)
    }
}

/// Type-erased shared component.
///
/// Holds a `RcThreadSafety<T>` where `T` is the declared type the instance was produced for,
/// so `T` can be a trait object such as `dyn Service`.
#[derive(Clone)]
pub struct Instance {
    type_info: TypeInfo,
    value: RcAnyThreadSafety,
}

impl Instance {
    #[inline]
    #[must_use]
    pub fn new<T>(value: RcThreadSafety<T>) -> Self
    where
        T: ?Sized + SendSafety + SyncSafety + 'static,
    {
        Self {
            type_info: TypeInfo::of::<T>(),
            value: RcThreadSafety::new(value),
        }
    }

    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn downcast<T: ?Sized + 'static>(&self) -> Option<RcThreadSafety<T>> {
        self.value.downcast_ref::<RcThreadSafety<T>>().cloned()
    }

    #[inline]
    #[must_use]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_info.id == TypeId::of::<T>()
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance").field("type", &self.type_info.name).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{Instance, TypeInfo};
    use crate::utils::thread_safety::{same_data, RcThreadSafety};

    trait Service: Send + Sync {
        fn id(&self) -> u8;
    }

    struct HttpClient;
    struct HTTPServer;
    struct Cache2Layer;

    impl Service for HttpClient {
        fn id(&self) -> u8 {
            7
        }
    }

    #[test]
    fn test_default_name() {
        assert_eq!(TypeInfo::of::<HttpClient>().default_name(), "http_client");
        assert_eq!(TypeInfo::of::<HTTPServer>().default_name(), "http_server");
        assert_eq!(TypeInfo::of::<Cache2Layer>().default_name(), "cache2_layer");
        assert_eq!(TypeInfo::of::<dyn Service>().default_name(), "service");
    }

    #[test]
    fn test_is_primitive() {
        assert!(TypeInfo::of::<i32>().is_primitive());
        assert!(TypeInfo::of::<bool>().is_primitive());
        assert!(!TypeInfo::of::<alloc::string::String>().is_primitive());
        assert!(!TypeInfo::of::<HttpClient>().is_primitive());
    }

    #[test]
    fn test_instance_downcast_trait_object() {
        let service: RcThreadSafety<dyn Service> = RcThreadSafety::new(HttpClient);
        let instance = Instance::new(service.clone());

        assert!(instance.is::<dyn Service>());
        assert!(instance.downcast::<HttpClient>().is_none());

        let resolved = instance.downcast::<dyn Service>().unwrap();
        assert_eq!(resolved.id(), 7);
        assert!(same_data(&service, &resolved));
    }
}
