use alloc::{
    borrow::Cow,
    collections::BTreeMap,
    string::{String, ToString as _},
};
use core::mem;
use tracing::{debug, error};

use crate::{
    any::{Instance, TypeInfo},
    errors::ResolveErrorKind,
    provider::Provider,
    site::Request,
    utils::thread_safety::{Lock, RcThreadSafety, SendSafety, SyncSafety},
    Container,
};

/// Named mutable string value, injected into `String` sites with the same name.
pub trait Property: SendSafety + SyncSafety {
    fn key(&self) -> Cow<'_, str>;

    fn value(&self) -> String;

    /// Replaces the value, returning the previous one.
    fn set_value(&self, value: String) -> String;
}

pub struct SimpleProperty {
    key: Cow<'static, str>,
    value: Lock<String>,
}

impl SimpleProperty {
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Lock::new(value.into()),
        }
    }
}

impl Property for SimpleProperty {
    fn key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.key.as_ref())
    }

    fn value(&self) -> String {
        self.value.read().clone()
    }

    fn set_value(&self, value: String) -> String {
        mem::replace(&mut *self.value.write(), value)
    }
}

/// Properties by key. Also the default provider of `String`.
pub(crate) struct PropertyStore {
    properties: Lock<BTreeMap<String, RcThreadSafety<dyn Property>>>,
}

impl PropertyStore {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            properties: Lock::new(BTreeMap::new()),
        }
    }

    /// Adds the property, replacing the one registered under the same key.
    pub(crate) fn add(&self, property: RcThreadSafety<dyn Property>) -> Option<RcThreadSafety<dyn Property>> {
        let key = property.key().to_string();
        debug!(key = key.as_str(), "Property added");
        self.properties.write().insert(key, property)
    }

    /// Updates the value in place if the key is known, otherwise adds a new property.
    pub(crate) fn set(&self, key: &str, value: String) -> Option<String> {
        let property = self.properties.read().get(key).cloned();
        if let Some(property) = property {
            return Some(property.set_value(value));
        }
        self.add(RcThreadSafety::new(SimpleProperty::new(key.to_string(), value)));
        None
    }

    #[must_use]
    pub(crate) fn get(&self, key: &str) -> Option<String> {
        let property = self.properties.read().get(key).cloned();
        property.map(|property| property.value())
    }

    #[must_use]
    pub(crate) fn contains(&self, key: &str) -> bool {
        self.properties.read().contains_key(key)
    }

    pub(crate) fn remove(&self, key: &str) -> Option<RcThreadSafety<dyn Property>> {
        self.properties.write().remove(key)
    }
}

impl Provider for PropertyStore {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<String>()
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed("properties")
    }

    fn is_default(&self) -> bool {
        true
    }

    fn provide(&self, _container: &Container, request: Request<'_>) -> Result<Instance, ResolveErrorKind> {
        let key = request.site_name().unwrap_or_default();
        match self.get(key) {
            Some(value) => Ok(Instance::new(RcThreadSafety::new(value))),
            None => {
                let err = ResolveErrorKind::NoProperty { key: key.to_string() };
                error!("{}", err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{Property as _, PropertyStore, SimpleProperty};
    use crate::{
        any::TypeInfo,
        errors::ResolveErrorKind,
        provider::Provider as _,
        site::{Request, Site},
        utils::thread_safety::RcThreadSafety,
        Container,
    };

    use alloc::string::{String, ToString as _};
    use tracing_test::traced_test;

    #[test]
    fn test_simple_property() {
        let property = SimpleProperty::new("retries", "3");

        assert_eq!(property.key(), "retries");
        assert_eq!(property.set_value("5".to_string()), "3");
        assert_eq!(property.value(), "5");
    }

    #[test]
    fn test_store_replace_by_key() {
        let store = PropertyStore::new();

        assert!(store.add(RcThreadSafety::new(SimpleProperty::new("retries", "3"))).is_none());
        assert!(store.add(RcThreadSafety::new(SimpleProperty::new("retries", "4"))).is_some());
        assert_eq!(store.get("retries").as_deref(), Some("4"));

        assert_eq!(store.set("retries", "5".to_string()).as_deref(), Some("4"));
        assert_eq!(store.set("timeout", "30".to_string()), None);
        assert!(store.contains("timeout"));
        assert_eq!(store.get("timeout").as_deref(), Some("30"));

        assert!(store.remove("timeout").is_some());
        assert!(!store.contains("timeout"));
    }

    #[test]
    #[traced_test]
    fn test_store_provides_by_site_name() {
        let container = Container::default();
        let store = PropertyStore::new();
        store.set("retries", "3".to_string());

        let site = Site::field("retries", TypeInfo::of::<String>());
        let value = store.provide(&container, Request::new(None, Some(&site))).unwrap();
        assert_eq!(*value.downcast::<String>().unwrap(), "3");

        let site = Site::field("timeout", TypeInfo::of::<String>());
        let err = store.provide(&container, Request::new(None, Some(&site))).unwrap_err();
        assert!(matches!(err, ResolveErrorKind::NoProperty { key } if key == "timeout"));
    }
}
