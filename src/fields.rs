use alloc::vec::Vec;

use crate::{
    any::{Instance, TypeInfo},
    config::{Config, Modifiers},
    utils::thread_safety::{Lock, RcThreadSafety, SendSafety, SyncSafety},
};

/// Late-bound reference filled by the container after construction.
///
/// Injection only fills empty slots. [`Slot::set`] overwrites unconditionally.
pub struct Slot<T: ?Sized>(Lock<Option<RcThreadSafety<T>>>);

impl<T: ?Sized> Slot<T> {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Lock::new(None))
    }

    #[inline]
    #[must_use]
    pub fn with(value: RcThreadSafety<T>) -> Self {
        Self(Lock::new(Some(value)))
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<RcThreadSafety<T>> {
        self.0.read().clone()
    }

    #[inline]
    pub fn set(&self, value: RcThreadSafety<T>) {
        *self.0.write() = Some(value);
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.read().is_none()
    }
}

impl<T: ?Sized> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased access to a [`Slot`].
pub trait FieldSlot: SendSafety + SyncSafety {
    fn type_info(&self) -> TypeInfo;

    fn is_empty(&self) -> bool;

    /// Stores the instance, giving it back if it isn't of the slot type.
    ///
    /// # Errors
    /// Returns the instance when its declared type differs from the slot type.
    fn assign(&self, instance: Instance) -> Result<(), Instance>;
}

impl<T> FieldSlot for Slot<T>
where
    T: ?Sized + SendSafety + SyncSafety + 'static,
{
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn is_empty(&self) -> bool {
        Slot::is_empty(self)
    }

    fn assign(&self, instance: Instance) -> Result<(), Instance> {
        match instance.downcast::<T>() {
            Some(value) => {
                self.set(value);
                Ok(())
            }
            None => Err(instance),
        }
    }
}

/// Injectable field of a component.
pub struct Field<'a> {
    pub name: &'static str,
    pub modifiers: Modifiers,
    /// `0` for own fields, incremented for every [`Fields::inherit`] level.
    pub depth: usize,
    pub slot: &'a dyn FieldSlot,
}

/// Field list returned by [`Injectable::fields`].
#[derive(Default)]
pub struct Fields<'a> {
    fields: Vec<Field<'a>>,
}

impl<'a> Fields<'a> {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds a private field.
    #[inline]
    #[must_use]
    pub fn field(self, name: &'static str, slot: &'a dyn FieldSlot) -> Self {
        self.field_with(name, Modifiers::PRIVATE, slot)
    }

    #[must_use]
    pub fn field_with(mut self, name: &'static str, modifiers: Modifiers, slot: &'a dyn FieldSlot) -> Self {
        self.fields.push(Field {
            name,
            modifiers,
            depth: 0,
            slot,
        });
        self
    }

    /// Adds fields of an embedded base one level deeper.
    #[must_use]
    pub fn inherit(mut self, base: &'a dyn Injectable) -> Self {
        for mut field in base.fields() {
            field.depth += 1;
            self.fields.push(field);
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for Fields<'a> {
    type Item = Field<'a>;
    type IntoIter = alloc::vec::IntoIter<Field<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Exposes the fields the container fills after construction.
///
/// ```rust,ignore
/// impl Injectable for UserService {
///     fn fields(&self) -> Fields<'_> {
///         Fields::new().field("repo", &self.repo).field("retries", &self.retries)
///     }
/// }
/// ```
pub trait Injectable: SendSafety + SyncSafety {
    fn fields(&self) -> Fields<'_> {
        Fields::new()
    }
}

/// Field filter copied out of [`Config`], so no config lock is held while injecting.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InjectionRules {
    process_inherited: bool,
    ignore_strings: bool,
    ignore_filter: Modifiers,
    ignore_signature: Option<Modifiers>,
}

impl InjectionRules {
    #[must_use]
    pub(crate) fn from_config(config: &Config) -> Self {
        Self {
            process_inherited: config.process_inherited_sites,
            ignore_strings: config.ignore_string_sites,
            ignore_filter: config.fields_ignore_filter,
            ignore_signature: config.fields_ignore_signature,
        }
    }

    #[must_use]
    pub(crate) fn accepts(&self, field: &Field<'_>) -> bool {
        let type_info = field.slot.type_info();
        if field.depth > 0 && !self.process_inherited {
            return false;
        }
        if type_info.is_primitive() || (self.ignore_strings && type_info == TypeInfo::of::<alloc::string::String>()) {
            return false;
        }
        if self.ignore_filter.intersects(field.modifiers) || self.ignore_signature == Some(field.modifiers) {
            return false;
        }
        field.slot.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Field, FieldSlot as _, Fields, Injectable, InjectionRules, Slot};
    use crate::{
        any::Instance,
        config::{Config, Modifiers},
        utils::thread_safety::RcThreadSafety,
    };

    use alloc::{string::String, vec::Vec};

    struct Pool;

    #[derive(Default)]
    struct Base {
        pool: Slot<Pool>,
    }

    impl Injectable for Base {
        fn fields(&self) -> Fields<'_> {
            Fields::new().field("pool", &self.pool)
        }
    }

    #[derive(Default)]
    struct Service {
        base: Base,
        name: Slot<String>,
        attempts: Slot<u32>,
        cache: Slot<Pool>,
    }

    impl Injectable for Service {
        fn fields(&self) -> Fields<'_> {
            Fields::new()
                .field("name", &self.name)
                .field("attempts", &self.attempts)
                .field_with("cache", Modifiers::TRANSIENT, &self.cache)
                .inherit(&self.base)
        }
    }

    fn accepted(rules: InjectionRules, service: &Service) -> Vec<&'static str> {
        service
            .fields()
            .into_iter()
            .filter(|field: &Field<'_>| rules.accepts(field))
            .map(|field| field.name)
            .collect()
    }

    #[test]
    fn test_slot_assign() {
        let slot = Slot::<Pool>::new();
        assert!(slot.is_empty());

        assert!(slot.assign(Instance::new(RcThreadSafety::new(1u8))).is_err());
        assert!(slot.is_empty());

        assert!(slot.assign(Instance::new(RcThreadSafety::new(Pool))).is_ok());
        assert!(slot.get().is_some());
    }

    #[test]
    fn test_inherited_depth() {
        let service = Service::default();
        let fields: Vec<_> = service.fields().into_iter().map(|field| (field.name, field.depth)).collect();

        assert_eq!(fields, [("name", 0), ("attempts", 0), ("cache", 0), ("pool", 1)]);
    }

    #[test]
    fn test_rules() {
        let service = Service::default();

        let rules = InjectionRules::from_config(&Config::default());
        assert_eq!(accepted(rules, &service), ["name", "pool"]);

        let rules = InjectionRules::from_config(
            &Config::default()
                .with_ignore_string_sites(true)
                .with_process_inherited_sites(false),
        );
        assert!(accepted(rules, &service).is_empty());

        let rules = InjectionRules::from_config(&Config::default().with_fields_ignore(Modifiers::STATIC, None));
        assert_eq!(accepted(rules, &service), ["name", "cache", "pool"]);

        service.base.pool.set(RcThreadSafety::new(Pool));
        assert_eq!(accepted(rules, &service), ["name", "cache"]);
    }
}
