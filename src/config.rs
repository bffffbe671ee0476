use alloc::{vec, vec::Vec};
use core::{
    any::Any,
    fmt::{Debug, Display},
};

use crate::{
    any::TypeInfo,
    fields::Injectable,
    lifecycle::{Destructible, Initiated},
    property::Property,
    provider::Provider,
};

bitflags::bitflags! {
    /// Declaration modifiers attached to fields and factory methods.
    /// Used only for filtering what gets injected or exposed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const TRANSIENT = 1 << 5;
        const NATIVE = 1 << 6;
    }
}

bitflags::bitflags! {
    /// Roles a component can play, requested from a scanner.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        /// Plain shared component.
        const SINGLETON = 1 << 0;
        const FACTORY = 1 << 1;
        const PROVIDER = 1 << 2;
        const PROPERTY = 1 << 3;
        const INITIATED = 1 << 4;
        const DESTRUCTIBLE = 1 << 5;
    }
}

/// Container configuration
/// ## Fields
/// - `fail_on_unknown_type`:
///   If `true`, requesting a type without a provider fails instead of creating it from a registered recipe.
///   Also makes a scan fail when some blueprints are still unresolved after all construction passes.
/// - `fail_on_ambiguous_dependency`:
///   If `true`, a request that matches neither a provider name nor a default provider fails.
///   Ad-hoc creation is used as a fallback only when both this and `fail_on_unknown_type` are `false`.
/// - `process_inherited_sites`:
///   If `true`, fields of embedded bases (see [`crate::Fields::inherit`]) are injected as well.
/// - `ignore_string_sites`:
///   If `true`, `String` fields are never filled from properties.
/// - `map_super_types`:
///   If `true`, every registered provider is also registered for all declared supertypes of its type.
/// - `max_construction_passes`:
///   Number of passes a scan makes over pending blueprints before giving up on them.
/// - `fields_ignore_filter` / `fields_ignore_signature`:
///   Fields having any of the filter modifiers or exactly the signature modifiers are skipped.
/// - `methods_ignore_filter` / `methods_ignore_signature`:
///   Same as above for factory methods.
/// - `meta_types`:
///   Types that never become provider keys when walking supertypes.
/// - `forbidden_method_names`:
///   Factory methods with these names are never exposed as providers.
#[derive(Debug, Clone)]
pub struct Config {
    pub fail_on_unknown_type: bool,
    pub fail_on_ambiguous_dependency: bool,
    pub process_inherited_sites: bool,
    pub ignore_string_sites: bool,
    pub map_super_types: bool,
    pub max_construction_passes: usize,
    pub fields_ignore_filter: Modifiers,
    pub fields_ignore_signature: Option<Modifiers>,
    pub methods_ignore_filter: Modifiers,
    pub methods_ignore_signature: Option<Modifiers>,
    pub meta_types: Vec<TypeInfo>,
    pub forbidden_method_names: Vec<&'static str>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fail_on_unknown_type: true,
            fail_on_ambiguous_dependency: true,
            process_inherited_sites: true,
            ignore_string_sites: false,
            map_super_types: true,
            max_construction_passes: 5,
            fields_ignore_filter: Modifiers::STATIC | Modifiers::TRANSIENT,
            fields_ignore_signature: Some(Modifiers::TRANSIENT),
            methods_ignore_filter: Modifiers::STATIC | Modifiers::NATIVE,
            methods_ignore_signature: None,
            meta_types: default_meta_types(),
            forbidden_method_names: vec![
                "clone",
                "clone_from",
                "eq",
                "ne",
                "fmt",
                "hash",
                "drop",
                "to_string",
                "type_id",
            ],
        }
    }
}

fn default_meta_types() -> Vec<TypeInfo> {
    vec![
        TypeInfo::of::<dyn Any>(),
        TypeInfo::of::<dyn Any + Send + Sync>(),
        TypeInfo::of::<dyn Debug>(),
        TypeInfo::of::<dyn Display>(),
        TypeInfo::of::<dyn Injectable>(),
        TypeInfo::of::<dyn Initiated>(),
        TypeInfo::of::<dyn Destructible>(),
        TypeInfo::of::<dyn Provider>(),
        TypeInfo::of::<dyn Property>(),
    ]
}

impl Config {
    #[inline]
    #[must_use]
    pub fn with_fail_on_unknown_type(mut self, value: bool) -> Self {
        self.fail_on_unknown_type = value;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_fail_on_ambiguous_dependency(mut self, value: bool) -> Self {
        self.fail_on_ambiguous_dependency = value;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_process_inherited_sites(mut self, value: bool) -> Self {
        self.process_inherited_sites = value;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_ignore_string_sites(mut self, value: bool) -> Self {
        self.ignore_string_sites = value;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_map_super_types(mut self, value: bool) -> Self {
        self.map_super_types = value;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_construction_passes(mut self, value: usize) -> Self {
        self.max_construction_passes = value;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_fields_ignore(mut self, filter: Modifiers, signature: Option<Modifiers>) -> Self {
        self.fields_ignore_filter = filter;
        self.fields_ignore_signature = signature;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_methods_ignore(mut self, filter: Modifiers, signature: Option<Modifiers>) -> Self {
        self.methods_ignore_filter = filter;
        self.methods_ignore_signature = signature;
        self
    }

    /// Adds a type to the meta denylist of the supertype walk.
    #[must_use]
    pub fn with_meta_type<T: ?Sized + 'static>(mut self) -> Self {
        let type_info = TypeInfo::of::<T>();
        if !self.meta_types.contains(&type_info) {
            self.meta_types.push(type_info);
        }
        self
    }

    #[must_use]
    pub fn is_meta_type(&self, type_info: &TypeInfo) -> bool {
        self.meta_types.contains(type_info)
    }

    /// Ad-hoc creation is allowed only when neither failure switch is on.
    #[inline]
    #[must_use]
    pub(crate) const fn allows_fallback(&self) -> bool {
        !(self.fail_on_unknown_type || self.fail_on_ambiguous_dependency)
    }

    #[inline]
    pub(crate) fn is_method_exposed(&self, name: &str, modifiers: Modifiers) -> bool {
        !self.methods_ignore_filter.intersects(modifiers)
            && self.methods_ignore_signature != Some(modifiers)
            && !self.forbidden_method_names.contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Modifiers};
    use crate::{any::TypeInfo, provider::Provider};

    trait Marker {}

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert!(config.fail_on_unknown_type);
        assert!(config.fail_on_ambiguous_dependency);
        assert!(config.process_inherited_sites);
        assert!(!config.ignore_string_sites);
        assert!(config.map_super_types);
        assert_eq!(config.max_construction_passes, 5);
        assert!(config.is_meta_type(&TypeInfo::of::<dyn Provider>()));
        assert!(!config.allows_fallback());
    }

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_fail_on_unknown_type(false)
            .with_fail_on_ambiguous_dependency(false)
            .with_max_construction_passes(2)
            .with_meta_type::<dyn Marker>()
            .with_meta_type::<dyn Marker>();

        assert!(config.allows_fallback());
        assert_eq!(config.max_construction_passes, 2);
        assert_eq!(
            config.meta_types.iter().filter(|ty| **ty == TypeInfo::of::<dyn Marker>()).count(),
            1
        );
    }

    #[test]
    fn test_method_exposure() {
        let config = Config::default();

        assert!(config.is_method_exposed("connection", Modifiers::PUBLIC));
        assert!(!config.is_method_exposed("connection", Modifiers::PUBLIC | Modifiers::STATIC));
        assert!(!config.is_method_exposed("clone", Modifiers::PUBLIC));
    }
}
