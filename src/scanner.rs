use alloc::{borrow::Cow, vec::Vec};

use crate::{blueprint::Blueprint, config::Capabilities, utils::thread_safety::{SendSafety, SyncSafety}};

/// Source of candidate components for [`crate::Container::scan`].
pub trait Scanner: SendSafety + SyncSafety {
    /// Blueprints under `root` playing at least one of `capabilities`.
    fn scan(&self, root: &str, capabilities: Capabilities) -> Vec<Blueprint>;
}

/// Scanner over a fixed list of blueprints, each under a `::`-separated namespace.
#[derive(Clone, Default)]
pub struct FixedScanner {
    entries: Vec<(Cow<'static, str>, Blueprint)>,
}

impl FixedScanner {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    #[must_use]
    pub fn with(mut self, namespace: impl Into<Cow<'static, str>>, blueprint: Blueprint) -> Self {
        self.entries.push((namespace.into(), blueprint));
        self
    }
}

fn is_within(namespace: &str, root: &str) -> bool {
    root.is_empty()
        || namespace
            .strip_prefix(root)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

impl Scanner for FixedScanner {
    fn scan(&self, root: &str, capabilities: Capabilities) -> Vec<Blueprint> {
        self.entries
            .iter()
            .filter(|(namespace, blueprint)| is_within(namespace, root) && blueprint.capabilities().intersects(capabilities))
            .map(|(_, blueprint)| blueprint.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{FixedScanner, Scanner as _};
    use crate::{any::TypeInfo, config::Capabilities, fields::Injectable, Blueprint, Component};

    struct Pool;
    struct Cache;
    struct Metrics;

    impl Injectable for Pool {}
    impl Component for Pool {}
    impl Injectable for Cache {}
    impl Component for Cache {}
    impl Injectable for Metrics {}
    impl Component for Metrics {
        const CAPABILITIES: Capabilities = Capabilities::FACTORY;
    }

    fn scanner() -> FixedScanner {
        FixedScanner::new()
            .with("app::db", Blueprint::new(|| Ok(Pool)))
            .with("app::dbx", Blueprint::new(|| Ok(Cache)))
            .with("app::db::metrics", Blueprint::new(|| Ok(Metrics)))
    }

    fn types(found: &[crate::Blueprint]) -> alloc::vec::Vec<TypeInfo> {
        found.iter().map(crate::Blueprint::type_info).collect()
    }

    #[test]
    fn test_scan_namespace() {
        let scanner = scanner();

        let found = scanner.scan("app::db", Capabilities::all());
        assert_eq!(types(&found), [TypeInfo::of::<Pool>(), TypeInfo::of::<Metrics>()]);

        assert_eq!(scanner.scan("", Capabilities::all()).len(), 3);
        assert!(scanner.scan("other", Capabilities::all()).is_empty());
    }

    #[test]
    fn test_scan_capabilities() {
        let found = scanner().scan("app", Capabilities::FACTORY | Capabilities::PROVIDER);
        assert_eq!(types(&found), [TypeInfo::of::<Metrics>()]);
    }
}
