use alloc::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    vec::Vec,
};
use tracing::debug;

use crate::{
    any::TypeInfo,
    hierarchy::{Cast, Edge},
    provider::{Provider, UpcastProvider},
    provider_manager::ProviderManager,
    utils::thread_safety::RcThreadSafety,
};

enum Entry {
    Single(RcThreadSafety<dyn Provider>),
    Ambiguous(RcThreadSafety<ProviderManager>),
}

impl Entry {
    fn provider(&self) -> RcThreadSafety<dyn Provider> {
        match self {
            Self::Single(provider) => provider.clone(),
            Self::Ambiguous(manager) => manager.clone(),
        }
    }
}

/// Providers by declared type plus the supertype graph used to register them.
///
/// A type has at most one entry. Once a second provider targets the type,
/// the entry becomes a [`ProviderManager`] and stays one until the type is removed.
pub(crate) struct Registry {
    entries: BTreeMap<TypeInfo, Entry>,
    hierarchy: BTreeMap<TypeInfo, Vec<Edge>>,
}

impl Registry {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            hierarchy: BTreeMap::new(),
        }
    }

    /// Adds supertype edges of the type, skipping already known targets.
    pub(crate) fn declare(&mut self, type_info: TypeInfo, edges: Vec<Edge>) {
        let known = self.hierarchy.entry(type_info).or_default();
        for edge in edges {
            if known.iter().all(|known| known.target != edge.target) {
                known.push(edge);
            }
        }
    }

    /// Registers the provider under the type without walking supertypes.
    pub(crate) fn put(&mut self, type_info: TypeInfo, provider: RcThreadSafety<dyn Provider>) {
        match self.entries.get(&type_info) {
            None => {
                self.entries.insert(type_info, Entry::Single(provider));
            }
            Some(Entry::Single(existing)) => {
                let manager = ProviderManager::new(type_info);
                manager.add(existing.clone());
                manager.add(provider);
                debug!(dependency = type_info.name, "Several providers registered, switched to manager");
                self.entries.insert(type_info, Entry::Ambiguous(RcThreadSafety::new(manager)));
            }
            Some(Entry::Ambiguous(manager)) => manager.add(provider),
        }
    }

    /// Registers the provider under its own type and, if `map_super_types` is set,
    /// under every supertype reachable from it.
    pub(crate) fn register_tree(&mut self, provider: RcThreadSafety<dyn Provider>, meta_types: &[TypeInfo], map_super_types: bool) {
        let type_info = provider.type_info();
        self.put(type_info, provider.clone());
        if !map_super_types {
            return;
        }
        for (ancestor, casts) in self.ancestors(type_info, meta_types) {
            debug!(dependency = type_info.name, ancestor = ancestor.name, "Registered as supertype");
            self.put(ancestor, RcThreadSafety::new(UpcastProvider::new(provider.clone(), ancestor, casts)));
        }
    }

    /// Breadth-first walk over declared supertypes. Every ancestor is reported once,
    /// with the casts leading to it. Meta types are neither reported nor walked through.
    #[must_use]
    pub(crate) fn ancestors(&self, type_info: TypeInfo, meta_types: &[TypeInfo]) -> Vec<(TypeInfo, Vec<Cast>)> {
        let mut ancestors = Vec::new();
        let mut visited = BTreeSet::from([type_info]);
        let mut queue = VecDeque::from([(type_info, Vec::new())]);

        while let Some((current, casts)) = queue.pop_front() {
            let Some(edges) = self.hierarchy.get(&current) else {
                continue;
            };
            for edge in edges {
                if meta_types.contains(&edge.target) || !visited.insert(edge.target) {
                    continue;
                }
                let mut chain: Vec<Cast> = casts.clone();
                chain.push(edge.cast.clone());
                ancestors.push((edge.target, chain.clone()));
                queue.push_back((edge.target, chain));
            }
        }
        ancestors
    }

    #[must_use]
    pub(crate) fn get(&self, type_info: &TypeInfo) -> Option<RcThreadSafety<dyn Provider>> {
        self.entries.get(type_info).map(Entry::provider)
    }

    #[must_use]
    pub(crate) fn contains(&self, type_info: &TypeInfo) -> bool {
        self.entries.contains_key(type_info)
    }

    #[must_use]
    pub(crate) fn is_ambiguous(&self, type_info: &TypeInfo) -> bool {
        matches!(self.entries.get(type_info), Some(Entry::Ambiguous(_)))
    }

    pub(crate) fn remove(&mut self, type_info: &TypeInfo) -> bool {
        self.entries.remove(type_info).is_some()
    }

    /// Removes the type and every supertype reachable the same way [`Self::register_tree`] walks.
    pub(crate) fn remove_tree(&mut self, type_info: TypeInfo, meta_types: &[TypeInfo]) -> usize {
        let mut removed = usize::from(self.remove(&type_info));
        for (ancestor, _) in self.ancestors(type_info, meta_types) {
            removed += usize::from(self.remove(&ancestor));
        }
        removed
    }

    /// Drops all providers. The supertype graph is kept.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
