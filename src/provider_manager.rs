use alloc::{borrow::Cow, collections::BTreeMap, string::String, vec::Vec};
use tracing::{debug, debug_span, error};

use crate::{
    any::{Instance, TypeInfo},
    errors::ResolveErrorKind,
    provider::Provider,
    site::Request,
    utils::thread_safety::{Lock, RcThreadSafety},
    Container,
};

/// Provider standing in for several providers of the same type.
///
/// Picks a provider per request: the one named like the requesting site,
/// else the default one, else creates the type ad hoc when the configuration allows it.
pub struct ProviderManager {
    type_info: TypeInfo,
    providers: Lock<BTreeMap<String, RcThreadSafety<dyn Provider>>>,
    default: Lock<Option<RcThreadSafety<dyn Provider>>>,
}

impl ProviderManager {
    #[inline]
    #[must_use]
    pub(crate) fn new(type_info: TypeInfo) -> Self {
        Self {
            type_info,
            providers: Lock::new(BTreeMap::new()),
            default: Lock::new(None),
        }
    }

    /// Indexes the provider by its name. A default provider replaces the previous default.
    pub fn add(&self, provider: RcThreadSafety<dyn Provider>) {
        let name = String::from(provider.name());
        if provider.is_default() {
            debug!(name = name.as_str(), "Default provider set");
            *self.default.write() = Some(provider.clone());
        }
        self.providers.write().insert(name, provider);
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.providers.read().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }

    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default.read().is_some()
    }

    fn by_name(&self, name: &str) -> Option<RcThreadSafety<dyn Provider>> {
        self.providers.read().get(name).cloned()
    }
}

impl Provider for ProviderManager {
    fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(self.type_info.default_name())
    }

    fn provide(&self, container: &Container, request: Request<'_>) -> Result<Instance, ResolveErrorKind> {
        let span = debug_span!("provide_ambiguous", dependency = self.type_info.name, site = request.site_name());
        let _guard = span.enter();

        if let Some(provider) = request.site_name().and_then(|name| self.by_name(name)) {
            debug!("Matched by site name");
            return provider.provide(container, request);
        }

        let default = self.default.read().clone();
        if let Some(provider) = default {
            debug!("Default provider used");
            return provider.provide(container, request);
        }

        if !container.allows_fallback() {
            let err = ResolveErrorKind::Ambiguous {
                type_info: self.type_info,
                owner: request.owner_type(),
            };
            error!("{}", err);
            return Err(err);
        }

        debug!("No provider matched, creating ad hoc");
        container.create_erased(self.type_info)
    }
}
