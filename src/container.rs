use alloc::{borrow::Cow, boxed::Box, collections::BTreeMap, string::String, vec::Vec};
use core::{any::type_name, mem};
use tracing::{debug, debug_span, error, info_span, warn};

use crate::{
    any::{Instance, TypeInfo},
    blueprint::Blueprint,
    component::{Component, Parts},
    config::{Capabilities, Config},
    errors::{LifecycleErrorKind, ResolveErrorKind, ScanErrorKind},
    fields::{Injectable, InjectionRules},
    hierarchy::{apply, Cast, Supertypes},
    lifecycle::{self, Destructible, Initiated, Schedule},
    property::{Property, PropertyStore},
    provider::{ContainerProvider, Provider, SingletonProvider},
    registry::Registry,
    scanner::Scanner,
    site::{Request, Site},
    utils::thread_safety::{Lock, RcThreadSafety, SendSafety, SyncSafety},
};

/// Recipe for ad-hoc creation, with the casts to the type it's registered under.
#[derive(Clone)]
struct Recipe {
    blueprint: Blueprint,
    casts: Vec<Cast>,
}

pub(crate) struct ContainerInner {
    config: Lock<Config>,
    registry: Lock<Registry>,
    properties: RcThreadSafety<PropertyStore>,
    recipes: Lock<BTreeMap<TypeInfo, Recipe>>,
    destructibles: Lock<Schedule<dyn Destructible>>,
    scanner: Lock<Option<RcThreadSafety<dyn Scanner>>>,
}

/// Registry of components with construction, injection and lifecycle management.
///
/// Cloning is cheap, clones share the same state.
/// No lock is held while providers, recipes or lifecycle callbacks run,
/// so they can use the container freely.
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: RcThreadSafety<ContainerInner>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn install_core(registry: &mut Registry, properties: &RcThreadSafety<PropertyStore>) {
    registry.put(TypeInfo::of::<Container>(), RcThreadSafety::new(ContainerProvider));
    registry.put(TypeInfo::of::<String>(), properties.clone());
}

fn downcast<T: ?Sized + 'static>(instance: &Instance) -> Result<RcThreadSafety<T>, ResolveErrorKind> {
    instance.downcast::<T>().ok_or_else(|| {
        let err = ResolveErrorKind::IncorrectType {
            expected: TypeInfo::of::<T>(),
            actual: instance.type_info(),
        };
        error!("{}", err);
        err
    })
}

impl Container {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let properties = RcThreadSafety::new(PropertyStore::new());
        let mut registry = Registry::new();
        install_core(&mut registry, &properties);

        Self {
            inner: RcThreadSafety::new(ContainerInner {
                config: Lock::new(config),
                registry: Lock::new(registry),
                properties,
                recipes: Lock::new(BTreeMap::new()),
                destructibles: Lock::new(Schedule::new()),
                scanner: Lock::new(None),
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_scanner(self, scanner: impl Scanner + 'static) -> Self {
        self.set_scanner(scanner);
        self
    }

    pub fn set_scanner(&self, scanner: impl Scanner + 'static) {
        *self.inner.scanner.write() = Some(RcThreadSafety::new(scanner));
    }

    #[must_use]
    pub fn config(&self) -> Config {
        self.inner.config.read().clone()
    }

    /// Changes the configuration in place. Affects subsequent operations only.
    pub fn update_config(&self, f: impl FnOnce(&mut Config)) {
        f(&mut self.inner.config.write());
    }

    pub(crate) fn allows_fallback(&self) -> bool {
        self.inner.config.read().allows_fallback()
    }

    fn walk_rules(&self) -> (Vec<TypeInfo>, bool) {
        let config = self.inner.config.read();
        (config.meta_types.clone(), config.map_super_types)
    }

    fn register_tree(&self, provider: RcThreadSafety<dyn Provider>) {
        let (meta_types, map_super_types) = self.walk_rules();
        self.inner.registry.write().register_tree(provider, &meta_types, map_super_types);
    }

    /// Registers a shared component with all its roles, then injects and initiates it.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::Injection`] if a field can't be injected
    /// - Returns [`ResolveErrorKind::Lifecycle`] if the initializer fails
    pub fn add<T: Component>(&self, component: T) -> Result<RcThreadSafety<T>, ResolveErrorKind> {
        self.add_rc(RcThreadSafety::new(component))
    }

    /// Same as [`Self::add`] for an already shared component.
    ///
    /// # Errors
    /// See [`Self::add`]
    pub fn add_rc<T: Component>(&self, component: RcThreadSafety<T>) -> Result<RcThreadSafety<T>, ResolveErrorKind> {
        let span = info_span!("add", component = type_name::<T>());
        let _guard = span.enter();

        let parts = Parts::new(component.clone());
        self.register_parts(&parts);
        self.inject_parts(&parts)?;
        if let Some(initiated) = &parts.initiated {
            lifecycle::initiate(parts.type_info(), &**initiated)?;
        }
        if let Some(destructible) = &parts.destructible {
            self.track_destructible(parts.type_info(), destructible.clone());
        }
        Ok(component)
    }

    pub fn add_provider<P: Provider + 'static>(&self, provider: P) {
        self.add_provider_rc(RcThreadSafety::new(provider));
    }

    pub fn add_provider_rc(&self, provider: RcThreadSafety<dyn Provider>) {
        debug!(dependency = provider.type_info().name, "Provider added");
        self.register_tree(provider);
    }

    /// Replaces whatever is registered under the provider type, supertypes are left as they are.
    pub fn replace<P: Provider + 'static>(&self, provider: P) {
        let provider: RcThreadSafety<dyn Provider> = RcThreadSafety::new(provider);
        let type_info = provider.type_info();
        let mut registry = self.inner.registry.write();
        registry.remove(&type_info);
        registry.put(type_info, provider);
    }

    /// Returns `true` if something was registered under the type.
    pub fn remove<T: ?Sized + 'static>(&self) -> bool {
        self.inner.registry.write().remove(&TypeInfo::of::<T>())
    }

    /// Removes the type and all its supertypes. Returns the number of removed registrations.
    /// Only the type itself is removed when supertype mapping is off.
    pub fn remove_tree<T: ?Sized + 'static>(&self) -> usize {
        let type_info = TypeInfo::of::<T>();
        let (meta_types, map_super_types) = self.walk_rules();
        let mut registry = self.inner.registry.write();
        if map_super_types {
            registry.remove_tree(type_info, &meta_types)
        } else {
            usize::from(registry.remove(&type_info))
        }
    }

    /// Drops every provider except the container itself and the property store.
    pub fn clear(&self) {
        let mut registry = self.inner.registry.write();
        registry.clear();
        install_core(&mut registry, &self.inner.properties);
        debug!("Registry cleared");
    }

    /// Adds the property, replacing the one with the same key.
    pub fn add_property<P: Property + 'static>(&self, property: P) -> Option<RcThreadSafety<dyn Property>> {
        self.inner.properties.add(RcThreadSafety::new(property))
    }

    /// Sets the property value, adding the property if the key is new. Returns the previous value.
    pub fn set_property(&self, key: &str, value: impl Into<String>) -> Option<String> {
        self.inner.properties.set(key, value.into())
    }

    #[must_use]
    pub fn get_property(&self, key: &str) -> Option<String> {
        self.inner.properties.get(key)
    }

    #[must_use]
    pub fn has_property(&self, key: &str) -> bool {
        self.inner.properties.contains(key)
    }

    pub fn remove_property(&self, key: &str) -> Option<RcThreadSafety<dyn Property>> {
        self.inner.properties.remove(key)
    }

    /// Resolves a dependency by its type.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::UnknownType`] if nothing provides the type and ad-hoc creation is off
    /// - Returns [`ResolveErrorKind::Ambiguous`] if several providers compete and none is default
    /// - Returns [`ResolveErrorKind::Construction`] if a created dependency can't be built
    pub fn get<T>(&self) -> Result<RcThreadSafety<T>, ResolveErrorKind>
    where
        T: ?Sized + SendSafety + SyncSafety + 'static,
    {
        let span = info_span!("get", dependency = type_name::<T>());
        let _guard = span.enter();

        let instance = self.resolve(TypeInfo::of::<T>(), Request::default())?;
        downcast(&instance)
    }

    /// Resolves the provider registered under `name` when several providers compete.
    ///
    /// # Errors
    /// See [`Self::get`]
    pub fn get_named<T>(&self, name: impl Into<Cow<'static, str>>) -> Result<RcThreadSafety<T>, ResolveErrorKind>
    where
        T: ?Sized + SendSafety + SyncSafety + 'static,
    {
        let site = Site::lookup(name, TypeInfo::of::<T>());
        let span = info_span!("get_named", dependency = type_name::<T>(), name = site.name.as_ref());
        let _guard = span.enter();

        let instance = self.resolve(TypeInfo::of::<T>(), Request::new(None, Some(&site)))?;
        downcast(&instance)
    }

    /// Resolves on behalf of `owner` through `site`.
    ///
    /// # Errors
    /// See [`Self::get`]
    pub fn get_for<T>(&self, owner: Option<&Instance>, site: Option<&Site>) -> Result<RcThreadSafety<T>, ResolveErrorKind>
    where
        T: ?Sized + SendSafety + SyncSafety + 'static,
    {
        let span = info_span!("get_for", dependency = type_name::<T>());
        let _guard = span.enter();

        let instance = self.resolve(TypeInfo::of::<T>(), Request::new(owner, site))?;
        downcast(&instance)
    }

    /// Resolves the type if something provides it, otherwise returns `default()`.
    ///
    /// # Errors
    /// See [`Self::get`]
    pub fn get_or_else<T>(&self, default: impl FnOnce() -> RcThreadSafety<T>) -> Result<RcThreadSafety<T>, ResolveErrorKind>
    where
        T: ?Sized + SendSafety + SyncSafety + 'static,
    {
        if self.is_available::<T>() {
            self.get()
        } else {
            Ok(default())
        }
    }

    #[must_use]
    pub fn is_available<T: ?Sized + 'static>(&self) -> bool {
        self.inner.registry.read().contains(&TypeInfo::of::<T>())
    }

    /// Builds a new unregistered instance from the recipe of `T`, injected and initiated.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NoRecipe`] if no recipe builds `T`
    /// - Returns [`ResolveErrorKind::Construction`] if the recipe fails
    pub fn create<T>(&self) -> Result<RcThreadSafety<T>, ResolveErrorKind>
    where
        T: ?Sized + SendSafety + SyncSafety + 'static,
    {
        let span = info_span!("create", dependency = type_name::<T>());
        let _guard = span.enter();

        let instance = self.create_erased(TypeInfo::of::<T>())?;
        downcast(&instance)
    }

    pub(crate) fn resolve(&self, type_info: TypeInfo, request: Request<'_>) -> Result<Instance, ResolveErrorKind> {
        let span = debug_span!("resolve", dependency = type_info.name, site = request.site_name());
        let _guard = span.enter();

        let provider = self.inner.registry.read().get(&type_info);
        if let Some(provider) = provider {
            return provider.provide(self, request);
        }

        let fail_on_unknown_type = self.inner.config.read().fail_on_unknown_type;
        if fail_on_unknown_type {
            let err = ResolveErrorKind::UnknownType { type_info };
            error!("{}", err);
            return Err(err);
        }

        warn!("Unknown type, creating ad hoc");
        self.create_erased(type_info)
    }

    /// Casts the instance to one of its registered supertypes.
    pub(crate) fn upcast(&self, instance: &Instance, target: TypeInfo) -> Option<Instance> {
        let (meta_types, _) = self.walk_rules();
        let casts = self
            .inner
            .registry
            .read()
            .ancestors(instance.type_info(), &meta_types)
            .into_iter()
            .find_map(|(ancestor, casts)| (ancestor == target).then_some(casts))?;
        apply(instance.clone(), &casts)
    }

    pub(crate) fn create_erased(&self, type_info: TypeInfo) -> Result<Instance, ResolveErrorKind> {
        let span = debug_span!("create", dependency = type_info.name);
        let _guard = span.enter();

        let recipe = self.inner.recipes.read().get(&type_info).cloned();
        let Some(recipe) = recipe else {
            let err = ResolveErrorKind::NoRecipe { type_info };
            error!("{}", err);
            return Err(err);
        };

        let parts = recipe.blueprint.build(self)?;
        self.inject_parts(&parts)?;
        if let Some(initiated) = &parts.initiated {
            lifecycle::initiate(parts.type_info(), &**initiated)?;
        }

        let actual = parts.type_info();
        apply(parts.instance, &recipe.casts).ok_or_else(|| {
            let err = ResolveErrorKind::IncorrectType { expected: type_info, actual };
            error!("{}", err);
            err
        })
    }

    /// Fills empty fields of a component that isn't necessarily registered.
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind::Injection`] naming the first field that can't be filled
    pub fn inject<T: Component>(&self, component: &RcThreadSafety<T>) -> Result<(), ResolveErrorKind> {
        let owner = Instance::new(component.clone());
        self.inject_fields(&owner, &**component)
    }

    fn inject_parts(&self, parts: &Parts) -> Result<(), ResolveErrorKind> {
        self.inject_fields(&parts.instance, &*parts.injectable)
    }

    fn inject_fields(&self, owner: &Instance, injectable: &dyn Injectable) -> Result<(), ResolveErrorKind> {
        let span = debug_span!("inject", component = owner.type_info().name);
        let _guard = span.enter();

        let rules = InjectionRules::from_config(&self.inner.config.read());
        for field in injectable.fields() {
            if !rules.accepts(&field) {
                continue;
            }

            let type_info = field.slot.type_info();
            let site = Site::field(field.name, type_info);
            let value = match self.resolve(type_info, Request::new(Some(owner), Some(&site))) {
                Ok(value) => value,
                Err(ResolveErrorKind::NoProperty { key }) if type_info == TypeInfo::of::<String>() => {
                    debug!(key = key.as_str(), "No property for field, left unset");
                    continue;
                }
                Err(err) => {
                    let err = ResolveErrorKind::Injection {
                        owner: owner.type_info(),
                        site: Cow::Borrowed(field.name),
                        source: Box::new(err),
                    };
                    error!("{}", err);
                    return Err(err);
                }
            };

            if let Err(value) = field.slot.assign(value) {
                let err = ResolveErrorKind::Injection {
                    owner: owner.type_info(),
                    site: Cow::Borrowed(field.name),
                    source: Box::new(ResolveErrorKind::IncorrectType {
                        expected: type_info,
                        actual: value.type_info(),
                    }),
                };
                error!("{}", err);
                return Err(err);
            }
            debug!(field = field.name, "Injected");
        }
        Ok(())
    }

    /// Registers the component provider, factory methods, its own provider role and property role.
    fn register_parts(&self, parts: &Parts) {
        let type_info = parts.type_info();
        self.inner.registry.write().declare(type_info, parts.supertypes.clone());
        self.register_tree(RcThreadSafety::new(SingletonProvider::new(
            parts.instance.clone(),
            parts.name.clone(),
            parts.is_default,
        )));

        if let Some(methods) = &parts.factory {
            let providers = {
                let config = self.inner.config.read();
                methods.providers(parts.is_default, |name, modifiers| config.is_method_exposed(name, modifiers))
            };
            for provider in providers {
                self.register_tree(RcThreadSafety::new(provider));
            }
        }
        if let Some(provider) = &parts.provider {
            self.register_tree(provider.clone());
        }
        if let Some(property) = &parts.property {
            self.inner.properties.add(property.clone());
        }
        debug!(component = type_info.name, name = parts.name.as_ref(), "Registered");
    }

    fn track_destructible(&self, type_info: TypeInfo, destructible: RcThreadSafety<dyn Destructible>) {
        let order = destructible.destruction_order();
        self.inner.destructibles.write().push(order, type_info, destructible);
    }

    /// Makes the recipe available for ad-hoc creation of its type and of all its supertypes.
    /// A supertype keeps the first recipe registered for it.
    pub fn register_recipe(&self, blueprint: Blueprint) {
        let type_info = blueprint.type_info();
        let (meta_types, _) = self.walk_rules();
        let ancestors = {
            let mut registry = self.inner.registry.write();
            registry.declare(type_info, blueprint.supertypes().to_vec());
            registry.ancestors(type_info, &meta_types)
        };

        let mut recipes = self.inner.recipes.write();
        for (ancestor, casts) in ancestors {
            recipes.entry(ancestor).or_insert_with(|| Recipe {
                blueprint: blueprint.clone(),
                casts,
            });
        }
        recipes.insert(
            type_info,
            Recipe {
                blueprint,
                casts: Vec::new(),
            },
        );
    }

    /// Declares `U` as a supertype of `S`, for types that aren't components themselves,
    /// e.g. one trait object type as another.
    pub fn declare_supertype<S, U>(&self, upcast: fn(RcThreadSafety<S>) -> RcThreadSafety<U>)
    where
        S: ?Sized + SendSafety + SyncSafety + 'static,
        U: ?Sized + SendSafety + SyncSafety + 'static,
    {
        let mut supertypes = Supertypes::<S>::new();
        supertypes.add::<U>(upcast);
        self.inner.registry.write().declare(TypeInfo::of::<S>(), supertypes.into_edges());
    }

    /// Scans `root` with the configured scanner and processes the found blueprints.
    ///
    /// # Errors
    /// - Returns [`ScanErrorKind::NoScanner`] if no scanner is set
    /// - See [`Self::process`]
    pub fn scan(&self, root: &str) -> Result<Vec<Instance>, ScanErrorKind> {
        let span = info_span!("scan", root);
        let _guard = span.enter();

        let scanner = self.inner.scanner.read().clone();
        let Some(scanner) = scanner else {
            let err = ScanErrorKind::NoScanner;
            error!("{}", err);
            return Err(err);
        };
        self.process(scanner.scan(root, Capabilities::all()))
    }

    /// Builds and registers the blueprints in passes, each pass building every blueprint
    /// whose dependencies are registered. Then injects all built components and runs
    /// their initializers in order.
    ///
    /// Blueprints still waiting after `max_construction_passes` passes fail the call if
    /// `fail_on_unknown_type` is set, otherwise they are built anyway, creating missing
    /// dependencies ad hoc. A dependency cycle then recurses without bound.
    ///
    /// # Errors
    /// - Returns [`ScanErrorKind::Unresolvable`] listing the blueprints left after the last pass
    /// - Returns [`ScanErrorKind::Resolve`] if building or injecting a component fails
    /// - Returns [`ScanErrorKind::Lifecycle`] if an initializer fails
    pub fn process(&self, blueprints: Vec<Blueprint>) -> Result<Vec<Instance>, ScanErrorKind> {
        let span = info_span!("process", blueprints = blueprints.len());
        let _guard = span.enter();

        for blueprint in &blueprints {
            self.register_recipe(blueprint.clone());
        }
        let (max_passes, fail_on_unknown_type) = {
            let config = self.inner.config.read();
            (config.max_construction_passes, config.fail_on_unknown_type)
        };

        let mut remaining = blueprints;
        let mut built = Vec::with_capacity(remaining.len());
        let mut initiation = Schedule::<dyn Initiated>::new();
        let mut passes = 0;

        while passes < max_passes && !remaining.is_empty() {
            passes += 1;
            let mut index = 0;
            while index < remaining.len() {
                if !self.is_buildable(&remaining[index]) {
                    index += 1;
                    continue;
                }
                let blueprint = remaining.remove(index);
                let parts = blueprint.build(self)?;
                self.process_scanned(&parts, &mut initiation);
                built.push(parts);
            }
            debug!(pass = passes, remaining = remaining.len(), "Construction pass finished");
        }

        if !remaining.is_empty() {
            if fail_on_unknown_type {
                let err = ScanErrorKind::Unresolvable {
                    type_infos: remaining.iter().map(Blueprint::type_info).collect(),
                    passes,
                };
                error!("{}", err);
                return Err(err);
            }
            for blueprint in remaining {
                warn!(component = blueprint.type_info().name, "Dependencies still missing, building anyway");
                let parts = blueprint.build(self)?;
                self.process_scanned(&parts, &mut initiation);
                built.push(parts);
            }
        }

        for parts in &built {
            self.inject_parts(parts)?;
        }
        lifecycle::initiate_all(initiation)?;

        debug!(built = built.len(), "Processed");
        Ok(built.into_iter().map(|parts| parts.instance).collect())
    }

    /// `String` parameters served by the property store wait until their property is added,
    /// so property components scanned later in the same batch are picked up.
    fn is_buildable(&self, blueprint: &Blueprint) -> bool {
        let registry = self.inner.registry.read();
        if !blueprint.dependencies().iter().all(|type_info| registry.contains(type_info)) {
            return false;
        }

        let string = TypeInfo::of::<String>();
        registry.is_ambiguous(&string)
            || blueprint
                .sites()
                .iter()
                .filter(|site| site.type_info == string)
                .all(|site| self.inner.properties.contains(&site.name))
    }

    fn process_scanned(&self, parts: &Parts, initiation: &mut Schedule<dyn Initiated>) {
        self.register_parts(parts);
        if let Some(destructible) = &parts.destructible {
            self.track_destructible(parts.type_info(), destructible.clone());
        }
        if let Some(initiated) = &parts.initiated {
            initiation.push(initiated.initiation_order(), parts.type_info(), initiated.clone());
        }
    }

    /// Tracks a destructible that isn't registered as a component.
    pub fn add_destructible<D: Destructible + 'static>(&self, destructible: RcThreadSafety<D>) {
        self.track_destructible(TypeInfo::of::<D>(), destructible);
    }

    /// Runs all tracked destructors in ascending order and forgets them.
    ///
    /// # Errors
    /// Returns the first destructor failure. Destructors after it don't run.
    pub fn destroy(&self) -> Result<(), LifecycleErrorKind> {
        let span = info_span!("destroy");
        let _guard = span.enter();

        let schedule = mem::take(&mut *self.inner.destructibles.write());
        debug!(count = schedule.len(), "Destroying");
        lifecycle::destroy_all(schedule)
    }

    /// Stops tracking the component and runs its destructor.
    /// Returns `false` if the component wasn't tracked.
    ///
    /// # Errors
    /// Returns the destructor failure
    pub fn destroy_component<T: ?Sized>(&self, component: &RcThreadSafety<T>) -> Result<bool, LifecycleErrorKind> {
        let removed = self.inner.destructibles.write().remove(component);
        match removed {
            Some((type_info, destructible)) => {
                lifecycle::destroy(type_info, &*destructible)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
