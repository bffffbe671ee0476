use alloc::{borrow::Cow, boxed::Box, vec::Vec};
use tracing::{debug, debug_span, error};

use crate::{
    any::TypeInfo,
    component::{supertype_edges, Component, Parts},
    config::Capabilities,
    dependency_resolver::Dependencies,
    errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
    hierarchy::Edge,
    instantiator::Instantiator,
    service::{service_fn, BoxCloneService, Service as _},
    site::Site,
    utils::thread_safety::RcThreadSafety,
    Container,
};

type BoxedBuild = BoxCloneService<(Container, RcThreadSafety<[Site]>), Parts, ResolveErrorKind>;

/// Pending component: its recipe plus the types the recipe needs.
#[derive(Clone)]
pub struct Blueprint {
    type_info: TypeInfo,
    dependencies: Vec<TypeInfo>,
    sites: RcThreadSafety<[Site]>,
    capabilities: Capabilities,
    supertypes: Vec<Edge>,
    build: BoxedBuild,
}

impl Blueprint {
    #[must_use]
    pub fn new<Inst, Deps>(instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps, Error = InstantiateErrorKind>,
        Inst::Provides: Component,
        Deps: Dependencies,
    {
        let type_info = TypeInfo::of::<Inst::Provides>();
        let sites: Vec<Site> = Deps::type_infos()
            .into_iter()
            .enumerate()
            .map(|(index, type_info)| Site::parameter(index, type_info))
            .collect();

        let build = BoxCloneService::new(service_fn({
            move |(container, sites): (Container, RcThreadSafety<[Site]>)| {
                let span = debug_span!("build", component = type_info.name);
                let _guard = span.enter();

                let dependencies = match Deps::resolve(&container, None, None, &sites) {
                    Ok(dependencies) => dependencies,
                    Err(err) => {
                        let err = ResolveErrorKind::Construction {
                            type_info,
                            source: InstantiatorErrorKind::Deps(Box::new(err)),
                        };
                        error!("{}", err);
                        return Err(err);
                    }
                };
                let component = match instantiator.clone().instantiate(dependencies) {
                    Ok(component) => component,
                    Err(err) => {
                        let err = ResolveErrorKind::Construction {
                            type_info,
                            source: InstantiatorErrorKind::Factory(err),
                        };
                        error!("{}", err);
                        return Err(err);
                    }
                };

                debug!("Built");
                Ok(Parts::new(RcThreadSafety::new(component)))
            }
        }));

        Self {
            type_info,
            dependencies: Deps::required(),
            sites: sites.into(),
            capabilities: <Inst::Provides as Component>::CAPABILITIES,
            supertypes: supertype_edges::<Inst::Provides>(),
            build,
        }
    }

    /// Renames constructor parameters, in order. Names are matched against provider names
    /// of ambiguous types and used as property keys for `String` parameters.
    #[must_use]
    pub fn with_parameter_names<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Cow<'static, str>>,
    {
        let mut sites = self.sites.to_vec();
        for (site, name) in sites.iter_mut().zip(names) {
            site.name = name.into();
        }
        self.sites = sites.into();
        self
    }

    /// Overrides the roles announced to scanners.
    #[inline]
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// Types that must be registered before the recipe can run.
    #[inline]
    #[must_use]
    pub fn dependencies(&self) -> &[TypeInfo] {
        &self.dependencies
    }

    #[inline]
    #[must_use]
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    #[inline]
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    #[inline]
    pub(crate) fn supertypes(&self) -> &[Edge] {
        &self.supertypes
    }

    pub(crate) fn build(&self, container: &Container) -> Result<Parts, ResolveErrorKind> {
        self.build.clone().call((container.clone(), self.sites.clone()))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::Blueprint;
    use crate::{
        any::TypeInfo,
        config::Capabilities,
        errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
        fields::Injectable,
        inject::{Inject, Requester},
        utils::thread_safety::RcThreadSafety,
        Component, Container,
    };

    use tracing_test::traced_test;

    struct Pool;

    impl Injectable for Pool {}
    impl Component for Pool {}

    struct Repo {
        #[allow(dead_code)]
        pool: RcThreadSafety<Pool>,
    }

    impl Injectable for Repo {}
    impl Component for Repo {}

    #[test]
    fn test_metadata() {
        let blueprint = Blueprint::new(|Inject(pool): Inject<Pool>, Requester(_): Requester| Ok(Repo { pool }))
            .with_parameter_names(["pool"]);

        assert_eq!(blueprint.type_info(), TypeInfo::of::<Repo>());
        assert_eq!(blueprint.dependencies(), [TypeInfo::of::<Pool>()]);
        assert_eq!(blueprint.sites().len(), 2);
        assert_eq!(blueprint.sites()[0].name, "pool");
        assert_eq!(blueprint.sites()[1].name, "arg1");
        assert_eq!(blueprint.capabilities(), Capabilities::SINGLETON);

        let blueprint = blueprint.with_capabilities(Capabilities::FACTORY);
        assert_eq!(blueprint.capabilities(), Capabilities::FACTORY);
    }

    #[test]
    #[traced_test]
    fn test_build() {
        let container = Container::default();
        let blueprint = Blueprint::new(|Inject(pool): Inject<Pool>| Ok(Repo { pool }));

        let err = blueprint.build(&container).err().unwrap();
        assert!(matches!(
            err,
            ResolveErrorKind::Construction {
                source: InstantiatorErrorKind::Deps(_),
                ..
            }
        ));

        container.add(Pool).unwrap();
        let parts = blueprint.build(&container).unwrap();
        assert!(parts.instance.is::<Repo>());
    }

    #[test]
    #[traced_test]
    fn test_build_failure() {
        let container = Container::default();
        let blueprint = Blueprint::new(|| -> Result<Pool, InstantiateErrorKind> { Err(anyhow::anyhow!("no pool").into()) });

        let err = blueprint.build(&container).err().unwrap();
        assert!(matches!(
            err,
            ResolveErrorKind::Construction {
                source: InstantiatorErrorKind::Factory(_),
                ..
            }
        ));
    }
}
