use alloc::{borrow::Cow, format};

use crate::any::{Instance, TypeInfo};

/// Where a dependency request comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteKind {
    Field,
    Parameter { index: usize },
    MethodParameter { method: Cow<'static, str>, index: usize },
    /// Explicit lookup made through the container API.
    Lookup,
}

/// Descriptor of a field or parameter requesting a dependency.
/// Its name is what ambiguous providers are matched against.
#[derive(Debug, Clone)]
pub struct Site {
    pub name: Cow<'static, str>,
    pub kind: SiteKind,
    pub type_info: TypeInfo,
}

impl Site {
    #[inline]
    #[must_use]
    pub fn field(name: impl Into<Cow<'static, str>>, type_info: TypeInfo) -> Self {
        Self {
            name: name.into(),
            kind: SiteKind::Field,
            type_info,
        }
    }

    #[inline]
    #[must_use]
    pub fn parameter(index: usize, type_info: TypeInfo) -> Self {
        Self {
            name: Cow::Owned(format!("arg{index}")),
            kind: SiteKind::Parameter { index },
            type_info,
        }
    }

    #[inline]
    #[must_use]
    pub fn method_parameter(method: impl Into<Cow<'static, str>>, index: usize, type_info: TypeInfo) -> Self {
        Self {
            name: Cow::Owned(format!("arg{index}")),
            kind: SiteKind::MethodParameter {
                method: method.into(),
                index,
            },
            type_info,
        }
    }

    #[inline]
    #[must_use]
    pub fn lookup(name: impl Into<Cow<'static, str>>, type_info: TypeInfo) -> Self {
        Self {
            name: name.into(),
            kind: SiteKind::Lookup,
            type_info,
        }
    }

    #[inline]
    #[must_use]
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }
}

/// Context of a single `provide` call: who asks and through which site.
#[derive(Debug, Clone, Copy, Default)]
pub struct Request<'a> {
    pub owner: Option<&'a Instance>,
    pub site: Option<&'a Site>,
}

impl<'a> Request<'a> {
    #[inline]
    #[must_use]
    pub const fn new(owner: Option<&'a Instance>, site: Option<&'a Site>) -> Self {
        Self { owner, site }
    }

    #[inline]
    #[must_use]
    pub fn site_name(&self) -> Option<&'a str> {
        self.site.map(|site| site.name.as_ref())
    }

    #[inline]
    #[must_use]
    pub fn owner_type(&self) -> Option<TypeInfo> {
        self.owner.map(Instance::type_info)
    }
}

#[cfg(test)]
mod tests {
    use super::{Request, Site, SiteKind};
    use crate::any::{Instance, TypeInfo};
    use crate::utils::thread_safety::RcThreadSafety;

    struct Pool;

    #[test]
    fn test_parameter_names() {
        let site = Site::parameter(2, TypeInfo::of::<Pool>());
        assert_eq!(site.name, "arg2");
        assert_eq!(site.kind, SiteKind::Parameter { index: 2 });

        let site = Site::method_parameter("connection", 0, TypeInfo::of::<Pool>()).named("pool");
        assert_eq!(site.name, "pool");
        assert_eq!(
            site.kind,
            SiteKind::MethodParameter {
                method: "connection".into(),
                index: 0
            }
        );
    }

    #[test]
    fn test_request_accessors() {
        let owner = Instance::new(RcThreadSafety::new(Pool));
        let site = Site::field("pool", TypeInfo::of::<Pool>());

        let request = Request::new(Some(&owner), Some(&site));
        assert_eq!(request.site_name(), Some("pool"));
        assert_eq!(request.owner_type(), Some(TypeInfo::of::<Pool>()));

        let request = Request::default();
        assert!(request.site_name().is_none());
        assert!(request.owner_type().is_none());
    }
}
