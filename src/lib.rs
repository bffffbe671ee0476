#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod blueprint;
pub(crate) mod component;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod dependency_resolver;
pub(crate) mod errors;
pub(crate) mod factory;
pub(crate) mod fields;
pub(crate) mod hierarchy;
pub(crate) mod inject;
pub(crate) mod instantiator;
pub(crate) mod lifecycle;
pub(crate) mod property;
pub(crate) mod provider;
pub(crate) mod provider_manager;
pub(crate) mod registry;
pub(crate) mod scanner;
pub(crate) mod service;
pub(crate) mod site;

pub mod utils;

pub use any::{Instance, TypeInfo};
pub use blueprint::Blueprint;
pub use component::Component;
pub use config::{Capabilities, Config, Modifiers};
pub use container::Container;
pub use dependency_resolver::{Dependencies, DependencyResolver, Resolution};
pub use errors::{InstantiateErrorKind, InstantiatorErrorKind, LifecycleErrorKind, ResolveErrorKind, ScanErrorKind};
pub use factory::{FactoryMethod, Methods, MethodsBuilder};
pub use fields::{Field, FieldSlot, Fields, Injectable, Slot};
pub use hierarchy::Supertypes;
pub use inject::{Inject, Requester};
pub use instantiator::{instance, Instantiator};
pub use lifecycle::{Destructible, Initiated};
pub use property::{Property, SimpleProperty};
pub use provider::{provider_fn, FnProvider, Provider, SingletonProvider};
pub use provider_manager::ProviderManager;
pub use scanner::{FixedScanner, Scanner};
pub use site::{Request, Site, SiteKind};
