use stagedi::{Blueprint, Capabilities, Component, Container, Destructible, Injectable, LifecycleErrorKind};
use std::{
    borrow::Cow,
    sync::{Arc, Mutex},
};
use tracing_test::traced_test;

struct Resource {
    order: i32,
    fails: bool,
    log: Arc<Mutex<Vec<i32>>>,
}

impl Injectable for Resource {}

impl Destructible for Resource {
    fn destruction_order(&self) -> i32 {
        self.order
    }

    fn destroy(&self) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(self.order);
        if self.fails {
            anyhow::bail!("resource {} is busy", self.order);
        }
        Ok(())
    }
}

impl Component for Resource {
    const CAPABILITIES: Capabilities = Capabilities::DESTRUCTIBLE;

    fn name(&self) -> Option<Cow<'static, str>> {
        Some(Cow::Owned(format!("resource_{}", self.order)))
    }

    fn as_destructible(self: Arc<Self>) -> Option<Arc<dyn Destructible>> {
        Some(self)
    }
}

fn resource(order: i32, fails: bool, log: &Arc<Mutex<Vec<i32>>>) -> Resource {
    Resource {
        order,
        fails,
        log: log.clone(),
    }
}

#[test]
#[traced_test]
fn test_destruction_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::default();
    for order in [3, 1, 2] {
        container.add(resource(order, false, &log)).unwrap();
    }

    container.destroy().unwrap();
    assert_eq!(*log.lock().unwrap(), [1, 2, 3]);

    container.destroy().unwrap();
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[test]
#[traced_test]
fn test_destruction_aborts_on_failure() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::default();
    container.add(resource(1, false, &log)).unwrap();
    container.add(resource(2, true, &log)).unwrap();
    container.add(resource(3, false, &log)).unwrap();

    let err = container.destroy().unwrap_err();

    assert!(matches!(err, LifecycleErrorKind::Destruction { .. }));
    assert_eq!(*log.lock().unwrap(), [1, 2]);
}

#[test]
#[traced_test]
fn test_scanned_destructibles() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::default();
    let blueprints = [5, -2, 0]
        .into_iter()
        .map(|order| {
            let log = log.clone();
            Blueprint::new(move || Ok(resource(order, false, &log)))
        })
        .collect();

    container.process(blueprints).unwrap();
    container.destroy().unwrap();

    assert_eq!(*log.lock().unwrap(), [-2, 0, 5]);
}

#[test]
#[traced_test]
fn test_destroy_single_component() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::default();
    let first = container.add(resource(1, false, &log)).unwrap();
    container.add(resource(2, false, &log)).unwrap();

    assert!(container.destroy_component(&first).unwrap());
    assert!(!container.destroy_component(&first).unwrap());

    container.destroy().unwrap();
    assert_eq!(*log.lock().unwrap(), [1, 2]);
}

#[test]
#[traced_test]
fn test_external_destructible() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let container = Container::default();
    container.add_destructible(Arc::new(resource(4, false, &log)));
    container.add(resource(1, false, &log)).unwrap();

    assert_eq!(container.get::<Resource>().unwrap().order, 1);

    container.destroy().unwrap();
    assert_eq!(*log.lock().unwrap(), [1, 4]);
}
