#![allow(dead_code)]

use criterion::{criterion_group, criterion_main, Criterion};
use stagedi::{Blueprint, Component, Container, FixedScanner, Inject, Injectable, Supertypes};
use std::sync::Arc;

trait Repo: Send + Sync {}

struct A(Arc<B>, Arc<C>);
struct B(i32);
struct C(Arc<CA>);
struct CA(Arc<dyn Repo>);
struct PgRepo;

impl Repo for PgRepo {}

macro_rules! plain_components {
    ($($ty:ident),*) => {
        $(
            impl Injectable for $ty {}
            impl Component for $ty {}
        )*
    };
}

plain_components!(A, B, C, CA);

impl Injectable for PgRepo {}

impl Component for PgRepo {
    fn supertypes(supertypes: &mut Supertypes<Self>) {
        supertypes.add::<dyn Repo>(|this| this);
    }
}

fn scanner() -> FixedScanner {
    FixedScanner::new()
        .with("app", Blueprint::new(|Inject(b): Inject<B>, Inject(c): Inject<C>| Ok(A(b, c))))
        .with("app", Blueprint::new(|Inject(ca): Inject<CA>| Ok(C(ca))))
        .with("app", Blueprint::new(|Inject(repo): Inject<dyn Repo>| Ok(CA(repo))))
        .with("app", Blueprint::new(|| Ok(B(1))))
        .with("app", Blueprint::new(|| Ok(PgRepo)))
}

fn resolve_benchmark(c: &mut Criterion) {
    let container = Container::default().with_scanner(scanner());
    container.scan("app").unwrap();

    c.bench_function("get_single", |b| {
        b.iter(|| container.get::<B>().unwrap());
    })
    .bench_function("get_supertype", |b| {
        b.iter(|| container.get::<dyn Repo>().unwrap());
    })
    .bench_function("create", |b| {
        b.iter(|| container.create::<C>().unwrap());
    })
    .bench_function("scan", |b| {
        b.iter(|| Container::default().with_scanner(scanner()).scan("app").unwrap());
    });
}

criterion_group!(benches, resolve_benchmark);
criterion_main!(benches);
