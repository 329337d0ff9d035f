//! # Entity Performance Benchmark
//!
//! Measures the per-tick costs the simulation loop pays:
//! - Entity creation and destruction through a context
//! - Component attach / lookup on a single entity
//! - Snapshot iteration filtered by component type
//!
//! Run with: `cargo bench --package realm_core`

// Benchmarks don't need docs and may have intentionally unused code
#![allow(missing_docs)]
#![allow(dead_code)]

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use realm_core::{Component, Context, ContextConfig, EntityKind, IdAllocator};

#[derive(Clone, Copy)]
struct Position {
    x: f32,
    z: f32,
}
impl Component for Position {}

#[derive(Clone, Copy)]
struct Health(u32);
impl Component for Health {}

fn context() -> Context {
    Context::with_allocator(ContextConfig::named("bench"), Arc::new(IdAllocator::new()))
}

/// Benchmark: create then destroy entities.
fn bench_create_destroy(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_destroy");

    for count in [1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let ctx = context();
                let entities: Vec<_> = (0..count)
                    .map(|_| ctx.create_entity(EntityKind::Monster))
                    .collect();
                for entity in &entities {
                    ctx.destroy_entity(entity).ok();
                }
                black_box(ctx.len())
            });
        });
    }

    group.finish();
}

/// Benchmark: attach/detach/lookup on one entity.
fn bench_component_access(c: &mut Criterion) {
    let ctx = context();
    let entity = ctx.create_entity(EntityKind::Player);
    entity.add(Position { x: 1.0, z: 2.0 }).ok();

    c.bench_function("component_get", |b| {
        b.iter(|| black_box(entity.get::<Position>().map(|p| p.x + p.z)));
    });

    c.bench_function("component_add_remove", |b| {
        b.iter(|| {
            entity.add(Health(100)).ok();
            black_box(entity.remove::<Health>().ok())
        });
    });

    c.bench_function("component_modify", |b| {
        b.iter(|| black_box(entity.modify::<Position, _, _>(|p| p.x += 0.001).ok()));
    });
}

/// Benchmark: tick-style iteration over a snapshot.
fn bench_snapshot_iteration(c: &mut Criterion) {
    let ctx = context();
    for i in 0..10_000_u16 {
        let entity = ctx.create_entity(EntityKind::Monster);
        entity
            .add(Position {
                x: f32::from(i),
                z: 0.0,
            })
            .ok();
        if i % 2 == 0 {
            entity.add(Health(100)).ok();
        }
    }

    c.bench_function("snapshot_with_component_10K", |b| {
        b.iter(|| {
            let sum: f32 = ctx
                .entities()
                .with_component::<Position>()
                .map(|(_, p)| p.x)
                .sum();
            black_box(sum)
        });
    });
}

criterion_group!(
    benches,
    bench_create_destroy,
    bench_component_access,
    bench_snapshot_iteration
);
criterion_main!(benches);
