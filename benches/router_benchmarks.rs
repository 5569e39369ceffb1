//! Criterion benchmarks for log_router_system

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use log_router_system::prelude::*;
use std::sync::Arc;

struct NullSink;

impl Sink for NullSink {
    fn handle(&self, record: &LogRecord) -> Result<()> {
        black_box(record.level);
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

// ============================================================================
// Router Creation Benchmarks
// ============================================================================

fn bench_router_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("router_creation");
    group.throughput(Throughput::Elements(1));

    group.bench_function("registry_new", |b| {
        b.iter(|| {
            let registry = RouterRegistry::new();
            black_box(registry)
        });
    });

    group.bench_function("get_router_cached", |b| {
        let registry = RouterRegistry::new();
        registry.get_router("cached");
        b.iter(|| {
            let router = registry.get_router(black_box("cached"));
            black_box(router)
        });
    });

    group.finish();
}

// ============================================================================
// Dispatch Benchmarks
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let registry = RouterRegistry::new();
    let router = registry.get_router("bench");
    router.attach(Arc::new(NullSink));

    group.bench_function("suppressed_by_threshold", |b| {
        router.set_level(LogLevel::Error);
        b.iter(|| {
            router.debug(black_box("filtered out")).unwrap();
        });
    });

    group.bench_function("delivered_one_sink", |b| {
        router.set_level(LogLevel::Verbose);
        b.iter(|| {
            router.info(black_box("delivered")).unwrap();
        });
    });

    group.bench_function("delivered_four_sinks", |b| {
        let registry = RouterRegistry::new();
        let router = registry.get_router("fanout");
        for _ in 0..4 {
            router.attach(Arc::new(NullSink));
        }
        b.iter(|| {
            router.info(black_box("fanned out")).unwrap();
        });
    });

    group.bench_function("delivered_with_pre_process", |b| {
        let registry = RouterRegistry::new();
        let router = registry.get_router("hooked");
        router.attach(Arc::new(NullSink));
        router.set_pre_process(|record| Some(record));
        b.iter(|| {
            router.info(black_box("hooked")).unwrap();
        });
    });

    group.finish();
}

// ============================================================================
// Shared Context Benchmarks
// ============================================================================

fn bench_shared_context(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared_context");
    group.throughput(Throughput::Elements(1));

    let ctx = SharedContext::new();
    ctx.put("env", "prod");

    group.bench_function("get", |b| {
        b.iter(|| {
            black_box(ctx.get(black_box("env")));
        });
    });

    group.bench_function("put_overwrite", |b| {
        b.iter(|| {
            black_box(ctx.put(black_box("env"), black_box("staging")));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_router_creation,
    bench_dispatch,
    bench_shared_context
);
criterion_main!(benches);
