//! Benchmarks for the composition kernel's hot paths: building a graph,
//! resolving singletons/transients, emitting events, and dispatching
//! transversal advice.

use assemblage::{
    Advice, AssemblageDef, Builder, EventBus, Identifier, InjectionTuple, Lifecycle, Pointcut,
    Resolver, Result, TransversalEngine,
};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

struct Leaf;
impl assemblage::Assemblage for Leaf {
    fn construct(_resolver: &Resolver<'_>) -> Result<Self> {
        Ok(Leaf)
    }
}
impl Lifecycle for Leaf {}

struct Mid {
    #[allow(dead_code)]
    leaf: Arc<Leaf>,
}
impl assemblage::Assemblage for Mid {
    fn definition() -> AssemblageDef {
        AssemblageDef::new().inject(InjectionTuple::concrete::<Leaf>())
    }
    fn construct(resolver: &Resolver<'_>) -> Result<Self> {
        Ok(Mid {
            leaf: resolver.dep::<Leaf>("leaf")?,
        })
    }
}
impl Lifecycle for Mid {}

struct Root {
    #[allow(dead_code)]
    mid: Arc<Mid>,
}
impl assemblage::Assemblage for Root {
    fn definition() -> AssemblageDef {
        AssemblageDef::new().inject(InjectionTuple::concrete::<Mid>())
    }
    fn construct(resolver: &Resolver<'_>) -> Result<Self> {
        Ok(Root {
            mid: resolver.dep::<Mid>("mid")?,
        })
    }
}
impl Lifecycle for Root {}

struct Transient;
impl assemblage::Assemblage for Transient {
    fn definition() -> AssemblageDef {
        AssemblageDef::new().transient()
    }
    fn construct(_resolver: &Resolver<'_>) -> Result<Self> {
        Ok(Transient)
    }
}
impl Lifecycle for Transient {}

fn rt() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().unwrap()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    let runtime = rt();

    group.bench_function("three_level_chain", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let builder = Builder::new();
                black_box(builder.build::<Root>().await.unwrap())
            })
        })
    });

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    group.throughput(Throughput::Elements(1));
    let runtime = rt();

    let builder = Builder::new();
    runtime.block_on(builder.build::<Root>()).unwrap();

    group.bench_function("require_singleton", |b| {
        b.iter(|| black_box(builder.container().require::<Leaf>().unwrap()))
    });

    group.bench_function("has_check", |b| {
        b.iter(|| black_box(builder.container().has(Identifier::of::<Leaf>())))
    });

    group.bench_function("unknown_identifier", |b| {
        b.iter(|| black_box(builder.container().has(Identifier::of::<i64>())))
    });

    group.finish();
}

fn bench_transient_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("transient");
    group.throughput(Throughput::Elements(1));
    let runtime = rt();

    let builder = Builder::new();
    runtime.block_on(builder.build::<Transient>()).unwrap();

    group.bench_function("require_transient", |b| {
        b.iter(|| black_box(builder.container().require::<Transient>().unwrap()))
    });

    group.finish();
}

fn bench_events(c: &mut Criterion) {
    let mut group = c.benchmark_group("events");
    group.throughput(Throughput::Elements(1));

    let bus = EventBus::new();
    let declared = vec!["orders:created".to_string()];
    bus.on(
        "orders:created",
        Arc::new(|_args: &[Arc<dyn std::any::Any + Send + Sync>]| -> Result<()> { Ok(()) }),
    );

    group.bench_function("emit_single_listener", |b| {
        b.iter(|| black_box(bus.emit("orders:created", &[], &declared, "Bench").unwrap()))
    });

    group.finish();
}

fn bench_transversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("transversal");
    group.throughput(Throughput::Elements(1));

    let engine = TransversalEngine::new();
    engine.install(
        std::any::TypeId::of::<()>(),
        vec![Advice::before(
            Pointcut::parse("execution(Svc.*)").unwrap(),
            0,
            Arc::new(|ctx| Box::pin(async { Ok(ctx) })),
        )],
    );
    let runtime = rt();

    group.bench_function("invoke_with_before_advice", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let ctx = engine
                    .invoke(std::any::TypeId::of::<()>(), "Svc", "create", vec![], |_args| {
                        Box::pin(async {
                            Ok(Arc::new(()) as Arc<dyn std::any::Any + Send + Sync>)
                        })
                    })
                    .await
                    .unwrap();
                black_box(ctx)
            })
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_resolution,
    bench_transient_resolution,
    bench_events,
    bench_transversal,
);

criterion_main!(benches);
