//! End-to-end coverage of the build/resolve/dispose lifecycle:
//! singleton identity, transient freshness, topological init order,
//! cycle detection, and the public context surface.

use assemblage::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

struct Config;
impl Assemblage for Config {
    fn construct(_resolver: &Resolver<'_>) -> Result<Self> {
        Ok(Config)
    }
}
impl Lifecycle for Config {}

struct Database {
    #[allow(dead_code)]
    config: Arc<Config>,
}
impl Assemblage for Database {
    fn definition() -> AssemblageDef {
        AssemblageDef::new().inject(InjectionTuple::concrete::<Config>())
    }
    fn construct(resolver: &Resolver<'_>) -> Result<Self> {
        Ok(Database {
            config: resolver.dep::<Config>("config")?,
        })
    }
}
impl Lifecycle for Database {}

struct UserService {
    #[allow(dead_code)]
    db: Arc<Database>,
}
impl Assemblage for UserService {
    fn definition() -> AssemblageDef {
        AssemblageDef::new().inject(InjectionTuple::concrete::<Database>())
    }
    fn construct(resolver: &Resolver<'_>) -> Result<Self> {
        Ok(UserService {
            db: resolver.dep::<Database>("db")?,
        })
    }
}
impl Lifecycle for UserService {}

#[tokio::test]
async fn singleton_identity_holds_across_requires() {
    let builder = Builder::new();
    builder.build::<UserService>().await.unwrap();

    let a = builder.container().require::<Database>().unwrap();
    let b = builder.container().require::<Database>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

struct Counted;
impl Assemblage for Counted {
    fn definition() -> AssemblageDef {
        AssemblageDef::new().transient()
    }
    fn construct(_resolver: &Resolver<'_>) -> Result<Self> {
        COUNTED_CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
        Ok(Counted)
    }
}
impl Lifecycle for Counted {}

static COUNTED_CONSTRUCTIONS: AtomicU32 = AtomicU32::new(0);

struct WantsCounted {
    #[allow(dead_code)]
    first: Arc<Counted>,
}
impl Assemblage for WantsCounted {
    fn definition() -> AssemblageDef {
        AssemblageDef::new().inject(InjectionTuple::concrete::<Counted>())
    }
    fn construct(resolver: &Resolver<'_>) -> Result<Self> {
        Ok(WantsCounted {
            first: resolver.dep::<Counted>("first")?,
        })
    }
}
impl Lifecycle for WantsCounted {}

#[tokio::test]
async fn transient_entries_yield_distinct_instances_each_require() {
    let builder = Builder::new();
    builder.build::<WantsCounted>().await.unwrap();

    let before = COUNTED_CONSTRUCTIONS.load(Ordering::SeqCst);
    let a = builder.container().require::<Counted>().unwrap();
    let b = builder.container().require::<Counted>().unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(COUNTED_CONSTRUCTIONS.load(Ordering::SeqCst), before + 2);
}

static INIT_ORDER: Mutex<Vec<&str>> = Mutex::new(Vec::new());

struct Leaf;
impl Assemblage for Leaf {
    fn construct(_resolver: &Resolver<'_>) -> Result<Self> {
        Ok(Leaf)
    }
}
impl Lifecycle for Leaf {
    fn on_init(self: Arc<Self>, _ctx: &PublicContext) -> assemblage::BoxFuture<'static, Result<()>> {
        Box::pin(async {
            INIT_ORDER.lock().unwrap().push("Leaf");
            Ok(())
        })
    }
}

struct Mid {
    #[allow(dead_code)]
    leaf: Arc<Leaf>,
}
impl Assemblage for Mid {
    fn definition() -> AssemblageDef {
        AssemblageDef::new().inject(InjectionTuple::concrete::<Leaf>())
    }
    fn construct(resolver: &Resolver<'_>) -> Result<Self> {
        Ok(Mid {
            leaf: resolver.dep::<Leaf>("leaf")?,
        })
    }
}
impl Lifecycle for Mid {
    fn on_init(self: Arc<Self>, _ctx: &PublicContext) -> assemblage::BoxFuture<'static, Result<()>> {
        Box::pin(async {
            INIT_ORDER.lock().unwrap().push("Mid");
            Ok(())
        })
    }
}

struct Root {
    #[allow(dead_code)]
    mid: Arc<Mid>,
}
impl Assemblage for Root {
    fn definition() -> AssemblageDef {
        AssemblageDef::new().inject(InjectionTuple::concrete::<Mid>())
    }
    fn construct(resolver: &Resolver<'_>) -> Result<Self> {
        Ok(Root {
            mid: resolver.dep::<Mid>("mid")?,
        })
    }
}
impl Lifecycle for Root {
    fn on_init(self: Arc<Self>, _ctx: &PublicContext) -> assemblage::BoxFuture<'static, Result<()>> {
        Box::pin(async {
            INIT_ORDER.lock().unwrap().push("Root");
            Ok(())
        })
    }
}

#[tokio::test]
async fn on_init_runs_leaves_before_their_dependents() {
    INIT_ORDER.lock().unwrap().clear();

    let builder = Builder::new();
    builder.build::<Root>().await.unwrap();

    let order = INIT_ORDER.lock().unwrap().clone();
    assert_eq!(order, vec!["Leaf", "Mid", "Root"]);
}

#[derive(Debug)]
struct CycleA {
    #[allow(dead_code)]
    b: Arc<CycleB>,
}
impl Assemblage for CycleA {
    fn definition() -> AssemblageDef {
        AssemblageDef::new().inject(InjectionTuple::concrete::<CycleB>())
    }
    fn construct(resolver: &Resolver<'_>) -> Result<Self> {
        Ok(CycleA {
            b: resolver.dep::<CycleB>("b")?,
        })
    }
}
impl Lifecycle for CycleA {}

#[derive(Debug)]
struct CycleB {
    #[allow(dead_code)]
    a: Arc<CycleA>,
}
impl Assemblage for CycleB {
    fn definition() -> AssemblageDef {
        AssemblageDef::new().inject(InjectionTuple::concrete::<CycleA>())
    }
    fn construct(resolver: &Resolver<'_>) -> Result<Self> {
        Ok(CycleB {
            a: resolver.dep::<CycleA>("a")?,
        })
    }
}
impl Lifecycle for CycleB {}

#[tokio::test]
async fn mutual_cycle_is_rejected_and_the_build_never_completes() {
    let builder = Builder::new();
    let err = builder.build::<CycleA>().await.unwrap_err();
    assert!(matches!(err, DiError::DependencyCycle(_)));

    // The cycle reproduces deterministically: retrying resolution still fails,
    // so no instance on the cycle ever exists, not even transiently.
    let retry = builder.container().require::<CycleA>().unwrap_err();
    assert!(matches!(retry, DiError::DependencyCycle(_)));
}

static CONTEXT_CHECKS: Mutex<Option<(bool, bool, bool)>> = Mutex::new(None);

struct TestService;
impl Assemblage for TestService {
    fn construct(_resolver: &Resolver<'_>) -> Result<Self> {
        Ok(TestService)
    }
}
impl Lifecycle for TestService {}

struct RootWithContext {
    #[allow(dead_code)]
    service: Arc<TestService>,
}
impl Assemblage for RootWithContext {
    fn definition() -> AssemblageDef {
        AssemblageDef::new().inject(InjectionTuple::concrete::<TestService>())
    }
    fn construct(resolver: &Resolver<'_>) -> Result<Self> {
        Ok(RootWithContext {
            service: resolver.dep::<TestService>("service")?,
        })
    }
}
impl Lifecycle for RootWithContext {
    fn on_init(self: Arc<Self>, ctx: &PublicContext) -> assemblage::BoxFuture<'static, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let has = ctx.has(Identifier::of::<TestService>());
            let concrete_matches = matches!(
                ctx.concrete(Identifier::of::<TestService>()),
                Ok(id) if id == Identifier::of::<TestService>()
            );
            let resolved = ctx.require::<TestService>().is_ok();
            *CONTEXT_CHECKS.lock().unwrap() = Some((has, concrete_matches, resolved));
            Ok(())
        })
    }
}

#[tokio::test]
async fn public_context_surface_matches_container_state() {
    let builder = Builder::new();
    builder.build::<RootWithContext>().await.unwrap();

    let (has, concrete_matches, resolved) = CONTEXT_CHECKS.lock().unwrap().expect("on_init ran");
    assert!(has);
    assert!(concrete_matches);
    assert!(resolved);
}
