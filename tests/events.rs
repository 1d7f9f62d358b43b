//! Pub/sub channel discipline: declared channels only, listeners in
//! registration order, one failing listener doesn't block its peers.

use assemblage::prelude::*;
use assemblage::EventBus;
use std::sync::Mutex;

static RECEIVED: Mutex<Vec<String>> = Mutex::new(Vec::new());

struct Emitter;
impl Assemblage for Emitter {
    fn definition() -> AssemblageDef {
        AssemblageDef::new().event("t:e")
    }
    fn construct(_resolver: &Resolver<'_>) -> Result<Self> {
        Ok(Emitter)
    }
}
impl Lifecycle for Emitter {
    fn on_init(self: Arc<Self>, ctx: &PublicContext) -> assemblage::BoxFuture<'static, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.emit(
                "t:e",
                vec![Arc::new("hello".to_string())],
                ("Emitter", &["t:e".to_string()]),
            )?;
            Ok(())
        })
    }
}

struct Subscriber;
impl Assemblage for Subscriber {
    fn construct(_resolver: &Resolver<'_>) -> Result<Self> {
        Ok(Subscriber)
    }
}
impl Lifecycle for Subscriber {
    fn on_init(self: Arc<Self>, ctx: &PublicContext) -> assemblage::BoxFuture<'static, Result<()>> {
        ctx.on(
            "t:e",
            Arc::new(|args: &[Arc<dyn std::any::Any + Send + Sync>]| {
                let message = args[0].downcast_ref::<String>().unwrap().clone();
                RECEIVED.lock().unwrap().push(message);
                Ok(())
            }),
        );
        Box::pin(async { Ok(()) })
    }
}

struct EventRoot {
    // Resolved first so its `on_init` (the subscription) runs before
    // Emitter's in the post-order pass below.
    #[allow(dead_code)]
    subscriber: Arc<Subscriber>,
    #[allow(dead_code)]
    emitter: Arc<Emitter>,
}
impl Assemblage for EventRoot {
    fn definition() -> AssemblageDef {
        AssemblageDef::new()
            .inject(InjectionTuple::concrete::<Subscriber>())
            .inject(InjectionTuple::concrete::<Emitter>())
    }
    fn construct(resolver: &Resolver<'_>) -> Result<Self> {
        Ok(EventRoot {
            subscriber: resolver.dep::<Subscriber>("subscriber")?,
            emitter: resolver.dep::<Emitter>("emitter")?,
        })
    }
}
impl Lifecycle for EventRoot {}

#[tokio::test]
async fn subscriber_receives_what_emitter_published_during_on_init() {
    RECEIVED.lock().unwrap().clear();

    let builder = Builder::new();
    builder.build::<EventRoot>().await.unwrap();

    assert_eq!(*RECEIVED.lock().unwrap(), vec!["hello".to_string()]);
}

#[tokio::test]
async fn emit_on_undeclared_channel_is_rejected() {
    let bus = EventBus::new();
    let err = bus.emit("unknown", &[], &[], "Emitter").unwrap_err();
    assert!(matches!(err, DiError::UnknownChannel { .. }));
}

#[tokio::test]
async fn declared_channel_delivers_to_subscribers_registered_via_on() {
    let bus = EventBus::new();
    let received = Arc::new(Mutex::new(Vec::new()));
    let r = Arc::clone(&received);

    bus.on(
        "t:e",
        Arc::new(move |args: &[Arc<dyn std::any::Any + Send + Sync>]| {
            let message = args[0].downcast_ref::<String>().unwrap().clone();
            r.lock().unwrap().push(message);
            Ok(())
        }),
    );

    bus.emit(
        "t:e",
        &[Arc::new("hello".to_string())],
        &["t:e".to_string()],
        "Emitter",
    )
    .unwrap();

    assert_eq!(*received.lock().unwrap(), vec!["hello".to_string()]);
}

#[tokio::test]
async fn failing_listener_does_not_prevent_delivery_to_peers() {
    let bus = EventBus::new();
    bus.on("t:e", Arc::new(|_args| Err(DiError::Internal("boom".into()))));

    let delivered = Arc::new(Mutex::new(false));
    let d = Arc::clone(&delivered);
    bus.on(
        "t:e",
        Arc::new(move |_args| {
            *d.lock().unwrap() = true;
            Ok(())
        }),
    );

    let failures = bus.emit("t:e", &[], &["t:e".to_string()], "Emitter").unwrap();
    assert_eq!(failures.len(), 1);
    assert!(*delivered.lock().unwrap());
}
