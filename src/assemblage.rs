//! The `Assemblage` and `Lifecycle` traits a participating type implements.
//!
//! A type declares its place in the composition graph by implementing
//! these traits (by hand, or via `#[derive(Assemblage)]` from the
//! sibling derive crate); its definition and constructor are known at
//! compile time, with no reflection step involved.

use crate::definition::AssemblageDef;
use crate::error::Result;
use crate::resolve::Resolver;
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, `Send` future — this crate's stand-in for `async fn` in a
/// trait, used instead of pulling in `async-trait`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type that participates in the composition graph.
///
/// `construct` is the annotated constructor: the [`Resolver`] hands
/// back whichever ambient or dependency value each field needs, in the
/// order `#[derive(Assemblage)]` scanned them.
pub trait Assemblage: Send + Sync + 'static {
    /// The declaration: what this type injects, uses, emits, and tags itself with.
    fn definition() -> AssemblageDef
    where
        Self: Sized,
    {
        AssemblageDef::new()
    }

    /// Build an instance, resolving each constructor slot through `resolver`.
    fn construct(resolver: &Resolver<'_>) -> Result<Self>
    where
        Self: Sized;
}

/// Lifecycle hooks. Every [`Assemblage`] gets a default no-op
/// implementation; override to hook registration, async init, or teardown.
pub trait Lifecycle: Assemblage {
    /// Runs once per class during registration, before any instance
    /// exists. `configuration` is the value this class was registered
    /// with (via `inject`/`use` with a configuration payload), if any.
    fn on_register(
        _ctx: &crate::context::PublicContext,
        _configuration: Option<&Arc<dyn Any + Send + Sync>>,
    ) -> Result<()>
    where
        Self: Sized,
    {
        Ok(())
    }

    /// Runs once per singleton instance, after construction and after all
    /// transitive singleton dependencies have completed their own `on_init`.
    fn on_init(self: std::sync::Arc<Self>, _ctx: &crate::context::PublicContext) -> BoxFuture<'static, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    /// Runs once per singleton instance at container teardown, in reverse
    /// `on_init` order.
    fn on_dispose(self: std::sync::Arc<Self>) -> BoxFuture<'static, Result<()>> {
        Box::pin(async { Ok(()) })
    }
}
