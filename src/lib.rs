//! # assemblage — a dependency-injection and aspect-oriented composition kernel
//!
//! An application declares types as *assemblages*: components with a
//! static [`AssemblageDef`] describing what they inject, what events
//! they publish, what tags they carry, and what configuration they
//! accept. A root assemblage is *built*: the [`Builder`] walks the
//! transitive dependency graph, constructs instances in topological
//! order, resolves each constructor's parameters from a [`Container`],
//! fires lifecycle hooks, wires a pub/sub [`EventBus`], and applies
//! cross-cutting [`Transversal`](transversal) advice to matching targets.
//!
//! ## Features
//!
//! - **Lock-free registry & storage** — `DashMap` + `ahash` throughout,
//!   the same foundation a request-time DI container would use.
//! - **Cycle detection** — a resolution stack catches a cycle in the
//!   singleton constructor graph before any instance on it is created.
//! - **Ambient parameter injection** — constructor slots can ask for the
//!   public context, a configuration object, the definition's metadata,
//!   a dispose handle, or another identifier, instead of only a concrete
//!   dependency type.
//! - **AOP engine** — `Before`/`After`/`Around` advice, ordered by
//!   priority, installed per-container rather than through global state.
//!
//! ## Quick start
//!
//! ```rust
//! use assemblage::prelude::*;
//!
//! struct Logger;
//! impl Assemblage for Logger {
//!     fn construct(_resolver: &Resolver<'_>) -> Result<Self> {
//!         Ok(Logger)
//!     }
//! }
//! impl Lifecycle for Logger {}
//!
//! struct App {
//!     #[allow(dead_code)]
//!     logger: std::sync::Arc<Logger>,
//! }
//! impl Assemblage for App {
//!     fn definition() -> AssemblageDef {
//!         AssemblageDef::new().inject(InjectionTuple::concrete::<Logger>())
//!     }
//!     fn construct(resolver: &Resolver<'_>) -> Result<Self> {
//!         Ok(App { logger: resolver.dep::<Logger>("logger")? })
//!     }
//! }
//! impl Lifecycle for App {}
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let builder = Builder::new();
//! let app = builder.build::<App>().await?;
//! assert!(builder.container().has(Identifier::of::<Logger>()));
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

mod assemblage;
mod builder;
mod container;
mod context;
mod definition;
mod error;
mod events;
mod factory;
mod identifier;
#[cfg(feature = "logging")]
pub mod logging;
mod metadata;
mod pointcut;
mod registry;
mod resolve;
mod storage;
mod transversal;
mod vtable;
#[cfg(feature = "async")]
mod waitable;

pub use assemblage::{Assemblage, BoxFuture, Lifecycle};
pub use builder::Builder;
pub use container::Container;
pub use context::PublicContext;
pub use definition::{validate, validate_named, AssemblageDef, InjectionTuple, MetadataMap, MetaKey, UseTuple};
pub use error::{DiError, Result};
pub use events::{EventBus, Listener, ListenerId};
pub use identifier::{Identifier, Symbol};
pub use metadata::MetadataStore;
pub use pointcut::Pointcut;
pub use registry::Registry;
pub use resolve::{InjectionSource, Resolver};
pub use transversal::{Advice, AdviceContext, AdviceFn, AdviceKind, AroundFn, ProceedFn, TransversalEngine};
#[cfg(feature = "async")]
pub use waitable::{Waitable, DEFAULT_POLL_INTERVAL};

// Re-export tracing macros for convenience when the logging feature is enabled.
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

pub use std::sync::Arc;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Advice, Assemblage, AssemblageDef, Builder, Container, DiError, Identifier, InjectionTuple,
        Lifecycle, PublicContext, Resolver, Result, UseTuple,
    };
    pub use std::sync::Arc;
}
