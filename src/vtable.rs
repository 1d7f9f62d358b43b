//! Type-erased construction and lifecycle dispatch for a registered concrete.
//!
//! A small `dyn`-free vtable of function pointers wrapped behind a
//! type-erased struct: one static dispatch table per concrete type,
//! carrying its declaration and lifecycle hooks alongside construction.

use crate::assemblage::{Assemblage, BoxFuture, Lifecycle};
use crate::context::PublicContext;
use crate::definition::AssemblageDef;
use crate::error::Result;
use crate::resolve::Resolver;
use std::any::{Any, TypeId};
use std::sync::Arc;

type ConstructFn = fn(&Resolver<'_>) -> Result<Arc<dyn Any + Send + Sync>>;
type OnRegisterFn = fn(&PublicContext, Option<&Arc<dyn Any + Send + Sync>>) -> Result<()>;
type OnInitFn = fn(Arc<dyn Any + Send + Sync>, &PublicContext) -> BoxFuture<'static, Result<()>>;
type OnDisposeFn = fn(Arc<dyn Any + Send + Sync>) -> BoxFuture<'static, Result<()>>;

/// A type-erased handle onto one `Assemblage + Lifecycle` implementation.
#[derive(Clone, Copy)]
pub struct AssemblageVTable {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub definition: fn() -> AssemblageDef,
    pub construct: ConstructFn,
    pub on_register: OnRegisterFn,
    pub on_init: OnInitFn,
    pub on_dispose: OnDisposeFn,
}

impl AssemblageVTable {
    /// A vtable for a `use` binding: the value already exists, so
    /// `construct`/`on_init`/`on_dispose` are never reached through it —
    /// `registry::Registry` stores this only to satisfy `RegistryEntry`'s
    /// non-optional `vtable` field for pre-built entries.
    pub fn opaque() -> Self {
        struct Opaque;
        impl Assemblage for Opaque {
            fn construct(_resolver: &Resolver<'_>) -> Result<Self> {
                Err(crate::error::DiError::Internal(
                    "opaque vtable should never be constructed".into(),
                ))
            }
        }
        impl Lifecycle for Opaque {}
        Self::of::<Opaque>()
    }

    pub fn of<T: Assemblage + Lifecycle>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            definition: T::definition,
            construct: |resolver| {
                let instance = T::construct(resolver)?;
                Ok(Arc::new(instance) as Arc<dyn Any + Send + Sync>)
            },
            on_register: T::on_register,
            on_init: |instance, ctx| {
                match instance.downcast::<T>() {
                    Ok(typed) => typed.on_init(ctx),
                    Err(_) => Box::pin(async { Ok(()) }),
                }
            },
            on_dispose: |instance| match instance.downcast::<T>() {
                Ok(typed) => typed.on_dispose(),
                Err(_) => Box::pin(async { Ok(()) }),
            },
        }
    }
}

impl std::fmt::Debug for AssemblageVTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssemblageVTable")
            .field("type_name", &self.type_name)
            .finish()
    }
}
