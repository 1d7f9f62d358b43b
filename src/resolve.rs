//! The constructor parameter resolver.
//!
//! For each constructor slot, `#[derive(Assemblage)]`-generated code
//! calls exactly one of the methods below, selected by the field's
//! ambient attribute (`#[context]`, `#[configuration]`, `#[definition]`,
//! `#[dispose]`, `#[use_("name")]`, `#[global("name")]`) or, absent an
//! attribute, `dep::<FieldType>()`. The switch lives in generated code
//! rather than a runtime `match`, since slot types are already known at
//! compile time.

use crate::container::{Container, DisposeHandle};
use crate::context::PublicContext;
use crate::definition::{MetaKey, MetadataMap};
use crate::error::{DiError, Result};
use crate::identifier::Identifier;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Where a constructor slot's value comes from. Exposed mainly for
/// diagnostics and generated-code readability; resolution itself goes
/// straight through the typed accessor methods below.
#[derive(Clone, Debug)]
pub enum InjectionSource {
    Context,
    Configuration,
    Definition,
    Dispose,
    Use(Identifier),
    Global(Identifier),
    Concrete,
}

/// Threaded through one `Assemblage::construct` call.
pub struct Resolver<'a> {
    container: &'a Arc<Container>,
    ctx: PublicContext,
    configuration: Option<Arc<dyn Any + Send + Sync>>,
    metadata: MetadataMap,
    type_id: TypeId,
    dispose: DisposeHandle,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(
        container: &'a Arc<Container>,
        configuration: Option<Arc<dyn Any + Send + Sync>>,
        metadata: MetadataMap,
        type_id: TypeId,
    ) -> Self {
        Self {
            ctx: PublicContext::new(Arc::clone(container)),
            dispose: DisposeHandle::new(Arc::clone(container)),
            container,
            configuration,
            metadata,
            type_id,
        }
    }

    /// `Context` slot: the read-only façade.
    pub fn context(&self) -> PublicContext {
        self.ctx.clone()
    }

    /// `Configuration` slot: this entry's configuration object, if any.
    pub fn configuration<T: 'static + Send + Sync>(&self) -> Option<Arc<T>> {
        self.configuration
            .clone()
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// `Definition`/`Metadata` slot: the declaration's forwarded metadata.
    pub fn definition_metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    /// Reads a single metadatum back from the container's
    /// [`crate::metadata::MetadataStore`] rather than the snapshot
    /// captured at resolve time — the same value `definition_metadata`
    /// exposes, fetched through the live per-type store instead.
    pub fn metadatum(&self, key: MetaKey) -> Option<Arc<dyn Any + Send + Sync>> {
        self.container.metadata().get_own(self.type_id, key)
    }

    /// `Dispose` slot: a handle that tears down the owning container.
    pub fn dispose_handle(&self) -> DisposeHandle {
        self.dispose.clone()
    }

    /// `Use(name)` slot: look an instance injection up by identifier.
    pub fn use_identifier(&self, identifier: Identifier) -> Result<Arc<dyn Any + Send + Sync>> {
        self.container.require_dyn(identifier)
    }

    /// `Global(name)` slot. There is no separate process-wide registry in
    /// this crate — a single container is the whole composition graph —
    /// so this resolves from the same container `Use` would.
    pub fn global_identifier(&self, identifier: Identifier) -> Result<Arc<dyn Any + Send + Sync>> {
        self.container.require_dyn(identifier)
    }

    /// Plain typed slot: `require(T)`, converting an unknown-identifier
    /// failure into `UnresolvedParameter` since a bare field with no
    /// ambient annotation and no registration is exactly that case.
    pub fn dep<T: crate::assemblage::Assemblage>(&self, slot: &'static str) -> Result<Arc<T>> {
        self.container
            .require::<T>()
            .map_err(|err| match err {
                DiError::UnknownIdentifier { .. } => {
                    DiError::unresolved_parameter(std::any::type_name::<T>(), slot)
                }
                other => other,
            })
    }
}
