//! Builder: walks the declaration graph from a root, registers
//! everything, instantiates it, and drives lifecycle hooks and
//! transversal installation.
//!
//! Two phases: a depth-first pre-order walk registers every declared
//! class before anything is constructed, then the root is resolved,
//! which recursively constructs whatever it actually needs and drives
//! `on_init` in post-order once construction finishes.

use crate::assemblage::{Assemblage, Lifecycle};
use crate::context::PublicContext;
use crate::definition::{validate_named, AssemblageDef};
use crate::error::Result;
use crate::identifier::Identifier;
use crate::registry::RegistryEntry;
use crate::transversal::TransversalEngine;
use crate::vtable::AssemblageVTable;
use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;
#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Drives one build from a root assemblage to a finished, initialised graph.
pub struct Builder {
    container: Arc<crate::container::Container>,
    engine: Arc<TransversalEngine>,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            container: crate::container::Container::new(),
            engine: Arc::new(TransversalEngine::new()),
        }
    }

    /// Builds `T` as the root of a new graph: registers the whole
    /// transitive declaration graph, constructs the root (which drives
    /// construction of whatever it actually needs), runs `on_init` in
    /// topological order, installs any engaged transversals, and
    /// returns the root instance.
    pub async fn build<T: Assemblage + Lifecycle>(&self) -> Result<Arc<T>> {
        #[cfg(feature = "logging")]
        debug!(target: "assemblage", root = std::any::type_name::<T>(), "building root assemblage");

        let mut visited = HashSet::new();
        self.register_tree(Identifier::of::<T>(), AssemblageVTable::of::<T>(), None, &mut visited)?;

        self.fire_on_register(&visited)?;

        let root = self.container.require::<T>()?;

        if let Err(err) = self.fire_on_init().await {
            #[cfg(feature = "logging")]
            debug!(target: "assemblage", root = std::any::type_name::<T>(), "on_init failed, disposing graph");
            let _ = Arc::clone(&self.container).dispose().await;
            return Err(err);
        }

        self.install_transversals(&T::definition());

        Ok(root)
    }

    /// Depth-first, pre-order registration walk with dedup by
    /// identifier. `visited` both prevents re-registering the same
    /// identifier's subtree and guards against cyclic declarations
    /// (A injects B, B injects A) looping forever — the underlying
    /// registration still runs for every occurrence so a genuine
    /// `DuplicateRegistration` is still caught.
    fn register_tree(
        &self,
        identifier: Identifier,
        vtable: AssemblageVTable,
        configuration: Option<Arc<dyn Any + Send + Sync>>,
        visited: &mut HashSet<Identifier>,
    ) -> Result<()> {
        let def = validate_named(vtable.type_name, (vtable.definition)())?;
        let first_time = !visited.contains(&identifier);

        #[cfg(feature = "logging")]
        trace!(target: "assemblage", concrete = vtable.type_name, first_time, "registering declared class");

        let entry = RegistryEntry {
            identifier,
            vtable,
            configuration,
            singleton: def.singleton,
            tags: def.tags.clone(),
            definition: def.clone(),
            pre_built: None,
            seq: 0,
        };
        self.container.register(entry)?;

        if !first_time {
            return Ok(());
        }
        visited.insert(identifier);

        for use_tuple in &def.use_ {
            self.container
                .registry()
                .bind_instance(use_tuple.identifier, use_tuple.value.clone())?;
        }
        for inject in &def.inject {
            self.register_tree(inject.identifier, inject.vtable, inject.configuration.clone(), visited)?;
        }
        Ok(())
    }

    /// Runs `on_register` once per registered class, passing each
    /// entry's own configuration object through alongside the context.
    fn fire_on_register(&self, visited: &HashSet<Identifier>) -> Result<()> {
        let ctx = PublicContext::new(Arc::clone(&self.container));
        for identifier in visited {
            let Some(entry) = self.container.entry(identifier) else {
                continue;
            };
            #[cfg(feature = "logging")]
            trace!(target: "assemblage", concrete = entry.vtable.type_name, "firing on_register");
            (entry.vtable.on_register)(&ctx, entry.configuration.as_ref())?;
        }
        Ok(())
    }

    /// `on_init` in post-order. The container's construction order is
    /// already post-order by construction: a parent's recursive
    /// `require` only returns once every dependency it pulled in has
    /// itself finished constructing, so a single forward pass over
    /// `construction_order()` calls `on_init` on leaves before parents.
    async fn fire_on_init(&self) -> Result<()> {
        let ctx = PublicContext::new(Arc::clone(&self.container));
        for identifier in self.container.construction_order() {
            let Some(entry) = self.container.entry(&identifier) else {
                continue;
            };
            let Some(instance) = self.container.peek(&identifier) else {
                continue;
            };
            #[cfg(feature = "logging")]
            trace!(target: "assemblage", concrete = entry.vtable.type_name, "firing on_init");
            (entry.vtable.on_init)(instance, &ctx).await?;
        }
        Ok(())
    }

    /// Installs every transversal named in the root definition's
    /// `engage` list against every registered concrete.
    fn install_transversals(&self, root_def: &AssemblageDef) {
        if root_def.engage.is_empty() {
            return;
        }
        let advices: Vec<_> = root_def.engage.iter().flat_map(|make| make()).collect();
        #[cfg(feature = "logging")]
        debug!(target: "assemblage", advice_count = advices.len(), "installing transversal advice");
        for identifier in self.container.registry().identifiers() {
            if let Some(entry) = self.container.entry(&identifier) {
                self.engine.install(entry.vtable.type_id, advices.clone());
            }
        }
    }

    pub fn engine(&self) -> &Arc<TransversalEngine> {
        &self.engine
    }

    pub fn container(&self) -> &Arc<crate::container::Container> {
        &self.container
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
