//! The Container: owns every registered instance, applies
//! singleton/transient policy, and implements the `require` resolution
//! algorithm with cycle detection.
//!
//! Singletons are cached for the container's lifetime in `storage.rs`'s
//! sharded map; transients are rebuilt on every `require`. A resolution
//! stack tracks identifiers currently under construction so a
//! dependency cycle fails fast with the full cycle path, instead of
//! recursing until the stack overflows.

use crate::assemblage::{Assemblage, BoxFuture};
use crate::error::{DiError, Result};
use crate::events::EventBus;
use crate::identifier::Identifier;
use crate::metadata::MetadataStore;
use crate::registry::{Registry, RegistryEntry};
use crate::resolve::Resolver;
use crate::storage::Storage;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;
#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Owns the identifier registry, the instance cache, and the event bus
/// for one build. Shared by `Arc` since the public context, the
/// resolver, and every constructed instance's dispose handle all need
/// a stable reference to the same container.
pub struct Container {
    registry: Registry,
    storage: Storage,
    events: EventBus,
    metadata: MetadataStore,
    resolution_stack: Mutex<Vec<Identifier>>,
    construction_order: Mutex<Vec<Identifier>>,
}

impl Container {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            registry: Registry::new(),
            storage: Storage::new(),
            events: EventBus::new(),
            metadata: MetadataStore::new(),
            resolution_stack: Mutex::new(Vec::new()),
            construction_order: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn events(&self) -> &EventBus {
        &self.events
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    /// Registers `entry`, declaring its storage policy and recording
    /// its declared metadata under its concrete `TypeId`. Called by the
    /// Builder during the pre-order registration walk; never called by
    /// user code directly.
    pub(crate) fn register(&self, entry: RegistryEntry) -> Result<()> {
        let identifier = entry.identifier;
        let singleton = entry.singleton;
        let pre_built = entry.pre_built.clone();
        let type_id = entry.vtable.type_id;
        let metadata = entry.definition.metadata.clone();

        #[cfg(feature = "logging")]
        trace!(target: "assemblage", concrete = entry.vtable.type_name, singleton, "registering entry in container");

        self.registry.register(entry)?;
        for (key, value) in metadata {
            self.metadata.define(type_id, key, value);
        }
        if let Some(value) = pre_built {
            self.storage.declare(identifier, true);
            let _ = self.storage.get_or_try_init(identifier, || Ok(value));
        } else {
            self.storage.declare(identifier, singleton);
        }
        Ok(())
    }

    pub fn has(&self, identifier: Identifier) -> bool {
        self.registry.has(&identifier)
    }

    pub fn concrete(&self, identifier: Identifier) -> Result<Identifier> {
        let entry = self
            .registry
            .get(&identifier)
            .ok_or_else(|| DiError::unknown_identifier(identifier))?;
        Ok(Identifier::Type {
            type_id: entry.vtable.type_id,
            type_name: entry.vtable.type_name,
        })
    }

    pub fn tagged(&self, tag: &str) -> Vec<Arc<dyn Any + Send + Sync>> {
        self.registry
            .tagged(tag)
            .into_iter()
            .filter_map(|id| self.storage.peek(&id))
            .collect()
    }

    /// Resolves `identifier` to an instance: pre-built and already-cached
    /// instances return immediately; otherwise the identifier is pushed
    /// onto the resolution stack (failing fast on a cycle), its
    /// constructor parameters resolved, and the result cached if it is
    /// a singleton.
    pub fn require_dyn(self: &Arc<Self>, identifier: Identifier) -> Result<Arc<dyn Any + Send + Sync>> {
        let entry = self
            .registry
            .get(&identifier)
            .ok_or_else(|| DiError::unknown_identifier(identifier))?;

        if let Some(pre_built) = &entry.pre_built {
            return Ok(pre_built.clone());
        }

        if entry.singleton {
            if let Some(cached) = self.storage.peek(&identifier) {
                #[cfg(feature = "logging")]
                trace!(target: "assemblage", concrete = entry.vtable.type_name, "returning cached singleton");
                return Ok(cached);
            }
        }

        {
            let mut stack = self.resolution_stack.lock();
            if stack.contains(&identifier) {
                let mut path = stack.clone();
                path.push(identifier);
                #[cfg(feature = "logging")]
                debug!(target: "assemblage", concrete = entry.vtable.type_name, "dependency cycle detected");
                return Err(DiError::cycle(path));
            }
            stack.push(identifier);
        }

        #[cfg(feature = "logging")]
        trace!(target: "assemblage", concrete = entry.vtable.type_name, "constructing instance");

        let build_result = self.storage.get_or_try_init(identifier, || {
            let resolver = Resolver::new(
                self,
                entry.configuration.clone(),
                entry.definition.metadata.clone(),
                entry.vtable.type_id,
            );
            (entry.vtable.construct)(&resolver)
        });

        self.resolution_stack.lock().pop();
        let instance = build_result?;
        self.construction_order.lock().push(identifier);
        Ok(instance)
    }

    pub fn require<T: Assemblage>(self: &Arc<Self>) -> Result<Arc<T>> {
        let instance = self.require_dyn(Identifier::of::<T>())?;
        instance
            .downcast::<T>()
            .map_err(|_| DiError::Internal("downcast failed after successful resolve".into()))
    }

    /// Construction order so far, used by the Builder to dispatch
    /// `on_init` in the same depth-first post-order the recursive
    /// `require_dyn` calls already produced: since a parent's `require`
    /// call only returns after every dependency it pulled in has
    /// finished constructing, appending to this list on return yields
    /// dependencies before their dependents.
    pub(crate) fn construction_order(&self) -> Vec<Identifier> {
        self.construction_order.lock().clone()
    }

    pub(crate) fn entry(&self, identifier: &Identifier) -> Option<RegistryEntry> {
        self.registry.get(identifier)
    }

    pub(crate) fn peek(&self, identifier: &Identifier) -> Option<Arc<dyn Any + Send + Sync>> {
        self.storage.peek(identifier)
    }

    /// Calls `on_dispose` on every singleton that was constructed, in
    /// reverse construction order, per invariant 4. Clears the instance
    /// table and listener lists once done.
    pub fn dispose(self: Arc<Self>) -> BoxFuture<'static, Result<()>> {
        Box::pin(async move {
            let mut order = self.construction_order();
            order.reverse();
            #[cfg(feature = "logging")]
            debug!(target: "assemblage", instance_count = order.len(), "disposing container");
            for identifier in order {
                let Some(entry) = self.registry.get(&identifier) else {
                    continue;
                };
                let Some(instance) = self.storage.peek(&identifier) else {
                    continue;
                };
                #[cfg(feature = "logging")]
                trace!(target: "assemblage", concrete = entry.vtable.type_name, "firing on_dispose");
                (entry.vtable.on_dispose)(instance).await?;
            }
            Ok(())
        })
    }
}

/// A zero-arg handle that tears the owning container down. Handed to
/// any constructor slot annotated `Dispose`.
#[derive(Clone)]
pub struct DisposeHandle(Arc<Container>);

impl DisposeHandle {
    pub(crate) fn new(container: Arc<Container>) -> Self {
        Self(container)
    }

    pub fn dispose(&self) -> BoxFuture<'static, Result<()>> {
        Container::dispose(Arc::clone(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemblage::Lifecycle;
    use crate::registry::RegistryEntry;
    use crate::vtable::AssemblageVTable;

    #[derive(Debug)]
    struct Leaf;
    impl Assemblage for Leaf {
        fn construct(_resolver: &Resolver<'_>) -> Result<Self> {
            Ok(Leaf)
        }
    }
    impl Lifecycle for Leaf {}

    struct Needs(#[allow(dead_code)] Arc<Leaf>);
    impl Assemblage for Needs {
        fn construct(resolver: &Resolver<'_>) -> Result<Self> {
            Ok(Needs(resolver.dep::<Leaf>("leaf")?))
        }
    }
    impl Lifecycle for Needs {}

    fn entry_for<T: Assemblage + Lifecycle>(identifier: Identifier, singleton: bool) -> RegistryEntry {
        RegistryEntry {
            identifier,
            vtable: AssemblageVTable::of::<T>(),
            configuration: None,
            singleton,
            tags: Vec::new(),
            definition: crate::definition::AssemblageDef::new(),
            pre_built: None,
            seq: 0,
        }
    }

    #[test]
    fn singleton_identity_holds_across_requires() {
        let container = Container::new();
        container.register(entry_for::<Leaf>(Identifier::of::<Leaf>(), true)).unwrap();

        let a = container.require::<Leaf>().unwrap();
        let b = container.require::<Leaf>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn transient_yields_fresh_instances() {
        let container = Container::new();
        container.register(entry_for::<Leaf>(Identifier::of::<Leaf>(), false)).unwrap();

        let a = container.require::<Leaf>().unwrap();
        let b = container.require::<Leaf>().unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unknown_identifier_errors() {
        let container = Container::new();
        let err = container.require::<Leaf>().unwrap_err();
        assert!(matches!(err, DiError::UnknownIdentifier { .. }));
    }

    #[test]
    fn direct_self_cycle_is_detected() {
        #[derive(Debug)]
        struct SelfRef;
        impl Assemblage for SelfRef {
            fn construct(resolver: &Resolver<'_>) -> Result<Self> {
                let _: Arc<SelfRef> = resolver.dep::<SelfRef>("self")?;
                Ok(SelfRef)
            }
        }
        impl Lifecycle for SelfRef {}

        let container = Container::new();
        container
            .register(entry_for::<SelfRef>(Identifier::of::<SelfRef>(), true))
            .unwrap();

        let err = container.require::<SelfRef>().unwrap_err();
        assert!(matches!(err, DiError::DependencyCycle(_)));
    }

    #[test]
    fn dependency_resolves_transitively() {
        let container = Container::new();
        container.register(entry_for::<Leaf>(Identifier::of::<Leaf>(), true)).unwrap();
        container.register(entry_for::<Needs>(Identifier::of::<Needs>(), true)).unwrap();

        assert!(container.require::<Needs>().is_ok());
    }

    #[test]
    fn register_forwards_declared_metadata_into_the_store() {
        let container = Container::new();
        let mut entry = entry_for::<Leaf>(Identifier::of::<Leaf>(), true);
        entry
            .definition
            .metadata
            .insert("description", Arc::new("a leaf node") as Arc<dyn Any + Send + Sync>);
        container.register(entry).unwrap();

        let value = container.metadata().get_own(std::any::TypeId::of::<Leaf>(), "description").unwrap();
        assert_eq!(*value.downcast::<&str>().unwrap(), "a leaf node");
    }
}
