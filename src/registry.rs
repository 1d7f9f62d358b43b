//! Identifier Registry: maps identifiers to their registered concrete,
//! enforces the uniqueness invariants, and indexes tags.
//!
//! Keyed by `Identifier` over a `TypeId`-keyed `DashMap`, the same
//! sharded-map idiom `storage.rs` uses for the instance cache. The
//! duplicate-registration tie-break below ("first wins, silently,
//! unless the concrete differs") favors idempotent re-registration of
//! a shared dependency over a warn-and-replace policy.

use crate::definition::AssemblageDef;
use crate::error::{DiError, Result};
use crate::identifier::Identifier;
use crate::vtable::AssemblageVTable;
use ahash::RandomState;
use dashmap::DashMap;
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A registered entry: everything the container needs to construct,
/// cache, and tag-index one identifier.
#[derive(Clone)]
pub struct RegistryEntry {
    pub identifier: Identifier,
    pub vtable: AssemblageVTable,
    pub configuration: Option<Arc<dyn Any + Send + Sync>>,
    pub singleton: bool,
    pub tags: Vec<String>,
    pub definition: AssemblageDef,
    pub pre_built: Option<Arc<dyn Any + Send + Sync>>,
    /// Monotonic registration order, stamped by the registry on
    /// insert. Lets `tagged` return results in the order their classes
    /// were registered rather than in the backing map's hash order.
    pub seq: u64,
}

pub struct Registry {
    entries: DashMap<Identifier, RegistryEntry, RandomState>,
    next_seq: AtomicU64,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(RandomState::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn has(&self, identifier: &Identifier) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn get(&self, identifier: &Identifier) -> Option<RegistryEntry> {
        self.entries.get(identifier).map(|entry| entry.value().clone())
    }

    /// Insert a freshly-constructed registration.
    ///
    /// Enforces invariant 1 (identifier uniqueness): if `identifier`
    /// already names a different concrete type, this fails with
    /// `DuplicateRegistration`. Registering the identical identifier
    /// with the identical concrete is a silent no-op — first
    /// registration wins. `entry.seq` is overwritten here with the
    /// registry's own counter regardless of what the caller set, so
    /// callers never need to coordinate on sequence numbers themselves.
    pub fn register(&self, mut entry: RegistryEntry) -> Result<()> {
        if let Some(existing) = self.entries.get(&entry.identifier) {
            if existing.vtable.type_id == entry.vtable.type_id {
                return Ok(());
            }
            return Err(DiError::duplicate(entry.identifier));
        }
        entry.seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(entry.identifier, entry);
        Ok(())
    }

    /// Bind a pre-built `use` value. Same first-wins semantics as `register`.
    pub fn bind_instance(&self, identifier: Identifier, value: Arc<dyn Any + Send + Sync>) -> Result<()> {
        if self.entries.contains_key(&identifier) {
            return Ok(());
        }
        let entry = RegistryEntry {
            identifier,
            vtable: AssemblageVTable::opaque(),
            configuration: None,
            singleton: true,
            tags: Vec::new(),
            definition: AssemblageDef::new(),
            pre_built: Some(value),
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        };
        self.entries.insert(identifier, entry);
        Ok(())
    }

    /// Identifiers tagged `tag`, in the order their classes were registered.
    pub fn tagged(&self, tag: &str) -> Vec<Identifier> {
        let mut matches: Vec<(u64, Identifier)> = self
            .entries
            .iter()
            .filter(|entry| entry.tags.iter().any(|t| t == tag))
            .map(|entry| (entry.seq, entry.identifier))
            .collect();
        matches.sort_by_key(|(seq, _)| *seq);
        matches.into_iter().map(|(_, id)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn identifiers(&self) -> Vec<Identifier> {
        self.entries.iter().map(|entry| *entry.key()).collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
