//! Per-type metadata store with "own" (non-inherited) read semantics.
//!
//! A small `(TypeId, MetaKey)`-keyed table, populated by
//! [`crate::container::Container::register`] from each class's declared
//! [`crate::definition::AssemblageDef::metadata`] and consulted by the
//! [`crate::resolve::Resolver`] handed to that class's own constructor.
//! A lookup never falls back to a supertype or a default — either the
//! exact `(type, key)` pair was defined at registration, or it was not.

use crate::definition::MetaKey;
use ahash::RandomState;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;

pub struct MetadataStore {
    entries: DashMap<(TypeId, MetaKey), Arc<dyn Any + Send + Sync>, RandomState>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Attach `value` under `key` for `type_id`. Overwrites any prior value.
    pub fn define(&self, type_id: TypeId, key: MetaKey, value: Arc<dyn Any + Send + Sync>) {
        self.entries.insert((type_id, key), value);
    }

    /// Read the value defined for `type_id` under `key`, if any.
    pub fn get_own(&self, type_id: TypeId, key: MetaKey) -> Option<Arc<dyn Any + Send + Sync>> {
        self.entries.get(&(type_id, key)).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, type_id: TypeId, key: MetaKey) -> bool {
        self.entries.contains_key(&(type_id, key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MetadataStore {
    fn default() -> Self {
        Self::new()
    }
}
