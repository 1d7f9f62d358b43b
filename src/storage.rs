//! Instance storage: a lock-free, `Identifier`-keyed table of
//! [`AnyFactory`] caches, backing the Container's half of the
//! resolution algorithm.
//!
//! A `DashMap<Identifier, AnyFactory, ahash::RandomState>` with an
//! unchecked downcast on the hot path, the same shape as the identifier
//! registry and the metadata store. No thread-local hot cache: an
//! identifier resolves once per `build`, not repeatedly on a request
//! path, so a second cache layer would guard nothing.

use crate::error::{DiError, Result};
use crate::factory::AnyFactory;
use crate::identifier::Identifier;
use ahash::RandomState;
use dashmap::DashMap;
use std::any::Any;
use std::sync::Arc;

/// Casts an `Arc<dyn Any + Send + Sync>` to `Arc<T>` without checking the
/// underlying `TypeId`.
///
/// # Safety
/// The caller must guarantee the erased value really is a `T` — the
/// storage table only ever inserts factories built from a vtable whose
/// `type_id` matches the identifier used to look it up, which the
/// container enforces at registration time.
unsafe fn downcast_arc_unchecked<T: 'static>(arc: Arc<dyn Any + Send + Sync>) -> Arc<T> {
    let raw = Arc::into_raw(arc) as *const T;
    unsafe { Arc::from_raw(raw) }
}

pub(crate) struct Storage {
    factories: DashMap<Identifier, AnyFactory, RandomState>,
}

impl Storage {
    pub fn new() -> Self {
        Self {
            factories: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Registers the caching policy for `identifier`. No-op if already present.
    pub fn declare(&self, identifier: Identifier, singleton: bool) {
        self.factories.entry(identifier).or_insert_with(|| {
            if singleton {
                AnyFactory::singleton()
            } else {
                AnyFactory::transient()
            }
        });
    }

    /// Constructs (or returns the cached) instance for `identifier`,
    /// running `build` at most once for singletons.
    pub fn get_or_try_init<F>(&self, identifier: Identifier, build: F) -> Result<Arc<dyn Any + Send + Sync>>
    where
        F: FnOnce() -> Result<Arc<dyn Any + Send + Sync>>,
    {
        let factory = self
            .factories
            .get(&identifier)
            .ok_or_else(|| DiError::unknown_identifier(identifier))?;
        factory.get_or_try_init(build)
    }

    /// Already-cached instance, without triggering construction.
    pub fn peek(&self, identifier: &Identifier) -> Option<Arc<dyn Any + Send + Sync>> {
        self.factories.get(identifier).and_then(|f| f.peek())
    }

    /// Typed accessor over `peek`, performing the unchecked downcast.
    pub fn peek_typed<T: 'static>(&self, identifier: &Identifier) -> Option<Arc<T>> {
        self.peek(identifier).map(|arc| unsafe { downcast_arc_unchecked(arc) })
    }

    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.factories.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}
