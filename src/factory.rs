//! Instance caching policy: singleton (construct once, cache forever)
//! vs. transient (never cached, construct fresh every `require`).
//!
//! A small closed set of caching strategies behind one type-erased
//! wrapper. The thing being cached is always the output of a
//! [`crate::vtable::AssemblageVTable`] construction, never a
//! user-supplied closure, since assemblages are constructed by the
//! Builder, not registered ad hoc by caller code.

use once_cell::sync::OnceCell;
use std::any::Any;
use std::sync::Arc;

/// Per-identifier instance cache. `Singleton` lazily constructs once,
/// on the first `require`, and then always returns the cached `Arc`.
/// `Transient` never caches — every `require` runs construction again.
pub(crate) enum AnyFactory {
    Singleton(OnceCell<Arc<dyn Any + Send + Sync>>),
    Transient,
}

impl AnyFactory {
    pub fn singleton() -> Self {
        Self::Singleton(OnceCell::new())
    }

    pub fn transient() -> Self {
        Self::Transient
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient)
    }

    /// Returns the cached instance for `Singleton`, constructing it via
    /// `f` on first use; always calls `f` for `Transient`.
    pub fn get_or_try_init<F>(&self, f: F) -> crate::error::Result<Arc<dyn Any + Send + Sync>>
    where
        F: FnOnce() -> crate::error::Result<Arc<dyn Any + Send + Sync>>,
    {
        match self {
            Self::Singleton(cell) => cell.get_or_try_init(f).cloned(),
            Self::Transient => f(),
        }
    }

    /// The already-cached instance, if this is a `Singleton` that has
    /// already been constructed. Used by the resolution algorithm's
    /// step 3 ("if singleton and instance already set, return it")
    /// without re-entering construction.
    pub fn peek(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        match self {
            Self::Singleton(cell) => cell.get().cloned(),
            Self::Transient => None,
        }
    }
}
