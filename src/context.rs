//! The public context façade: the read-only surface handed to user code
//! through a `Context`-annotated constructor slot.
//!
//! A thin wrapper that delegates straight through to `Container`, but
//! narrowed to only the operations user code is meant to reach for:
//! `has`, `concrete`, `require`, `tagged`, and the event bus proxy —
//! registration, construction, and disposal stay internal to the
//! crate's own machinery.

use crate::assemblage::Assemblage;
use crate::container::Container;
use crate::error::Result;
use crate::events::{Listener, ListenerId};
use crate::identifier::Identifier;
use std::any::Any;
use std::sync::Arc;

/// Read-only façade over a [`Container`].
#[derive(Clone)]
pub struct PublicContext {
    container: Arc<Container>,
}

impl PublicContext {
    pub(crate) fn new(container: Arc<Container>) -> Self {
        Self { container }
    }

    pub fn has(&self, identifier: Identifier) -> bool {
        self.container.has(identifier)
    }

    pub fn concrete(&self, identifier: Identifier) -> Result<Identifier> {
        self.container.concrete(identifier)
    }

    pub fn require<T: Assemblage>(&self) -> Result<Arc<T>> {
        self.container.require::<T>()
    }

    pub fn require_identifier(&self, identifier: Identifier) -> Result<Arc<dyn Any + Send + Sync>> {
        self.container.require_dyn(identifier)
    }

    pub fn tagged(&self, tag: &str) -> Vec<Arc<dyn Any + Send + Sync>> {
        self.container.tagged(tag)
    }

    pub fn on(&self, channel: impl Into<String>, listener: Listener) -> ListenerId {
        self.container.events().on(channel.into(), listener)
    }

    pub fn off(&self, channel: &str, listener: Option<ListenerId>) {
        self.container.events().off(channel, listener)
    }

    pub fn emit(
        &self,
        channel: &str,
        args: Vec<Arc<dyn Any + Send + Sync>>,
        declared_by: (&'static str, &[String]),
    ) -> Result<Vec<(ListenerId, crate::error::DiError)>> {
        let (source_type, declared) = declared_by;
        self.container.events().emit(channel, &args, declared, source_type)
    }
}
