//! The per-assemblage declaration: what it injects, what it uses
//! ready-built, which event channels it may emit on, its tags, and its
//! forwarded metadata.
//!
//! Plain data, built up with a builder-style chained API and
//! `#[derive(Clone)]` throughout, so a hand-written `Assemblage::definition`
//! impl reads the same as one `#[derive(Assemblage)]` would generate.

use crate::error::{DiError, Result};
use crate::identifier::Identifier;
use crate::transversal::Advice;
use crate::vtable::AssemblageVTable;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A well-known metadata key forwarded to an instance's `Definition`
/// parameter slot. See [`crate::metadata`] for the declaration-time store.
pub type MetaKey = &'static str;

/// Arbitrary per-assemblage metadata, forwarded verbatim to any
/// constructor slot annotated `Definition`/`Metadata`.
pub type MetadataMap = BTreeMap<MetaKey, Arc<dyn Any + Send + Sync>>;

/// One entry of an `inject` list: register `vtable`'s concrete type
/// under `identifier` (which may be the concrete's own identifier, or
/// a distinct abstract identifier it is bound to), with an optional
/// per-entry configuration object.
#[derive(Clone)]
pub struct InjectionTuple {
    pub identifier: Identifier,
    pub vtable: AssemblageVTable,
    pub configuration: Option<Arc<dyn Any + Send + Sync>>,
}

impl InjectionTuple {
    /// `[Concrete]` — register `T` under its own identifier.
    pub fn concrete<T: crate::assemblage::Assemblage + crate::assemblage::Lifecycle>() -> Self {
        let vtable = AssemblageVTable::of::<T>();
        Self {
            identifier: Identifier::of::<T>(),
            vtable,
            configuration: None,
        }
    }

    /// `[Abstract, Concrete]` — register `T` under `Abstract`'s identifier.
    pub fn under<Abstract: 'static, T: crate::assemblage::Assemblage + crate::assemblage::Lifecycle>() -> Self {
        let vtable = AssemblageVTable::of::<T>();
        Self {
            identifier: Identifier::of::<Abstract>(),
            vtable,
            configuration: None,
        }
    }

    /// Attach a configuration object, turning `[Concrete]` into
    /// `[Concrete, Configuration]` (or likewise for the abstract form).
    pub fn with_configuration(mut self, configuration: Arc<dyn Any + Send + Sync>) -> Self {
        self.configuration = Some(configuration);
        self
    }
}

/// One entry of a `use` list: bind a pre-built value under an
/// identifier without ever constructing it.
#[derive(Clone)]
pub struct UseTuple {
    pub identifier: Identifier,
    pub value: Arc<dyn Any + Send + Sync>,
}

impl UseTuple {
    pub fn new(identifier: Identifier, value: Arc<dyn Any + Send + Sync>) -> Self {
        Self { identifier, value }
    }
}

/// The normalized declaration attached to an assemblage.
#[derive(Clone, Default)]
pub struct AssemblageDef {
    pub singleton: bool,
    pub inject: Vec<InjectionTuple>,
    pub use_: Vec<UseTuple>,
    pub events: Vec<String>,
    pub tags: Vec<String>,
    pub metadata: MetadataMap,
    /// Transversals to install once the root assemblage finishes
    /// building. Only meaningful on a root definition; non-root
    /// definitions leave this empty.
    pub engage: Vec<fn() -> Vec<Advice>>,
}

impl AssemblageDef {
    pub fn new() -> Self {
        Self {
            singleton: true,
            ..Default::default()
        }
    }

    pub fn transient(mut self) -> Self {
        self.singleton = false;
        self
    }

    pub fn inject(mut self, tuple: InjectionTuple) -> Self {
        self.inject.push(tuple);
        self
    }

    pub fn uses(mut self, tuple: UseTuple) -> Self {
        self.use_.push(tuple);
        self
    }

    pub fn event(mut self, channel: impl Into<String>) -> Self {
        self.events.push(channel.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn metadatum(mut self, key: MetaKey, value: Arc<dyn Any + Send + Sync>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn engage(mut self, transversal: fn() -> Vec<Advice>) -> Self {
        self.engage.push(transversal);
        self
    }
}

/// Normalizes a raw declaration: collapses duplicate event channels
/// while keeping first-seen order, rejects empty channel names, and
/// trims/dedups tags. Missing fields already default to empty lists /
/// `singleton = true` at the Rust type level, so there is no "unknown
/// top-level key" check to perform here.
pub fn validate<T: 'static>(def: AssemblageDef) -> Result<AssemblageDef> {
    validate_named(std::any::type_name::<T>(), def)
}

/// As [`validate`], but for call sites (the Builder's registration walk)
/// that only have a vtable's erased `type_name`, not the concrete `T`.
pub fn validate_named(type_name: &'static str, def: AssemblageDef) -> Result<AssemblageDef> {
    let mut seen_events = std::collections::HashSet::new();
    let mut events = Vec::with_capacity(def.events.len());
    for channel in def.events {
        if channel.trim().is_empty() {
            return Err(DiError::InvalidDefinition {
                type_name,
                reason: "event channel names must be non-empty".into(),
            });
        }
        if seen_events.insert(channel.clone()) {
            events.push(channel);
        }
    }

    let mut seen_tags = std::collections::HashSet::new();
    let mut tags = Vec::with_capacity(def.tags.len());
    for tag in def.tags {
        let tag = tag.trim().to_string();
        if tag.is_empty() {
            continue;
        }
        if seen_tags.insert(tag.clone()) {
            tags.push(tag);
        }
    }

    Ok(AssemblageDef {
        events,
        tags,
        ..def
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture;

    #[test]
    fn validate_collapses_duplicate_events() {
        let def = AssemblageDef::new()
            .event("orders:created")
            .event("orders:created")
            .event("orders:shipped");

        let normalized = validate::<Fixture>(def).unwrap();
        assert_eq!(normalized.events, vec!["orders:created", "orders:shipped"]);
    }

    #[test]
    fn validate_rejects_blank_event_names() {
        let def = AssemblageDef::new().event("   ");
        assert!(validate::<Fixture>(def).is_err());
    }

    #[test]
    fn validate_dedups_and_trims_tags() {
        let def = AssemblageDef::new().tag(" api ").tag("api").tag("service");
        let normalized = validate::<Fixture>(def).unwrap();
        assert_eq!(normalized.tags, vec!["api", "service"]);
    }

    #[test]
    fn default_is_singleton_with_empty_lists() {
        let def = AssemblageDef::new();
        assert!(def.singleton);
        assert!(def.inject.is_empty());
        assert!(def.use_.is_empty());
    }
}
