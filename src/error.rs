//! Error taxonomy for the assemblage kernel.
//!
//! Mirrors the shape of a typical DI container's error type (one
//! `thiserror` enum, constructor helpers per variant, a crate-wide
//! `Result` alias) but names the failure modes from the composition
//! model: bad definitions, duplicate/unknown identifiers, unresolved
//! constructor slots, dependency cycles, bad pointcuts and failing
//! lifecycle hooks.

use crate::identifier::Identifier;
use std::any::TypeId;
use thiserror::Error;

/// Errors that can occur while declaring, building, or driving an assemblage graph.
#[derive(Error, Debug, Clone)]
pub enum DiError {
    /// An assemblage's declared definition failed validation.
    #[error("invalid definition for {type_name}: {reason}")]
    InvalidDefinition {
        type_name: &'static str,
        reason: String,
    },

    /// The same identifier was registered twice with two different concretes.
    #[error("identifier {identifier:?} already registered with a different concrete")]
    DuplicateRegistration { identifier: Identifier },

    /// `require`/`concrete`/`has` addressed an identifier with no registry entry.
    #[error("unknown identifier: {identifier:?}")]
    UnknownIdentifier { identifier: Identifier },

    /// `emit` targeted a channel the assemblage never declared in its `events` list.
    #[error("unknown event channel {channel:?} (not declared by {type_name})")]
    UnknownChannel {
        channel: String,
        type_name: &'static str,
    },

    /// A constructor parameter slot had neither an ambient annotation nor a registered type.
    #[error("unresolved parameter `{slot}` on {type_name}")]
    UnresolvedParameter {
        type_name: &'static str,
        slot: &'static str,
    },

    /// A cycle was found in the singleton constructor-dependency graph.
    #[error("dependency cycle detected: {}", format_cycle(.0))]
    DependencyCycle(Vec<Identifier>),

    /// A pointcut expression failed the `execution(Type.method)` grammar.
    #[error("invalid pointcut expression: {expr}")]
    InvalidPointcut { expr: String },

    /// `onInit`/`onDispose` raised an error for a specific identifier.
    #[error("lifecycle hook failed for {identifier:?}: {reason}")]
    LifecycleFailure { identifier: Identifier, reason: String },

    /// Catch-all for invariant violations that should not occur outside a bug.
    #[error("internal assemblage error: {0}")]
    Internal(String),
}

fn format_cycle(path: &[Identifier]) -> String {
    path.iter()
        .map(|id| format!("{id:?}"))
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl DiError {
    #[inline]
    pub fn unknown_identifier(identifier: Identifier) -> Self {
        Self::UnknownIdentifier { identifier }
    }

    #[inline]
    pub fn unknown_type<T: 'static>() -> Self {
        Self::UnknownIdentifier {
            identifier: Identifier::of::<T>(),
        }
    }

    #[inline]
    pub fn duplicate(identifier: Identifier) -> Self {
        Self::DuplicateRegistration { identifier }
    }

    #[inline]
    pub fn unresolved_parameter(type_name: &'static str, slot: &'static str) -> Self {
        Self::UnresolvedParameter { type_name, slot }
    }

    #[inline]
    pub fn cycle(path: Vec<Identifier>) -> Self {
        Self::DependencyCycle(path)
    }

    #[inline]
    pub fn invalid_pointcut(expr: impl Into<String>) -> Self {
        Self::InvalidPointcut { expr: expr.into() }
    }

    #[inline]
    pub fn lifecycle(identifier: Identifier, reason: impl Into<String>) -> Self {
        Self::LifecycleFailure {
            identifier,
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn invalid_definition<T: 'static>(reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            type_name: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn unknown_channel(channel: impl Into<String>, type_name: &'static str) -> Self {
        Self::UnknownChannel {
            channel: channel.into(),
            type_name,
        }
    }

    /// The [`TypeId`] involved, when this error carries a type-based identifier.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Self::UnknownIdentifier { identifier } | Self::DuplicateRegistration { identifier } => {
                identifier.type_id()
            }
            _ => None,
        }
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DiError>;
