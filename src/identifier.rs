//! Identifiers used to address an entry in the identifier registry.
//!
//! An [`Identifier`] is the key half of the registry's identifier to
//! concrete-type mapping. It can name a concrete type directly, an
//! abstract marker type (a trait or tag struct used only as a key), a
//! string tag, or an interned [`Symbol`] — `TypeId` is the canonical
//! registration key, extended with string and symbol variants for
//! identifiers that have no corresponding Rust type.

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// An interned, process-unique symbol identifier.
///
/// Distinct from a string tag: two `Symbol`s are only equal if they
/// came from the same [`Symbol::new`] call, even when created from
/// identical descriptions.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct Symbol {
    id: u64,
    description: &'static str,
}

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

impl Symbol {
    /// Mints a new, globally unique symbol with the given description.
    pub fn new(description: &'static str) -> Self {
        let id = NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed);
        Self { id, description }
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({}#{})", self.description, self.id)
    }
}

/// A key addressing an entry in the identifier registry.
///
/// `Type` identifiers compare by [`TypeId`] alone; `Str` and `Sym`
/// identifiers compare by value. There is no abstract/concrete
/// distinction at the type level — a trait marker and a concrete
/// struct are both just a `Type` identifier over whatever type was
/// used to register them; the registry never needs to know whether an
/// identifier's type is ever instantiated directly.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub enum Identifier {
    /// Identifies by Rust type, e.g. `Identifier::of::<Logger>()`.
    Type {
        type_id: TypeId,
        type_name: &'static str,
    },
    /// Identifies by an arbitrary string tag.
    Str(&'static str),
    /// Identifies by an interned, collision-proof symbol.
    Sym(Symbol),
}

impl Identifier {
    /// Builds a type-keyed identifier for `T`.
    pub fn of<T: 'static>() -> Self {
        Self::Type {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Builds a string-keyed identifier.
    pub fn tag(name: &'static str) -> Self {
        Self::Str(name)
    }

    /// Builds a symbol-keyed identifier.
    pub fn symbol(symbol: Symbol) -> Self {
        Self::Sym(symbol)
    }

    /// The [`TypeId`] behind this identifier, if it is a `Type` identifier.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Self::Type { type_id, .. } => Some(*type_id),
            _ => None,
        }
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { type_name, .. } => write!(f, "Identifier::Type({type_name})"),
            Self::Str(s) => write!(f, "Identifier::Str({s:?})"),
            Self::Sym(s) => write!(f, "Identifier::Sym({s:?})"),
        }
    }
}
