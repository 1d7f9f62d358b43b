//! Event Bus: per-container, channel-scoped pub/sub with declared-channel
//! discipline.
//!
//! A `DashMap`-backed channel table, with each channel's listener list
//! behind its own `parking_lot::Mutex<Vec<_>>` so emitting on one
//! channel never blocks a subscription on another.

use crate::error::{DiError, Result};
use ahash::RandomState;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handle returned by [`EventBus::on`], used to remove a specific listener.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct ListenerId(u64);

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// A subscriber callback. Receives the arguments passed to `emit` and
/// may fail; a failure does not prevent delivery to other listeners.
pub type Listener = Arc<dyn Fn(&[Arc<dyn Any + Send + Sync>]) -> Result<()> + Send + Sync>;

struct Subscription {
    id: ListenerId,
    listener: Listener,
}

/// Scoped to one [`crate::container::Container`]; per channel, maintains
/// an ordered list of listeners delivered to synchronously, in
/// registration order.
pub struct EventBus {
    channels: DashMap<String, Mutex<Vec<Subscription>>, RandomState>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            channels: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Subscribe `listener` to `channel`. Registering the exact same
    /// `Arc` twice on the same channel is idempotent.
    pub fn on(&self, channel: impl Into<String>, listener: Listener) -> ListenerId {
        let channel = channel.into();
        let binding = self
            .channels
            .entry(channel)
            .or_insert_with(|| Mutex::new(Vec::new()));
        let mut subs = binding.value().lock();

        if let Some(existing) = subs
            .iter()
            .find(|sub| Arc::ptr_eq(&sub.listener, &listener))
        {
            return existing.id;
        }

        let id = ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed));
        subs.push(Subscription { id, listener });
        id
    }

    /// Remove one listener by id, or clear the whole channel if `id` is `None`.
    pub fn off(&self, channel: &str, id: Option<ListenerId>) {
        let Some(subs) = self.channels.get(channel) else {
            return;
        };
        let mut subs = subs.lock();
        match id {
            Some(id) => subs.retain(|sub| sub.id != id),
            None => subs.clear(),
        }
    }

    /// Deliver `args` to every listener on `channel`, in registration
    /// order. `declared` must list `channel` or the call fails with
    /// `UnknownChannel` before anything is delivered. Listener failures
    /// are collected rather than aborting delivery to peers.
    pub fn emit(
        &self,
        channel: &str,
        args: &[Arc<dyn Any + Send + Sync>],
        declared: &[String],
        source_type: &'static str,
    ) -> Result<Vec<(ListenerId, DiError)>> {
        if !declared.iter().any(|c| c == channel) {
            return Err(DiError::unknown_channel(channel, source_type));
        }

        let Some(subs) = self.channels.get(channel) else {
            return Ok(Vec::new());
        };
        let subs = subs.lock();
        let mut failures = Vec::new();
        for sub in subs.iter() {
            if let Err(err) = (sub.listener)(args) {
                failures.push((sub.id, err));
            }
        }
        Ok(failures)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
