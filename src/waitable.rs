//! Waitable Gate: turns a method into a poll-until-property-truthy
//! async wait, with cancellation on container dispose.
//!
//! Prefers a one-shot [`tokio::sync::Notify`] wake over bare polling —
//! `signal_ready`/`dispose` fire it immediately — falling back to the
//! polling interval only as a backstop for a guard flipped without
//! going through `signal_ready`.

use crate::error::{DiError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

/// Default polling interval, matching the source's documented 25 ms default.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// A single property gate. One `Waitable` guards one property on one
/// instance; an instance with several `Waitable`-decorated methods owns
/// several of these.
pub struct Waitable {
    ready: AtomicBool,
    disposed: AtomicBool,
    notify: Notify,
}

impl Waitable {
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Flips the guarded property truthy and wakes every waiter immediately.
    pub fn signal_ready(&self) {
        self.ready.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Cancels all pending waiters. Called when `on_dispose` fires on
    /// the owning instance.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Resolves once [`Waitable::signal_ready`] has been called, or
    /// fails once [`Waitable::dispose`] has. Falls back to polling
    /// every `interval` in case the guard is flipped by some other
    /// means than `signal_ready`.
    pub async fn wait(&self, interval: Duration) -> Result<()> {
        loop {
            if self.disposed.load(Ordering::Acquire) {
                return Err(DiError::Internal("waitable cancelled by dispose".into()));
            }
            if self.ready.load(Ordering::Acquire) {
                return Ok(());
            }
            tokio::select! {
                _ = self.notify.notified() => {}
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    pub async fn wait_default(&self) -> Result<()> {
        self.wait(DEFAULT_POLL_INTERVAL).await
    }
}

impl Default for Waitable {
    fn default() -> Self {
        Self::new()
    }
}
