//! Reentrancy locks and the page-wide exclusivity flag.
//!
//! Both are advisory: a refused acquisition is a silent no-op for the caller,
//! never an error.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use tracing::trace;

use crate::dom::NodeId;

/// Per-binding lock held while that binding's call is in flight.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    /// True while a token is outstanding.
    held: AtomicBool,
}

impl ReentrancyGuard {
    /// Create a released guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock, or `None` when it is already held.
    pub fn try_acquire(&self) -> Option<ReentrancyToken<'_>> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ReentrancyToken { guard: self })
    }

    /// Whether a call holding this lock is in flight.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Proof of a held [`ReentrancyGuard`]; releases it when dropped.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the token is dropped"]
pub struct ReentrancyToken<'a> {
    /// Guard to release.
    guard: &'a ReentrancyGuard,
}

impl ReentrancyToken<'_> {
    /// Release the lock now.
    pub fn release(self) {}
}

impl Drop for ReentrancyToken<'_> {
    fn drop(&mut self) {
        self.guard.held.store(false, Ordering::Release);
    }
}

/// Page-scoped marker: at most one submit-style action in flight at a time.
///
/// The marker records which element is executing so that removing or
/// resetting that element can clear it.
#[derive(Debug, Clone, Default)]
pub struct ExclusivityState {
    /// Element currently executing, if any.
    executing: Arc<Mutex<Option<NodeId>>>,
}

impl ExclusivityState {
    /// Create a cleared flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any element is executing.
    pub fn is_executing(&self) -> bool {
        self.executing.lock().is_some()
    }

    /// Element currently executing.
    pub fn executing(&self) -> Option<NodeId> {
        *self.executing.lock()
    }

    /// Mark `element` executing; false when another action already holds the flag.
    pub fn try_begin(&self, element: NodeId) -> bool {
        let mut slot = self.executing.lock();
        if slot.is_some() {
            trace!(?element, holder = ?*slot, "exclusivity_refused");
            return false;
        }
        *slot = Some(element);
        true
    }

    /// Clear the flag if `element` holds it; returns whether it did.
    pub fn finish(&self, element: NodeId) -> bool {
        let mut slot = self.executing.lock();
        if *slot == Some(element) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// Clear the flag if its holder satisfies `pred`; returns the cleared holder.
    pub fn finish_if(&self, pred: impl FnOnce(NodeId) -> bool) -> Option<NodeId> {
        let mut slot = self.executing.lock();
        match *slot {
            Some(holder) if pred(holder) => slot.take(),
            _ => None,
        }
    }
}
