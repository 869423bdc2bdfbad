//! Pending-call table: one write-once slot per in-flight command.
//!
//! [`PendingCalls`] maps a [`CallId`] to the sender half of a
//! [`tokio::sync::oneshot`] channel on which exactly one caller waits.
//! Removing the entry and completing its slot happen under the same lock,
//! so a slot can never be resolved twice; a send to a receiver the caller
//! already dropped is deliberately ignored.
//!
//! Registration pairs the receiver with a [`PendingGuard`]. The guard
//! evicts the entry when dropped, so a caller whose future is cancelled
//! mid-wait takes its registration with it instead of stranding it in the
//! table.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;

use super::CallId;
use crate::error::GatewayError;

/// Outcome delivered through a pending slot: the reply payload on success,
/// or the failure that terminated the call.
pub type CallResult = Result<serde_json::Value, GatewayError>;

/// One registered call awaiting its reply.
#[derive(Debug)]
struct PendingSlot {
    created_at: DateTime<Utc>,
    tx: oneshot::Sender<CallResult>,
}

/// Table of in-flight commands keyed by correlation id.
///
/// # Concurrency
///
/// Safe under concurrent registration from many callers and resolution
/// from the single inbound dispatcher. Every read-modify-write runs under
/// one synchronous [`Mutex`] whose critical sections are single map
/// operations; the lock is never held across an await, which is what lets
/// [`PendingGuard`] evict from its destructor.
#[derive(Debug, Default)]
pub struct PendingCalls {
    slots: Mutex<HashMap<CallId, PendingSlot>>,
}

impl PendingCalls {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<CallId, PendingSlot>> {
        // Critical sections are single map operations; a poisoned lock
        // cannot hold a half-applied update, so take the guard anyway.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new pending call, returning the receiver the caller
    /// waits on paired with the guard that evicts the entry on drop.
    ///
    /// The guard is a no-op once the entry has been resolved, failed or
    /// removed; it only acts when the caller stops waiting with the entry
    /// still in the table.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if an entry with the same id
    /// already exists. Ids are generated as UUID v4 by the bridge, so this
    /// is a defensive invariant check rather than an expected path.
    pub fn register(
        &self,
        id: CallId,
    ) -> Result<(oneshot::Receiver<CallResult>, PendingGuard<'_>), GatewayError> {
        let (tx, rx) = oneshot::channel();
        let mut slots = self.table();
        if slots.contains_key(&id) {
            return Err(GatewayError::Internal(format!(
                "call {id} already registered"
            )));
        }
        slots.insert(
            id,
            PendingSlot {
                created_at: Utc::now(),
                tx,
            },
        );
        drop(slots);
        Ok((rx, PendingGuard { calls: self, id }))
    }

    /// Resolves the call with a success payload and removes its entry.
    ///
    /// Returns `false` when no entry matched — the call already timed out
    /// or was force-failed, and the reply is discarded without side
    /// effects.
    pub fn resolve(&self, id: CallId, value: serde_json::Value) -> bool {
        let slot = self.table().remove(&id);
        match slot {
            Some(slot) => {
                let elapsed_ms = Utc::now()
                    .signed_duration_since(slot.created_at)
                    .num_milliseconds();
                tracing::debug!(call_id = %id, elapsed_ms, "pending call resolved");
                // The receiver may already be gone; that is a no-op.
                let _ = slot.tx.send(Ok(value));
                true
            }
            None => false,
        }
    }

    /// Resolves the call with a failure and removes its entry.
    ///
    /// Unknown ids are a silent no-op, as with [`PendingCalls::resolve`].
    pub fn fail(&self, id: CallId, error: GatewayError) -> bool {
        let slot = self.table().remove(&id);
        match slot {
            Some(slot) => {
                let _ = slot.tx.send(Err(error));
                true
            }
            None => false,
        }
    }

    /// Evicts an entry without completing its slot.
    ///
    /// Used when the caller itself has stopped waiting: the timeout and
    /// send-failure paths call it directly, and [`PendingGuard`] calls it
    /// when an abandoned caller's future is dropped. Returns `false` when
    /// the entry was already gone.
    pub fn remove(&self, id: CallId) -> bool {
        self.table().remove(&id).is_some()
    }

    /// Removes every entry and fails each slot with a freshly built error.
    ///
    /// Returns the number of calls failed. Used on disconnect and on
    /// connection supersede so every blocked caller wakes immediately.
    pub fn drain_all_failing<F>(&self, make_error: F) -> usize
    where
        F: Fn() -> GatewayError,
    {
        let drained: Vec<PendingSlot> = {
            let mut slots = self.table();
            slots.drain().map(|(_, slot)| slot).collect()
        };
        let count = drained.len();
        for slot in drained {
            let _ = slot.tx.send(Err(make_error()));
        }
        count
    }

    /// Returns the number of calls currently in flight.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    /// Returns `true` if no call is in flight.
    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }
}

/// Evicts its registration from the table when dropped.
///
/// Held by the issuing caller for the lifetime of its wait. The normal
/// verdicts (reply, forced failure, explicit eviction) remove the entry
/// first and make the drop a no-op; a caller cancelled mid-wait drops the
/// guard with its future, and the registration goes with it.
#[derive(Debug)]
pub struct PendingGuard<'a> {
    calls: &'a PendingCalls,
    id: CallId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.calls.remove(self.id) {
            tracing::debug!(call_id = %self.id, "evicted pending call abandoned by its caller");
        }
    }
}
