//! Correlation bridge between stateless HTTP callers and the plant link.
//!
//! [`DeviceBridge`] owns the two pieces of shared state in the gateway:
//! the single active-connection slot and the [`PendingCalls`] table. HTTP
//! handlers call [`DeviceBridge::issue_command`] and block on the reply;
//! the WebSocket layer feeds connection lifecycle events and inbound
//! replies back in through [`DeviceBridge::accept_connection`],
//! [`DeviceBridge::on_disconnect`] and [`DeviceBridge::resolve_reply`].
//!
//! Lock order is always connection slot before pending table, and
//! `issue_command` never holds either lock while waiting for the reply.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc};

use super::{CallId, Command, CommandFrame, LinkId, PendingCalls, PlantLink};
use crate::error::GatewayError;

/// Snapshot of the bridge state for the status endpoint.
#[derive(Debug, Clone)]
pub struct BridgeStatus {
    /// Whether a plant connection is currently active.
    pub connected: bool,
    /// Identifier of the active link, if any.
    pub link_id: Option<LinkId>,
    /// When the active link was established, if any.
    pub connected_at: Option<DateTime<Utc>>,
    /// Number of commands currently awaiting a reply.
    pub pending_calls: usize,
}

/// Request/response bridge over a single intermittent plant connection.
#[derive(Debug)]
pub struct DeviceBridge {
    pending: PendingCalls,
    link: Mutex<Option<PlantLink>>,
    link_seq: AtomicU64,
    command_timeout: Duration,
    outbound_capacity: usize,
}

impl DeviceBridge {
    /// Creates a bridge with no active connection.
    ///
    /// `command_timeout` bounds every [`DeviceBridge::issue_command`] wait;
    /// `outbound_capacity` is the per-connection outbound queue size handed
    /// to the WebSocket layer.
    #[must_use]
    pub fn new(command_timeout: Duration, outbound_capacity: usize) -> Self {
        Self {
            pending: PendingCalls::new(),
            link: Mutex::new(None),
            link_seq: AtomicU64::new(1),
            command_timeout,
            outbound_capacity,
        }
    }

    /// Outbound queue capacity for a new plant connection.
    #[must_use]
    pub const fn outbound_capacity(&self) -> usize {
        self.outbound_capacity
    }

    /// Installs a new plant connection and returns its link id.
    ///
    /// If a connection is already active it is superseded: the slot is
    /// replaced and every call pending against the old link fails
    /// immediately with [`GatewayError::DeviceDisconnected`]. The slot lock
    /// is held across the drain so no caller can register against the new
    /// link while old entries are still being swept.
    pub async fn accept_connection(&self, tx: mpsc::Sender<CommandFrame>) -> LinkId {
        let id = LinkId::new(self.link_seq.fetch_add(1, Ordering::Relaxed));
        let mut slot = self.link.lock().await;
        if let Some(old) = slot.take() {
            let drained = self
                .pending
                .drain_all_failing(|| GatewayError::DeviceDisconnected);
            tracing::warn!(
                old_link = %old.id(),
                new_link = %id,
                drained,
                "superseding active plant connection"
            );
        }
        *slot = Some(PlantLink::new(id, tx));
        tracing::info!(link_id = %id, "plant connection established");
        id
    }

    /// Handles the end of a plant connection.
    ///
    /// Clears the slot and fails every outstanding call with
    /// [`GatewayError::DeviceDisconnected`] — but only when `link_id` still
    /// names the active link. A disconnect from a superseded connection
    /// arrives after its replacement is installed and must not touch the
    /// new link's state.
    pub async fn on_disconnect(&self, link_id: LinkId) {
        let mut slot = self.link.lock().await;
        let is_current = slot.as_ref().is_some_and(|link| link.id() == link_id);
        if is_current {
            *slot = None;
            let drained = self
                .pending
                .drain_all_failing(|| GatewayError::DeviceDisconnected);
            tracing::info!(link_id = %link_id, drained, "plant connection closed");
        } else {
            tracing::debug!(link_id = %link_id, "ignoring disconnect for superseded link");
        }
    }

    /// Sends a command to the plant and waits for the correlated reply.
    ///
    /// The call is bounded by the configured command timeout. On timeout
    /// the pending entry is evicted, so a reply arriving later is discarded
    /// as unknown. A caller that stops waiting early (its future dropped
    /// mid-await) evicts its entry the same way, through the registration
    /// guard.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::DeviceUnavailable`] when no connection is active
    ///   or the command cannot be handed to the connection.
    /// - [`GatewayError::DeviceDisconnected`] when the connection drops
    ///   while the call is outstanding.
    /// - [`GatewayError::DeviceTimeout`] when no reply arrives in time.
    pub async fn issue_command(&self, command: Command) -> Result<serde_json::Value, GatewayError> {
        let link = { self.link.lock().await.clone() };
        let Some(link) = link else {
            return Err(GatewayError::DeviceUnavailable);
        };

        let call_id = CallId::new();
        // The guard outlives every await below; if this future is dropped
        // before a verdict, the entry leaves the table with it.
        let (rx, _evict) = self.pending.register(call_id)?;
        tracing::debug!(
            call_id = %call_id,
            action = %command.action,
            link_id = %link.id(),
            "dispatching command to plant"
        );

        let frame = command.into_frame(call_id);
        if link.send(frame).is_err() {
            self.pending.remove(call_id);
            return Err(GatewayError::DeviceUnavailable);
        }

        match tokio::time::timeout(self.command_timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            // Sender dropped without completing: the table itself went away.
            Ok(Err(_)) => Err(GatewayError::DeviceDisconnected),
            Err(_) => {
                self.pending.remove(call_id);
                tracing::warn!(
                    call_id = %call_id,
                    timeout = ?self.command_timeout,
                    "command timed out waiting for plant reply"
                );
                Err(GatewayError::DeviceTimeout)
            }
        }
    }

    /// Delivers a reply received from the plant to its waiting caller.
    ///
    /// Replies whose id matches no pending call (already timed out, drained
    /// or never issued) are logged and dropped.
    pub fn resolve_reply(&self, call_id: CallId, payload: serde_json::Value) {
        if !self.pending.resolve(call_id, payload) {
            tracing::debug!(call_id = %call_id, "discarding reply for unknown or expired call");
        }
    }

    /// Returns a point-in-time snapshot of connection and pending state.
    pub async fn status(&self) -> BridgeStatus {
        let (connected, link_id, connected_at) = {
            let slot = self.link.lock().await;
            match slot.as_ref() {
                Some(link) => (true, Some(link.id()), Some(link.connected_at())),
                None => (false, None, None),
            }
        };
        BridgeStatus {
            connected,
            link_id,
            connected_at,
            pending_calls: self.pending.len(),
        }
    }
}
