//! Send-half handle for the active plant connection.
//!
//! A [`PlantLink`] is what the bridge holds in its connection slot: the
//! sender of the per-connection outbound frame queue, tagged with a
//! [`LinkId`] so stale teardown notifications from a superseded connection
//! can be told apart from the live one. The receive half of the connection
//! is the WebSocket stream itself, consumed by the inbound dispatcher in
//! [`crate::ws::connection`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::CommandFrame;

/// Identifier of one accepted plant connection.
///
/// Monotonically increasing per gateway process. A new physical connection
/// always gets a fresh `LinkId`; a closed link never reopens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LinkId(u64);

impl LinkId {
    /// Creates a `LinkId` from a raw sequence number.
    #[must_use]
    pub const fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// Returns the raw sequence number.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned by [`PlantLink::send`] when a frame cannot be handed to
/// the connection's writer task.
///
/// Raised when the writer task has terminated (the connection is gone) or
/// the outbound queue is saturated; either way this link cannot deliver
/// the frame.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("plant link closed")]
pub struct ChannelClosed;

/// Handle to the currently active plant connection's outbound queue.
#[derive(Debug, Clone)]
pub struct PlantLink {
    id: LinkId,
    tx: mpsc::Sender<CommandFrame>,
    connected_at: DateTime<Utc>,
}

impl PlantLink {
    /// Creates a link handle over the given outbound queue sender.
    #[must_use]
    pub fn new(id: LinkId, tx: mpsc::Sender<CommandFrame>) -> Self {
        Self {
            id,
            tx,
            connected_at: Utc::now(),
        }
    }

    /// Returns this link's identifier.
    #[must_use]
    pub const fn id(&self) -> LinkId {
        self.id
    }

    /// Returns when this link was accepted.
    #[must_use]
    pub const fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Enqueues a frame for transmission on this connection.
    ///
    /// Uses `try_send` so a caller never suspends here — the only
    /// suspension point of a command round trip is the wait on its
    /// pending slot.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelClosed`] if the writer task is gone or the
    /// outbound queue is full.
    pub fn send(&self, frame: CommandFrame) -> Result<(), ChannelClosed> {
        self.tx.try_send(frame).map_err(|err| {
            if matches!(err, TrySendError::Full(_)) {
                tracing::warn!(link_id = %self.id, "plant link outbound queue full; dropping command");
            }
            ChannelClosed
        })
    }
}
