//! Bridge layer: call correlation over a single plant connection.
//!
//! This module contains the correlation core of the gateway: call
//! identity, the command wire frame, the pending-call table, the link
//! handle for the active connection, and the [`DeviceBridge`] that ties
//! them together.

pub mod call_id;
pub mod command;
pub mod device_bridge;
pub mod link;
pub mod pending;

pub use call_id::CallId;
pub use command::{Command, CommandFrame};
pub use device_bridge::{BridgeStatus, DeviceBridge};
pub use link::{ChannelClosed, LinkId, PlantLink};
pub use pending::{CallResult, PendingCalls, PendingGuard};
