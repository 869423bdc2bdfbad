//! WebSocket layer: the plant-side half of the gateway.
//!
//! The endpoint at `/ws/plant` carries the single bidirectional link to
//! the plant device: command frames flow out, reply frames flow back in
//! and are correlated by the bridge.

pub mod connection;
pub mod handler;
pub mod messages;
