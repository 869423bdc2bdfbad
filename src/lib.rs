//! # planta-gateway
//!
//! REST gateway bridging stateless HTTP clients to a single
//! intermittently-connected plant device over a correlated WebSocket link.
//!
//! HTTP callers never see the transport: each request becomes a command
//! frame tagged with a fresh call id, goes out over the plant's WebSocket,
//! and the handler blocks until the correlated reply arrives, the call
//! times out, or the link drops.
//!
//! ## Architecture
//!
//! ```text
//! HTTP clients                         Plant device
//!     │                                     │
//!     ├── REST Handlers (api/)       WS endpoint (ws/)
//!     │          │                          │
//!     │          └──── DeviceBridge ────────┘
//!     │                 (bridge/)
//!     │          pending calls · link slot
//! ```

pub mod api;
pub mod app_state;
pub mod bridge;
pub mod config;
pub mod error;
pub mod ws;
