//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::bridge::DeviceBridge;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Correlation bridge to the plant device.
    pub bridge: Arc<DeviceBridge>,
}
