//! Axum WebSocket upgrade handler for the plant endpoint.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /ws/plant` — Upgrade the plant device connection to WebSocket.
///
/// A newly accepted connection supersedes any existing one; the bridge
/// handles the handover.
pub async fn plant_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let bridge = std::sync::Arc::clone(&state.bridge);

    ws.on_upgrade(move |socket| run_connection(socket, bridge))
}
