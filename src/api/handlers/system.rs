//! System endpoints: health check and bridge status.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp. Does not touch the plant link.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Bridge status response.
#[derive(Debug, Serialize, ToSchema)]
struct StatusResponse {
    /// Whether the plant link is currently up.
    connected: bool,
    /// Identifier of the active link, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    link_id: Option<u64>,
    /// RFC 3339 timestamp of when the active link was accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    connected_at: Option<String>,
    /// Number of commands awaiting a plant reply.
    pending_calls: usize,
}

/// `GET /status` — Plant link and pending-call status.
#[utoipa::path(
    get,
    path = "/status",
    tag = "System",
    summary = "Bridge status",
    description = "Reports whether the plant is connected, since when, and how many calls are in flight.",
    responses(
        (status = 200, description = "Current bridge status", body = StatusResponse),
    )
)]
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.bridge.status().await;
    (
        StatusCode::OK,
        Json(StatusResponse {
            connected: status.connected,
            link_id: status.link_id.map(|id| id.as_u64()),
            connected_at: status.connected_at.map(|at| at.to_rfc3339()),
            pending_calls: status.pending_calls,
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
}
