//! Plant data handlers: every endpoint is a blocking round trip through
//! the bridge to the device.
//!
//! Responses are the plant's reply payloads passed through untouched, so
//! the JSON shape is owned by the plant, not the gateway.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::CommandRequest;
use crate::app_state::AppState;
use crate::bridge::Command;
use crate::error::{ErrorResponse, GatewayError};

/// Issues a command through the bridge and wraps the reply payload.
async fn forward(
    state: &AppState,
    command: Command,
) -> Result<Json<serde_json::Value>, GatewayError> {
    let payload = state.bridge.issue_command(command).await?;
    Ok(Json(payload))
}

/// `GET /dashboard/resumen` — Plant-wide dashboard summary.
///
/// # Errors
///
/// Returns [`GatewayError`] when the plant is unavailable, disconnects, or
/// does not reply in time.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/resumen",
    tag = "Plant",
    summary = "Dashboard summary",
    description = "Fetches the aggregated dashboard summary from the plant.",
    responses(
        (status = 200, description = "Summary as reported by the plant", body = serde_json::Value),
        (status = 503, description = "Plant not connected or disconnected mid-call", body = ErrorResponse),
        (status = 504, description = "Plant did not reply in time", body = ErrorResponse),
    )
)]
pub async fn dashboard_summary(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    forward(&state, Command::new("dashboard")).await
}

/// `GET /equipos` — List plant equipment.
///
/// # Errors
///
/// Returns [`GatewayError`] when the plant is unavailable, disconnects, or
/// does not reply in time.
#[utoipa::path(
    get,
    path = "/api/v1/equipos",
    tag = "Plant",
    summary = "List equipment",
    description = "Fetches the equipment inventory from the plant.",
    responses(
        (status = 200, description = "Equipment list as reported by the plant", body = serde_json::Value),
        (status = 503, description = "Plant not connected or disconnected mid-call", body = ErrorResponse),
        (status = 504, description = "Plant did not reply in time", body = ErrorResponse),
    )
)]
pub async fn list_equipment(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    forward(&state, Command::new("equipos")).await
}

/// `GET /sensores/:id_equipo` — Live sensor readings for one equipment.
///
/// # Errors
///
/// Returns [`GatewayError`] when the plant is unavailable, disconnects, or
/// does not reply in time.
#[utoipa::path(
    get,
    path = "/api/v1/sensores/{id_equipo}",
    tag = "Plant",
    summary = "Equipment sensors",
    description = "Fetches current sensor readings for the given equipment.",
    params(
        ("id_equipo" = String, Path, description = "Equipment identifier"),
    ),
    responses(
        (status = 200, description = "Sensor readings as reported by the plant", body = serde_json::Value),
        (status = 503, description = "Plant not connected or disconnected mid-call", body = ErrorResponse),
        (status = 504, description = "Plant did not reply in time", body = ErrorResponse),
    )
)]
pub async fn equipment_sensors(
    State(state): State<AppState>,
    Path(equipment_id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    forward(&state, Command::new("sensores").with_target(equipment_id)).await
}

/// `GET /analisis/:id_equipo` — Historical analysis for one equipment.
///
/// Query parameters (e.g. `periodo=24h`) are forwarded to the plant
/// verbatim.
///
/// # Errors
///
/// Returns [`GatewayError`] when the plant is unavailable, disconnects, or
/// does not reply in time.
#[utoipa::path(
    get,
    path = "/api/v1/analisis/{id_equipo}",
    tag = "Plant",
    summary = "Equipment analysis",
    description = "Fetches historical analysis for the given equipment; query parameters are forwarded to the plant.",
    params(
        ("id_equipo" = String, Path, description = "Equipment identifier"),
        ("periodo" = Option<String>, Query, description = "Analysis window understood by the plant, e.g. `24h`"),
    ),
    responses(
        (status = 200, description = "Analysis data as reported by the plant", body = serde_json::Value),
        (status = 503, description = "Plant not connected or disconnected mid-call", body = ErrorResponse),
        (status = 504, description = "Plant did not reply in time", body = ErrorResponse),
    )
)]
pub async fn equipment_analysis(
    State(state): State<AppState>,
    Path(equipment_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, GatewayError> {
    let command = Command::new("analisis")
        .with_target(equipment_id)
        .with_params(params);
    forward(&state, command).await
}

/// `GET /eventos/:id_equipo` — Event log for one equipment.
///
/// Query parameters are forwarded to the plant verbatim.
///
/// # Errors
///
/// Returns [`GatewayError`] when the plant is unavailable, disconnects, or
/// does not reply in time.
#[utoipa::path(
    get,
    path = "/api/v1/eventos/{id_equipo}",
    tag = "Plant",
    summary = "Equipment events",
    description = "Fetches the event log for the given equipment; query parameters are forwarded to the plant.",
    params(
        ("id_equipo" = String, Path, description = "Equipment identifier"),
        ("periodo" = Option<String>, Query, description = "Event window understood by the plant, e.g. `7d`"),
    ),
    responses(
        (status = 200, description = "Events as reported by the plant", body = serde_json::Value),
        (status = 503, description = "Plant not connected or disconnected mid-call", body = ErrorResponse),
        (status = 504, description = "Plant did not reply in time", body = ErrorResponse),
    )
)]
pub async fn equipment_events(
    State(state): State<AppState>,
    Path(equipment_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, GatewayError> {
    let command = Command::new("eventos")
        .with_target(equipment_id)
        .with_params(params);
    forward(&state, command).await
}

/// `POST /comando` — Send an arbitrary command to the plant.
///
/// Escape hatch for actions the typed routes do not cover.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on an empty action, otherwise
/// the usual bridge errors.
#[utoipa::path(
    post,
    path = "/api/v1/comando",
    tag = "Plant",
    summary = "Send raw command",
    description = "Forwards an arbitrary command to the plant and returns its reply payload.",
    request_body = CommandRequest,
    responses(
        (status = 200, description = "Reply payload from the plant", body = serde_json::Value),
        (status = 400, description = "Empty action", body = ErrorResponse),
        (status = 503, description = "Plant not connected or disconnected mid-call", body = ErrorResponse),
        (status = 504, description = "Plant did not reply in time", body = ErrorResponse),
    )
)]
pub async fn send_command(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if req.action.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "action must not be empty".to_string(),
        ));
    }
    forward(&state, Command::from(req)).await
}

/// Plant data routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/resumen", get(dashboard_summary))
        .route("/equipos", get(list_equipment))
        .route("/sensores/{id_equipo}", get(equipment_sensors))
        .route("/analisis/{id_equipo}", get(equipment_analysis))
        .route("/eventos/{id_equipo}", get(equipment_events))
        .route("/comando", post(send_command))
}
