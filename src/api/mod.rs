//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Plant-facing endpoints are mounted under `/api/v1`; health and status
//! live at the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::error::{ErrorBody, ErrorResponse};
use self::dto::CommandRequest;

/// OpenAPI document covering the whole REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    paths(
        handlers::plant::dashboard_summary,
        handlers::plant::list_equipment,
        handlers::plant::equipment_sensors,
        handlers::plant::equipment_analysis,
        handlers::plant::equipment_events,
        handlers::plant::send_command,
        handlers::system::health_handler,
        handlers::system::status_handler,
    ),
    components(schemas(CommandRequest, ErrorResponse, ErrorBody)),
    tags(
        (name = "Plant", description = "Data and command facade over the plant link"),
        (name = "System", description = "Gateway health and bridge status"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
