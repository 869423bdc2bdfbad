//! planta-gateway server entry point.
//!
//! Starts the Axum HTTP server with the REST facade and the plant
//! WebSocket endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use planta_gateway::api;
use planta_gateway::app_state::AppState;
use planta_gateway::bridge::DeviceBridge;
use planta_gateway::config::GatewayConfig;
use planta_gateway::ws::handler::plant_ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting planta-gateway");

    // Build the bridge
    let bridge = Arc::new(DeviceBridge::new(
        Duration::from_secs(config.command_timeout_secs),
        config.outbound_queue_capacity,
    ));

    let app_state = AppState { bridge };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws/plant", get(plant_ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    #[cfg(feature = "swagger-ui")]
    let app = app.merge(
        utoipa_swagger_ui::SwaggerUi::new("/docs").url(
            "/api-docs/openapi.json",
            <api::ApiDoc as utoipa::OpenApi>::openapi(),
        ),
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
