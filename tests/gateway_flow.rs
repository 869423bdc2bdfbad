//! End-to-end gateway flow tests.
//!
//! Each test boots the real Axum server on an ephemeral port, attaches a
//! fake plant over tokio-tungstenite and drives the REST side with
//! reqwest, so the whole path — handler, bridge, WebSocket loop — is
//! exercised exactly as in production.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use planta_gateway::api;
use planta_gateway::app_state::AppState;
use planta_gateway::bridge::DeviceBridge;
use planta_gateway::ws::handler::plant_ws_handler;

type PlantSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Boots the gateway on an ephemeral port and returns its `host:port`.
async fn spawn_gateway(command_timeout: Duration) -> Result<String> {
    let bridge = Arc::new(DeviceBridge::new(command_timeout, 32));
    let state = AppState { bridge };
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws/plant", get(plant_ws_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind ephemeral port")?;
    let addr = listener.local_addr().context("read local addr")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("127.0.0.1:{}", addr.port()))
}

/// Connects a fake plant to the gateway's WebSocket endpoint.
async fn connect_plant(host: &str) -> Result<PlantSocket> {
    let (socket, _) = tokio_tungstenite::connect_async(format!("ws://{host}/ws/plant"))
        .await
        .context("plant websocket connect")?;
    Ok(socket)
}

/// Polls `/status` until the gateway reports the plant link as active.
///
/// The WebSocket handshake completes before the connection is installed
/// in the bridge, so tests must not issue commands until this returns.
async fn wait_until_connected(client: &reqwest::Client, host: &str) -> Result<()> {
    for _ in 0..100 {
        let status: Value = client
            .get(format!("http://{host}/status"))
            .send()
            .await?
            .json()
            .await?;
        if status.get("connected").and_then(Value::as_bool) == Some(true) {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    anyhow::bail!("plant link never became active")
}

/// Reads the next command frame the gateway pushed to the plant.
async fn next_command(plant: &mut PlantSocket) -> Result<Value> {
    loop {
        let msg = plant.next().await.context("plant socket ended")??;
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).context("decode command frame");
        }
    }
}

/// Sends a correlated reply back through the plant socket.
async fn send_reply(plant: &mut PlantSocket, call_id: &Value, payload: Value) -> Result<()> {
    let reply = json!({ "callId": call_id, "payload": payload });
    plant
        .send(Message::text(reply.to_string()))
        .await
        .context("send reply frame")
}

#[tokio::test]
async fn equipment_request_round_trips_through_plant() -> Result<()> {
    let host = spawn_gateway(Duration::from_secs(5)).await?;
    let client = reqwest::Client::new();
    let mut plant = connect_plant(&host).await?;
    wait_until_connected(&client, &host).await?;

    let request = tokio::spawn({
        let client = client.clone();
        let url = format!("http://{host}/api/v1/equipos");
        async move { client.get(url).send().await }
    });

    let frame = next_command(&mut plant).await?;
    assert_eq!(frame.get("action").and_then(Value::as_str), Some("equipos"));
    let call_id = frame.get("callId").cloned().context("frame missing callId")?;
    send_reply(&mut plant, &call_id, json!([1, 2, 3])).await?;

    let response = request.await??;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body, json!([1, 2, 3]));
    Ok(())
}

#[tokio::test]
async fn command_post_carries_target_and_params() -> Result<()> {
    let host = spawn_gateway(Duration::from_secs(5)).await?;
    let client = reqwest::Client::new();
    let mut plant = connect_plant(&host).await?;
    wait_until_connected(&client, &host).await?;

    let request = tokio::spawn({
        let client = client.clone();
        let url = format!("http://{host}/api/v1/comando");
        async move {
            client
                .post(url)
                .json(&json!({
                    "action": "reinicio",
                    "targetId": "bomba-1",
                    "params": { "modo": "seguro" }
                }))
                .send()
                .await
        }
    });

    let frame = next_command(&mut plant).await?;
    assert_eq!(frame.get("action").and_then(Value::as_str), Some("reinicio"));
    assert_eq!(
        frame.get("targetId").and_then(Value::as_str),
        Some("bomba-1")
    );
    assert_eq!(
        frame.pointer("/params/modo").and_then(Value::as_str),
        Some("seguro")
    );
    let call_id = frame.get("callId").cloned().context("frame missing callId")?;
    send_reply(&mut plant, &call_id, json!({ "ok": true })).await?;

    let response = request.await??;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({ "ok": true }));
    Ok(())
}

#[tokio::test]
async fn missing_plant_yields_service_unavailable() -> Result<()> {
    let host = spawn_gateway(Duration::from_secs(5)).await?;

    let response = reqwest::get(format!("http://{host}/api/v1/dashboard/resumen")).await?;
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = response.json().await?;
    assert_eq!(body.pointer("/error/code").and_then(Value::as_u64), Some(2001));
    Ok(())
}

#[tokio::test]
async fn silent_plant_yields_gateway_timeout() -> Result<()> {
    let host = spawn_gateway(Duration::from_millis(100)).await?;
    let client = reqwest::Client::new();
    let mut plant = connect_plant(&host).await?;
    wait_until_connected(&client, &host).await?;

    // The plant receives the command but never replies.
    let response = client
        .get(format!("http://{host}/api/v1/sensores/bomba-1"))
        .send()
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::GATEWAY_TIMEOUT);
    let body: Value = response.json().await?;
    assert_eq!(body.pointer("/error/code").and_then(Value::as_u64), Some(2003));

    // The frame did go out, with the path id as target; replying after the
    // timeout must not disturb the gateway.
    let frame = next_command(&mut plant).await?;
    assert_eq!(
        frame.get("targetId").and_then(Value::as_str),
        Some("bomba-1")
    );
    let call_id = frame.get("callId").cloned().context("frame missing callId")?;
    send_reply(&mut plant, &call_id, json!("late")).await?;

    let status: Value = client
        .get(format!("http://{host}/status"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(
        status.get("pending_calls").and_then(Value::as_u64),
        Some(0)
    );
    Ok(())
}

#[tokio::test]
async fn plant_disconnect_fails_call_in_flight() -> Result<()> {
    let host = spawn_gateway(Duration::from_secs(5)).await?;
    let client = reqwest::Client::new();
    let mut plant = connect_plant(&host).await?;
    wait_until_connected(&client, &host).await?;

    let request = tokio::spawn({
        let client = client.clone();
        let url = format!("http://{host}/api/v1/analisis/molino-2?periodo=24h");
        async move { client.get(url).send().await }
    });

    // Query parameters ride along inside the frame.
    let frame = next_command(&mut plant).await?;
    assert_eq!(frame.get("action").and_then(Value::as_str), Some("analisis"));
    assert_eq!(
        frame.pointer("/params/periodo").and_then(Value::as_str),
        Some("24h")
    );

    plant.close(None).await.context("close plant socket")?;

    let response = request.await??;
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await?;
    assert_eq!(body.pointer("/error/code").and_then(Value::as_u64), Some(2002));

    // The bridge slot is clear again.
    let status: Value = client
        .get(format!("http://{host}/status"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(status.get("connected").and_then(Value::as_bool), Some(false));
    Ok(())
}

#[tokio::test]
async fn blank_action_is_rejected_before_reaching_plant() -> Result<()> {
    let host = spawn_gateway(Duration::from_secs(5)).await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{host}/api/v1/comando"))
        .json(&json!({ "action": "  " }))
        .send()
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body.pointer("/error/code").and_then(Value::as_u64), Some(1001));
    Ok(())
}

#[tokio::test]
async fn health_endpoint_answers_without_plant() -> Result<()> {
    let host = spawn_gateway(Duration::from_secs(5)).await?;

    let response = reqwest::get(format!("http://{host}/health")).await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body.get("status").and_then(Value::as_str), Some("healthy"));
    Ok(())
}

#[tokio::test]
async fn new_plant_connection_supersedes_old_one() -> Result<()> {
    let host = spawn_gateway(Duration::from_secs(5)).await?;
    let client = reqwest::Client::new();
    let mut first = connect_plant(&host).await?;
    wait_until_connected(&client, &host).await?;

    let request = tokio::spawn({
        let client = client.clone();
        let url = format!("http://{host}/api/v1/equipos");
        async move { client.get(url).send().await }
    });
    let _frame = next_command(&mut first).await?;

    // Second connection takes over; the in-flight call fails immediately.
    let mut second = connect_plant(&host).await?;
    let response = request.await??;
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

    // The replacement link serves traffic.
    let request = tokio::spawn({
        let client = client.clone();
        let url = format!("http://{host}/api/v1/equipos");
        async move { client.get(url).send().await }
    });
    let frame = next_command(&mut second).await?;
    let call_id = frame.get("callId").cloned().context("frame missing callId")?;
    send_reply(&mut second, &call_id, json!([4])).await?;

    let response = request.await??;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body, json!([4]));
    Ok(())
}

#[tokio::test]
async fn abandoned_client_request_does_not_leak_a_pending_call() -> Result<()> {
    let host = spawn_gateway(Duration::from_secs(1)).await?;
    let client = reqwest::Client::new();
    let mut plant = connect_plant(&host).await?;
    wait_until_connected(&client, &host).await?;

    // The client gives up long before the gateway's command timeout.
    let hung = client
        .get(format!("http://{host}/api/v1/sensores/molino-1"))
        .timeout(Duration::from_millis(100))
        .send()
        .await;
    assert!(hung.is_err());

    // The frame reached the plant even though its caller is gone.
    let frame = next_command(&mut plant).await?;
    assert_eq!(
        frame.get("targetId").and_then(Value::as_str),
        Some("molino-1")
    );

    // The abandoned entry drains without any reply from the plant.
    let mut pending = u64::MAX;
    for _ in 0..300 {
        let status: Value = client
            .get(format!("http://{host}/status"))
            .send()
            .await?
            .json()
            .await?;
        pending = status
            .get("pending_calls")
            .and_then(Value::as_u64)
            .context("status missing pending_calls")?;
        if pending == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(pending, 0);

    // A late reply for the abandoned id is discarded; fresh traffic flows.
    let call_id = frame.get("callId").cloned().context("frame missing callId")?;
    send_reply(&mut plant, &call_id, json!("ghost")).await?;

    let request = tokio::spawn({
        let client = client.clone();
        let url = format!("http://{host}/api/v1/equipos");
        async move { client.get(url).send().await }
    });
    let frame = next_command(&mut plant).await?;
    let call_id = frame.get("callId").cloned().context("frame missing callId")?;
    send_reply(&mut plant, &call_id, json!([7])).await?;

    let response = request.await??;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body, json!([7]));
    Ok(())
}
