//! Plant WebSocket connection loop.
//!
//! Runs the read/write loop for one plant connection: outbound command
//! frames are drained from the bridge-fed queue onto the socket, inbound
//! text frames are decoded and dispatched back into the bridge. When the
//! socket ends for any reason the bridge is notified so every call still
//! pending against this link fails immediately.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::messages::{InboundFrame, decode_inbound};
use crate::bridge::{CommandFrame, DeviceBridge, LinkId};

/// Runs the read/write loop for a single plant connection.
///
/// - Forwards command frames queued by the bridge to the plant.
/// - Decodes inbound frames and resolves the matching pending calls.
/// - On socket close or error, reports the disconnect to the bridge.
pub async fn run_connection(socket: WebSocket, bridge: Arc<DeviceBridge>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut outbound_rx) = mpsc::channel::<CommandFrame>(bridge.outbound_capacity());
    let link_id = bridge.accept_connection(tx).await;

    loop {
        tokio::select! {
            // Inbound frame from the plant
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        dispatch_inbound(&bridge, link_id, &text);
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(link_id = %link_id, error = %err, "plant socket error");
                        break;
                    }
                    _ => {}
                }
            }
            // Command frame queued by the bridge
            frame = outbound_rx.recv() => {
                match frame {
                    Some(frame) => {
                        let json = match serde_json::to_string(&frame) {
                            Ok(json) => json,
                            Err(err) => {
                                tracing::error!(
                                    call_id = %frame.call_id,
                                    error = %err,
                                    "failed to serialize outbound frame"
                                );
                                continue;
                            }
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    // Sender gone: this link was superseded in the bridge.
                    None => break,
                }
            }
        }
    }

    bridge.on_disconnect(link_id).await;
    tracing::debug!(link_id = %link_id, "plant ws connection closed");
}

/// Classifies one inbound text frame and routes it into the bridge.
///
/// Malformed or unsolicited frames are logged and dropped; they never
/// tear down the connection.
fn dispatch_inbound(bridge: &DeviceBridge, link_id: LinkId, text: &str) {
    match decode_inbound(text) {
        Ok(InboundFrame::Reply(reply)) => {
            bridge.resolve_reply(reply.call_id, reply.payload);
        }
        Ok(InboundFrame::Unsolicited(value)) => {
            tracing::debug!(link_id = %link_id, frame = %value, "dropping unsolicited plant frame");
        }
        Err(err) => {
            tracing::warn!(link_id = %link_id, error = %err, "undecodable plant frame");
        }
    }
}
