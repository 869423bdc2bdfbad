//! Wire format of frames received from the plant.
//!
//! Outbound frames are [`crate::bridge::CommandFrame`]; this module covers
//! the inbound direction. The plant is not required to tag its frames, so
//! classification is structural: anything carrying a `callId` that parses
//! as a UUID **and** a `payload` field is a reply, everything else that is
//! valid JSON is an unsolicited frame.

use serde::Deserialize;

use crate::bridge::CallId;
use crate::error::GatewayError;

/// A decoded text frame from the plant connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InboundFrame {
    /// Correlated reply to a previously issued command.
    Reply(ReplyFrame),
    /// Any other well-formed JSON the plant pushes spontaneously.
    Unsolicited(serde_json::Value),
}

/// Reply frame carrying the correlation id and the result payload.
///
/// `payload` is mandatory: a frame with a `callId` but no payload does not
/// classify as a reply and is dropped as unsolicited instead of waking a
/// caller with nothing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyFrame {
    /// Correlation id echoed back by the plant.
    pub call_id: CallId,
    /// Result payload, opaque to the gateway.
    pub payload: serde_json::Value,
}

/// Decodes one text frame from the plant.
///
/// # Errors
///
/// Returns [`GatewayError::MalformedInbound`] when the text is not valid
/// JSON. Well-formed JSON always decodes, falling back to
/// [`InboundFrame::Unsolicited`].
pub fn decode_inbound(text: &str) -> Result<InboundFrame, GatewayError> {
    serde_json::from_str(text).map_err(|err| GatewayError::MalformedInbound(err.to_string()))
}
