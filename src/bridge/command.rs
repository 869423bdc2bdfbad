//! Outbound command types: the caller-facing [`Command`] and its wire
//! envelope [`CommandFrame`].
//!
//! Callers describe what they want from the plant; the bridge injects the
//! correlation id just before transmission. Absent optional fields are
//! omitted from the wire entirely.

use std::collections::HashMap;

use serde::Serialize;

use super::CallId;

/// A request/response style call to the plant, as supplied by a caller.
///
/// Carries an action name, an optional target-object identifier, and
/// optional string parameters. Callers never supply a correlation id —
/// [`Command::into_frame`] attaches one.
#[derive(Debug, Clone)]
pub struct Command {
    /// Action name understood by the plant (e.g. `"equipos"`).
    pub action: String,
    /// Optional identifier of the object the action targets.
    pub target_id: Option<String>,
    /// Optional free-form string parameters forwarded verbatim.
    pub params: Option<HashMap<String, String>>,
}

impl Command {
    /// Creates a command with only an action name.
    #[must_use]
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            target_id: None,
            params: None,
        }
    }

    /// Sets the target-object identifier.
    #[must_use]
    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    /// Sets the parameter map. An empty map is treated as no parameters.
    #[must_use]
    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = if params.is_empty() {
            None
        } else {
            Some(params)
        };
        self
    }

    /// Converts the command into its wire envelope with `call_id` attached.
    #[must_use]
    pub fn into_frame(self, call_id: CallId) -> CommandFrame {
        CommandFrame {
            action: self.action,
            target_id: self.target_id,
            params: self.params,
            call_id,
        }
    }
}

/// Wire envelope for an outbound command.
///
/// Serialized to a single JSON text frame:
/// `{"action": "...", "targetId": "...", "params": {...}, "callId": "..."}`
/// with absent optional fields omitted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFrame {
    /// Action name understood by the plant.
    pub action: String,
    /// Optional identifier of the object the action targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    /// Optional free-form string parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<HashMap<String, String>>,
    /// Correlation id the plant must echo on the reply.
    pub call_id: CallId,
}
