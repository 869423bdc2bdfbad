//! Request DTO for the generic command endpoint.

use std::collections::HashMap;

use serde::Deserialize;
use utoipa::ToSchema;

use crate::bridge::Command;

/// Body of `POST /comando`: a free-form command forwarded to the plant.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    /// Action name the plant understands (e.g. `"equipos"`).
    pub action: String,
    /// Optional target entity id.
    #[serde(default)]
    pub target_id: Option<String>,
    /// Optional string parameters forwarded verbatim.
    #[serde(default)]
    pub params: Option<HashMap<String, String>>,
}

impl From<CommandRequest> for Command {
    fn from(req: CommandRequest) -> Self {
        Self {
            action: req.action,
            target_id: req.target_id,
            params: req.params.filter(|p| !p.is_empty()),
        }
    }
}
