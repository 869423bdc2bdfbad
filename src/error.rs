//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2003,
///     "message": "plant device did not reply within the timeout window",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category    | HTTP Status                           |
/// |-----------|-------------|---------------------------------------|
/// | 1000–1999 | Validation  | 400 Bad Request                       |
/// | 2000–2999 | Plant link  | 503 Service Unavailable / 504 Timeout |
/// | 3000–3999 | Server      | 500 Internal Server Error             |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No plant connection was present when the command was issued, or the
    /// command could not be handed to the connection.
    #[error("plant device is not connected")]
    DeviceUnavailable,

    /// The plant connection dropped while the call was still waiting for
    /// its reply.
    #[error("plant device disconnected before replying")]
    DeviceDisconnected,

    /// The plant stayed connected but did not reply within the timeout
    /// window.
    #[error("plant device did not reply within the timeout window")]
    DeviceTimeout,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// A frame received from the plant could not be decoded.
    #[error("malformed inbound frame: {0}")]
    MalformedInbound(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::DeviceUnavailable => 2001,
            Self::DeviceDisconnected => 2002,
            Self::DeviceTimeout => 2003,
            Self::Internal(_) => 3000,
            Self::MalformedInbound(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::DeviceUnavailable | Self::DeviceDisconnected => StatusCode::SERVICE_UNAVAILABLE,
            Self::DeviceTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) | Self::MalformedInbound(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
