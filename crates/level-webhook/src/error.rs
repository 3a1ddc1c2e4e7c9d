// ── Webhook error responses ──
//
// Every rejection is a small JSON body `{"message": ...}`; nothing
// internal is echoed back to the sender.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::event::EventError;
use crate::signature::SignatureError;

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// Signature missing, malformed, or wrong.
    #[error(transparent)]
    Unauthorized(#[from] SignatureError),

    /// The body is not a JSON object or array.
    #[error(transparent)]
    InvalidPayload(#[from] EventError),

    /// The emission receiver is gone.
    #[error("Webhook receiver is shutting down.")]
    ChannelClosed,
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::ChannelClosed => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}
