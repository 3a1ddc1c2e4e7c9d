// ── Webhook receiver ──
//
// `POST /webhook`: verify the signature over the raw body, parse, route
// through the event selection, and push accepted deliveries into a
// bounded channel. Shared state is read-only.

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::WebhookError;
use crate::event::{Dispatch, EventSelection, WebhookEvent, dispatch};
use crate::signature::{SIGNATURE_HEADER, check};

/// Route the receiver is mounted on.
pub const WEBHOOK_PATH: &str = "/webhook";

/// Receiver settings.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub secret: Option<SecretString>,
    pub selection: EventSelection,
    pub emit_raw: bool,
    /// Body returned for accepted and suppressed deliveries.
    pub ack: Value,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            selection: EventSelection::all(),
            emit_raw: false,
            ack: json!({ "received": true }),
        }
    }
}

impl WebhookConfig {
    pub fn with_secret(mut self, secret: Option<SecretString>) -> Self {
        self.secret = secret.filter(|s| !s.expose_secret().is_empty());
        self
    }

    pub fn with_selection(mut self, selection: EventSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_emit_raw(mut self, emit_raw: bool) -> Self {
        self.emit_raw = emit_raw;
        self
    }

    pub fn with_ack(mut self, ack: Value) -> Self {
        self.ack = ack;
        self
    }
}

/// An accepted delivery, as handed to the consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    pub payload: Value,
}

struct WebhookState {
    config: WebhookConfig,
    tx: mpsc::Sender<Delivery>,
}

/// Build the receiver router. Deliveries are sent on `tx`.
pub fn router(config: WebhookConfig, tx: mpsc::Sender<Delivery>) -> Router {
    let state = Arc::new(WebhookState { config, tx });
    Router::new()
        .route(WEBHOOK_PATH, post(receive))
        .with_state(state)
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, path = WEBHOOK_PATH, "webhook receiver listening");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn receive(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, WebhookError> {
    let id = Uuid::new_v4();
    let received_at = Utc::now();
    let config = &state.config;

    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let secret = config.secret.as_ref().map(ExposeSecret::expose_secret);

    if let Err(reason) = check(secret, &body, header) {
        warn!(delivery_id = %id, %reason, "rejected webhook delivery");
        return Err(reason.into());
    }

    let event = WebhookEvent::parse(&body).map_err(|err| {
        warn!(delivery_id = %id, error = %err, "unparseable webhook delivery");
        WebhookError::from(err)
    })?;
    let event_type = event.event_type().map(str::to_owned);

    match dispatch(event, &config.selection, config.emit_raw) {
        Dispatch::Suppress => {
            debug!(delivery_id = %id, event_type = ?event_type, "event not selected");
        }
        Dispatch::Emit(emission) => {
            info!(delivery_id = %id, event_type = ?event_type, bytes = body.len(), "accepted webhook delivery");
            let delivery = Delivery {
                id,
                received_at,
                event_type,
                payload: emission.into_json(),
            };
            state
                .tx
                .send(delivery)
                .await
                .map_err(|_| WebhookError::ChannelClosed)?;
        }
    }

    Ok(Json(config.ack.clone()))
}
