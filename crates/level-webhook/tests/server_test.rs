#![allow(clippy::unwrap_used)]
// Router tests for the webhook receiver, driven through `tower::ServiceExt`.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

use level_webhook::{
    Delivery, EventSelection, EventType, SIGNATURE_HEADER, WEBHOOK_PATH, WebhookConfig, router,
    sign,
};

const SECRET: &str = "abc";
const BODY: &str = r#"{"x":1}"#;

// ── Helpers ─────────────────────────────────────────────────────────

fn setup(config: WebhookConfig) -> (Router, mpsc::Receiver<Delivery>) {
    let (tx, rx) = mpsc::channel(8);
    (router(config, tx), rx)
}

fn signed_config() -> WebhookConfig {
    WebhookConfig::default().with_secret(Some(SECRET.to_string().into()))
}

fn request(body: &str, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(WEBHOOK_PATH)
        .header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header(SIGNATURE_HEADER, sig);
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ── Signatures ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_valid_signature_is_accepted_and_emitted() {
    let (app, mut rx) = setup(signed_config());
    let signature = sign(SECRET, BODY.as_bytes()).unwrap();

    let response = app.oneshot(request(BODY, Some(&signature))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "received": true }));

    let delivery = rx.try_recv().unwrap();
    assert_eq!(delivery.payload, json!({ "x": 1 }));
    assert_eq!(delivery.event_type, None);
}

#[tokio::test]
async fn test_flipped_signature_is_rejected() {
    let (app, mut rx) = setup(signed_config());
    let mut signature = sign(SECRET, BODY.as_bytes()).unwrap();
    let last = if signature.ends_with('0') { "1" } else { "0" };
    signature.pop();
    signature.push_str(last);

    let response = app.oneshot(request(BODY, Some(&signature))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        read_json(response).await,
        json!({ "message": "Invalid Level webhook signature." })
    );
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_missing_header_is_rejected_before_parsing() {
    let (app, mut rx) = setup(signed_config());

    let response = app.oneshot(request("not json", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        read_json(response).await,
        json!({ "message": "Missing or invalid Level signature header." })
    );
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_no_secret_accepts_unsigned_deliveries() {
    let (app, mut rx) = setup(WebhookConfig::default());

    let response = app.oneshot(request(BODY, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(rx.try_recv().is_ok());
}

// ── Dispatch ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unselected_event_is_acknowledged_but_not_emitted() {
    let selection: EventSelection = [EventType::AlertActive].into_iter().collect();
    let (app, mut rx) = setup(WebhookConfig::default().with_selection(selection));

    let response = app
        .oneshot(request(r#"{"event_type":"device_created"}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "received": true }));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_raw_mode_emits_the_body_verbatim() {
    let body = r#"{ "event_type": "alert_resolved",  "id": "a1" }"#;
    let config = signed_config()
        .with_emit_raw(true)
        .with_ack(json!({ "ok": 1 }));
    let (app, mut rx) = setup(config);
    let signature = sign(SECRET, body.as_bytes()).unwrap();

    let response = app.oneshot(request(body, Some(&signature))).await.unwrap();

    assert_eq!(read_json(response).await, json!({ "ok": 1 }));
    let delivery = rx.try_recv().unwrap();
    assert_eq!(delivery.event_type.as_deref(), Some("alert_resolved"));
    assert_eq!(delivery.payload, json!({ "rawBody": body }));
}

#[tokio::test]
async fn test_scalar_body_is_a_bad_request() {
    let (app, mut rx) = setup(WebhookConfig::default());

    let response = app.oneshot(request("42", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_array_body_is_delivered() {
    let (app, mut rx) = setup(WebhookConfig::default());

    let response = app.oneshot(request("[1,2,3]", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let delivery = rx.try_recv().unwrap();
    assert_eq!(delivery.event_type, None);
    assert_eq!(delivery.payload, json!([1, 2, 3]));
}

#[tokio::test]
async fn test_closed_channel_is_service_unavailable() {
    let (app, rx) = setup(WebhookConfig::default());
    drop(rx);

    let response = app.oneshot(request(BODY, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
