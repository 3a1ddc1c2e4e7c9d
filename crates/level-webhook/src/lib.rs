// level-webhook: Signed webhook receiver for Level event deliveries.

pub mod error;
pub mod event;
pub mod server;
pub mod signature;

pub use error::WebhookError;
pub use event::{Dispatch, Emission, EventError, EventSelection, EventType, WebhookEvent, dispatch};
pub use server::{Delivery, WEBHOOK_PATH, WebhookConfig, router, serve};
pub use signature::{SIGNATURE_HEADER, SignatureError, check, sign, verify};
