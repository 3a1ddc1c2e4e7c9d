//! Webhook receiver and signing handlers.

use std::io::Write;

use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

use level_config::Config;
use level_webhook::{Delivery, EventSelection, EventType, SIGNATURE_HEADER, WebhookConfig};

use crate::cli::{GlobalOpts, WebhookArgs, WebhookCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

/// Deliveries buffered between the receiver and stdout.
const DELIVERY_BUFFER: usize = 64;

pub async fn handle(args: WebhookArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        WebhookCommand::Serve {
            listen,
            events,
            raw,
            secret,
            ack,
            max_events,
        } => {
            let cfg = level_config::load_config()?;
            let addr = config::listen_addr(&cfg, listen)?;

            let selection = if events.is_empty() {
                EventSelection::all()
            } else {
                events.into_iter().map(EventType::from).collect()
            };
            let mut webhook = receiver_config(global, &cfg, secret.as_deref())
                .with_selection(selection)
                .with_emit_raw(raw);
            if let Some(ack) = ack {
                webhook = webhook.with_ack(parse_ack(&ack)?);
            }
            if webhook.secret.is_none() {
                tracing::warn!("no webhook secret configured; deliveries are not authenticated");
            }

            let listener = TcpListener::bind(addr).await?;
            if !global.quiet {
                eprintln!("Listening on http://{addr}{}", level_webhook::WEBHOOK_PATH);
            }
            serve(listener, webhook, max_events, &mut std::io::stdout()).await
        }

        WebhookCommand::Sign { secret, body, file } => {
            let body = match (body, file) {
                (Some(body), _) => body,
                (None, Some(path)) => util::read_input(&path)?,
                (None, None) => {
                    return Err(CliError::Validation {
                        field: "body".into(),
                        reason: "pass --body or --file".into(),
                    });
                }
            };
            let signature =
                level_webhook::sign(&secret, body.as_bytes()).map_err(|e| CliError::Validation {
                    field: "secret".into(),
                    reason: e.to_string(),
                })?;
            let out = if global.quiet {
                signature
            } else {
                format!("{SIGNATURE_HEADER}: {signature}")
            };
            println!("{out}");
            Ok(())
        }
    }
}

fn receiver_config(global: &GlobalOpts, cfg: &Config, secret: Option<&str>) -> WebhookConfig {
    WebhookConfig::default().with_secret(config::webhook_secret(global, cfg, secret))
}

fn parse_ack(raw: &str) -> Result<Value, CliError> {
    serde_json::from_str(raw).map_err(|e| CliError::Validation {
        field: "ack".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Run the receiver, writing each delivery as a JSON line to `out`, until
/// Ctrl-C or `max_events` deliveries.
///
/// Once the limit is reached the channel is closed: deliveries already
/// acknowledged are still written, later ones are refused with 503.
async fn serve<W: Write>(
    listener: TcpListener,
    webhook: WebhookConfig,
    max_events: Option<usize>,
    out: &mut W,
) -> Result<(), CliError> {
    let (tx, mut rx) = mpsc::channel(DELIVERY_BUFFER);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let app = level_webhook::router(webhook, tx);

    let shutdown = async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => tracing::info!("shutting down webhook receiver"),
            _ = stop_rx => {}
        }
    };
    let server = tokio::spawn(level_webhook::serve(listener, app, shutdown));

    let mut seen = 0usize;
    while let Some(delivery) = rx.recv().await {
        write_delivery(out, &delivery)?;

        seen += 1;
        if max_events.is_some_and(|max| seen >= max) {
            break;
        }
    }

    rx.close();
    while let Some(delivery) = rx.recv().await {
        write_delivery(out, &delivery)?;
    }

    let _ = stop_tx.send(());
    server
        .await
        .map_err(|e| CliError::Webhook {
            message: e.to_string(),
        })?
        .map_err(CliError::from)
}

fn write_delivery<W: Write>(out: &mut W, delivery: &Delivery) -> Result<(), CliError> {
    let line = output::render_json(delivery, true)?;
    writeln!(out, "{line}")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use clap::Parser;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::cli::Cli;

    #[test]
    fn ack_must_be_json() {
        assert_eq!(parse_ack(r#"{"ok":true}"#).unwrap(), serde_json::json!({ "ok": true }));
        assert!(matches!(parse_ack("ok"), Err(CliError::Validation { .. })));
    }

    #[tokio::test]
    async fn every_acknowledged_delivery_is_written_after_max_events() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!(
            "http://{}{}",
            listener.local_addr().unwrap(),
            level_webhook::WEBHOOK_PATH
        );

        let client = reqwest::Client::new();
        let requests: Vec<_> = (0..5)
            .map(|n| {
                let client = client.clone();
                let url = url.clone();
                tokio::spawn(async move {
                    client
                        .post(&url)
                        .header("content-type", "application/json")
                        .body(format!(r#"{{"event_type":"alert_created","n":{n}}}"#))
                        .send()
                        .await
                        .ok()
                        .map(|resp| resp.status().as_u16())
                })
            })
            .collect();

        let mut out = Vec::new();
        let (served, statuses) = tokio::join!(
            tokio::time::timeout(
                Duration::from_secs(10),
                serve(listener, WebhookConfig::default(), Some(1), &mut out),
            ),
            async {
                let mut statuses = Vec::new();
                for request in requests {
                    statuses.push(request.await.unwrap());
                }
                statuses
            }
        );
        served.unwrap().unwrap();

        let lines = String::from_utf8(out).unwrap();
        let acked = statuses.iter().filter(|s| **s == Some(200)).count();
        assert!(acked >= 1);
        assert_eq!(lines.lines().count(), acked);
        assert!(
            statuses
                .iter()
                .all(|s| matches!(s, Some(200 | 503) | None)),
            "{statuses:?}"
        );
    }

    #[test]
    fn secret_flag_enables_signature_checks() {
        let global = Cli::try_parse_from(["level", "groups", "list"]).unwrap().global;
        let webhook = receiver_config(&global, &Config::default(), Some("abc"));
        assert_eq!(webhook.secret.unwrap().expose_secret(), "abc");

        let webhook = receiver_config(&global, &Config::default(), Some(""));
        assert!(webhook.secret.is_none());
    }
}
