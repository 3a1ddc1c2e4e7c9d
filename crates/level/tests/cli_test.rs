//! Integration tests for the `level` CLI binary.
//!
//! Argument parsing, help output, config handling, and error exit codes run
//! without network access. API commands run against a `wiremock` server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const NO_CONFIG: &str = "/tmp/level-cli-test-nonexistent";

/// Build a [`Command`] for the `level` binary with env isolation.
///
/// Clears all `LEVEL_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn level_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("level");
    cmd.env("HOME", NO_CONFIG)
        .env("XDG_CONFIG_HOME", NO_CONFIG)
        .env_remove("LEVEL_PROFILE")
        .env_remove("LEVEL_BASE_URL")
        .env_remove("LEVEL_API_KEY")
        .env_remove("LEVEL_OUTPUT")
        .env_remove("LEVEL_TIMEOUT")
        .env_remove("LEVEL_WEBHOOK_SECRET")
        .env_remove("RUST_LOG");
    cmd
}

/// `level_cmd` pointed at a mock server with an API key.
fn api_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = level_cmd();
    cmd.args(["--base-url", &server.uri(), "--api-key", "test-key"]);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = level_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    level_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("alerts")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("automations"))
            .and(predicate::str::contains("webhook")),
    );
}

#[test]
fn test_version_flag() {
    level_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("level"));
}

#[test]
fn test_completions_zsh() {
    level_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_output_format() {
    let output = level_cmd()
        .args(["--output", "xml", "groups", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("xml"));
}

#[test]
fn test_missing_api_key_is_an_auth_error() {
    let output = level_cmd().args(["groups", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("No API key configured"));
}

#[test]
fn test_unknown_profile_is_a_usage_error() {
    let output = level_cmd()
        .args(["--profile", "staging", "groups", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Profile 'staging' not found"));
}

// ── Webhook signing ─────────────────────────────────────────────────

#[test]
fn test_webhook_sign_prints_header_value() {
    level_cmd()
        .args(["webhook", "sign", "--secret", "abc", "--body", r#"{"x":1}"#])
        .assert()
        .success()
        .stdout(
            "x-level-signature: \
             sha256=151244191e9fd3d055f407d2825d287f860ad89417a2dcd414fff80158ff976a\n",
        );
}

#[test]
fn test_webhook_sign_requires_a_body() {
    let output = level_cmd()
        .args(["webhook", "sign", "--secret", "abc"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_init_then_show_masks_key() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().to_str().unwrap();

    level_cmd()
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .args([
            "--api-key",
            "secret-key",
            "config",
            "init",
            "--name",
            "lab",
            "--base-url",
            "https://lab.level.test/v2",
            "--plaintext",
        ])
        .assert()
        .success();

    let output = level_cmd()
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let shown = stdout_json(&output);
    assert_eq!(shown["default_profile"], "lab");
    assert_eq!(shown["profiles"]["lab"]["api_key"], "********");
    assert_eq!(shown["profiles"]["lab"]["base_url"], "https://lab.level.test/v2");

    level_cmd()
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .args(["-o", "plain", "config", "profiles"])
        .assert()
        .success()
        .stdout("lab\n");
}

#[test]
fn test_config_init_needs_a_storage_choice_for_the_key() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().to_str().unwrap();

    let output = level_cmd()
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .args(["--api-key", "k", "config", "init"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--keyring or --plaintext"));
}

// ── API commands against a mock server ──────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_groups_list_renders_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/groups"))
        .and(header("authorization", "test-key"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "g1", "name": "Servers" },
                { "id": "g2", "name": "Laptops", "parent_id": "g1" },
            ],
            "has_more": false,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = api_cmd(&server)
        .args(["-o", "json", "groups", "list"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let groups = stdout_json(&output);
    assert_eq!(groups.as_array().unwrap().len(), 2);
    assert_eq!(groups[1]["parent_id"], "g1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_get_accepts_a_device_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/devices/dev_42"))
        .and(query_param("include_cpus", "true"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "dev_42", "hostname": "web-1" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    api_cmd(&server)
        .args([
            "-o",
            "plain",
            "devices",
            "get",
            "https://app.level.io/devices/dev_42",
            "--include-cpus",
        ])
        .assert()
        .success()
        .stdout("dev_42\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_limit_out_of_range_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let output = api_cmd(&server)
        .args(["alerts", "list", "--limit", "500"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_group_exits_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/groups/nope"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let output = api_cmd(&server)
        .args(["groups", "get", "nope"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("groups list"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_key_exits_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let output = api_cmd(&server).args(["config", "test"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_automation_trigger_posts_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/automations/webhooks/tok_1"))
        .and(body_json(json!({ "device_ids": ["d1", "d2"], "reason": "patching" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let output = api_cmd(&server)
        .args([
            "-o",
            "json-compact",
            "automations",
            "trigger",
            "tok_1",
            "--device",
            "d1",
            "--device",
            "https://app.level.io/devices/d2",
            "--param",
            "reason=patching",
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "{}\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_automation_trigger_rejects_bad_json_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = api_cmd(&server)
        .args(["automations", "trigger", "tok_1", "--json", "{oops"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Invalid JSON payload."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_continue_on_fail_records_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/groups/g1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "g1" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/groups/missing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "groups": [] })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let batch = dir.path().join("batch.json");
    std::fs::write(
        &batch,
        json!([
            { "operation": "get_group", "id": "g1" },
            { "operation": "get_group", "id": "missing" },
        ])
        .to_string(),
    )
    .unwrap();

    let output = api_cmd(&server)
        .args(["-o", "json", "run", "--continue-on-fail"])
        .arg(&batch)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let items = stdout_json(&output);
    assert_eq!(items[0]["item_index"], 0);
    assert_eq!(items[0]["json"]["id"], "g1");
    assert_eq!(items[1]["item_index"], 1);
    assert_eq!(items[1]["json"]["error"], "Group not found: missing");

    let output = api_cmd(&server).arg("run").arg(&batch).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("Item 1 failed"));
}
