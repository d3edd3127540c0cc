//! Integration tests for the `fhsync` CLI binary.
//!
//! Argument parsing, help output, shell completions, manifest handling and
//! error classification run without a backend; the request paths run
//! against a wiremock stub.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `fhsync` binary with env isolation.
///
/// Clears all `FH_*` env vars and points config/data directories into
/// `home` so tests never touch the user's real manifest or stores.
fn fhsync_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fhsync");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("FH_MANIFEST")
        .env_remove("FH_DATA_DIR")
        .env_remove("FH_OUTPUT")
        .env_remove("FH_PASSWORD")
        .env_remove("FH_HOST")
        .env_remove("FH_APPID")
        .env_remove("FH_ENVIRONMENT")
        .env_remove("FH_TIMEOUT")
        .env_remove("FH_INSECURE")
        .env_remove("FH_CA_CERT")
        .env_remove("FH_TOKEN_STORE");
    cmd
}

/// Command with an explicit manifest and data dir under `home`.
fn app_cmd(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = fhsync_cmd(home.path());
    cmd.arg("--manifest")
        .arg(home.path().join("fhconfig.toml"))
        .arg("--data-dir")
        .arg(home.path().join("store"));
    cmd
}

fn write_manifest(home: &TempDir, contents: &str) {
    std::fs::write(home.path().join("fhconfig.toml"), contents).unwrap();
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = fhsync_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    fhsync_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("init")
            .and(predicate::str::contains("auth"))
            .and(predicate::str::contains("cloud"))
            .and(predicate::str::contains("logout")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    fhsync_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fhsync"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    fhsync_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    fhsync_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Manifest ────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    let home = TempDir::new().unwrap();
    app_cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fhconfig.toml"));
}

#[test]
fn test_config_show_renders_manifest() {
    let home = TempDir::new().unwrap();
    write_manifest(&home, "host = \"https://myapp.example.test\"\nappid = \"app-1\"\n");

    app_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("https://myapp.example.test")
                .and(predicate::str::contains("app-1")),
        );
}

#[test]
fn test_config_show_without_manifest_uses_defaults() {
    let home = TempDir::new().unwrap();
    app_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout = 30"));
}

// ── Device identity ─────────────────────────────────────────────────

#[test]
fn test_device_id_is_stable() {
    let home = TempDir::new().unwrap();

    let first = app_cmd(&home).arg("device").output().unwrap();
    assert!(first.status.success());
    let second = app_cmd(&home).arg("device").output().unwrap();
    assert!(second.status.success());

    let first = String::from_utf8_lossy(&first.stdout).trim().to_owned();
    let second = String::from_utf8_lossy(&second.stdout).trim().to_owned();
    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert!(home.path().join("store").join("store.json").exists());
}

// ── Init ────────────────────────────────────────────────────────────

#[test]
fn test_init_without_host_is_missing_configuration() {
    let home = TempDir::new().unwrap();
    let output = app_cmd(&home).arg("init").output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("Missing configuration"),
        "Expected missing configuration error:\n{text}"
    );
}

#[test]
fn test_init_with_unsupported_scheme_is_missing_configuration() {
    let home = TempDir::new().unwrap();
    let output = app_cmd(&home)
        .args(["init", "ftp://files.example.test"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Missing configuration"));
}

#[test]
fn test_init_reports_session() {
    let home = TempDir::new().unwrap();
    write_manifest(&home, "appid = \"app-1\"\n");

    app_cmd(&home)
        .args(["init", "https://api.example.test"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Client initialized")
                .and(predicate::str::contains("https://api.example.test/"))
                .and(predicate::str::contains("app-1")),
        );
}

#[test]
fn test_init_json_output() {
    let home = TempDir::new().unwrap();
    let output = app_cmd(&home)
        .args(["--host", "https://api.example.test", "-o", "json", "init"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["host"], "https://api.example.test/");
    assert!(value["device_id"].as_str().is_some_and(|id| !id.is_empty()));
}

// ── Requests ────────────────────────────────────────────────────────

#[test]
fn test_cloud_rejects_unknown_method() {
    let home = TempDir::new().unwrap();
    let output = app_cmd(&home)
        .args(["--host", "https://api.example.test", "cloud", "/hello", "-X", "FETCH"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cloud_rejects_non_object_body() {
    let home = TempDir::new().unwrap();
    let output = app_cmd(&home)
        .args(["--host", "https://api.example.test", "cloud", "/hello", "-d", "[1,2]"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("Invalid JSON payload"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cloud_request_prints_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hello"))
        .and(body_partial_json(json!({ "hello": "world" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "msg": "Hello world" })))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    write_manifest(&home, &format!("host = \"{}\"\nappid = \"app-1\"\n", server.uri()));

    app_cmd(&home)
        .args(["cloud", "/hello", "-d", r#"{"hello":"world"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello world"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_auth_then_cloud_uses_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/box/srv/1.1/admin/authpolicy/auth"))
        .and(body_partial_json(json!({
            "policyId": "FEEDHENRY",
            "clientToken": "app-1",
            "params": { "userId": "u", "password": "p" }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "ok", "sessionToken": "tok123" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("X-FH-sessionToken", "tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": "u" })))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    write_manifest(&home, &format!("host = \"{}\"\nappid = \"app-1\"\n", server.uri()));

    app_cmd(&home)
        .args(["auth", "FEEDHENRY", "--user", "u", "--password", "p"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Authenticated"));

    app_cmd(&home)
        .args(["cloud", "/me", "-X", "GET"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"user\""));

    app_cmd(&home)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session token cleared"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_auth_rejection_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/box/srv/1.1/admin/authpolicy/auth"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "error", "message": "bad creds" })),
        )
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    write_manifest(&home, &format!("host = \"{}\"\nappid = \"app-1\"\n", server.uri()));

    let output = app_cmd(&home)
        .args(["auth", "FEEDHENRY", "--user", "u", "--password", "p"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("bad creds"));

    app_cmd(&home)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("No session token stored"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_auth_without_app_id_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    write_manifest(&home, &format!("host = \"{}\"\n", server.uri()));

    let output = app_cmd(&home).args(["auth", "FEEDHENRY"]).output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Missing configuration"), "{text}");
    assert!(text.contains("appid"), "{text}");
}
