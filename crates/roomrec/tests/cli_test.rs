//! Integration tests for the `roomrec` binary.
//!
//! Argument parsing, completions and error exit codes, plus `info` against
//! a wiremock live API. Nothing touches the user's real configuration.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `roomrec` binary with env isolation.
fn roomrec_cmd(config_dir: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("roomrec");
    cmd.env("HOME", config_dir)
        .env("XDG_CONFIG_HOME", config_dir)
        .env("ROOMREC_CONFIG", config_dir.join("config.toml"))
        .env_remove("ROOMREC_ROOMS")
        .env_remove("ROOMREC_API_BASE")
        .env_remove("ROOMREC_OUTPUT_DIR")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = roomrec_cmd(dir.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    roomrec_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("record")
            .and(predicate::str::contains("info"))
            .and(predicate::str::contains("completions")),
    );
}

#[test]
fn test_completions_zsh() {
    let dir = tempfile::tempdir().unwrap();
    roomrec_cmd(dir.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_record_without_rooms_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    roomrec_cmd(dir.path())
        .arg("record")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No rooms to record"));
}

#[test]
fn test_non_numeric_room_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = roomrec_cmd(dir.path())
        .args(["info", "not-a-room"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(combined_output(&output).contains("invalid"));
}

#[test]
fn test_invalid_config_value() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "poll_interval = 0\n").unwrap();

    roomrec_cmd(dir.path())
        .args(["record", "1017"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("poll_interval"));
}

// ── info ────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_info_prints_room_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/room/v1/Room/get_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": {
                "room_id": 21_452_505,
                "short_id": 1017,
                "live_status": 1,
                "title": "evening stream"
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/live_user/v1/UserInfo/get_anchor_in_room"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": { "info": { "uid": 1, "uname": "anchor" } }
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = roomrec_cmd(dir.path())
        .args(["info", "1017", "--api-base", &server.uri()])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["real_room_id"], 21_452_505);
    assert_eq!(parsed["streamer_name"], "anchor");
    assert_eq!(parsed["is_live"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_info_unknown_room_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/room/v1/Room/get_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 60004,
            "message": "room does not exist",
            "data": {}
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    roomrec_cmd(dir.path())
        .args(["info", "9", "--api-base", &server.uri()])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Room 9 does not exist"));
}
