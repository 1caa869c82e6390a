//! Tests for error handling and CLI flags.

use crate::support::*;

#[test]
fn test_help() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("alertcfg") || out.contains("Usage"));
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    let output = t.cmd().arg("unknown-command").output().unwrap();
    assert_failure(&output);
}

#[test]
fn test_verbose_flag_accepted() {
    let t = Test::init();

    let output = t.cmd().args(["--verbose", "get"]).output().unwrap();
    assert_success(&output);
}

#[test]
fn test_malformed_document() {
    let t = Test::init();

    let output = t.set("{ not json");
    assert_failure(&output);
    let payload = stderr_json(&output);
    assert_eq!(payload["message"], SET_FAILED);
    assert!(payload["error"].as_str().unwrap().contains("invalid document"));
}

#[test]
fn test_missing_document_file() {
    let t = Test::init();

    let output = t.cmd().args(["set", "nope.json"]).output().unwrap();
    assert_failure(&output);
    assert_eq!(stderr_json(&output)["message"], SET_FAILED);
}

#[test]
fn test_invalid_tenant() {
    let t = Test::init();

    let output = t.get_tenant("../etc");
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid tenant");
    assert_eq!(
        stderr_json(&output)["message"],
        "failed to get Alertmanager configuration"
    );
}

#[test]
fn test_invalid_settings() {
    let t = Test::init();
    t.write("alertcfg.toml", "[apply]\ntimeout_ms = 0\n");

    let output = t.get();
    assert_failure(&output);
    assert_stderr_contains(&output, "apply.timeout_ms");
}

#[test]
fn test_unknown_notifier_type() {
    let t = Test::init();
    let doc = r#"{ "alertmanager_config": { "route": { "receiver": "r" }, "receivers": [
        { "name": "r", "grafana_managed_receiver_configs": [{ "name": "r", "type": "carrier-pigeon" }] }
    ]}}"#;

    let output = t.set(doc);
    assert_failure(&output);
    assert!(stderr_json(&output)["error"]
        .as_str()
        .unwrap()
        .contains("carrier-pigeon"));
}

#[test]
fn test_rejected_set_exit_status() {
    use predicates::prelude::*;

    let t = Test::init();
    let file = t.write("doc.json", SLACK_EMPTY_TOKEN);
    t.cmd()
        .args(["set", file.as_str()])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(SET_FAILED));
}
