//! Tests for `alertcfg check`.

use crate::support::*;

#[test]
fn test_check_valid_document() {
    let t = Test::init();

    let output = t.check(SLACK_CREATE);
    assert_success(&output);
    assert_stderr_contains(&output, "configuration is valid");
}

#[test]
fn test_check_rejected_document() {
    let t = Test::init();

    let output = t.check(SLACK_EMPTY_TOKEN);
    assert_failure(&output);
    assert_stderr_contains(&output, "token must be specified when using the Slack chat API");
}

#[test]
fn test_check_does_not_persist() {
    let t = Test::init();

    assert_success(&t.check(SLACK_CREATE));
    assert!(!t.dir.path().join(".alertcfg/store/1.json").exists());
}

#[test]
fn test_check_resolves_unchanged_against_store() {
    let t = Test::init();

    let output = t.check(SLACK_UPDATE_UNCHANGED);
    assert_failure(&output);
    assert_stderr_contains(&output, "no stored value");

    assert_success(&t.set(SLACK_CREATE));
    assert_success(&t.check(SLACK_UPDATE_UNCHANGED));
}
