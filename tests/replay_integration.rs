//! End-to-end replay scripts loaded from disk.

use inlinesync::{load_script, run_script, InlineRange, ReplayError, SyncConfig};
use std::io::Write;
use tempfile::NamedTempFile;

fn script_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(json.as_bytes()).expect("write script");
    file
}

fn replay(json: &str) -> inlinesync::ReplayReport {
    let file = script_file(json);
    let script = load_script(file.path()).expect("load script");
    run_script(&script, SyncConfig::default()).expect("replay")
}

#[test]
fn composition_with_empty_data_commits_dom_text() {
    let report = replay(
        r#"{
            "initial": [{"insert": "Hello"}],
            "selection": {"index": 5, "length": 0},
            "events": [
                {"type": "composition_start"},
                {"type": "compose", "text": "!"},
                {"type": "composition_update"},
                {"type": "composition_end", "data": ""}
            ]
        }"#,
    );
    assert_eq!(report.text, "Hello!");
    assert_eq!(report.inline_range, Some(InlineRange::caret(6)));
    assert_eq!(report.prevented_steps, vec![3]);
    assert_eq!(report.inputting_notifications, 2);
}

#[test]
fn arrow_left_selects_embed() {
    let report = replay(
        r#"{
            "initial": [{"insert": "￼", "attributes": {"label": "@doc"}}],
            "selection": {"index": 1, "length": 0},
            "events": [{"type": "key_down", "key": "ArrowLeft"}]
        }"#,
    );
    assert_eq!(report.inline_range, Some(InlineRange::new(0, 1)));
    assert_eq!(report.prevented_steps, vec![0]);
}

#[test]
fn backspace_and_click_around_embeds() {
    let report = replay(
        r#"{
            "initial": [
                {"insert": "ab"},
                {"insert": "￼"},
                {"insert": "cd"},
                {"insert": "￼"}
            ],
            "events": [
                {"type": "click_embed", "index": 1},
                {"type": "select", "index": 3},
                {"type": "before_input", "input_type": "deleteContentBackward"}
            ]
        }"#,
    );
    assert_eq!(report.text, "abcd\u{FFFC}");
    assert_eq!(report.inline_range, Some(InlineRange::caret(2)));
}

#[test]
fn android_double_fire_is_deduplicated() {
    let report = replay(
        r#"{
            "initial": [{"insert": "ab"}],
            "selection": {"index": 2, "length": 0},
            "user_agent": "Mozilla/5.0 (Linux; Android 14) AppleWebKit/537.36",
            "events": [
                {"type": "input", "data": "x"},
                {"type": "select", "index": 2},
                {"type": "advance_ms", "ms": 40},
                {"type": "input", "data": "x"},
                {"type": "select", "index": 2},
                {"type": "advance_ms", "ms": 110},
                {"type": "input", "data": "x"}
            ]
        }"#,
    );
    assert_eq!(report.text, "abxx");
}

#[test]
fn input_events_are_ignored_off_android() {
    let report = replay(
        r#"{
            "initial": [{"insert": "ab"}],
            "selection": {"index": 2, "length": 0},
            "events": [{"type": "input", "data": "x"}]
        }"#,
    );
    assert_eq!(report.text, "ab");
}

#[test]
fn read_only_scripts_do_not_mutate() {
    let report = replay(
        r#"{
            "initial": [{"insert": "ab"}],
            "selection": {"index": 1, "length": 0},
            "read_only": true,
            "events": [{"type": "before_input", "input_type": "insertText", "data": "x"}]
        }"#,
    );
    assert_eq!(report.text, "ab");
    assert!(report.prevented_steps.is_empty());
}

#[test]
fn detached_root_drops_later_input() {
    let report = replay(
        r#"{
            "initial": [{"insert": "ab"}],
            "selection": {"index": 2, "length": 0},
            "events": [
                {"type": "detach"},
                {"type": "before_input", "input_type": "insertText", "data": "x"}
            ]
        }"#,
    );
    assert_eq!(report.text, "ab");
}

#[test]
fn json_report_serializes_deltas() {
    let report = replay(r#"{"initial": [{"insert": "hi", "attributes": {"bold": true}}]}"#);
    let json = serde_json::to_value(&report).expect("json");
    assert_eq!(json["deltas"][0]["attributes"]["bold"], true);
    assert_eq!(json["inline_range"], serde_json::Value::Null);
}

#[test]
fn malformed_scripts_are_rejected() {
    let file = script_file(r#"{"events": [{"type": "teleport"}]}"#);
    let err = load_script(file.path()).expect_err("unknown event");
    assert!(matches!(err, ReplayError::Parse(_)), "{err}");

    let missing = load_script(std::path::Path::new("/definitely/not/here.json"))
        .expect_err("missing file");
    assert!(matches!(missing, ReplayError::Read { .. }), "{missing}");
}

#[test]
fn selecting_past_the_end_fails_with_step() {
    let file = script_file(
        r#"{"initial": [{"insert": "ab"}], "events": [{"type": "select", "index": 9}]}"#,
    );
    let script = load_script(file.path()).expect("load script");
    let err = run_script(&script, SyncConfig::default()).expect_err("bad select");
    assert!(matches!(err, ReplayError::Step { step: 0, .. }), "{err}");
}
