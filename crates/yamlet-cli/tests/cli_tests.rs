//! Integration tests for the `yamlet` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the to-json,
//! from-json, fmt and check subcommands through the actual binary, including
//! stdin/stdout piping, file I/O and exit codes.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

fn sample_yml_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample.yml")
}

fn multi_yml_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/multi.yml")
}

fn bad_yml_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/bad.yml")
}

fn sample_json_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample.json")
}

/// Helper: read a fixture as a string.
fn fixture(path: &str) -> String {
    std::fs::read_to_string(path).expect("fixture must exist")
}

fn yamlet() -> Command {
    Command::cargo_bin("yamlet").unwrap()
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout must be valid JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// to-json
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn to_json_stdin_to_stdout() {
    let output = yamlet()
        .arg("to-json")
        .write_stdin(fixture(sample_yml_path()))
        .output()
        .unwrap();

    assert!(output.status.success());
    let expected = serde_json::json!({
        "defaults": {"retries": 3, "timeout": 2.5},
        "service": {
            "retries": 3,
            "timeout": 2.5,
            "name": "api",
            "ports": [80, 443],
            "enabled": true
        }
    });
    assert_eq!(stdout_json(&output), expected);
}

#[test]
fn to_json_keeps_merged_key_order() {
    let output = yamlet()
        .args(["to-json", "-i", sample_yml_path(), "--compact"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains(
        r#""service":{"retries":3,"timeout":2.5,"name":"api","ports":[80,443],"enabled":true}"#
    ));
}

#[test]
fn to_json_pretty_by_default() {
    yamlet()
        .args(["to-json", "-i", sample_yml_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\n  \"defaults\": {"));
}

#[test]
fn to_json_compact_is_one_line() {
    let output = yamlet()
        .args(["to-json", "--compact"])
        .write_stdin("a: 1\nb: [x, y]\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "{\"a\":1,\"b\":[\"x\",\"y\"]}\n"
    );
}

#[test]
fn to_json_first_document_only_by_default() {
    let output = yamlet()
        .args(["to-json", "-i", multi_yml_path()])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output), serde_json::json!({"a": 1}));
}

#[test]
fn to_json_all_documents() {
    let output = yamlet()
        .args(["to-json", "-i", multi_yml_path(), "--all"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        serde_json::json!([{"a": 1}, [2, "three"]])
    );
}

#[test]
fn to_json_empty_input_is_null() {
    let output = yamlet()
        .arg("to-json")
        .write_stdin("# nothing here\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output), serde_json::Value::Null);
}

#[test]
fn to_json_file_to_file() {
    let out_path = "/tmp/yamlet_cli_test_to_json.json";

    yamlet()
        .args(["to-json", "-i", sample_yml_path(), "-o", out_path])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out_path).unwrap()).unwrap();
    assert_eq!(written["service"]["name"], "api");

    let _ = std::fs::remove_file(out_path);
}

#[test]
fn to_json_parse_error_names_the_file() {
    yamlet()
        .args(["to-json", "-i", bad_yml_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.yml"))
        .stderr(predicate::str::contains("delimiter error at line 1"));
}

#[test]
fn to_json_missing_file_fails() {
    yamlet()
        .args(["to-json", "-i", "/tmp/yamlet_no_such_file.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// from-json
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn from_json_file_to_stdout() {
    yamlet()
        .args(["from-json", "-i", sample_json_path()])
        .assert()
        .success()
        .stdout(
            "name: api\ntags:\n  - edge\n  - public\nlimits:\n  rps: 100\n  burst: null\n",
        );
}

#[test]
fn from_json_quotes_ambiguous_strings() {
    yamlet()
        .arg("from-json")
        .write_stdin(r#"{"port": "8080", "flag": "yes: no"}"#)
        .assert()
        .success()
        .stdout("port: \"8080\"\nflag: \"yes: no\"\n");
}

#[test]
fn from_json_scalar_root_fails() {
    yamlet()
        .arg("from-json")
        .write_stdin("42")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be written as a document root"));
}

#[test]
fn from_json_merge_key_with_map_fails() {
    yamlet()
        .arg("from-json")
        .write_stdin(r#"{"<<": {"b": 1}, "c": 2}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("read back as a merge"));
}

#[test]
fn from_json_keeps_backslashes_verbatim() {
    let yml = yamlet()
        .arg("from-json")
        .write_stdin(r#"{"path": " C:\\new\\table"}"#)
        .output()
        .unwrap();
    assert!(yml.status.success());
    assert_eq!(
        String::from_utf8(yml.stdout.clone()).unwrap(),
        "path: ' C:\\new\\table'\n"
    );

    let back = yamlet()
        .args(["to-json", "--compact"])
        .write_stdin(yml.stdout)
        .output()
        .unwrap();
    assert_eq!(
        String::from_utf8(back.stdout).unwrap(),
        "{\"path\":\" C:\\\\new\\\\table\"}\n"
    );
}

#[test]
fn from_json_invalid_json_fails() {
    yamlet()
        .arg("from-json")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse JSON input"));
}

#[test]
fn from_json_then_to_json_roundtrip() {
    let original: serde_json::Value =
        serde_json::from_str(&fixture(sample_json_path())).unwrap();

    let as_yamlet = yamlet()
        .args(["from-json", "-i", sample_json_path()])
        .output()
        .unwrap();
    assert!(as_yamlet.status.success());

    let back = yamlet()
        .arg("to-json")
        .write_stdin(as_yamlet.stdout)
        .output()
        .unwrap();
    assert!(back.status.success());
    assert_eq!(stdout_json(&back), original);
}

// ─────────────────────────────────────────────────────────────────────────────
// fmt
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn fmt_resolves_anchors_and_drops_comments() {
    yamlet()
        .args(["fmt", "-i", sample_yml_path()])
        .assert()
        .success()
        .stdout(
            "defaults:\n  retries: 3\n  timeout: 2.5\nservice:\n  retries: 3\n  timeout: 2.5\n  name: api\n  ports:\n    - 80\n    - 443\n  enabled: true\n",
        );
}

#[test]
fn fmt_keeps_document_separators() {
    yamlet()
        .args(["fmt", "-i", multi_yml_path()])
        .assert()
        .success()
        .stdout("a: 1\n---\n- 2\n- three\n");
}

#[test]
fn fmt_output_is_stable() {
    let once = yamlet()
        .args(["fmt", "-i", sample_yml_path()])
        .output()
        .unwrap();
    let twice = yamlet()
        .arg("fmt")
        .write_stdin(once.stdout.clone())
        .output()
        .unwrap();
    assert_eq!(once.stdout, twice.stdout);
}

#[test]
fn fmt_reports_values_that_cannot_be_written() {
    // Flow strings decode escapes, so this one holds a whitespace-only line.
    yamlet()
        .arg("fmt")
        .write_stdin("a: [\"x\\n  \\ny\"]\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to write normalized output"))
        .stderr(predicate::str::contains("cannot be written"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn fmt_rejects_invalid_input() {
    yamlet()
        .arg("fmt")
        .write_stdin("a:\n  b: 1\n c: 2\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<stdin>"));
}

// ─────────────────────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_valid_files() {
    yamlet()
        .args(["check", sample_yml_path(), multi_yml_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("sample.yml: ok (1 document)"))
        .stdout(predicate::str::contains("multi.yml: ok (2 documents)"));
}

#[test]
fn check_reports_each_failure() {
    yamlet()
        .args(["check", sample_yml_path(), bad_yml_path()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("sample.yml: ok"))
        .stderr(predicate::str::contains("bad.yml: delimiter error at line 1"))
        .stderr(predicate::str::contains("1 of 2 file(s) failed"));
}

#[test]
fn check_requires_a_file() {
    yamlet().arg("check").assert().failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// General
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn help_lists_subcommands() {
    yamlet()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("to-json"))
        .stdout(predicate::str::contains("from-json"))
        .stdout(predicate::str::contains("fmt"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn unknown_subcommand_fails() {
    yamlet().arg("explode").assert().failure();
}
