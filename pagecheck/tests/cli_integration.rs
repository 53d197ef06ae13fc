//! Integration tests for pagecheck CLI

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

const NINE_ROWS: &str = "
|id| value            |
|1 |'testing'         |
|2 |'and more testing'|
|3 |'and more testing'|
|4 |'and more testing'|
|5 |'and more testing'|
|6 |'testing'         |
|7 |'and more testing'|
|8 |'and more testing'|
|9 |'and more testing'|
";

fn run_pagecheck(args: &[&str]) -> (String, String, bool) {
    let mut cmd_args = vec!["run", "-q", "-p", "pagecheck", "--"];
    cmd_args.extend(args);

    let output = Command::new("cargo")
        .args(&cmd_args)
        .current_dir(env!("CARGO_MANIFEST_DIR").to_string() + "/..")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();

    (stdout, stderr, success)
}

fn fixture(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fixture.txt");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_cli_help() {
    let (stdout, _, success) = run_pagecheck(&["--help"]);

    assert!(success);
    assert!(stdout.contains("pagecheck"));
    assert!(stdout.contains("expand"));
    assert!(stdout.contains("page"));
}

#[test]
fn test_cli_version() {
    let (stdout, _, success) = run_pagecheck(&["--version"]);

    assert!(success);
    assert!(stdout.contains("pagecheck"));
}

#[test]
fn test_page_help_lists_options() {
    let (stdout, _, success) = run_pagecheck(&["page", "--help"]);

    assert!(success);
    assert!(stdout.contains("--fetch-size"));
    assert!(stdout.contains("--key-columns"));
    assert!(stdout.contains("--limit"));
}

#[test]
fn test_expand_table_output() {
    let (_dir, path) = fixture("|id|value|\n|*3|1|'x'|\n|2|'y'|\n");
    let (stdout, _, success) = run_pagecheck(&["expand", path.to_str().unwrap()]);

    assert!(success);
    assert!(stdout.contains("Line"));
    assert_eq!(stdout.matches("'x'").count(), 3);
    assert!(stdout.contains("Total (4 rows)"));
}

#[test]
fn test_expand_json_output() {
    let (_dir, path) = fixture("|id|value|\n|*2|1|'x'|\n");
    let (stdout, _, success) =
        run_pagecheck(&["expand", path.to_str().unwrap(), "--output", "json"]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(parsed["header"], serde_json::json!(["id", "value"]));
    assert_eq!(parsed["rows"].as_array().unwrap().len(), 2);
    assert_eq!(parsed["rows"][1]["cells"], serde_json::json!(["1", "'x'"]));
}

#[test]
fn test_expand_malformed_fixture_fails() {
    let (_dir, path) = fixture("|id|value|\n|1|'x'|extra|\n");
    let (_, stderr, success) = run_pagecheck(&["expand", path.to_str().unwrap()]);

    assert!(!success);
    assert!(stderr.contains("Error"));
}

#[test]
fn test_missing_file_fails() {
    let (_, stderr, success) = run_pagecheck(&["expand", "/nonexistent/fixture.txt"]);

    assert!(!success);
    assert!(stderr.contains("Error"));
}

#[test]
fn test_page_table_output() {
    let (_dir, path) = fixture(NINE_ROWS);
    let (stdout, _, success) =
        run_pagecheck(&["page", path.to_str().unwrap(), "--fetch-size", "5"]);

    assert!(success);
    assert!(stdout.contains("page 1"));
    assert!(stdout.contains("page 2"));
    assert!(stdout.contains("[5, 4]"));
    assert!(stdout.contains("9 of 9 fixture rows in 2 pages"));
}

#[test]
fn test_page_json_output() {
    let (_dir, path) = fixture(NINE_ROWS);
    let (stdout, _, success) = run_pagecheck(&[
        "page",
        path.to_str().unwrap(),
        "--fetch-size",
        "2",
        "--output",
        "json",
    ]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(parsed["report"]["page_sizes"], serde_json::json!([2, 2, 2, 2, 1]));
    assert_eq!(parsed["report"]["matches"], true);
    assert_eq!(parsed["pages"].as_array().unwrap().len(), 5);
    assert_eq!(parsed["pages"][0]["rows"][0], serde_json::json!([1, "testing"]));
}

#[test]
fn test_page_with_limit() {
    let (_dir, path) = fixture(NINE_ROWS);
    let (stdout, _, success) = run_pagecheck(&[
        "page",
        path.to_str().unwrap(),
        "--fetch-size",
        "5",
        "--limit",
        "8",
        "--output",
        "json",
    ]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(parsed["report"]["page_sizes"], serde_json::json!([5, 3]));
    assert_eq!(parsed["statement"], "SELECT * FROM paging_test LIMIT 8");
}

#[test]
fn test_page_zero_fetch_size_uses_default() {
    let (_dir, path) = fixture(NINE_ROWS);
    let (stdout, _, success) = run_pagecheck(&[
        "page",
        path.to_str().unwrap(),
        "--fetch-size",
        "0",
        "--output",
        "json",
    ]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(parsed["report"]["page_sizes"], serde_json::json!([9]));
}

#[test]
fn test_page_duplicate_keys_still_match_as_set() {
    let (_dir, path) = fixture("|id|value|\n|*3|1|'x'|\n|2|'y'|\n");
    let (stdout, _, success) = run_pagecheck(&[
        "page",
        path.to_str().unwrap(),
        "--fetch-size",
        "1",
        "--key-columns",
        "2",
        "--output",
        "json",
    ]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(parsed["report"]["total_rows"], 2);
    assert_eq!(parsed["report"]["baseline_rows"], 4);
}

#[test]
fn test_page_upsert_mismatch_fails() {
    // Same key, different values: the store keeps only the last row.
    let (_dir, path) = fixture("|id|value|\n|1|'x'|\n|1|'y'|\n");
    let (_, stderr, success) =
        run_pagecheck(&["page", path.to_str().unwrap(), "--fetch-size", "5"]);

    assert!(!success);
    assert!(stderr.contains("do not match"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let (_dir, path) = fixture(NINE_ROWS);
    let (stdout, stderr, success) = run_pagecheck(&[
        "-v",
        "page",
        path.to_str().unwrap(),
        "--fetch-size",
        "5",
        "--output",
        "json",
    ]);

    assert!(success);
    assert!(stderr.contains("page complete"));
    assert!(serde_json::from_str::<serde_json::Value>(&stdout).is_ok());
}

#[test]
fn test_verbose_after_subcommand() {
    let (_dir, path) = fixture(NINE_ROWS);
    let (_, stderr, success) =
        run_pagecheck(&["page", path.to_str().unwrap(), "--fetch-size", "5", "-v"]);

    assert!(success);
    assert!(stderr.contains("page complete"));
}

#[test]
fn test_quiet_without_verbose() {
    let (_dir, path) = fixture(NINE_ROWS);
    let (_, stderr, success) =
        run_pagecheck(&["page", path.to_str().unwrap(), "--fetch-size", "5"]);

    assert!(success);
    assert!(!stderr.contains("page complete"));
}
