//! Integration tests for the `lint-todo format` and `lint-todo config` commands.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo;
use tempfile::TempDir;

const SETTINGS_VARS: &[&str] = &[
    "UPDATE_TODO",
    "INCLUDE_TODO",
    "TODO_DAYS_TO_WARN",
    "TODO_DAYS_TO_ERROR",
    "NO_CLEAN_TODO",
    "COMPACT_TODO",
    "FORMAT_TODO_AS",
    "STYLELINT_TODO_DIR",
    "CI",
    "CONTINUOUS_INTEGRATION",
    "BUILD_NUMBER",
    "RUN_ID",
    "RUST_LOG",
];

fn lint_todo_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("lint-todo"));
    cmd.current_dir(dir);
    for var in SETTINGS_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn results_json(dir: &Path) -> String {
    let source = dir.join("src").join("a.css");
    serde_json::json!([{
        "source": source.to_string_lossy(),
        "errored": true,
        "warnings": [
            { "line": 1, "column": 5, "rule": "color-no-hex", "severity": "error",
              "text": "Unexpected hex color \"#fff\" (color-no-hex)" },
            { "line": 4, "column": 1, "rule": "block-no-empty", "severity": "error",
              "text": "Unexpected empty block (block-no-empty)" },
            { "line": 6, "column": 3, "rule": "selector-max-id", "severity": "warning",
              "text": "Expected no more than 0 ID selectors (selector-max-id)" }
        ],
        "deprecations": [],
        "invalidOptionWarnings": [],
        "parseErrors": []
    }])
    .to_string()
}

fn write_results(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("results.json");
    fs::write(&path, results_json(dir)).expect("write results");
    path
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn format_without_ledger_reports_errors_and_exits_2() {
    let td = TempDir::new().expect("temp");
    let input = write_results(td.path());

    let output = lint_todo_cmd(td.path())
        .arg("format")
        .arg("--input")
        .arg(&input)
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(2));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("src/a.css"), "stdout: {stdout}");
    assert!(stdout.contains("3 problems (2 errors, 1 warning)"));
    assert!(!td.path().join(".lint-todo").exists());
}

#[test]
fn update_then_plain_run_suppresses_todos() {
    let td = TempDir::new().expect("temp");
    let input = write_results(td.path());

    let output = lint_todo_cmd(td.path())
        .env("UPDATE_TODO", "1")
        .arg("format")
        .arg("--input")
        .arg(&input)
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("✔ 2 todos created, 0 todos removed"));
    assert!(td.path().join(".lint-todo").is_file());

    let output = lint_todo_cmd(td.path())
        .arg("format")
        .arg("--input")
        .arg(&input)
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    assert!(!stdout.contains("color-no-hex"), "stdout: {stdout}");
    assert!(stdout.contains("1 problem (0 errors, 1 warning)"));
}

#[test]
fn results_can_come_from_stdin() {
    let td = TempDir::new().expect("temp");

    lint_todo_cmd(td.path())
        .env("UPDATE_TODO", "1")
        .arg("format")
        .write_stdin(results_json(td.path()))
        .assert()
        .success();

    let storage = fs::read_to_string(td.path().join(".lint-todo")).expect("storage");
    assert_eq!(storage.lines().count(), 2);
    assert!(storage.contains("\"op\":\"add\""));
}

#[test]
fn base_dir_comes_from_environment() {
    let td = TempDir::new().expect("temp");
    let ledger_dir = TempDir::new().expect("temp");
    let input = write_results(td.path());

    lint_todo_cmd(td.path())
        .env("UPDATE_TODO", "1")
        .env("STYLELINT_TODO_DIR", ledger_dir.path())
        .arg("format")
        .arg("--input")
        .arg(&input)
        .assert()
        .success();

    assert!(ledger_dir.path().join(".lint-todo").is_file());
    assert!(!td.path().join(".lint-todo").exists());
}

#[test]
fn decay_override_without_update_fails() {
    let td = TempDir::new().expect("temp");
    let input = write_results(td.path());

    let output = lint_todo_cmd(td.path())
        .env("TODO_DAYS_TO_WARN", "5")
        .arg("format")
        .arg("--input")
        .arg(&input)
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("only valid when the `UPDATE_TODO` environment variable is being used"),
        "stderr: {stderr}"
    );
}

#[test]
fn unknown_format_fails() {
    let td = TempDir::new().expect("temp");
    let input = write_results(td.path());

    let output = lint_todo_cmd(td.path())
        .arg("format")
        .arg("--input")
        .arg(&input)
        .arg("--format")
        .arg("xml")
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("You must use a valid FORMAT_TODO_AS: xml"));
}

#[test]
fn json_format_emits_parseable_results() {
    let td = TempDir::new().expect("temp");
    let input = write_results(td.path());

    let output = lint_todo_cmd(td.path())
        .env("FORMAT_TODO_AS", "json")
        .arg("format")
        .arg("--input")
        .arg(&input)
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(2));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(parsed[0]["warnings"].as_array().map(Vec::len), Some(3));
}

#[test]
fn compact_reports_removed_entries() {
    let td = TempDir::new().expect("temp");
    let input = write_results(td.path());
    lint_todo_cmd(td.path())
        .env("UPDATE_TODO", "1")
        .arg("format")
        .arg("--input")
        .arg(&input)
        .assert()
        .success();

    let output = lint_todo_cmd(td.path())
        .env("COMPACT_TODO", "1")
        .arg("format")
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout_of(&output),
        "Removed 0 todos in .lint-todo storage file"
    );
}

#[test]
fn config_prints_effective_configuration() {
    let td = TempDir::new().expect("temp");
    fs::write(td.path().join(".lint-todorc.toml"), "warn = 5\nerror = 10\n").expect("write rc");

    let output = lint_todo_cmd(td.path())
        .arg("config")
        .arg("--format")
        .arg("json")
        .output()
        .expect("run");

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(parsed["days_to_decay"]["warn"], 5);
    assert_eq!(parsed["days_to_decay"]["error"], 10);
}

#[test]
fn config_in_two_places_is_rejected() {
    let td = TempDir::new().expect("temp");
    fs::write(td.path().join(".lint-todorc.toml"), "warn = 5\n").expect("write rc");
    fs::write(
        td.path().join("package.json"),
        r#"{"name":"app","lintTodo":{"warn":5}}"#,
    )
    .expect("write package");

    let output = lint_todo_cmd(td.path()).arg("config").output().expect("run");

    assert_eq!(output.status.code(), Some(1));
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .contains("You cannot have todo configurations in both package.json and .lint-todorc.toml")
    );
}
