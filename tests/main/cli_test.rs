//! CLI contract tests.

use std::fs;

use assert_cmd::Command;

fn demo() -> Command {
    Command::cargo_bin("messaging-demo").expect("binary should build")
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn check_config_reports_effective_values() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("config.toml");
    fs::write(&path, "[messaging]\nbrand_id = \"1234\"\ndebug = true\n").expect("write config");

    let output = demo()
        .arg("--config")
        .arg(&path)
        .arg("check-config")
        .env_remove("MESSAGING_DEMO_BRAND_ID")
        .output()
        .expect("command should run");

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("brand_id: 1234"));
    assert!(stdout.contains("installation_id: f10767f2-24fd-4d8f-95bd-0397cd244194"));
    assert!(stdout.contains("sdk_log_level: Verbose"));
    assert!(stdout.contains("config OK"));
}

#[test]
fn check_config_rejects_bad_close_reason() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("config.toml");
    fs::write(&path, "[simulation]\nclose_reason = \"BOT\"\n").expect("write config");

    let output = demo()
        .arg("--config")
        .arg(&path)
        .arg("check-config")
        .output()
        .expect("command should run");
    assert!(!output.status.success());
}

#[test]
fn run_closes_on_back_after_failed_startup() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("config.toml");
    fs::write(&path, "").expect("write config");

    let output = demo()
        .arg("--config")
        .arg(&path)
        .args(["run", "--fail-init"])
        .write_stdin("help\nback\n")
        .output()
        .expect("command should run");

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Commands:"));
    assert!(stdout.contains("[screen] finished"));
    assert!(!stdout.contains("[toolbar]"));
}

#[test]
fn config_loading_is_logged_for_check_config() {
    let tmp = tempfile::tempdir().expect("should create temp dir");

    let output = demo()
        .arg("check-config")
        .env("MESSAGING_DEMO_CONFIG", tmp.path().join("missing.toml"))
        .env("RUST_LOG", "debug")
        .output()
        .expect("command should run");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no config file found, using defaults"));
}

#[test]
fn config_loading_is_logged_for_run() {
    let tmp = tempfile::tempdir().expect("should create temp dir");

    let output = demo()
        .args(["run", "--fail-init"])
        .env("MESSAGING_DEMO_CONFIG", tmp.path().join("missing.toml"))
        .env("RUST_LOG", "debug")
        .write_stdin("back\n")
        .output()
        .expect("command should run");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no config file found, using defaults"));
}
