//! Integration tests for the agrisense CLI

use std::process::Command;

#[test]
fn help_flag_shows_usage() {
    let output = Command::new("cargo")
        .args(["run", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("agrisense"));
    assert!(stdout.contains("--nitrogen"));
}

#[test]
fn help_env_lists_variables() {
    let output = Command::new("cargo")
        .args(["run", "--", "--help-env"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("AGRISENSE_BASE_URL"));
    assert!(stdout.contains("AGRISENSE_DEPLOYMENT"));
}

#[test]
fn version_flag_shows_version() {
    let output = Command::new("cargo")
        .args(["run", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn make_config_prints_template() {
    let output = Command::new("cargo")
        .args(["run", "--", "--make-config"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[api]"));
    assert!(stdout.contains("[network]"));
    assert!(stdout.contains("dns_fallback = true"));
}

#[test]
fn completions_are_generated() {
    let output = Command::new("cargo")
        .args(["run", "--", "--completions", "fish"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("agrisense"));
}

#[test]
fn no_arguments_does_not_panic() {
    let output = Command::new("cargo")
        .args(["run", "--"])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!stderr.contains("panic"));
    assert!(!stdout.contains("panic"));
}

#[test]
fn json_flag_is_recognized() {
    let output = Command::new("cargo")
        .args(["run", "--", "--json", "--help"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
}
