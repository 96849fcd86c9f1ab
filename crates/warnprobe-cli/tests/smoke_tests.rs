//! Smoke tests for the warnprobe CLI
//!
//! None of these launch a browser.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the warnprobe binary with a clean environment
fn warnprobe() -> Command {
    let mut cmd = Command::cargo_bin("warnprobe").expect("warnprobe binary should exist");
    cmd.env_remove("WARNPROBE_SOURCE_URL")
        .env_remove("WARNPROBE_CHROMIUM_PATH")
        .env_remove("WARNPROBE_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &TempDir, yaml: &str) -> std::path::PathBuf {
    let path = dir.path().join("warnprobe.yaml");
    fs::write(&path, yaml).unwrap();
    path
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    warnprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    warnprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_fails() {
    warnprobe().assert().failure();
}

#[test]
fn test_run_help_lists_scenarios() {
    warnprobe()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tor-browser"))
        .stdout(predicate::str::contains("security-level"))
        .stdout(predicate::str::contains("--fail-fast"));
}

// ============================================================================
// List
// ============================================================================

#[test]
fn test_list_scenarios() {
    warnprobe()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("tor-browser"))
        .stdout(predicate::str::contains("#browser-tb-close"))
        .stdout(predicate::str::contains("use the desktop version of Tor Browser"))
        .stdout(predicate::str::contains("#browser-security-level"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_defaults() {
    warnprobe()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("source_url: http://127.0.0.1:8080"))
        .stdout(predicate::str::contains("port: 9150"));
}

#[test]
fn test_config_from_file_and_flag() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "source_url: http://10.0.0.5:8080\nwait:\n  timeout_ms: 3000\n");

    warnprobe()
        .args(["config", "--format", "json", "--config"])
        .arg(&path)
        .args(["--timeout", "4500"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source_url\": \"http://10.0.0.5:8080\""))
        .stdout(predicate::str::contains("\"timeout_ms\": 4500"));
}

#[test]
fn test_config_from_env() {
    warnprobe()
        .env("WARNPROBE_SOURCE_URL", "http://192.168.1.20:8080")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://192.168.1.20:8080"));
}

#[test]
fn test_config_check_ok() {
    warnprobe()
        .args(["config", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration OK"));
}

#[test]
fn test_config_check_accepts_short_timeout() {
    warnprobe()
        .args(["config", "--check", "--timeout", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration OK"));
}

#[test]
fn test_config_short_timeout_shows_clamped_poll_interval() {
    warnprobe()
        .args(["config", "--format", "json", "--timeout", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"poll_interval_ms\": 50"));
}

#[test]
fn test_config_check_rejects_socks4_remote_dns() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "proxy:\n  version: \"4\"\n");

    warnprobe()
        .args(["config", "--check", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("SOCKS version 5"));
}

#[test]
fn test_config_check_rejects_bad_url() {
    warnprobe()
        .args(["config", "--check", "--source-url", "ftp://127.0.0.1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_config_check_rejects_bad_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "wait:\n  timeout_ms: 0\n");

    warnprobe()
        .args(["config", "--check", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_missing_config_file() {
    warnprobe()
        .args(["config", "--config", "/nonexistent/warnprobe.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

// ============================================================================
// Run (argument handling only)
// ============================================================================

#[test]
fn test_run_unknown_scenario() {
    warnprobe()
        .args(["run", "--scenario", "desktop"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_run_leaves_unrelated_profile_dir_alone() {
    let dir = TempDir::new().unwrap();
    let documents = dir.path().join("Documents");
    fs::create_dir_all(&documents).unwrap();
    fs::write(documents.join("thesis.odt"), "draft").unwrap();

    warnprobe()
        .args(["run", "--scenario", "orbot", "--profile-dir"])
        .arg(&documents)
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing"));

    assert_eq!(fs::read_to_string(documents.join("thesis.odt")).unwrap(), "draft");
}

#[test]
fn test_run_rejects_invalid_config_before_launch() {
    warnprobe()
        .args(["run", "--source-url", "not-a-url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}
