//! Tests for the `xbl-crawl` binary.
//!
//! None of these reach the real service: they stop at startup errors or point
//! the client at a closed local port.

use std::fs;
use tempfile::TempDir;

mod common;
use common::run_xbl_crawl_in_dir;

/// Config pointing at a local port nothing listens on
const CLOSED_PORT_CONFIG: &str = "base-url: http://127.0.0.1:9\nrequest-timeout-secs: 2\n";

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_lists_flags() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_xbl_crawl_in_dir(temp_dir.path(), &["--help"], &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--seed", "--config", "--env-file", "--output", "--delay", "--json"] {
        assert!(stdout.contains(flag), "help is missing {flag}:\n{stdout}");
    }
}

#[test]
fn test_version() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_xbl_crawl_in_dir(temp_dir.path(), &["--version"], &[]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_api_key_fails_before_crawling() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_xbl_crawl_in_dir(temp_dir.path(), &["--seed", "alice", "--no-banner"], &[]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("OPENXBL_API_KEY"));
    assert!(!temp_dir.path().join("output").exists());
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("xbl-crawl.yaml"),
        "base-url: ftp://xbl.io/api/v2\n",
    )
    .unwrap();

    let output = run_xbl_crawl_in_dir(
        temp_dir.path(),
        &["--seed", "alice", "--no-banner"],
        &[("OPENXBL_API_KEY", "test-key")],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("base-url"));
}

#[test]
fn test_closed_stdin_without_seed_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_xbl_crawl_in_dir(
        temp_dir.path(),
        &["--no-banner"],
        &[("OPENXBL_API_KEY", "test-key")],
    );

    assert!(!output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("Enter initial gamertag: "));
    assert!(stderr.contains("end of input"));
}

#[test]
fn test_unreachable_service_skips_seed_and_finishes() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("xbl-crawl.yaml"), CLOSED_PORT_CONFIG).unwrap();
    fs::write(temp_dir.path().join(".env"), "OPENXBL_API_KEY=from-env-file\n").unwrap();

    let output = run_xbl_crawl_in_dir(
        temp_dir.path(),
        &["--seed", "alice", "--no-banner", "--json", "--delay", "0"],
        &[("NO_PROXY", "127.0.0.1"), ("no_proxy", "127.0.0.1")],
    );

    assert!(output.status.success(), "stderr:\n{}", stderr(&output));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"]["status"], "exhausted");
    assert_eq!(report["expanded"], 0);
    assert_eq!(report["skipped"], 1);
    assert!(stderr(&output).contains("Failed to retrieve friends for alice"));
    // Nothing was discovered, so nothing was written
    assert!(!temp_dir.path().join("output").join("gamertags.txt").exists());
}
