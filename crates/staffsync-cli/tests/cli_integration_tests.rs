//! CLI integration tests for staffsync
//!
//! Runs the binary end-to-end with assert_cmd. Every test gets its own
//! configuration directory; service calls go to a port nothing listens on.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Command isolated from the user's configuration and credentials
#[allow(deprecated)]
fn staffsync_cmd(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("staffsync").unwrap();
    cmd.env("STAFFSYNC_CONFIG_DIR", config_dir.path());
    cmd.env_remove("STAFFSYNC_TOKEN");
    cmd.env("RUST_LOG", "off");
    cmd
}

fn point_at_unreachable(config_dir: &TempDir) {
    staffsync_cmd(config_dir)
        .args(["config", "set", "remote.base_url", UNREACHABLE])
        .assert()
        .success();
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    staffsync_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("employees"))
        .stdout(predicate::str::contains("skills"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_defaults() {
    let dir = TempDir::new().unwrap();
    staffsync_cmd(&dir)
        .args(["config", "get", "remote.base_url"])
        .assert()
        .success()
        .stdout("http://localhost:8089\n");

    staffsync_cmd(&dir)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cascade.max_attempts = 3"))
        .stdout(predicate::str::contains("remote.skill_collection = skills"));
}

#[test]
fn test_config_set_persists() {
    let dir = TempDir::new().unwrap();
    staffsync_cmd(&dir)
        .args(["config", "set", "cascade.max_attempts", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set cascade.max_attempts = 5"));

    staffsync_cmd(&dir)
        .args(["config", "get", "cascade.max_attempts"])
        .assert()
        .success()
        .stdout("5\n");

    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    staffsync_cmd(&dir)
        .args(["config", "set", "cascade.max_attempts", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 1 and 10"));

    staffsync_cmd(&dir)
        .args(["config", "set", "remote.skill_collection", "people"])
        .assert()
        .failure();

    staffsync_cmd(&dir)
        .args(["config", "set", "remote.token", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("STAFFSYNC_TOKEN"));
}

#[test]
fn test_config_reset_and_path() {
    let dir = TempDir::new().unwrap();
    staffsync_cmd(&dir)
        .args(["config", "set", "remote.timeout_secs", "5"])
        .assert()
        .success();

    staffsync_cmd(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    staffsync_cmd(&dir)
        .args(["config", "reset"])
        .assert()
        .success();

    staffsync_cmd(&dir)
        .args(["config", "get", "remote.timeout_secs"])
        .assert()
        .success()
        .stdout("30\n");
}

#[test]
fn test_token_is_redacted() {
    let dir = TempDir::new().unwrap();
    staffsync_cmd(&dir)
        .env("STAFFSYNC_TOKEN", "abcdefghijklmnop")
        .args(["config", "get", "remote.token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("abcdefghijklmnop").not());
}

#[test]
fn test_list_reports_unreachable_service() {
    let dir = TempDir::new().unwrap();
    point_at_unreachable(&dir);

    staffsync_cmd(&dir)
        .args(["employees", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load"));
}

#[test]
fn test_show_reports_network_error_code() {
    let dir = TempDir::new().unwrap();
    point_at_unreachable(&dir);

    staffsync_cmd(&dir)
        .args(["employees", "show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E100"));
}

#[test]
fn test_empty_skill_name_is_rejected_locally() {
    let dir = TempDir::new().unwrap();
    point_at_unreachable(&dir);

    staffsync_cmd(&dir)
        .args(["skills", "create", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E800"));
}

#[test]
fn test_unknown_sort_column() {
    let dir = TempDir::new().unwrap();
    staffsync_cmd(&dir)
        .args(["employees", "list", "--sort", "salary"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown sort column"));
}

#[test]
fn test_doctor_flags_unreachable_service() {
    let dir = TempDir::new().unwrap();
    point_at_unreachable(&dir);

    staffsync_cmd(&dir)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] Configuration: Valid"))
        .stdout(predicate::str::contains("unreachable"));
}
