#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Nothing listens on the discard port, so version checks fail fast.
const DEAD_INDEX: &str = "http://127.0.0.1:9";

fn veil(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("veil").unwrap();
    cmd.current_dir(dir.path())
        .env("VEIL_ROOT", dir.path())
        .env("VEIL_CONFIG_DIR", dir.path().join(".veil"))
        .env("VEIL_INDEX_URL", DEAD_INDEX)
        .env_remove("RUST_LOG");
    cmd
}

fn json_output(cmd: &mut Command) -> Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).expect("stdout should be JSON")
}

fn write_descriptor(dir: &TempDir, version: &str) {
    std::fs::write(
        dir.path().join("Cargo.toml"),
        format!("[package]\nname = \"veil-project\"\nversion = \"{version}\"\n"),
    )
    .unwrap();
}

fn log_records(dir: &TempDir) -> Vec<Value> {
    std::fs::read_to_string(dir.path().join("logs/veil.log"))
        .unwrap_or_default()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// veil status / set-channel
// ---------------------------------------------------------------------------

#[test]
fn status_defaults_to_stable_without_config() {
    let dir = TempDir::new().unwrap();
    let v = json_output(veil(&dir).args(["--json", "status"]));
    assert_eq!(v["default_channel"], "stable");
    assert!(!dir.path().join(".veil/config.json").exists());
}

#[test]
fn set_channel_round_trips_through_status() {
    let dir = TempDir::new().unwrap();
    veil(&dir)
        .args(["set-channel", "EDGE"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Default channel set to: edge"));

    let v = json_output(veil(&dir).args(["--json", "status"]));
    assert_eq!(v["default_channel"], "edge");
    assert_eq!(v["source"], "config file");

    let raw = std::fs::read_to_string(dir.path().join(".veil/config.json")).unwrap();
    let cfg: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(cfg["channel"], "edge");
}

#[test]
fn set_channel_rejects_unknown_channel() {
    let dir = TempDir::new().unwrap();
    veil(&dir)
        .args(["set-channel", "beta"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("stable, edge, dev"));
    assert!(!dir.path().join(".veil/config.json").exists());
}

#[test]
fn corrupt_config_falls_back_to_stable() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".veil")).unwrap();
    std::fs::write(dir.path().join(".veil/config.json"), r#"{"channel": "nightly"}"#).unwrap();

    let v = json_output(veil(&dir).args(["--json", "status"]));
    assert_eq!(v["default_channel"], "stable");
    assert_eq!(v["source"], "default (config file unreadable)");
}

// ---------------------------------------------------------------------------
// veil update / update-apply
// ---------------------------------------------------------------------------

#[test]
fn update_dry_run_reports_unknown_latest() {
    let dir = TempDir::new().unwrap();
    write_descriptor(&dir, "1.2.0");

    let v = json_output(veil(&dir).args(["--json", "update", "--channel", "dev"]));
    assert_eq!(v["channel"], "dev");
    assert_eq!(v["artifact_reference"], "notchofhwend/updater:dev");
    assert_eq!(v["current_version"], "1.2.0");
    assert_eq!(v["latest_version"], "unknown");
    assert_eq!(v["version_status"], "check_failed");
    assert_eq!(v["update_available"], false);
    assert_eq!(v["applied"], false);
    assert!(v.get("error").is_none());
}

#[test]
fn update_uses_configured_channel() {
    let dir = TempDir::new().unwrap();
    veil(&dir).args(["set-channel", "edge"]).assert().success();

    let v = json_output(veil(&dir).args(["--json", "update"]));
    assert_eq!(v["channel"], "edge");
    assert_eq!(v["artifact_reference"], "notchofhwend/updater:edge");
}

#[test]
fn update_with_invalid_channel_fails() {
    let dir = TempDir::new().unwrap();
    veil(&dir)
        .args(["update", "--channel", "beta"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid channel 'beta'"));
}

#[test]
fn update_apply_without_container_runtime_reports_error() {
    let dir = TempDir::new().unwrap();
    let v = json_output(
        veil(&dir)
            .env("PATH", "")
            .args(["--json", "update-apply", "--channel", "stable"]),
    );
    assert_eq!(v["applied"], false);
    let error = v["error"].as_str().expect("error should be set");
    assert!(error.contains("docker"));

    let records = log_records(&dir);
    assert!(records
        .iter()
        .any(|r| r["message"] == "Self-update failed" && r["level"] == "ERROR"));
}

#[test]
fn update_apply_via_package_skips_when_latest_unknown() {
    let dir = TempDir::new().unwrap();
    let v = json_output(
        veil(&dir)
            .env("PATH", "")
            .args(["--json", "update-apply", "--via", "package"]),
    );
    assert_eq!(v["mechanism"], "package");
    assert_eq!(v["applied"], false);
    assert!(v.get("error").is_none());
}

#[test]
fn update_text_output_has_banner_and_title() {
    let dir = TempDir::new().unwrap();
    veil(&dir)
        .args(["update", "--channel", "stable"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The Veil"))
        .stdout(predicate::str::contains("Update Check (channel: stable)"))
        .stdout(predicate::str::contains("latest_version"));
}

#[test]
fn update_logs_corrupt_config_fallback() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".veil")).unwrap();
    std::fs::write(dir.path().join(".veil/config.json"), "{ not json").unwrap();

    let v = json_output(veil(&dir).args(["--json", "update"]));
    assert_eq!(v["channel"], "stable");

    let records = log_records(&dir);
    let fallback = records
        .iter()
        .find(|r| r["operation"] == "config_load")
        .expect("fallback should be in the event log");
    assert_eq!(fallback["level"], "WARN");
    assert!(fallback["reason"].as_str().is_some_and(|r| !r.is_empty()));

    let check = records
        .iter()
        .find(|r| r["message"] == "Latest version unavailable")
        .expect("failed version check should be in the event log");
    assert!(check["reason"].as_str().is_some_and(|r| !r.is_empty()));
}

// ---------------------------------------------------------------------------
// veil promote
// ---------------------------------------------------------------------------

#[test]
fn promote_without_container_runtime_reports_failure() {
    let dir = TempDir::new().unwrap();
    let v = json_output(
        veil(&dir)
            .env("PATH", "")
            .args(["--json", "promote", "1.1.3", "--to", "edge"]),
    );
    assert_eq!(v["promoted"], false);
    assert_eq!(v["source_reference"], "notchofhwend/updater:1.1.3");
    assert_eq!(v["target_reference"], "notchofhwend/updater:edge");
    assert!(v["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[test]
fn promote_defaults_to_stable() {
    let dir = TempDir::new().unwrap();
    let v = json_output(veil(&dir).env("PATH", "").args(["--json", "promote", "2.0.0"]));
    assert_eq!(v["channel"], "stable");
}

#[test]
fn promote_positional_coexists_with_version_flag() {
    let dir = TempDir::new().unwrap();
    veil(&dir)
        .args(["promote", "--version"])
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));

    veil(&dir)
        .args(["promote", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<VERSION>"));
}

#[test]
fn promote_does_not_need_config_dir() {
    let dir = TempDir::new().unwrap();
    let v = json_output(
        veil(&dir)
            .env_remove("VEIL_CONFIG_DIR")
            .env_remove("HOME")
            .env("PATH", "")
            .args(["--json", "promote", "1.1.3", "--to", "dev"]),
    );
    assert_eq!(v["target_reference"], "notchofhwend/updater:dev");
    assert!(!dir.path().join(".veil").exists());
}

#[test]
fn promote_rejects_invalid_channel() {
    let dir = TempDir::new().unwrap();
    veil(&dir)
        .args(["promote", "1.1.3", "--to", "nightly"])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// veil diagnostics / repair
// ---------------------------------------------------------------------------

#[test]
fn diagnostics_json_lists_checks() {
    let dir = TempDir::new().unwrap();
    write_descriptor(&dir, "0.3.0");
    let v = json_output(veil(&dir).args(["--json", "diagnostics"]));
    assert_eq!(v["version"], "0.3.0");
    let names: Vec<&str> = v["checks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"project_paths"));
    assert!(names.contains(&"platform"));
}

#[test]
fn repair_creates_directories() {
    let dir = TempDir::new().unwrap();
    let v = json_output(veil(&dir).args(["--json", "repair"]));
    assert_eq!(v["overall_ok"], true);
    assert!(dir.path().join("logs").is_dir());
    assert!(dir.path().join(".veil").is_dir());
}

// ---------------------------------------------------------------------------
// veil harden-docs
// ---------------------------------------------------------------------------

#[test]
fn harden_docs_rewrites_and_renames() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(docs.join("updater.md"), "# Veil Updater\n").unwrap();

    veil(&dir)
        .arg("harden-docs")
        .assert()
        .success()
        .stdout(predicate::str::contains("[RENAME]"));

    assert_eq!(
        std::fs::read_to_string(docs.join("hardener.md")).unwrap(),
        "# Veil Sentinel Hardener\n"
    );
    assert!(docs.join("hardener.md.bak").exists());
}

#[test]
fn harden_docs_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    veil(&dir)
        .arg("harden-docs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("docs directory not found"));
}

// ---------------------------------------------------------------------------
// event log
// ---------------------------------------------------------------------------

#[test]
fn every_invocation_is_logged() {
    let dir = TempDir::new().unwrap();
    veil(&dir).arg("status").assert().success();
    veil(&dir).args(["update", "--channel", "dev"]).assert().success();

    let records = log_records(&dir);
    let invoked: Vec<&Value> = records
        .iter()
        .filter(|r| r["message"] == "CLI invoked")
        .collect();
    assert_eq!(invoked.len(), 2);
    assert_eq!(invoked[0]["command"], "status");
    assert_eq!(invoked[1]["command"], "update");
    assert!(records
        .iter()
        .all(|r| r["timestamp"].as_str().unwrap().ends_with('Z')));
}
