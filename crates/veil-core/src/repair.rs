//! Idempotent fixers for the directories the tool writes into.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;

use crate::check::CheckResult;
use crate::config::ConfigStore;
use crate::event_log::EventLog;
use crate::{identity, io, paths};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairReport {
    pub timestamp: String,
    pub overall_ok: bool,
    pub steps: Vec<CheckResult>,
}

pub fn run_repair(root: &Path, config: &ConfigStore, log: &EventLog) -> RepairReport {
    log.section("Repair Run");

    let steps = vec![
        ensure_directory("logs_directory", &paths::logs_dir(root)),
        ensure_directory("config_directory", config.dir()),
        check_permissions(root),
    ];
    for step in &steps {
        log.info("Repair step", step);
    }

    let overall_ok = steps.iter().all(|s| s.ok);
    if overall_ok {
        log.info("Repair completed successfully", json!({ "overall_ok": true }));
    } else {
        log.warn("Repair completed with warnings", json!({ "overall_ok": false }));
    }

    RepairReport {
        timestamp: identity::timestamp(),
        overall_ok,
        steps,
    }
}

fn ensure_directory(name: &str, dir: &Path) -> CheckResult {
    let existed = dir.is_dir();
    match io::ensure_dir(dir) {
        Ok(()) => CheckResult::new(name, dir.is_dir())
            .with("path", dir.display().to_string())
            .with("created", !existed),
        Err(e) => CheckResult::new(name, false)
            .with("path", dir.display().to_string())
            .with("error", e.to_string()),
    }
}

fn check_permissions(root: &Path) -> CheckResult {
    let check = CheckResult::new("permissions_check", false).with("path", root.display().to_string());
    match std::fs::metadata(root) {
        Ok(meta) => {
            let writable = !meta.permissions().readonly();
            CheckResult { ok: writable, ..check }.with("writable", writable)
        }
        Err(e) => check.with("error", e.to_string()),
    }
}
