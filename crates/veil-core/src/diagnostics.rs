//! Read-only environment probes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::check::{format_check, CheckResult};
use crate::config::{ConfigLoad, ConfigStore};
use crate::event_log::EventLog;
use crate::tools::{detect, ToolKind};
use crate::{identity, paths, version};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub timestamp: String,
    pub version: String,
    pub overall_ok: bool,
    pub checks: Vec<CheckResult>,
}

/// `config` is `None` when no config directory could be located; the
/// `config_file` check then fails instead of the whole run.
pub fn run_diagnostics(
    root: &Path,
    config: Option<&ConfigStore>,
    log: &EventLog,
) -> DiagnosticsReport {
    log.section("Diagnostics Run");

    let checks = vec![
        check_tool(ToolKind::ContainerRuntime, "container_runtime"),
        check_tool(ToolKind::PackageManager, "package_manager"),
        check_paths(root),
        check_config(config),
        check_platform(),
    ];

    for c in &checks {
        log.info(
            "Diagnostic check",
            serde_json::json!({ "name": c.name, "ok": c.ok }),
        );
    }

    DiagnosticsReport {
        timestamp: identity::timestamp(),
        version: version::current_version(root),
        overall_ok: checks.iter().all(|c| c.ok),
        checks,
    }
}

fn check_tool(kind: ToolKind, name: &str) -> CheckResult {
    let found = detect(kind);
    CheckResult::new(name, found.is_some())
        .with(
            "current",
            found
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "not found".into()),
        )
        .with("required", format!("{} on PATH", kind.candidates().join(" or ")))
}

fn check_paths(root: &Path) -> CheckResult {
    let descriptor = paths::build_descriptor(root);
    CheckResult::new("project_paths", descriptor.is_some())
        .with("project_root", root.display().to_string())
        .with(
            "build_descriptor",
            descriptor
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| format!("none of {}", paths::BUILD_DESCRIPTORS.join(", "))),
        )
        .with("logs_dir", paths::logs_dir(root).display().to_string())
}

fn check_config(config: Option<&ConfigStore>) -> CheckResult {
    let Some(config) = config else {
        return CheckResult::new("config_file", false)
            .with("state", "unavailable")
            .with("reason", "no config directory (home directory not found)");
    };
    let outcome = config.load_outcome();
    let state = match &outcome {
        ConfigLoad::Loaded(_) => "loaded",
        ConfigLoad::Missing(_) => "missing (defaults)",
        ConfigLoad::Defaulted { .. } => "corrupt (defaults)",
    };
    let mut check = CheckResult::new("config_file", !outcome.is_defaulted())
        .with("path", config.path().display().to_string())
        .with("state", state)
        .with("channel", outcome.record().channel.as_str());
    if let ConfigLoad::Defaulted { reason, .. } = &outcome {
        check = check.with("reason", reason.as_str());
    }
    check
}

fn check_platform() -> CheckResult {
    CheckResult::new("platform", true)
        .with("system", std::env::consts::OS)
        .with("family", std::env::consts::FAMILY)
        .with("machine", std::env::consts::ARCH)
}

/// Human-readable report.
pub fn render_report(report: &DiagnosticsReport) -> String {
    let mut lines = vec![
        format!("Diagnostics Report — {}", report.timestamp),
        format!("Version: {}", report.version),
        format!("Overall OK: {}", report.overall_ok),
        String::new(),
    ];
    for check in &report.checks {
        lines.push(format_check(check));
        lines.push(String::new());
    }
    lines.join("\n").trim().to_string()
}
