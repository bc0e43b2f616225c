use chrono::{SecondsFormat, Utc};
use std::path::Path;

pub const NAME: &str = "The Veil";
pub const CODENAME: &str = "GrafanaNetes Sentinel";

/// Current UTC time as ISO-8601 with a trailing `Z`.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Multi-line banner printed above text-mode command output.
pub fn banner(version: &str, root: &Path, extra: Option<&str>) -> String {
    let mut out = format!(
        "{NAME} — {CODENAME}\nVersion: {version}\nTimestamp: {}\nProject root: {}",
        timestamp(),
        root.display()
    );
    if let Some(extra) = extra.map(str::trim).filter(|e| !e.is_empty()) {
        out.push('\n');
        out.push_str(extra);
    }
    out
}
