//! Append-only structured event log (`<root>/logs/veil.log`).
//!
//! Each record is one self-contained JSON line:
//! `{"timestamp": "...Z", "level": "INFO", "message": "...", ...context}`.
//! The file is opened in append mode per write and never read back by the
//! core. Records from concurrent processes may interleave line-wise.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::{identity, io, paths};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to the log file. Cheap to clone; holds only the path.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    /// Log under `<root>/logs/veil.log`.
    pub fn for_root(root: &Path) -> Self {
        Self {
            path: paths::log_path(root),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. `context` must serialize to a JSON object; its keys
    /// are merged into the record after the fixed fields, so they cannot
    /// overwrite `timestamp`, `level`, or `message`.
    ///
    /// Failures are reported through `tracing` and otherwise ignored.
    pub fn record<C: Serialize>(&self, level: Level, message: &str, context: C) {
        let line = match render_line(level, message, context) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, message, "failed to serialize log record");
                return;
            }
        };
        if let Err(e) = io::append_text(&self.path, &line) {
            tracing::warn!(error = %e, path = %self.path.display(), "failed to append log record");
        }
    }

    pub fn info<C: Serialize>(&self, message: &str, context: C) {
        self.record(Level::Info, message, context);
    }

    pub fn warn<C: Serialize>(&self, message: &str, context: C) {
        self.record(Level::Warn, message, context);
    }

    pub fn error<C: Serialize>(&self, message: &str, context: C) {
        self.record(Level::Error, message, context);
    }

    /// Structural separator, e.g. `--- Self-Update Check ---`.
    pub fn section(&self, title: &str) {
        self.record(Level::Info, &format!("--- {title} ---"), ());
    }
}

fn render_line<C: Serialize>(
    level: Level,
    message: &str,
    context: C,
) -> serde_json::Result<String> {
    let mut record = Map::new();
    record.insert("timestamp".into(), Value::String(identity::timestamp()));
    record.insert("level".into(), Value::String(level.as_str().into()));
    record.insert("message".into(), Value::String(message.into()));

    if let Value::Object(extra) = serde_json::to_value(context)? {
        for (k, v) in extra {
            record.entry(k).or_insert(v);
        }
    }

    let mut line = serde_json::to_string(&Value::Object(record))?;
    line.push('\n');
    Ok(line)
}
