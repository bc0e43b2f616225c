//! External tool invocation for applying updates and promoting releases.
//!
//! Container operations go through `docker`; package upgrades go through
//! `pip3` (falling back to `pip`). Every call is blocking, inherits the
//! terminal's stdio so progress output stays visible, and has no timeout.
//! A call either succeeds or fails with a message; no partial results.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, VeilError};

/// The operations the orchestrator and promoter need from the outside world.
pub trait ExternalTools {
    fn pull(&self, reference: &str) -> Result<()>;
    fn run(&self, reference: &str) -> Result<()>;
    fn tag(&self, source: &str, target: &str) -> Result<()>;
    fn push(&self, reference: &str) -> Result<()>;
    fn install_or_upgrade(&self, package: &str) -> Result<()>;
}

/// Which binary backs a family of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    ContainerRuntime,
    PackageManager,
}

impl ToolKind {
    /// Candidate binaries in priority order.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            ToolKind::ContainerRuntime => &["docker"],
            ToolKind::PackageManager => &["pip3", "pip"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::ContainerRuntime => "container runtime",
            ToolKind::PackageManager => "package manager",
        }
    }
}

/// Locate the first available binary for `kind` on PATH.
pub fn detect(kind: ToolKind) -> Option<PathBuf> {
    kind.candidates()
        .iter()
        .find_map(|bin| which::which(bin).ok())
}

/// Production implementation backed by real subprocesses.
#[derive(Debug, Default, Clone)]
pub struct SystemTools;

impl SystemTools {
    pub fn new() -> Self {
        Self
    }

    fn exec<I, S>(&self, kind: ToolKind, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let bin = detect(kind).ok_or_else(|| {
            VeilError::ToolNotFound(format!("{} ({})", kind.name(), kind.candidates().join(" or ")))
        })?;
        run_checked(&bin, args)
    }
}

/// Run `bin` to completion; a spawn error or non-zero exit is `ToolFailed`.
fn run_checked<I, S>(bin: &Path, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(bin);
    cmd.args(args);
    let command = render_command(&cmd);
    tracing::debug!(%command, "spawning external tool");

    let status = cmd.status().map_err(|e| VeilError::ToolFailed {
        command: command.clone(),
        status: format!("failed to spawn: {e}"),
    })?;

    if !status.success() {
        return Err(VeilError::ToolFailed {
            command,
            status: status.to_string(),
        });
    }
    Ok(())
}

impl ExternalTools for SystemTools {
    fn pull(&self, reference: &str) -> Result<()> {
        self.exec(ToolKind::ContainerRuntime, ["pull", reference])
    }

    fn run(&self, reference: &str) -> Result<()> {
        self.exec(ToolKind::ContainerRuntime, ["run", "--rm", reference])
    }

    fn tag(&self, source: &str, target: &str) -> Result<()> {
        self.exec(ToolKind::ContainerRuntime, ["tag", source, target])
    }

    fn push(&self, reference: &str) -> Result<()> {
        self.exec(ToolKind::ContainerRuntime, ["push", reference])
    }

    fn install_or_upgrade(&self, package: &str) -> Result<()> {
        self.exec(ToolKind::PackageManager, ["install", "--upgrade", package])
    }
}

fn render_command(cmd: &Command) -> String {
    let program = Path::new(cmd.get_program())
        .file_name()
        .unwrap_or(cmd.get_program())
        .to_string_lossy()
        .into_owned();
    std::iter::once(program)
        .chain(cmd.get_args().map(|a| a.to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------
