//! Current and latest version resolution.
//!
//! Both lookups are total: a missing build descriptor yields
//! [`FALLBACK_VERSION`], and any failure talking to the package index yields
//! [`LatestVersion::Unknown`] with the cause attached. Neither ever aborts an
//! update check.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::paths;

/// Reported when no build descriptor or version field is found.
pub const FALLBACK_VERSION: &str = "0.0.0";

/// Rendering of a failed latest-version lookup.
pub const UNKNOWN_VERSION: &str = "unknown";

pub const DEFAULT_INDEX_URL: &str = "https://pypi.org";

/// Upper bound on the latest-version query.
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// LatestVersion / VersionStatus
// ---------------------------------------------------------------------------

/// Result of asking the index for the newest version. `Unknown` carries the
/// reason the lookup failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatestVersion {
    Known(String),
    Unknown(String),
}

impl LatestVersion {
    /// A published version of literally `unknown` is treated as a failed lookup.
    pub fn known(version: &str) -> Self {
        let version = version.trim();
        if version.is_empty() || version == UNKNOWN_VERSION {
            LatestVersion::Unknown(format!("index returned unusable version '{version}'"))
        } else {
            LatestVersion::Known(version.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LatestVersion::Known(v) => v,
            LatestVersion::Unknown(_) => UNKNOWN_VERSION,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            LatestVersion::Known(_) => None,
            LatestVersion::Unknown(reason) => Some(reason),
        }
    }
}

impl fmt::Display for LatestVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing the installed version against the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    UpToDate,
    UpdateAvailable,
    CheckFailed,
}

impl VersionStatus {
    pub fn compare(current: &str, latest: &LatestVersion) -> Self {
        match latest {
            LatestVersion::Unknown(_) => VersionStatus::CheckFailed,
            LatestVersion::Known(v) if v == UNKNOWN_VERSION => VersionStatus::CheckFailed,
            LatestVersion::Known(v) if v == current => VersionStatus::UpToDate,
            LatestVersion::Known(_) => VersionStatus::UpdateAvailable,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VersionStatus::UpToDate => "up_to_date",
            VersionStatus::UpdateAvailable => "update_available",
            VersionStatus::CheckFailed => "check_failed",
        }
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True iff `latest` is known and differs from `current`.
pub fn is_update_available(current: &str, latest: &str) -> bool {
    latest != UNKNOWN_VERSION && latest != current
}

// ---------------------------------------------------------------------------
// Current version
// ---------------------------------------------------------------------------

/// Read the version from the first build descriptor under `root`.
pub fn current_version(root: &Path) -> String {
    paths::build_descriptor(root)
        .and_then(|p| read_descriptor_version(&p))
        .unwrap_or_else(|| FALLBACK_VERSION.to_string())
}

fn read_descriptor_version(path: &Path) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    let doc: toml::Table = match text.parse() {
        Ok(doc) => doc,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "unparseable build descriptor");
            return None;
        }
    };

    let lookup = |keys: &[&str]| -> Option<String> {
        let mut value = doc.get(keys[0])?;
        for key in &keys[1..] {
            value = value.get(*key)?;
        }
        value
            .as_str()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    lookup(&["package", "version"])
        .or_else(|| lookup(&["project", "version"]))
        .or_else(|| lookup(&["tool", "poetry", "version"]))
}

// ---------------------------------------------------------------------------
// Package index
// ---------------------------------------------------------------------------

/// Source of the newest published version of a package.
pub trait PackageIndex {
    fn latest_version(&self, package: &str) -> LatestVersion;
}

/// Client for an index speaking the PyPI JSON API
/// (`GET {base}/pypi/{package}/json` → `info.version`).
pub struct HttpIndex {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct IndexDocument {
    info: IndexInfo,
}

#[derive(Deserialize)]
struct IndexInfo {
    version: String,
}

impl HttpIndex {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, CHECK_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("veil/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn fetch(&self, package: &str) -> Result<String> {
        let url = format!("{}/pypi/{}/json", self.base_url, package);
        let doc: IndexDocument = self
            .client
            .get(&url)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(doc.info.version)
    }
}

impl PackageIndex for HttpIndex {
    fn latest_version(&self, package: &str) -> LatestVersion {
        let latest = match self.fetch(package) {
            Ok(v) => LatestVersion::known(&v),
            Err(e) => LatestVersion::Unknown(e.to_string()),
        };
        if let Some(reason) = latest.failure_reason() {
            tracing::warn!(package, %reason, "latest version lookup failed");
        }
        latest
    }
}

// ---------------------------------------------------------------------------
// VersionResolver
// ---------------------------------------------------------------------------

/// Pairs the local build descriptor with a package index.
pub struct VersionResolver {
    root: PathBuf,
    index: Box<dyn PackageIndex>,
}

impl VersionResolver {
    pub fn new(root: impl Into<PathBuf>, index: Box<dyn PackageIndex>) -> Self {
        Self {
            root: root.into(),
            index,
        }
    }

    pub fn current_version(&self) -> String {
        current_version(&self.root)
    }

    pub fn latest_version(&self, package: &str) -> LatestVersion {
        self.index.latest_version(package)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
