use crate::error::{Result, VeilError};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory and file constants
// ---------------------------------------------------------------------------

/// Per-user config directory, relative to the home directory.
pub const CONFIG_DIR: &str = ".veil";
pub const CONFIG_FILE: &str = "config.json";

pub const LOGS_DIR: &str = "logs";
pub const LOG_FILE: &str = "veil.log";

pub const DOCS_DIR: &str = "docs";

/// Build descriptors checked for the current version, in priority order.
pub const BUILD_DESCRIPTORS: &[&str] = &["Cargo.toml", "pyproject.toml"];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `~/.veil`, or `HomeNotFound` when no home directory can be determined.
pub fn default_config_dir() -> Result<PathBuf> {
    home::home_dir()
        .map(|h| h.join(CONFIG_DIR))
        .ok_or(VeilError::HomeNotFound)
}

pub fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE)
}

pub fn logs_dir(root: &Path) -> PathBuf {
    root.join(LOGS_DIR)
}

pub fn log_path(root: &Path) -> PathBuf {
    logs_dir(root).join(LOG_FILE)
}

pub fn docs_dir(root: &Path) -> PathBuf {
    root.join(DOCS_DIR)
}

/// First build descriptor that exists under `root`.
pub fn build_descriptor(root: &Path) -> Option<PathBuf> {
    BUILD_DESCRIPTORS
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(log_path(root), PathBuf::from("/tmp/proj/logs/veil.log"));
        assert_eq!(docs_dir(root), PathBuf::from("/tmp/proj/docs"));
        assert_eq!(
            config_path(Path::new("/home/u/.veil")),
            PathBuf::from("/home/u/.veil/config.json")
        );
    }

    #[test]
    fn build_descriptor_prefers_cargo_toml() {
        let dir = TempDir::new().unwrap();
        assert!(build_descriptor(dir.path()).is_none());

        std::fs::write(dir.path().join("pyproject.toml"), "").unwrap();
        assert_eq!(
            build_descriptor(dir.path()).unwrap(),
            dir.path().join("pyproject.toml")
        );

        std::fs::write(dir.path().join("Cargo.toml"), "").unwrap();
        assert_eq!(
            build_descriptor(dir.path()).unwrap(),
            dir.path().join("Cargo.toml")
        );
    }
}
