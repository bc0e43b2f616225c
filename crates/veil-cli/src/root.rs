use std::path::{Path, PathBuf};

use veil_core::paths::BUILD_DESCRIPTORS;

/// Resolve the project root the tool operates on.
///
/// Priority:
/// 1. `--root` flag / `VEIL_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for a build descriptor
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    find_upward(&cwd, |dir| BUILD_DESCRIPTORS.iter().any(|f| dir.join(f).is_file()))
        .or_else(|| find_upward(&cwd, |dir| dir.join(".git").is_dir()))
        .unwrap_or(cwd)
}

fn find_upward(start: &Path, matches: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start.ancestors().find(|d| matches(d)).map(Path::to_path_buf)
}
