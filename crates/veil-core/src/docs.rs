//! One-off documentation rewrite: "Updater" → "Hardener".
//!
//! Renames `updater.md` to `hardener.md`, then rewrites every text file
//! under the docs root with an ordered list of literal replacements. A
//! `.bak` copy is written the first time a file is modified and never
//! refreshed afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, VeilError};
use crate::io;

/// Applied in order; longer phrases come before the words they contain.
pub const REPLACEMENTS: &[(&str, &str)] = &[
    ("Veil Updater", "Veil Sentinel Hardener"),
    ("Updater Module", "Hardener Module"),
    ("updater module", "hardener module"),
    ("Updater", "Hardener"),
    ("updater", "hardener"),
    ("run the updater", "run the hardener"),
    ("Run the updater", "Run the hardener"),
    ("update pass", "hardening pass"),
    ("update pipeline", "hardening pipeline"),
    ("Update pipeline", "Hardening pipeline"),
    ("update run", "hardener run"),
    ("update", "harden"),
    ("Update", "Harden"),
];

const SKIP_SUFFIXES: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "svg", "ttf", "woff", "woff2", "pdf", "bak",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    Rewritten,
    Unchanged,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub action: FileAction,
    #[serde(default)]
    pub backed_up: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsRewriteReport {
    pub docs_root: PathBuf,
    pub dry_run: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub files: Vec<FileOutcome>,
}

impl DocsRewriteReport {
    pub fn rewritten(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.action == FileAction::Rewritten)
            .count()
    }
}

pub fn rewrite_content(text: &str) -> String {
    REPLACEMENTS
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

pub fn rewrite_docs(docs_root: &Path, dry_run: bool) -> Result<DocsRewriteReport> {
    if !docs_root.is_dir() {
        return Err(VeilError::DocsNotFound(docs_root.display().to_string()));
    }

    let mut report = DocsRewriteReport {
        docs_root: docs_root.to_path_buf(),
        dry_run,
        renamed: None,
        warnings: Vec::new(),
        files: Vec::new(),
    };

    let old = docs_root.join("updater.md");
    let new = docs_root.join("hardener.md");
    if old.is_file() {
        if new.exists() {
            let msg = format!("{} already exists; not renaming {}", new.display(), old.display());
            tracing::warn!("{msg}");
            report.warnings.push(msg);
        } else {
            if !dry_run {
                std::fs::rename(&old, &new)?;
            }
            report.renamed = Some(new);
        }
    }

    let mut files = Vec::new();
    collect_files(docs_root, &mut files)?;
    files.sort();

    for path in files {
        report.files.push(process_file(&path, dry_run)?);
    }
    Ok(report)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else if path.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn has_skipped_suffix(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SKIP_SUFFIXES.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn process_file(path: &Path, dry_run: bool) -> Result<FileOutcome> {
    let skipped = FileOutcome {
        path: path.to_path_buf(),
        action: FileAction::Skipped,
        backed_up: false,
    };
    if has_skipped_suffix(path) {
        return Ok(skipped);
    }
    let Ok(original) = String::from_utf8(std::fs::read(path)?) else {
        return Ok(skipped);
    };

    let transformed = rewrite_content(&original);
    if transformed == original {
        return Ok(FileOutcome {
            action: FileAction::Unchanged,
            ..skipped
        });
    }

    let mut backed_up = false;
    if !dry_run {
        backed_up = io::backup_once(path)?;
        std::fs::write(path, transformed.as_bytes())?;
        tracing::debug!(path = %path.display(), "rewrote doc");
    }
    Ok(FileOutcome {
        path: path.to_path_buf(),
        action: FileAction::Rewritten,
        backed_up,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rewrite_content_prefers_longer_phrases() {
        assert_eq!(
            rewrite_content("The Veil Updater runs an update pass."),
            "The Veil Sentinel Hardener runs an hardening pass."
        );
        assert_eq!(rewrite_content("Update the updater"), "Harden the hardener");
    }

    #[test]
    fn rewrite_is_idempotent() {
        let once = rewrite_content("Run the updater: update pipeline, Update Module");
        assert_eq!(rewrite_content(&once), once);
    }

    #[test]
    fn rewrites_files_with_single_backup() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir_all(docs.join("guides")).unwrap();
        std::fs::write(docs.join("guides/usage.md"), "Run the updater daily.").unwrap();
        std::fs::write(docs.join("index.md"), "Nothing to see.").unwrap();

        let report = rewrite_docs(&docs, false).unwrap();
        assert_eq!(report.rewritten(), 1);
        assert_eq!(
            std::fs::read_to_string(docs.join("guides/usage.md")).unwrap(),
            "Run the hardener daily."
        );
        assert_eq!(
            std::fs::read_to_string(docs.join("guides/usage.md.bak")).unwrap(),
            "Run the updater daily."
        );

        // Second pass: nothing left to rewrite, backup untouched.
        let again = rewrite_docs(&docs, false).unwrap();
        assert_eq!(again.rewritten(), 0);
        assert_eq!(
            std::fs::read_to_string(docs.join("guides/usage.md.bak")).unwrap(),
            "Run the updater daily."
        );
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("updater.md"), "Updater Module").unwrap();

        let report = rewrite_docs(&docs, true).unwrap();
        assert_eq!(report.renamed, Some(docs.join("hardener.md")));
        assert_eq!(report.rewritten(), 1);
        assert!(docs.join("updater.md").exists());
        assert!(!docs.join("hardener.md").exists());
        assert!(!docs.join("updater.md.bak").exists());
    }

    #[test]
    fn rename_is_skipped_when_target_exists() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("updater.md"), "old").unwrap();
        std::fs::write(docs.join("hardener.md"), "new").unwrap();

        let report = rewrite_docs(&docs, false).unwrap();
        assert!(report.renamed.is_none());
        assert_eq!(report.warnings.len(), 1);
        assert!(docs.join("updater.md").exists());
    }

    #[test]
    fn binary_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("logo.PNG"), "update").unwrap();
        std::fs::write(docs.join("blob.dat"), [0xff, 0xfe, 0x00, 0x75]).unwrap();

        let report = rewrite_docs(&docs, false).unwrap();
        assert!(report.files.iter().all(|f| f.action == FileAction::Skipped));
        assert_eq!(std::fs::read_to_string(docs.join("logo.PNG")).unwrap(), "update");
    }

    #[test]
    fn missing_docs_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = rewrite_docs(&dir.path().join("docs"), false).unwrap_err();
        assert!(matches!(err, VeilError::DocsNotFound(_)));
    }
}
