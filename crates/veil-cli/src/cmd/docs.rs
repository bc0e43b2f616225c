use crate::output::print_json;
use anyhow::Context as _;
use serde_json::json;
use std::path::Path;
use veil_core::docs::{rewrite_docs, FileAction};
use veil_core::paths;

use super::Context;

/// `veil harden-docs`: rename `updater.md` and rewrite Updater wording.
pub fn run(ctx: &Context, docs_dir: Option<&Path>, dry_run: bool) -> anyhow::Result<()> {
    let docs_root = docs_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths::docs_dir(ctx.root()));

    ctx.log.section("Docs Rewrite");
    let report = rewrite_docs(&docs_root, dry_run).context("docs rewrite failed")?;
    ctx.log.info(
        "Docs rewrite complete",
        json!({
            "docs_root": docs_root.display().to_string(),
            "dry_run": dry_run,
            "rewritten": report.rewritten(),
        }),
    );

    if ctx.json {
        return print_json(&report);
    }

    let verb = if dry_run { "would rewrite" } else { "rewrote" };
    if let Some(renamed) = &report.renamed {
        println!("[RENAME] updater.md -> {}", renamed.display());
    }
    for warning in &report.warnings {
        println!("[WARN] {warning}");
    }
    for file in report.files.iter().filter(|f| f.action == FileAction::Rewritten) {
        let backup = if file.backed_up { " (backup written)" } else { "" };
        println!("[WRITE] {}{backup}", file.path.display());
    }
    println!("\nDocs refactor {verb} {} file(s).", report.rewritten());
    Ok(())
}
