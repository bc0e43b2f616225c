use crate::output::{print_json, print_table};
use veil_core::repair::run_repair;

use super::Context;

pub fn run(ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.config()?;
    let report = run_repair(ctx.root(), &config, &ctx.log);

    if ctx.json {
        return print_json(&report);
    }

    println!("{}\n", ctx.banner("repair"));
    let rows = report
        .steps
        .iter()
        .map(|s| {
            let path = s
                .details
                .get("path")
                .and_then(|p| p.as_str())
                .unwrap_or("-")
                .to_string();
            let note = s
                .details
                .get("error")
                .and_then(|e| e.as_str())
                .map(str::to_string)
                .unwrap_or_default();
            vec![
                s.name.clone(),
                if s.ok { "ok" } else { "warn" }.to_string(),
                path,
                note,
            ]
        })
        .collect();
    print_table(&["step", "status", "path", "note"], rows);
    println!("\nOverall OK: {}", report.overall_ok);
    Ok(())
}
