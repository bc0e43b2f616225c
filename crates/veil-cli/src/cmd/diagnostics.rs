use crate::output::print_json;
use veil_core::diagnostics::{render_report, run_diagnostics};

use super::Context;

pub fn run(ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.config();
    if let Err(e) = &config {
        tracing::warn!("diagnostics running without a config store: {e:#}");
    }
    let report = run_diagnostics(ctx.root(), config.as_ref().ok(), &ctx.log);

    if ctx.json {
        return print_json(&report);
    }
    println!("{}\n", ctx.banner("diagnostics"));
    println!("{}", render_report(&report));
    Ok(())
}
