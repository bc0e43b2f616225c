use crate::output::{print_json, print_result};
use anyhow::Context as _;
use veil_core::tools::SystemTools;
use veil_core::update::{Orchestrator, UpdateMechanism};
use veil_core::version::{HttpIndex, VersionResolver};

use super::Context;

/// `veil update` / `veil update-apply`.
///
/// An invalid `--channel` is an error. A failed apply is not: it is reported
/// in the result and the command still exits successfully.
pub fn run(
    ctx: &Context,
    apply: bool,
    channel: Option<&str>,
    mechanism: UpdateMechanism,
) -> anyhow::Result<()> {
    let index = HttpIndex::new(ctx.index_url.as_str()).context("failed to build index client")?;
    let versions = VersionResolver::new(ctx.root(), Box::new(index));
    let tools = SystemTools::new();
    let config = ctx.config()?;

    let result = Orchestrator::new(&config, &versions, &tools, &ctx.log)
        .with_mechanism(mechanism)
        .run(apply, channel)?;

    if ctx.json {
        return print_json(&result);
    }

    let mode = if apply { "update-apply" } else { "update (dry run)" };
    println!("{}\n", ctx.banner(mode));

    let title = match (apply, result.applied) {
        (false, _) => format!("Update Check (channel: {})", result.channel),
        (true, true) => format!("Update Applied (channel: {})", result.channel),
        (true, false) if result.error.is_none() => {
            format!("Update Skipped (channel: {}, nothing to apply)", result.channel)
        }
        (true, false) => format!("Update Failed (channel: {})", result.channel),
    };
    print_result(&title, &result)
}
