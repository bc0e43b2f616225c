use crate::output::{print_json, print_result};
use veil_core::promote::Promoter;
use veil_core::tools::SystemTools;

use super::Context;

pub fn run(ctx: &Context, version: &str, to: &str) -> anyhow::Result<()> {
    let tools = SystemTools::new();
    let result = Promoter::new(&tools, &ctx.log).promote(version, to)?;

    if ctx.json {
        return print_json(&result);
    }

    let title = if result.promoted {
        format!("Promoted {} → {}", result.version, result.channel)
    } else {
        format!("Promotion Failed ({} → {})", result.version, result.channel)
    };
    print_result(&title, &result)
}
