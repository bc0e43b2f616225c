use crate::output::print_json;
use anyhow::Context as _;
use serde_json::json;
use veil_core::config::ConfigLoad;

use super::Context;

// ---------------------------------------------------------------------------
// set-channel
// ---------------------------------------------------------------------------

pub fn set(ctx: &Context, channel: &str) -> anyhow::Result<()> {
    let config = ctx.config()?;
    let record = config
        .set_default_channel(channel)
        .with_context(|| format!("failed to set default channel to '{channel}'"))?;
    ctx.log.info(
        "Default channel set",
        json!({ "channel": record.channel, "path": config.path().display().to_string() }),
    );

    if ctx.json {
        return print_json(&record);
    }
    println!("Default channel set to: {}", record.channel);
    Ok(())
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

pub fn status(ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.config()?;
    let outcome = config.load_outcome();
    let source = match &outcome {
        ConfigLoad::Loaded(_) => "config file",
        ConfigLoad::Missing(_) => "default (no config file)",
        ConfigLoad::Defaulted { .. } => "default (config file unreadable)",
    };
    let default_channel = outcome.record().channel;

    if ctx.json {
        return print_json(&json!({
            "default_channel": default_channel,
            "config_path": config.path(),
            "source": source,
        }));
    }

    println!("Default Channel: {default_channel}");
    println!("Config:          {} ({source})", config.path().display());
    if let ConfigLoad::Defaulted { reason, .. } = &outcome {
        println!("Warning:         {reason}");
    }
    Ok(())
}
