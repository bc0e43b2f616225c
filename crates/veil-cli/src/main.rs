mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::Context;
use std::path::PathBuf;
use veil_core::update::UpdateMechanism;

#[derive(Parser)]
#[command(
    name = "veil",
    about = "The Veil — diagnostics, repair, and channel-based self-update",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from Cargo.toml, pyproject.toml, or .git/)
    #[arg(long, global = true, env = "VEIL_ROOT")]
    root: Option<PathBuf>,

    /// Directory holding config.json (default: ~/.veil)
    #[arg(long, global = true, env = "VEIL_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Package index queried for the latest version
    #[arg(
        long,
        global = true,
        env = "VEIL_INDEX_URL",
        default_value = veil_core::version::DEFAULT_INDEX_URL
    )]
    index_url: String,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check for updates without applying them
    Update {
        /// Update channel: stable, edge, dev (default: configured channel)
        #[arg(long)]
        channel: Option<String>,

        /// How the update is delivered
        #[arg(long, value_enum, default_value_t = Via::Container)]
        via: Via,
    },

    /// Apply an update from the selected channel
    UpdateApply {
        /// Update channel: stable, edge, dev (default: configured channel)
        #[arg(long)]
        channel: Option<String>,

        /// How the update is delivered
        #[arg(long, value_enum, default_value_t = Via::Container)]
        via: Via,
    },

    /// Promote a versioned updater image to a rolling channel
    Promote {
        /// Version to promote, e.g. 1.1.3
        #[arg(value_name = "VERSION")]
        release: String,

        /// Channel to promote to: stable, edge, dev
        #[arg(long, default_value = "stable")]
        to: String,
    },

    /// Set the default update channel for this machine
    SetChannel {
        /// Channel to set as default: stable, edge, dev
        channel: String,
    },

    /// Show the default channel and config location
    Status,

    /// Run environment checks and report their health
    Diagnostics,

    /// Recreate missing directories and check permissions
    Repair,

    /// Rewrite "Updater" wording in the docs tree to "Hardener"
    HardenDocs {
        /// Docs directory (default: <root>/docs)
        #[arg(long)]
        docs_dir: Option<PathBuf>,

        /// Report changes without writing anything
        #[arg(long)]
        dry_run: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Update { .. } => "update",
            Commands::UpdateApply { .. } => "update-apply",
            Commands::Promote { .. } => "promote",
            Commands::SetChannel { .. } => "set-channel",
            Commands::Status => "status",
            Commands::Diagnostics => "diagnostics",
            Commands::Repair => "repair",
            Commands::HardenDocs { .. } => "harden-docs",
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Via {
    Container,
    Package,
}

impl From<Via> for UpdateMechanism {
    fn from(via: Via) -> Self {
        match via {
            Via::Container => UpdateMechanism::Container,
            Via::Package => UpdateMechanism::Package,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let ctx = Context::new(root, cli.config_dir, cli.index_url, cli.json, cli.command.name());
    let result = dispatch(&ctx, cli.command);

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn dispatch(ctx: &Context, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Update { channel, via } => {
            cmd::update::run(ctx, false, channel.as_deref(), via.into())
        }
        Commands::UpdateApply { channel, via } => {
            cmd::update::run(ctx, true, channel.as_deref(), via.into())
        }
        Commands::Promote { release, to } => cmd::promote::run(ctx, &release, &to),
        Commands::SetChannel { channel } => cmd::channel::set(ctx, &channel),
        Commands::Status => cmd::channel::status(ctx),
        Commands::Diagnostics => cmd::diagnostics::run(ctx),
        Commands::Repair => cmd::repair::run(ctx),
        Commands::HardenDocs { docs_dir, dry_run } => {
            cmd::docs::run(ctx, docs_dir.as_deref(), dry_run)
        }
    }
}
