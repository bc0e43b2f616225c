pub mod channel;
pub mod diagnostics;
pub mod docs;
pub mod promote;
pub mod repair;
pub mod update;

use anyhow::Context as _;
use serde_json::json;
use std::path::{Path, PathBuf};
use veil_core::config::ConfigStore;
use veil_core::event_log::EventLog;

/// Per-invocation handles shared by every command.
pub struct Context {
    pub root: PathBuf,
    pub log: EventLog,
    config_dir: Option<PathBuf>,
    pub index_url: String,
    pub json: bool,
}

impl Context {
    pub fn new(
        root: PathBuf,
        config_dir: Option<PathBuf>,
        index_url: String,
        json: bool,
        command: &str,
    ) -> Self {
        let log = EventLog::for_root(&root);
        log.info(
            "CLI invoked",
            json!({ "command": command, "json": json, "root": root.display().to_string() }),
        );
        Self {
            root,
            log,
            config_dir,
            index_url,
            json,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Config store for commands that read or write the default channel.
    /// The home directory is only consulted when no config dir was given.
    pub fn config(&self) -> anyhow::Result<ConfigStore> {
        match &self.config_dir {
            Some(dir) => Ok(ConfigStore::new(dir.clone())),
            None => ConfigStore::open_default().context("failed to locate config directory"),
        }
    }

    /// Banner shown above text-mode output.
    pub fn banner(&self, mode: &str) -> String {
        veil_core::identity::banner(
            &veil_core::version::current_version(&self.root),
            &self.root,
            Some(&format!("Mode: {mode}")),
        )
    }
}
