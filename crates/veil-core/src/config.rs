use crate::channel::Channel;
use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigRecord
// ---------------------------------------------------------------------------

/// The persisted per-user config. Unknown keys are carried in `extra` so they
/// survive a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigRecord {
    pub channel: Channel,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ConfigRecord {
    fn default() -> Self {
        Self {
            channel: Channel::Stable,
            extra: Map::new(),
        }
    }
}

/// On-disk shape before validation. The channel is read as free text so a
/// stale or hand-edited value can be normalized or rejected explicitly.
#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    channel: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl ConfigRecord {
    fn from_json(data: &str) -> std::result::Result<Self, String> {
        let raw: RawRecord = serde_json::from_str(data).map_err(|e| e.to_string())?;
        let channel = match raw.channel {
            Some(c) => Channel::validate(&c).map_err(|e| e.to_string())?,
            None => Channel::default(),
        };
        Ok(Self {
            channel,
            extra: raw.extra,
        })
    }
}

// ---------------------------------------------------------------------------
// ConfigLoad
// ---------------------------------------------------------------------------

/// How a record was obtained. `load()` collapses this to the record; callers
/// that care whether the file was trusted inspect the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigLoad {
    /// The file existed and held a valid record.
    Loaded(ConfigRecord),
    /// No file on disk; defaults apply and nothing was written.
    Missing(ConfigRecord),
    /// The file was unreadable, unparseable, or held an invalid channel.
    Defaulted { record: ConfigRecord, reason: String },
}

impl ConfigLoad {
    pub fn record(&self) -> &ConfigRecord {
        match self {
            ConfigLoad::Loaded(r) | ConfigLoad::Missing(r) => r,
            ConfigLoad::Defaulted { record, .. } => record,
        }
    }

    pub fn into_record(self) -> ConfigRecord {
        match self {
            ConfigLoad::Loaded(r) | ConfigLoad::Missing(r) => r,
            ConfigLoad::Defaulted { record, .. } => record,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, ConfigLoad::Defaulted { .. })
    }
}

// ---------------------------------------------------------------------------
// ConfigStore
// ---------------------------------------------------------------------------

/// Sole owner of the config file. Writers are not coordinated: the last
/// `save` wins.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `~/.veil`.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(paths::default_config_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        paths::config_path(&self.dir)
    }

    pub fn load_outcome(&self) -> ConfigLoad {
        let path = self.path();
        if !path.exists() {
            return ConfigLoad::Missing(ConfigRecord::default());
        }

        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|data| ConfigRecord::from_json(&data));

        match parsed {
            Ok(record) => ConfigLoad::Loaded(record),
            Err(reason) => {
                tracing::warn!(path = %path.display(), %reason, "config unusable, using defaults");
                ConfigLoad::Defaulted {
                    record: ConfigRecord::default(),
                    reason,
                }
            }
        }
    }

    /// Never fails: a missing or corrupt file yields the default record.
    pub fn load(&self) -> ConfigRecord {
        self.load_outcome().into_record()
    }

    /// Overwrite the whole file with `record`, creating the directory if needed.
    pub fn save(&self, record: &ConfigRecord) -> Result<()> {
        let mut data = serde_json::to_string_pretty(record)?;
        data.push('\n');
        crate::io::atomic_write(&self.path(), data.as_bytes())
    }

    pub fn get_default_channel(&self) -> Channel {
        self.load().channel
    }

    pub fn set_default_channel(&self, raw: &str) -> Result<ConfigRecord> {
        let channel = Channel::validate(raw)?;
        let mut record = self.load();
        record.channel = channel;
        self.save(&record)?;
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
