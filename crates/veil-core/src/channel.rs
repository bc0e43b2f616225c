use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, VeilError};

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// A release track. Values of this type have always passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    #[default]
    Stable,
    Edge,
    Dev,
}

impl Channel {
    pub fn all() -> &'static [Channel] {
        &[Channel::Stable, Channel::Edge, Channel::Dev]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Stable => "stable",
            Channel::Edge => "edge",
            Channel::Dev => "dev",
        }
    }

    /// Trim and lower-case `raw`, then match it against the known channels.
    pub fn validate(raw: &str) -> Result<Channel> {
        let normalized = raw.trim().to_lowercase();
        Channel::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or(VeilError::InvalidChannel(normalized))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = VeilError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Channel::validate(s)
    }
}

/// Tag segment used in artifact references for `channel`.
pub fn resolve_artifact_tag(channel: Channel) -> &'static str {
    channel.as_str()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
