//! Channel-based self-update orchestration.
//!
//! ```text
//! Idle → ChannelResolved → VersionChecked ─┬─ (dry run) ─────────────────→ done
//!                                          └─ Applying → Applied | Failed
//! ```
//!
//! Only an invalid explicit channel is returned as an error. Failures of the
//! external mechanism are captured into [`UpdateResult::error`] and logged.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

use crate::channel::{resolve_artifact_tag, Channel};
use crate::config::{ConfigLoad, ConfigStore};
use crate::error::Result;
use crate::event_log::EventLog;
use crate::identity;
use crate::tools::ExternalTools;
use crate::version::{VersionResolver, VersionStatus};

/// Container image that carries the updater for every channel.
pub const ARTIFACT_BASE: &str = "notchofhwend/updater";

/// Package name on the index, used for version checks and package upgrades.
pub const PACKAGE_NAME: &str = "trident-cli";

/// `ARTIFACT_BASE:tag`
pub fn artifact_reference(tag: &str) -> String {
    format!("{ARTIFACT_BASE}:{tag}")
}

// ---------------------------------------------------------------------------
// Mechanism / state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMechanism {
    /// Pull the channel's updater image and run it.
    #[default]
    Container,
    /// Upgrade the package through the package manager.
    Package,
}

impl UpdateMechanism {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateMechanism::Container => "container",
            UpdateMechanism::Package => "package",
        }
    }
}

impl fmt::Display for UpdateMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateState {
    Idle,
    ChannelResolved,
    VersionChecked,
    Applying,
    Applied,
    Failed,
}

impl UpdateState {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateState::Idle => "idle",
            UpdateState::ChannelResolved => "channel_resolved",
            UpdateState::VersionChecked => "version_checked",
            UpdateState::Applying => "applying",
            UpdateState::Applied => "applied",
            UpdateState::Failed => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// UpdateResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub timestamp: String,
    pub channel: Channel,
    pub artifact_reference: String,
    pub mechanism: UpdateMechanism,
    pub current_version: String,
    pub latest_version: String,
    pub version_status: VersionStatus,
    pub update_available: bool,
    pub applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator<'a> {
    config: &'a ConfigStore,
    versions: &'a VersionResolver,
    tools: &'a dyn ExternalTools,
    log: &'a EventLog,
    mechanism: UpdateMechanism,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a ConfigStore,
        versions: &'a VersionResolver,
        tools: &'a dyn ExternalTools,
        log: &'a EventLog,
    ) -> Self {
        Self {
            config,
            versions,
            tools,
            log,
            mechanism: UpdateMechanism::default(),
        }
    }

    pub fn with_mechanism(mut self, mechanism: UpdateMechanism) -> Self {
        self.mechanism = mechanism;
        self
    }

    /// Check for (and with `apply`, install) an update on `channel`, or on the
    /// configured default channel when `channel` is `None`.
    pub fn run(&self, apply: bool, channel: Option<&str>) -> Result<UpdateResult> {
        self.log.section("Self-Update Check");
        self.transition(UpdateState::Idle, json!({ "apply": apply, "mechanism": self.mechanism }));

        let channel = match channel {
            Some(raw) => Channel::validate(raw).inspect_err(|e| {
                self.log.error(
                    "Invalid channel",
                    json!({ "operation": "update", "channel": raw, "error": e.to_string() }),
                );
            })?,
            None => self.configured_channel(),
        };
        let artifact_reference = artifact_reference(resolve_artifact_tag(channel));
        self.transition(
            UpdateState::ChannelResolved,
            json!({ "channel": channel, "artifact_reference": artifact_reference }),
        );

        let current = self.versions.current_version();
        let latest = self.versions.latest_version(PACKAGE_NAME);
        let version_status = VersionStatus::compare(&current, &latest);
        let update_available = version_status == VersionStatus::UpdateAvailable;
        if version_status == VersionStatus::CheckFailed {
            self.log.warn(
                "Latest version unavailable",
                json!({
                    "operation": "version_check",
                    "package": PACKAGE_NAME,
                    "reason": latest.failure_reason().unwrap_or(latest.as_str()),
                }),
            );
        }
        self.transition(
            UpdateState::VersionChecked,
            json!({
                "current_version": current,
                "latest_version": latest.as_str(),
                "version_status": version_status,
            }),
        );

        let mut result = UpdateResult {
            timestamp: identity::timestamp(),
            channel,
            artifact_reference,
            mechanism: self.mechanism,
            current_version: current,
            latest_version: latest.to_string(),
            version_status,
            update_available,
            applied: false,
            error: None,
        };

        if !apply {
            return Ok(result);
        }

        if self.mechanism == UpdateMechanism::Package && !update_available {
            self.log.info(
                "Package upgrade skipped",
                json!({ "package": PACKAGE_NAME, "version_status": version_status }),
            );
            return Ok(result);
        }

        self.transition(UpdateState::Applying, json!({ "artifact_reference": result.artifact_reference }));
        match self.apply(&result.artifact_reference) {
            Ok(()) => {
                result.applied = true;
                self.transition(UpdateState::Applied, &result);
                self.log.info("Self-update applied", &result);
            }
            Err(e) => {
                let msg = e.to_string();
                tracing::error!(error = %msg, "self-update failed");
                self.log.error(
                    "Self-update failed",
                    json!({ "artifact_reference": result.artifact_reference, "error": msg }),
                );
                result.error = Some(msg);
                self.transition(UpdateState::Failed, &result);
            }
        }
        Ok(result)
    }

    fn configured_channel(&self) -> Channel {
        let outcome = self.config.load_outcome();
        if let ConfigLoad::Defaulted { reason, .. } = &outcome {
            self.log.warn(
                "Config unusable, using default channel",
                json!({
                    "operation": "config_load",
                    "path": self.config.path().display().to_string(),
                    "reason": reason,
                    "channel": outcome.record().channel,
                }),
            );
        }
        outcome.record().channel
    }

    fn apply(&self, reference: &str) -> Result<()> {
        match self.mechanism {
            UpdateMechanism::Container => {
                self.log.info("Pulling updater image", json!({ "image": reference }));
                self.tools.pull(reference)?;
                self.log.info("Running updater container", json!({ "image": reference }));
                self.tools.run(reference)
            }
            UpdateMechanism::Package => {
                self.log.info("Upgrading package", json!({ "package": PACKAGE_NAME }));
                self.tools.install_or_upgrade(PACKAGE_NAME)
            }
        }
    }

    fn transition<C: Serialize>(&self, state: UpdateState, context: C) {
        tracing::debug!(state = state.as_str(), "update state");
        let mut record = serde_json::to_value(context).unwrap_or_default();
        if let Some(obj) = record.as_object_mut() {
            obj.insert("state".into(), json!(state));
        }
        self.log.info("update state", record);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
