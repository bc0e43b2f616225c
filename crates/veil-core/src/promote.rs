use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::channel::{resolve_artifact_tag, Channel};
use crate::error::{Result, VeilError};
use crate::event_log::EventLog;
use crate::tools::ExternalTools;
use crate::update::artifact_reference;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionResult {
    pub version: String,
    pub channel: Channel,
    pub source_reference: String,
    pub target_reference: String,
    pub promoted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Re-publishes a versioned updater image under a channel's rolling tag.
pub struct Promoter<'a> {
    tools: &'a dyn ExternalTools,
    log: &'a EventLog,
}

impl<'a> Promoter<'a> {
    pub fn new(tools: &'a dyn ExternalTools, log: &'a EventLog) -> Self {
        Self { tools, log }
    }

    /// Pull `version`, tag it as `target_channel`, push the channel tag.
    ///
    /// Stops at the first failing step. Completed steps are not undone, so a
    /// failed push leaves the local re-tag in place.
    pub fn promote(&self, version: &str, target_channel: &str) -> Result<PromotionResult> {
        self.log.section("Release Promotion");

        let channel = Channel::validate(target_channel).inspect_err(|e| {
            self.log.error(
                "Invalid channel",
                json!({ "operation": "promote", "channel": target_channel, "error": e.to_string() }),
            );
        })?;
        let version = validate_version(version).inspect_err(|e| {
            self.log.error(
                "Invalid version",
                json!({ "operation": "promote", "version": version, "error": e.to_string() }),
            );
        })?;

        let mut result = PromotionResult {
            source_reference: artifact_reference(&version),
            target_reference: artifact_reference(resolve_artifact_tag(channel)),
            version,
            channel,
            promoted: false,
            error: None,
        };

        match self.run_steps(&result.source_reference, &result.target_reference) {
            Ok(()) => {
                result.promoted = true;
                self.log.info("Promotion complete", &result);
            }
            Err(e) => {
                let msg = e.to_string();
                tracing::error!(error = %msg, version = %result.version, "promotion failed");
                result.error = Some(msg);
                self.log.error("Promotion failed", &result);
            }
        }
        Ok(result)
    }

    fn run_steps(&self, source: &str, target: &str) -> Result<()> {
        self.log.info("Pulling source image", json!({ "step": "pull", "image": source }));
        self.tools.pull(source)?;

        self.log.info(
            "Tagging image",
            json!({ "step": "tag", "source": source, "target": target }),
        );
        self.tools.tag(source, target)?;

        self.log.info("Pushing channel tag", json!({ "step": "push", "image": target }));
        self.tools.push(target)
    }
}

fn validate_version(raw: &str) -> Result<String> {
    let version = raw.trim();
    if version.is_empty() || version.contains(':') || version.chars().any(char::is_whitespace) {
        return Err(VeilError::InvalidVersion(raw.to_string()));
    }
    Ok(version.to_string())
}
