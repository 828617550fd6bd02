/*!

Agent configuration read from the environment.

!*/

use crate::constants::{
    DEFAULT_STACK_PARAMETER_KEY, ENV_IMAGE_PIPELINE_ARN, ENV_REGION, ENV_SNS_TOPIC_ARN,
    ENV_STACK_NAME, ENV_STACK_PARAMETER_KEY, ENV_STATE_MACHINE_ARN, ENV_TAGS,
};
use crate::discovery::DiscoveryConfig;
use crate::error::{self, Result};
use crate::freshness::FreshnessConfig;
use crate::notification::ForwarderConfig;
use ami_refresh_types::Tag;
use snafu::ResultExt;
use std::env;

fn required(key: &str) -> Result<String> {
    env::var(key).context(error::EnvReadSnafu { key })
}

fn stack_parameter_key() -> String {
    env::var(ENV_STACK_PARAMETER_KEY).unwrap_or_else(|_| DEFAULT_STACK_PARAMETER_KEY.to_string())
}

/// The region to create clients in, `None` to use the SDK's region provider chain.
pub fn region_from_env() -> Option<String> {
    env::var(ENV_REGION).ok().filter(|region| !region.is_empty())
}

/// Parses the required cluster tags, a JSON list of `{"Key": ..., "Value": ...}` objects.
/// `null` means no tags.
pub fn parse_tags(tags_json: &str) -> Result<Vec<Tag>> {
    if tags_json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let tags: Option<Vec<Tag>> =
        serde_json::from_str(tags_json).context(error::DeserializeSnafu {
            what: format!("'{}'", ENV_TAGS),
        })?;
    Ok(tags.unwrap_or_default())
}

impl FreshnessConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            stack_name: required(ENV_STACK_NAME)?,
            stack_parameter_key: stack_parameter_key(),
            pipeline_arn: required(ENV_IMAGE_PIPELINE_ARN)?,
            topic_arn: required(ENV_SNS_TOPIC_ARN)?,
        })
    }
}

impl DiscoveryConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            stack_name: required(ENV_STACK_NAME)?,
            stack_parameter_key: stack_parameter_key(),
        })
    }
}

impl ForwarderConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            state_machine_arn: required(ENV_STATE_MACHINE_ARN)?,
            tags: parse_tags(&env::var(ENV_TAGS).unwrap_or_default())?,
        })
    }
}
