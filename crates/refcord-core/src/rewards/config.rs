//! Reward configuration parsing
//!
//! Format: `{ "GUILD_ID": { "THRESHOLD": ROLE_ID, ... }, ... }`. Role ids may be
//! JSON numbers or numeric strings. A bad entry drops its whole guild; the
//! remaining guilds are still loaded.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::policy::{RewardPolicy, RewardTiers};
use crate::value_objects::Snowflake;

/// Reward configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewardConfigError {
    #[error("reward config could not be read: {0}")]
    Unreadable(String),

    #[error("reward config is not a JSON object keyed by guild id: {0}")]
    Malformed(String),

    #[error("invalid guild id {0:?}")]
    InvalidGuild(String),

    #[error("guild {guild_id}: tiers must be an object of threshold -> role id")]
    InvalidMapping { guild_id: Snowflake },

    #[error("guild {guild_id}: invalid threshold {threshold:?}")]
    InvalidThreshold { guild_id: Snowflake, threshold: String },

    #[error("guild {guild_id}: invalid role id for threshold {threshold}")]
    InvalidRole { guild_id: Snowflake, threshold: u64 },
}

/// Result of parsing a reward configuration document
#[derive(Debug, Clone, Default)]
pub struct RewardConfigReport {
    pub guilds: HashMap<Snowflake, RewardTiers>,
    /// Per-guild diagnostics for the guilds that were dropped
    pub rejected: Vec<RewardConfigError>,
}

impl RewardConfigReport {
    /// Turn the accepted guilds into a policy snapshot
    pub fn into_policy(self, version: u64) -> RewardPolicy {
        RewardPolicy::new(version, self.guilds)
    }
}

/// Parse a reward configuration document
///
/// Blank input is an empty configuration. Only a document that is not a JSON
/// object at the top level fails as a whole.
pub fn parse_reward_config(raw: &str) -> Result<RewardConfigReport, RewardConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(RewardConfigReport::default());
    }

    let value: Value =
        serde_json::from_str(raw).map_err(|e| RewardConfigError::Malformed(e.to_string()))?;
    let Value::Object(document) = value else {
        return Err(RewardConfigError::Malformed(format!(
            "expected object, found {}",
            json_kind(&value)
        )));
    };

    let mut report = RewardConfigReport::default();
    for (key, mapping) in &document {
        match parse_guild(key, mapping) {
            Ok((guild_id, tiers)) => {
                report.guilds.insert(guild_id, tiers);
            }
            Err(e) => report.rejected.push(e),
        }
    }

    Ok(report)
}

fn parse_guild(key: &str, mapping: &Value) -> Result<(Snowflake, RewardTiers), RewardConfigError> {
    let guild_id =
        Snowflake::parse(key).map_err(|_| RewardConfigError::InvalidGuild(key.to_string()))?;

    let entries: &Map<String, Value> = mapping
        .as_object()
        .ok_or(RewardConfigError::InvalidMapping { guild_id })?;

    let mut tiers = RewardTiers::new();
    for (threshold, role) in entries {
        let threshold_value = threshold.trim().parse::<u64>().map_err(|_| {
            RewardConfigError::InvalidThreshold {
                guild_id,
                threshold: threshold.clone(),
            }
        })?;

        let role_id = parse_role(role).ok_or(RewardConfigError::InvalidRole {
            guild_id,
            threshold: threshold_value,
        })?;

        tiers.insert(threshold_value, role_id);
    }

    Ok((guild_id, tiers))
}

fn parse_role(value: &Value) -> Option<Snowflake> {
    match value {
        Value::Number(n) => n.as_i64().filter(|id| *id > 0).map(Snowflake::new),
        Value::String(s) => Snowflake::parse(s).ok().filter(|id| !id.is_zero()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
