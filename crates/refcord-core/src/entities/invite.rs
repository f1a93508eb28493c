//! Invite entities - tracked (ledger-owned) and live (platform-observed) invites

use crate::value_objects::Snowflake;

/// Base URL for shareable invite links
pub const INVITE_BASE_URL: &str = "https://discord.gg";

/// Build the shareable link for an invite code
pub fn invite_url(code: &str) -> String {
    format!("{INVITE_BASE_URL}/{code}")
}

/// An invite registered with an owner, as persisted in the referral ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedInvite {
    pub code: String,
    pub guild_id: Snowflake,
    pub owner_id: Snowflake,
    pub uses: i64,
}

impl TrackedInvite {
    /// Create a freshly registered invite with zero uses
    pub fn new(code: impl Into<String>, guild_id: Snowflake, owner_id: Snowflake) -> Self {
        Self {
            code: code.into(),
            guild_id,
            owner_id,
            uses: 0,
        }
    }

    /// Get the full invite URL
    pub fn url(&self) -> String {
        invite_url(&self.code)
    }
}

/// An invite as currently reported by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveInvite {
    pub code: String,
    pub guild_id: Option<Snowflake>,
    pub channel_id: Option<Snowflake>,
    pub inviter_id: Option<Snowflake>,
    pub uses: i64,
    /// 0 means unlimited
    pub max_uses: u32,
    /// Seconds; 0 means never expires
    pub max_age: u32,
}

impl LiveInvite {
    /// Create a live invite with only a code and a use count
    pub fn new(code: impl Into<String>, uses: i64) -> Self {
        Self {
            code: code.into(),
            guild_id: None,
            channel_id: None,
            inviter_id: None,
            uses,
            max_uses: 0,
            max_age: 0,
        }
    }

    /// Set the owning guild
    pub fn in_guild(mut self, guild_id: Snowflake) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    /// Set the channel and creator
    pub fn created_by(mut self, channel_id: Snowflake, inviter_id: Snowflake) -> Self {
        self.channel_id = Some(channel_id);
        self.inviter_id = Some(inviter_id);
        self
    }

    /// Get the full invite URL
    pub fn url(&self) -> String {
        invite_url(&self.code)
    }
}

/// Options for creating an invite on the platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InviteOptions {
    /// 0 means unlimited
    pub max_uses: u32,
    /// Seconds; 0 means never expires
    pub max_age_secs: u32,
    /// Always mint a new code instead of reusing a matching one
    pub unique: bool,
    /// Audit log reason shown to moderators
    pub reason: Option<String>,
}

impl InviteOptions {
    /// Build options from command-style limits (minutes for age)
    pub fn from_limits(max_uses: u32, max_age_minutes: u32) -> Self {
        Self {
            max_uses,
            max_age_secs: max_age_minutes.saturating_mul(60),
            unique: true,
            reason: None,
        }
    }

    /// Attach an audit log reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Check if the invite is unlimited in uses
    pub fn is_unlimited(&self) -> bool {
        self.max_uses == 0
    }

    /// Check if the invite never expires
    pub fn is_permanent(&self) -> bool {
        self.max_age_secs == 0
    }
}
