//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use refcord_core::{format_leaderboard_line, InviteDivergence, Snowflake};
use serde::Serialize;

use crate::services::{RewardOutcome, RewardReload};

// ============================================================================
// Health
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn pong() -> Self {
        Self {
            status: "healthy".to_string(),
            message: "🏓 Pong!".to_string(),
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Invite Responses
// ============================================================================

/// A newly created invite
#[derive(Debug, Clone, Serialize)]
pub struct InviteResponse {
    pub code: String,
    pub url: String,
    pub guild_id: Snowflake,
    pub channel_id: Snowflake,
    /// 0 means unlimited
    pub max_uses: u32,
    /// 0 means never expires
    pub max_age_minutes: u32,
    /// Whether joins through this invite are credited to its creator
    pub tracked: bool,
    pub message: String,
}

impl InviteResponse {
    /// "Unlimited" or the use limit
    pub fn uses_label(max_uses: u32) -> String {
        if max_uses == 0 {
            "Unlimited".to_string()
        } else {
            max_uses.to_string()
        }
    }

    /// "Never" or the lifetime in minutes
    pub fn expiry_label(max_age_minutes: u32) -> String {
        if max_age_minutes == 0 {
            "Never".to_string()
        } else {
            format!("in {max_age_minutes} minute(s)")
        }
    }
}

// ============================================================================
// Referral Responses
// ============================================================================

/// A member's referral total and reward state
#[derive(Debug, Clone, Serialize)]
pub struct ReferralSummaryResponse {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    pub total: i64,
    /// Role of the highest reached tier
    pub current_role: Option<Snowflake>,
    /// Roles of every reached tier, ascending by threshold
    pub eligible_roles: Vec<Snowflake>,
    pub reward: RewardOutcome,
    pub message: String,
}

/// One leaderboard row
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntryResponse {
    pub rank: usize,
    pub user_id: Snowflake,
    pub display_name: String,
    pub total: i64,
    pub line: String,
}

impl LeaderboardEntryResponse {
    pub fn new(rank: usize, user_id: Snowflake, display_name: String, total: i64) -> Self {
        let line = format_leaderboard_line(rank, &display_name, total);
        Self {
            rank,
            user_id,
            display_name,
            total,
            line,
        }
    }
}

/// Guild referral leaderboard
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardResponse {
    pub guild_id: Snowflake,
    pub title: String,
    pub entries: Vec<LeaderboardEntryResponse>,
    /// Rendered lines, or a placeholder when nobody has referrals yet
    pub description: String,
}

impl LeaderboardResponse {
    pub fn new(guild_id: Snowflake, entries: Vec<LeaderboardEntryResponse>) -> Self {
        let description = if entries.is_empty() {
            "No referral data yet.".to_string()
        } else {
            entries
                .iter()
                .map(|entry| entry.line.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        };

        Self {
            guild_id,
            title: "🏆 Referral Leaderboard".to_string(),
            entries,
            description,
        }
    }
}

/// An invite whose use count disagrees with its join log
#[derive(Debug, Clone, Serialize)]
pub struct InviteDivergenceResponse {
    pub code: String,
    pub owner_id: Snowflake,
    pub uses: i64,
    pub recorded_joins: i64,
    pub drift: i64,
}

impl From<InviteDivergence> for InviteDivergenceResponse {
    fn from(divergence: InviteDivergence) -> Self {
        Self {
            drift: divergence.drift(),
            code: divergence.code,
            owner_id: divergence.owner_id,
            uses: divergence.uses,
            recorded_joins: divergence.recorded_joins,
        }
    }
}

// ============================================================================
// Reward Responses
// ============================================================================

/// Result of a reward configuration reload
#[derive(Debug, Clone, Serialize)]
pub struct RewardReloadResponse {
    pub version: u64,
    pub guilds: usize,
    pub rejected: Vec<String>,
    pub message: String,
}

impl From<RewardReload> for RewardReloadResponse {
    fn from(reload: RewardReload) -> Self {
        Self {
            message: format!(
                "✅ Reward config v{} loaded for {} guild(s).",
                reload.version, reload.guilds
            ),
            version: reload.version,
            guilds: reload.guilds,
            rejected: reload.rejected.iter().map(ToString::to_string).collect(),
        }
    }
}
