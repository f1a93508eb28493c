//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! The invoking user is forwarded by the integration shell in the body.

use refcord_core::{Permissions, Snowflake};
use serde::Deserialize;
use validator::Validate;

/// Upper bound on invite uses (0 = unlimited)
pub const MAX_INVITE_USES: u32 = 1000;
/// Upper bound on invite lifetime in minutes (0 = never expires)
pub const MAX_INVITE_AGE_MINUTES: u32 = 10_080;

// ============================================================================
// Invite Requests
// ============================================================================

/// Create a trackable invite owned by the invoking member
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePersonalInviteRequest {
    pub user_id: Snowflake,

    pub channel_id: Snowflake,

    #[serde(default)]
    #[validate(range(max = 1000, message = "Max uses must be between 0 and 1000"))]
    pub max_uses: u32,

    #[serde(default)]
    #[validate(range(max = 10080, message = "Max age must be between 0 and 10080 minutes"))]
    pub max_age_minutes: u32,

    /// Name used in the audit log reason
    #[validate(length(max = 64, message = "User tag must be at most 64 characters"))]
    pub user_tag: Option<String>,
}

/// Create an untracked invite
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePublicInviteRequest {
    pub user_id: Snowflake,

    pub channel_id: Snowflake,

    #[serde(default)]
    #[validate(range(max = 1000, message = "Max uses must be between 0 and 1000"))]
    pub max_uses: u32,

    #[serde(default)]
    #[validate(range(max = 10080, message = "Max age must be between 0 and 10080 minutes"))]
    pub max_age_minutes: u32,

    /// Invoking member's permission bitfield, as forwarded by the platform
    #[serde(default)]
    pub permissions: Permissions,
}

// ============================================================================
// Referral Requests
// ============================================================================

/// Leaderboard query string
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LeaderboardQuery {
    #[serde(default = "default_leaderboard_limit")]
    #[validate(range(min = 1, max = 25, message = "Limit must be between 1 and 25"))]
    pub limit: u32,
}

impl Default for LeaderboardQuery {
    fn default() -> Self {
        Self {
            limit: default_leaderboard_limit(),
        }
    }
}

fn default_leaderboard_limit() -> u32 {
    10
}

// ============================================================================
// Reward Requests
// ============================================================================

/// Reload the reward configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReloadRewardsRequest {
    pub user_id: Snowflake,
}
