//! Invite database models

use sqlx::FromRow;

/// Database model for invites table
#[derive(Debug, Clone, FromRow)]
pub struct InviteModel {
    pub code: String,
    pub guild_id: i64,
    pub owner_user_id: i64,
    pub uses: i64,
}

/// One aggregated leaderboard row
#[derive(Debug, Clone, FromRow)]
pub struct LeaderboardRowModel {
    pub owner_user_id: i64,
    pub total: i64,
}

/// Invite joined with its join event count
#[derive(Debug, Clone, FromRow)]
pub struct InviteDivergenceModel {
    pub code: String,
    pub owner_user_id: i64,
    pub uses: i64,
    pub recorded_joins: i64,
}
