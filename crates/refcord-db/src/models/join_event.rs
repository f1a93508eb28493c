//! Join event database model

use sqlx::FromRow;

/// Database model for join_events table
#[derive(Debug, Clone, FromRow)]
pub struct JoinEventModel {
    pub guild_id: i64,
    pub joined_user_id: i64,
    pub inviter_code: String,
    /// Unix seconds
    pub ts: i64,
}
