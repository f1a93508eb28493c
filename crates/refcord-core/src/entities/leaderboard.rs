//! Aggregate read models - leaderboard rows and ledger audit findings

use crate::value_objects::Snowflake;

/// One row of a guild's referral leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: Snowflake,
    pub total: i64,
}

/// An invite whose persisted use count disagrees with its join event log
///
/// `uses > recorded_joins` means joins were counted without an audit row
/// (or rows were lost); `uses < recorded_joins` means the code was used
/// before it was registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteDivergence {
    pub code: String,
    pub owner_id: Snowflake,
    pub uses: i64,
    pub recorded_joins: i64,
}

impl InviteDivergence {
    /// Signed difference between the use count and the audit log
    pub fn drift(&self) -> i64 {
        self.uses - self.recorded_joins
    }
}

/// Format one leaderboard line, with medals for the podium
pub fn format_leaderboard_line(rank: usize, name: &str, total: i64) -> String {
    let medal = match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("{n}."),
    };
    format!("{medal} **{name}** - {total} referral(s)")
}
