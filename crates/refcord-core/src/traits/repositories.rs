//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;

use crate::entities::{InviteDivergence, JoinEvent, LeaderboardEntry, RecordedUse, TrackedInvite};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Referral Ledger
// ============================================================================

/// Durable record of invite ownership, use counts, and the join audit log
#[async_trait]
pub trait ReferralLedger: Send + Sync {
    /// Register `owner_id` as the owner of `code`
    ///
    /// Idempotent upsert. An existing code is re-pointed to the new owner
    /// and guild but keeps its accumulated use count.
    async fn register_ownership(
        &self,
        guild_id: Snowflake,
        owner_id: Snowflake,
        code: &str,
    ) -> RepoResult<()>;

    /// Increment the use count of `code` and append a join event
    ///
    /// Both writes commit together or not at all.
    async fn record_use(
        &self,
        guild_id: Snowflake,
        code: &str,
        joined_user_id: Snowflake,
    ) -> RepoResult<RecordedUse>;

    /// Find a registered invite by code
    async fn find_invite(&self, code: &str) -> RepoResult<Option<TrackedInvite>>;

    /// Owner of a registered code within a guild
    async fn inviter_of(&self, guild_id: Snowflake, code: &str) -> RepoResult<Option<Snowflake>>;

    /// Sum of uses over all invites owned by a user in a guild (0 if none)
    async fn total_referrals(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<i64>;

    /// Top referrers by total, descending, ties by ascending user id
    async fn leaderboard(&self, guild_id: Snowflake, limit: u32) -> RepoResult<Vec<LeaderboardEntry>>;

    /// Join events recorded for a code, oldest first
    async fn join_events(&self, guild_id: Snowflake, code: &str) -> RepoResult<Vec<JoinEvent>>;

    /// Registered invites whose use count differs from their join event count
    async fn divergent_invites(&self, guild_id: Snowflake) -> RepoResult<Vec<InviteDivergence>>;
}
