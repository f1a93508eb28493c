//! SQLite implementation of ReferralLedger

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::instrument;

use refcord_core::entities::{
    InviteDivergence, JoinEvent, LeaderboardEntry, RecordedUse, TrackedInvite,
};
use refcord_core::traits::{ReferralLedger, RepoResult};
use refcord_core::value_objects::Snowflake;

use crate::mappers::JoinEventInsert;
use crate::models::{InviteDivergenceModel, InviteModel, JoinEventModel, LeaderboardRowModel};

use super::error::map_db_error;

/// SQLite implementation of ReferralLedger
#[derive(Clone)]
pub struct SqliteReferralLedger {
    pool: SqlitePool,
}

impl SqliteReferralLedger {
    /// Create a new SqliteReferralLedger
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ReferralLedger for SqliteReferralLedger {
    #[instrument(skip(self))]
    async fn register_ownership(
        &self,
        guild_id: Snowflake,
        owner_id: Snowflake,
        code: &str,
    ) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO invites (code, guild_id, owner_user_id, uses)
            VALUES (?1, ?2, ?3, 0)
            ON CONFLICT(code) DO UPDATE
            SET owner_user_id = excluded.owner_user_id,
                guild_id = excluded.guild_id
            ",
        )
        .bind(code)
        .bind(guild_id.into_inner())
        .bind(owner_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn record_use(
        &self,
        guild_id: Snowflake,
        code: &str,
        joined_user_id: Snowflake,
    ) -> RepoResult<RecordedUse> {
        let row = JoinEventInsert::now(guild_id, code, joined_user_id);

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let owner: Option<i64> = sqlx::query_scalar(
            r"
            UPDATE invites
            SET uses = uses + 1
            WHERE guild_id = ?1 AND code = ?2
            RETURNING owner_user_id
            ",
        )
        .bind(row.guild_id)
        .bind(row.inviter_code)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO join_events (guild_id, joined_user_id, inviter_code, ts)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(row.guild_id)
        .bind(row.joined_user_id)
        .bind(row.inviter_code)
        .bind(row.ts)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(RecordedUse {
            event: row.to_event(),
            inviter_id: owner.map(Snowflake::new),
        })
    }

    #[instrument(skip(self))]
    async fn find_invite(&self, code: &str) -> RepoResult<Option<TrackedInvite>> {
        let result = sqlx::query_as::<_, InviteModel>(
            r"
            SELECT code, guild_id, owner_user_id, uses
            FROM invites
            WHERE code = ?1
            ",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(TrackedInvite::from))
    }

    #[instrument(skip(self))]
    async fn inviter_of(&self, guild_id: Snowflake, code: &str) -> RepoResult<Option<Snowflake>> {
        let owner: Option<i64> = sqlx::query_scalar(
            r"
            SELECT owner_user_id
            FROM invites
            WHERE guild_id = ?1 AND code = ?2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(owner.map(Snowflake::new))
    }

    #[instrument(skip(self))]
    async fn total_referrals(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar(
            r"
            SELECT COALESCE(SUM(uses), 0)
            FROM invites
            WHERE guild_id = ?1 AND owner_user_id = ?2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn leaderboard(&self, guild_id: Snowflake, limit: u32) -> RepoResult<Vec<LeaderboardEntry>> {
        let results = sqlx::query_as::<_, LeaderboardRowModel>(
            r"
            SELECT owner_user_id, SUM(uses) AS total
            FROM invites
            WHERE guild_id = ?1
            GROUP BY owner_user_id
            ORDER BY total DESC, owner_user_id ASC
            LIMIT ?2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(LeaderboardEntry::from).collect())
    }

    #[instrument(skip(self))]
    async fn join_events(&self, guild_id: Snowflake, code: &str) -> RepoResult<Vec<JoinEvent>> {
        let results = sqlx::query_as::<_, JoinEventModel>(
            r"
            SELECT guild_id, joined_user_id, inviter_code, ts
            FROM join_events
            WHERE guild_id = ?1 AND inviter_code = ?2
            ORDER BY id ASC
            ",
        )
        .bind(guild_id.into_inner())
        .bind(code)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(JoinEvent::from).collect())
    }

    #[instrument(skip(self))]
    async fn divergent_invites(&self, guild_id: Snowflake) -> RepoResult<Vec<InviteDivergence>> {
        let results = sqlx::query_as::<_, InviteDivergenceModel>(
            r"
            SELECT i.code, i.owner_user_id, i.uses, COUNT(j.id) AS recorded_joins
            FROM invites i
            LEFT JOIN join_events j
                ON j.guild_id = i.guild_id AND j.inviter_code = i.code
            WHERE i.guild_id = ?1
            GROUP BY i.code, i.owner_user_id, i.uses
            HAVING i.uses != COUNT(j.id)
            ORDER BY i.code ASC
            ",
        )
        .bind(guild_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(InviteDivergence::from).collect())
    }
}
