//! Referral service
//!
//! Turns resolved joins into ledger entries and reward grants, and answers
//! the read-side commands (own total, leaderboard, ledger audit).

use refcord_cache::InviteSnapshotCache;
use refcord_core::{DomainError, Snowflake};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::dto::{
    InviteDivergenceResponse, LeaderboardEntryResponse, LeaderboardResponse,
    ReferralSummaryResponse,
};

use super::attribution::AttributionService;
use super::context::ServiceContext;
use super::error::ServiceResult;

/// Largest leaderboard page
pub const MAX_LEADERBOARD_LIMIT: u32 = 25;

/// What happened to the inviter's reward after a referral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RewardOutcome {
    /// No tier reached in this guild
    NoTier,
    /// Member already holds the tier role
    AlreadyHeld { role_id: Snowflake },
    /// Role granted now
    Granted { role_id: Snowflake },
    /// Inviter is no longer in the guild
    MemberMissing { role_id: Snowflake },
    /// Grant failed; retried on the next total check
    Failed { role_id: Snowflake },
}

/// Result of handling a member join
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JoinOutcome {
    /// No invite could be identified; nothing recorded
    Unattributed,
    /// Join recorded against `code`
    Attributed {
        code: String,
        inviter_id: Option<Snowflake>,
        total: Option<i64>,
        reward: Option<RewardOutcome>,
    },
}

/// Restores a resolved code's cached use count when dropped armed
#[derive(Debug)]
struct SnapshotRollback<'a> {
    snapshots: &'a InviteSnapshotCache,
    guild_id: Snowflake,
    code: &'a str,
    previous_uses: i64,
    armed: bool,
}

impl<'a> SnapshotRollback<'a> {
    fn new(
        snapshots: &'a InviteSnapshotCache,
        guild_id: Snowflake,
        code: &'a str,
        previous_uses: i64,
    ) -> Self {
        Self {
            snapshots,
            guild_id,
            code,
            previous_uses,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for SnapshotRollback<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.snapshots
                .restore_uses(self.guild_id, self.code, self.previous_uses);
        }
    }
}

/// Referral service
pub struct ReferralService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReferralService<'a> {
    /// Create a new ReferralService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Attribute a join, record it, and reward the inviter
    ///
    /// Only a failure to record the join is returned as an error; once the
    /// ledger has committed, later failures are logged and the join counts.
    #[instrument(skip(self))]
    pub async fn handle_member_join(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<JoinOutcome> {
        let attribution = match AttributionService::new(self.ctx)
            .resolve_join(guild_id, user_id)
            .await
        {
            Some(attribution) => attribution,
            None => {
                info!(guild_id = %guild_id, user_id = %user_id, "Join unattributed");
                return Ok(JoinOutcome::Unattributed);
            }
        };
        let code = attribution.code;

        // until the ledger commits, an error or a dropped future puts the old
        // count back so a redelivered join sees the increase again
        let rollback = SnapshotRollback::new(
            self.ctx.snapshots(),
            guild_id,
            &code,
            attribution.previous_uses,
        );
        let recorded = match self.ctx.ledger().record_use(guild_id, &code, user_id).await {
            Ok(recorded) => {
                rollback.disarm();
                recorded
            }
            Err(e) => {
                error!(guild_id = %guild_id, code = %code, error = %e, "Failed to record join");
                return Err(e.into());
            }
        };

        let Some(inviter_id) = recorded.inviter_id else {
            info!(guild_id = %guild_id, code = %code, user_id = %user_id, "Join via unregistered invite");
            return Ok(JoinOutcome::Attributed {
                code,
                inviter_id: None,
                total: None,
                reward: None,
            });
        };

        let total = match self.ctx.ledger().total_referrals(guild_id, inviter_id).await {
            Ok(total) => total,
            Err(e) => {
                error!(guild_id = %guild_id, user_id = %inviter_id, error = %e, "Join recorded but total unavailable");
                return Ok(JoinOutcome::Attributed {
                    code,
                    inviter_id: Some(inviter_id),
                    total: None,
                    reward: None,
                });
            }
        };

        info!(
            guild_id = %guild_id,
            code = %code,
            user_id = %user_id,
            inviter_id = %inviter_id,
            total,
            "Join attributed"
        );

        let reward = self.grant_reward(guild_id, inviter_id, total).await;
        Ok(JoinOutcome::Attributed {
            code,
            inviter_id: Some(inviter_id),
            total: Some(total),
            reward: Some(reward),
        })
    }

    /// Grant the role of the highest reached tier, if not already held
    ///
    /// Never fails: platform errors are logged and reported in the outcome.
    #[instrument(skip(self))]
    pub async fn grant_reward(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        total: i64,
    ) -> RewardOutcome {
        let Some(role_id) = self.ctx.rewards().policy().next_role(guild_id, total) else {
            return RewardOutcome::NoTier;
        };

        let member = match self.ctx.platform().member(guild_id, user_id).await {
            Ok(Some(member)) => member,
            Ok(None) => {
                debug!(guild_id = %guild_id, user_id = %user_id, "Inviter left the guild; no role granted");
                return RewardOutcome::MemberMissing { role_id };
            }
            Err(e) => {
                warn!(guild_id = %guild_id, user_id = %user_id, error = %e, "Cannot fetch inviter");
                return RewardOutcome::Failed { role_id };
            }
        };

        if member.has_role(role_id) {
            return RewardOutcome::AlreadyHeld { role_id };
        }

        let reason = format!("RefCord: {total} referrals");
        match self
            .ctx
            .platform()
            .add_role(guild_id, user_id, role_id, &reason)
            .await
        {
            Ok(()) => {
                info!(guild_id = %guild_id, user_id = %user_id, role_id = %role_id, total, "Reward role granted");
                RewardOutcome::Granted { role_id }
            }
            Err(e) if e.is_forbidden() => {
                warn!(
                    guild_id = %guild_id,
                    role_id = %role_id,
                    error = %e,
                    "Cannot add role; the bot's role must be above the reward role"
                );
                RewardOutcome::Failed { role_id }
            }
            Err(e) => {
                error!(guild_id = %guild_id, role_id = %role_id, error = %e, "Failed to add reward role");
                RewardOutcome::Failed { role_id }
            }
        }
    }

    /// A member's total, with the reward grant re-attempted
    #[instrument(skip(self))]
    pub async fn my_total(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<ReferralSummaryResponse> {
        let total = self.ctx.ledger().total_referrals(guild_id, user_id).await?;
        let decision = self.ctx.rewards().policy().evaluate(guild_id, total);
        let reward = self.grant_reward(guild_id, user_id, total).await;

        Ok(ReferralSummaryResponse {
            guild_id,
            user_id,
            total,
            current_role: decision.current,
            eligible_roles: decision.eligible,
            reward,
            message: format!("You have **{total}** referral(s)."),
        })
    }

    /// Top referrers with display names
    ///
    /// Members that cannot be looked up are shown as `User(<id>)`.
    #[instrument(skip(self))]
    pub async fn leaderboard(
        &self,
        guild_id: Snowflake,
        limit: u32,
    ) -> ServiceResult<LeaderboardResponse> {
        if !(1..=MAX_LEADERBOARD_LIMIT).contains(&limit) {
            return Err(DomainError::OutOfRange {
                field: "limit",
                min: 1,
                max: i64::from(MAX_LEADERBOARD_LIMIT),
            }
            .into());
        }

        let rows = self.ctx.ledger().leaderboard(guild_id, limit).await?;

        let mut entries = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            let display_name = match self.ctx.platform().member(guild_id, row.user_id).await {
                Ok(Some(member)) => member.display_name,
                Ok(None) => format!("User({})", row.user_id),
                Err(e) => {
                    debug!(user_id = %row.user_id, error = %e, "Display name lookup failed");
                    format!("User({})", row.user_id)
                }
            };
            entries.push(LeaderboardEntryResponse::new(
                index + 1,
                row.user_id,
                display_name,
                row.total,
            ));
        }

        Ok(LeaderboardResponse::new(guild_id, entries))
    }

    /// Registered invites whose use count disagrees with the join log
    #[instrument(skip(self))]
    pub async fn audit(&self, guild_id: Snowflake) -> ServiceResult<Vec<InviteDivergenceResponse>> {
        let divergent = self.ctx.ledger().divergent_invites(guild_id).await?;
        if !divergent.is_empty() {
            warn!(guild_id = %guild_id, invites = divergent.len(), "Ledger divergence found");
        }
        Ok(divergent.into_iter().map(InviteDivergenceResponse::from).collect())
    }
}
