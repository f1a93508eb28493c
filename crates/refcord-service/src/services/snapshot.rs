//! Snapshot service
//!
//! Keeps the invite snapshot cache in step with the platform: full refreshes
//! at startup and when a guild becomes available, incremental patches on
//! invite create/delete notifications.

use refcord_core::Snowflake;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Result of refreshing one guild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// Snapshot replaced with the live listing
    Refreshed { invites: usize },
    /// Bot cannot read invites; snapshot emptied
    Degraded,
    /// Listing failed for another reason; snapshot untouched
    Unchanged,
}

/// Result of refreshing every guild at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WarmUpReport {
    pub guilds: usize,
    pub refreshed: usize,
    pub degraded: usize,
    pub failed: usize,
}

/// Snapshot service
pub struct SnapshotService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SnapshotService<'a> {
    /// Create a new SnapshotService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Replace a guild's snapshot with a fresh platform read
    #[instrument(skip(self))]
    pub async fn refresh(&self, guild_id: Snowflake) -> RefreshOutcome {
        match self.ctx.platform().list_invites(guild_id).await {
            Ok(invites) => {
                self.ctx.snapshots().replace_from_live(guild_id, &invites);
                info!(guild_id = %guild_id, invites = invites.len(), "Invite snapshot refreshed");
                RefreshOutcome::Refreshed {
                    invites: invites.len(),
                }
            }
            Err(e) if e.is_forbidden() => {
                self.ctx.snapshots().clear(guild_id);
                warn!(
                    guild_id = %guild_id,
                    error = %e,
                    "Missing Manage Guild permission; joins in this guild cannot be attributed"
                );
                RefreshOutcome::Degraded
            }
            Err(e) => {
                error!(guild_id = %guild_id, error = %e, "Invite snapshot refresh failed");
                RefreshOutcome::Unchanged
            }
        }
    }

    /// Refresh every guild the bot is in
    #[instrument(skip(self))]
    pub async fn warm_up(&self) -> ServiceResult<WarmUpReport> {
        let guilds = self.ctx.platform().current_guilds().await?;

        let mut report = WarmUpReport {
            guilds: guilds.len(),
            ..WarmUpReport::default()
        };
        for guild_id in guilds {
            match self.refresh(guild_id).await {
                RefreshOutcome::Refreshed { .. } => report.refreshed += 1,
                RefreshOutcome::Degraded => report.degraded += 1,
                RefreshOutcome::Unchanged => report.failed += 1,
            }
        }

        info!(
            guilds = report.guilds,
            refreshed = report.refreshed,
            degraded = report.degraded,
            failed = report.failed,
            "Invite snapshots warmed up"
        );
        Ok(report)
    }

    /// Record an invite created on the platform
    pub fn invite_created(&self, guild_id: Snowflake, code: &str, uses: i64) {
        self.ctx.snapshots().apply_created(guild_id, code, uses);
    }

    /// Forget an invite deleted on the platform
    pub fn invite_deleted(&self, guild_id: Snowflake, code: &str) {
        self.ctx.snapshots().apply_deleted(guild_id, code);
    }
}
