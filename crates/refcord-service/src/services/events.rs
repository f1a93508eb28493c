//! Platform event dispatch
//!
//! The integration shell forwards gateway events as tagged JSON; each one is
//! routed to the service that owns it.

use refcord_core::Snowflake;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::referral::{JoinOutcome, ReferralService};
use super::snapshot::{RefreshOutcome, SnapshotService};

/// A gateway event forwarded by the shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlatformEvent {
    MemberJoined {
        guild_id: Snowflake,
        user_id: Snowflake,
    },
    InviteCreated {
        guild_id: Snowflake,
        code: String,
        #[serde(default)]
        uses: i64,
    },
    InviteDeleted {
        guild_id: Snowflake,
        code: String,
    },
    /// The bot joined a guild, or a guild came back from an outage
    GuildAvailable { guild_id: Snowflake },
}

impl PlatformEvent {
    pub fn guild_id(&self) -> Snowflake {
        match self {
            Self::MemberJoined { guild_id, .. }
            | Self::InviteCreated { guild_id, .. }
            | Self::InviteDeleted { guild_id, .. }
            | Self::GuildAvailable { guild_id } => *guild_id,
        }
    }

    /// Event name as it appears in the `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MemberJoined { .. } => "member_joined",
            Self::InviteCreated { .. } => "invite_created",
            Self::InviteDeleted { .. } => "invite_deleted",
            Self::GuildAvailable { .. } => "guild_available",
        }
    }
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "result", rename_all = "snake_case")]
pub enum EventOutcome {
    Join(JoinOutcome),
    SnapshotRefreshed(RefreshOutcome),
    SnapshotUpdated,
}

/// Event service
pub struct EventService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> EventService<'a> {
    /// Create a new EventService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Route an event to its handler
    #[instrument(skip(self, event), fields(kind = event.kind(), guild_id = %event.guild_id()))]
    pub async fn dispatch(&self, event: PlatformEvent) -> ServiceResult<EventOutcome> {
        debug!("Dispatching platform event");

        match event {
            PlatformEvent::MemberJoined { guild_id, user_id } => {
                let outcome = ReferralService::new(self.ctx)
                    .handle_member_join(guild_id, user_id)
                    .await?;
                Ok(EventOutcome::Join(outcome))
            }
            PlatformEvent::InviteCreated {
                guild_id,
                code,
                uses,
            } => {
                SnapshotService::new(self.ctx).invite_created(guild_id, &code, uses);
                Ok(EventOutcome::SnapshotUpdated)
            }
            PlatformEvent::InviteDeleted { guild_id, code } => {
                SnapshotService::new(self.ctx).invite_deleted(guild_id, &code);
                Ok(EventOutcome::SnapshotUpdated)
            }
            PlatformEvent::GuildAvailable { guild_id } => {
                let outcome = SnapshotService::new(self.ctx).refresh(guild_id).await;
                Ok(EventOutcome::SnapshotRefreshed(outcome))
            }
        }
    }
}
