//! Invite model -> entity mappers

use refcord_core::entities::{InviteDivergence, LeaderboardEntry, TrackedInvite};
use refcord_core::value_objects::Snowflake;

use crate::models::{InviteDivergenceModel, InviteModel, LeaderboardRowModel};

/// Convert InviteModel to TrackedInvite entity
impl From<InviteModel> for TrackedInvite {
    fn from(model: InviteModel) -> Self {
        TrackedInvite {
            code: model.code,
            guild_id: Snowflake::new(model.guild_id),
            owner_id: Snowflake::new(model.owner_user_id),
            uses: model.uses,
        }
    }
}

impl From<LeaderboardRowModel> for LeaderboardEntry {
    fn from(model: LeaderboardRowModel) -> Self {
        LeaderboardEntry {
            user_id: Snowflake::new(model.owner_user_id),
            total: model.total,
        }
    }
}

impl From<InviteDivergenceModel> for InviteDivergence {
    fn from(model: InviteDivergenceModel) -> Self {
        InviteDivergence {
            code: model.code,
            owner_id: Snowflake::new(model.owner_user_id),
            uses: model.uses,
            recorded_joins: model.recorded_joins,
        }
    }
}
