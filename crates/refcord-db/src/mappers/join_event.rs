//! Join event entity <-> model mapper

use chrono::{DateTime, Utc};
use refcord_core::entities::JoinEvent;
use refcord_core::value_objects::Snowflake;

use crate::models::JoinEventModel;

/// Convert stored unix seconds to a UTC timestamp
pub fn timestamp_from_unix(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

/// Convert JoinEventModel to JoinEvent entity
impl From<JoinEventModel> for JoinEvent {
    fn from(model: JoinEventModel) -> Self {
        JoinEvent {
            guild_id: Snowflake::new(model.guild_id),
            joined_user_id: Snowflake::new(model.joined_user_id),
            inviter_code: model.inviter_code,
            created_at: timestamp_from_unix(model.ts),
        }
    }
}

/// Column values for appending a join event
pub struct JoinEventInsert<'a> {
    pub guild_id: i64,
    pub joined_user_id: i64,
    pub inviter_code: &'a str,
    pub ts: i64,
}

impl<'a> JoinEventInsert<'a> {
    /// Stamp a join with the current time, truncated to whole seconds
    pub fn now(guild_id: Snowflake, inviter_code: &'a str, joined_user_id: Snowflake) -> Self {
        Self {
            guild_id: guild_id.into_inner(),
            joined_user_id: joined_user_id.into_inner(),
            inviter_code,
            ts: Utc::now().timestamp(),
        }
    }

    /// The entity this row will hold once written
    pub fn to_event(&self) -> JoinEvent {
        JoinEvent {
            guild_id: Snowflake::new(self.guild_id),
            joined_user_id: Snowflake::new(self.joined_user_id),
            inviter_code: self.inviter_code.to_string(),
            created_at: timestamp_from_unix(self.ts),
        }
    }
}
