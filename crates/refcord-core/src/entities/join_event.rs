//! Join event entity - append-only audit record of an attributed join

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Audit record for one resolved join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEvent {
    pub guild_id: Snowflake,
    pub joined_user_id: Snowflake,
    pub inviter_code: String,
    pub created_at: DateTime<Utc>,
}

impl JoinEvent {
    /// Create a join event stamped with the current time
    pub fn new(guild_id: Snowflake, joined_user_id: Snowflake, inviter_code: impl Into<String>) -> Self {
        Self {
            guild_id,
            joined_user_id,
            inviter_code: inviter_code.into(),
            created_at: Utc::now(),
        }
    }
}

/// Result of recording a use in the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUse {
    /// The audit row that was appended
    pub event: JoinEvent,
    /// Owner of the code, if it was registered in that guild
    pub inviter_id: Option<Snowflake>,
}

impl RecordedUse {
    /// Check if the use was credited to an inviter
    pub fn is_credited(&self) -> bool {
        self.inviter_id.is_some()
    }
}
