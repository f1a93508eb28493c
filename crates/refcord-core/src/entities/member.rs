//! Guild member as seen through the platform

use crate::value_objects::Snowflake;

/// A guild member with the roles it currently holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    pub display_name: String,
    pub role_ids: Vec<Snowflake>,
}

impl Member {
    /// Create a member with no roles
    pub fn new(guild_id: Snowflake, user_id: Snowflake, display_name: impl Into<String>) -> Self {
        Self {
            guild_id,
            user_id,
            display_name: display_name.into(),
            role_ids: Vec::new(),
        }
    }

    /// Add roles to the member
    pub fn with_roles(mut self, role_ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.role_ids.extend(role_ids);
        self
    }

    /// Check if the member has a specific role
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.role_ids.contains(&role_id)
    }
}
