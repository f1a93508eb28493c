//! Path parameter extractors
//!
//! Snowflake IDs arrive as strings in the path and are parsed by the handler.

use refcord_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

fn parse_id(raw: &str, name: &str) -> Result<Snowflake, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid {name} format")))
}

/// Path parameters with guild_id
#[derive(Debug, Deserialize)]
pub struct GuildIdPath {
    pub guild_id: String,
}

impl GuildIdPath {
    /// Parse guild_id as Snowflake
    pub fn guild_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.guild_id, "guild_id")
    }
}

/// Path parameters with guild_id and user_id
#[derive(Debug, Deserialize)]
pub struct GuildUserPath {
    pub guild_id: String,
    pub user_id: String,
}

impl GuildUserPath {
    /// Parse guild_id as Snowflake
    pub fn guild_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.guild_id, "guild_id")
    }

    /// Parse user_id as Snowflake
    pub fn user_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.user_id, "user_id")
    }
}
