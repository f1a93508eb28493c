//! Platform port - the calls the engine makes against the chat platform

use async_trait::async_trait;

use crate::entities::{InviteOptions, LiveInvite, Member};
use crate::error::PlatformError;
use crate::value_objects::Snowflake;

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Chat platform operations used by the attribution engine
///
/// Implementations own their timeout policy; the engine never layers one on top.
#[async_trait]
pub trait InvitePlatform: Send + Sync {
    /// List the live invites of a guild, in platform order
    async fn list_invites(&self, guild_id: Snowflake) -> PlatformResult<Vec<LiveInvite>>;

    /// Create an invite pointing at a channel
    async fn create_invite(
        &self,
        channel_id: Snowflake,
        options: &InviteOptions,
    ) -> PlatformResult<LiveInvite>;

    /// Fetch a guild member with its current roles (None if not a member)
    async fn member(&self, guild_id: Snowflake, user_id: Snowflake) -> PlatformResult<Option<Member>>;

    /// Grant a role to a guild member
    async fn add_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()>;

    /// User id of the application owner
    async fn application_owner(&self) -> PlatformResult<Snowflake>;

    /// Guilds the bot is currently in
    async fn current_guilds(&self) -> PlatformResult<Vec<Snowflake>>;
}
