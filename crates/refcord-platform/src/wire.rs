//! Wire formats of the Discord REST API (only the fields we read)

use serde::{Deserialize, Serialize};

use refcord_core::entities::{LiveInvite, Member};
use refcord_core::value_objects::Snowflake;

#[derive(Debug, Deserialize)]
pub struct IdOnly {
    pub id: Snowflake,
}

#[derive(Debug, Deserialize)]
pub struct UserWire {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
}

/// Invite object (`GET /guilds/{id}/invites`, `POST /channels/{id}/invites`)
#[derive(Debug, Deserialize)]
pub struct InviteWire {
    pub code: String,
    #[serde(default)]
    pub guild: Option<IdOnly>,
    #[serde(default)]
    pub channel: Option<IdOnly>,
    #[serde(default)]
    pub inviter: Option<UserWire>,
    #[serde(default)]
    pub uses: Option<i64>,
    #[serde(default)]
    pub max_uses: Option<u32>,
    #[serde(default)]
    pub max_age: Option<u32>,
}

impl From<InviteWire> for LiveInvite {
    fn from(wire: InviteWire) -> Self {
        LiveInvite {
            code: wire.code,
            guild_id: wire.guild.map(|g| g.id),
            channel_id: wire.channel.map(|c| c.id),
            inviter_id: wire.inviter.map(|u| u.id),
            uses: wire.uses.unwrap_or(0),
            max_uses: wire.max_uses.unwrap_or(0),
            max_age: wire.max_age.unwrap_or(0),
        }
    }
}

/// Guild member object (`GET /guilds/{g}/members/{u}`)
#[derive(Debug, Deserialize)]
pub struct MemberWire {
    #[serde(default)]
    pub user: Option<UserWire>,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
}

impl MemberWire {
    /// Nickname, then global name, then username
    pub fn into_member(self, guild_id: Snowflake, user_id: Snowflake) -> Member {
        let display_name = self
            .nick
            .or_else(|| self.user.as_ref().and_then(|u| u.global_name.clone()))
            .or_else(|| self.user.as_ref().map(|u| u.username.clone()))
            .unwrap_or_else(|| format!("User({user_id})"));

        Member::new(guild_id, user_id, display_name).with_roles(self.roles)
    }
}

#[derive(Debug, Deserialize)]
pub struct TeamWire {
    pub owner_user_id: Snowflake,
}

/// Application object (`GET /oauth2/applications/@me`)
#[derive(Debug, Deserialize)]
pub struct ApplicationWire {
    #[serde(default)]
    pub owner: Option<UserWire>,
    #[serde(default)]
    pub team: Option<TeamWire>,
}

impl ApplicationWire {
    /// Team owner for team-owned applications, otherwise the owning user
    pub fn owner_id(&self) -> Option<Snowflake> {
        self.team
            .as_ref()
            .map(|t| t.owner_user_id)
            .or_else(|| self.owner.as_ref().map(|u| u.id))
    }
}

/// Body of `POST /channels/{id}/invites`
#[derive(Debug, Serialize)]
pub struct CreateInviteBody {
    pub max_uses: u32,
    pub max_age: u32,
    pub unique: bool,
}

/// Body of a 429 response
#[derive(Debug, Deserialize)]
pub struct RateLimitBody {
    pub retry_after: f64,
}
