//! # refcord-core
//!
//! Domain layer for the invite attribution engine: tracked invites, join
//! events, the reward policy, and the ports (ledger and platform) that the
//! infrastructure crates implement.
//! This crate has zero dependencies on infrastructure (database, HTTP, etc.).

pub mod entities;
pub mod error;
pub mod rewards;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    format_leaderboard_line, invite_url, InviteDivergence, InviteOptions, JoinEvent,
    LeaderboardEntry, LiveInvite, Member, RecordedUse, TrackedInvite,
};
pub use error::{DomainError, PlatformError};
pub use rewards::{
    parse_reward_config, RewardConfigError, RewardConfigReport, RewardDecision, RewardPolicy,
    RewardTiers,
};
pub use traits::{InvitePlatform, PlatformResult, ReferralLedger, RepoResult};
pub use value_objects::{Permissions, Snowflake, SnowflakeParseError};
