//! Domain entities - core business objects

mod invite;
mod join_event;
mod leaderboard;
mod member;

pub use invite::{invite_url, InviteOptions, LiveInvite, TrackedInvite};
pub use join_event::{JoinEvent, RecordedUse};
pub use leaderboard::{format_leaderboard_line, InviteDivergence, LeaderboardEntry};
pub use member::Member;
