//! Database models - SQLx-compatible structs for the ledger tables

mod invite;
mod join_event;

pub use invite::{InviteDivergenceModel, InviteModel, LeaderboardRowModel};
pub use join_event::JoinEventModel;
