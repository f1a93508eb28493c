//! Route handlers
//!
//! All HTTP request handlers organized by command family.

pub mod events;
pub mod health;
pub mod invites;
pub mod referrals;
pub mod rewards;
