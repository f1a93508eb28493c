//! Ports - interfaces the domain needs from infrastructure

mod platform;
mod repositories;

pub use platform::{InvitePlatform, PlatformResult};
pub use repositories::{ReferralLedger, RepoResult};
