//! # refcord-platform
//!
//! Discord REST API v10 implementation of the `InvitePlatform` port.
//!
//! ## Example
//!
//! ```ignore
//! use refcord_platform::{DiscordHttpConfig, DiscordHttpPlatform};
//!
//! let platform = DiscordHttpPlatform::new(DiscordHttpConfig::new(token))?;
//! let invites = platform.list_invites(guild_id).await?;
//! ```

mod client;
mod config;
mod wire;

pub use client::DiscordHttpPlatform;
pub use config::DiscordHttpConfig;
