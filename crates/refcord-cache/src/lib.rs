//! # refcord-cache
//!
//! In-memory invite usage snapshots, one per guild.
//!
//! ## Example
//!
//! ```ignore
//! use refcord_cache::InviteSnapshotCache;
//!
//! let cache = InviteSnapshotCache::new_shared();
//! cache.replace_from_live(guild_id, &live_invites);
//!
//! let before = cache.snapshot(guild_id);
//! cache.apply_created(guild_id, "abc", 0);
//! ```

pub mod snapshot;

pub use snapshot::{InviteSnapshot, InviteSnapshotCache};
