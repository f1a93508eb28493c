//! Invite snapshot cache
//!
//! Last-observed use count of every invite code, keyed by guild. Entries are
//! replaced whole on refresh and patched on invite create/delete events; they
//! may be stale between refreshes.

use dashmap::DashMap;
use refcord_core::entities::LiveInvite;
use refcord_core::value_objects::Snowflake;
use std::collections::HashMap;
use std::sync::Arc;

/// Invite code -> last observed use count for one guild
pub type InviteSnapshot = HashMap<String, i64>;

/// Per-guild invite usage snapshots
///
/// Uses `DashMap` for concurrent access. Reads hand out copies so callers
/// never hold a shard lock across an await point.
#[derive(Debug, Default)]
pub struct InviteSnapshotCache {
    guilds: DashMap<Snowflake, InviteSnapshot>,
}

impl InviteSnapshotCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Copy of a guild's snapshot (empty if the guild was never seen)
    pub fn snapshot(&self, guild_id: Snowflake) -> InviteSnapshot {
        self.guilds
            .get(&guild_id)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    /// Last observed use count of one code
    pub fn uses(&self, guild_id: Snowflake, code: &str) -> Option<i64> {
        self.guilds
            .get(&guild_id)
            .and_then(|entry| entry.get(code).copied())
    }

    /// Check if a guild has an entry (possibly empty)
    pub fn contains_guild(&self, guild_id: Snowflake) -> bool {
        self.guilds.contains_key(&guild_id)
    }

    /// Number of guilds with an entry
    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }

    /// Replace a guild's snapshot wholesale
    pub fn replace(&self, guild_id: Snowflake, snapshot: InviteSnapshot) {
        tracing::trace!(guild_id = %guild_id, invites = snapshot.len(), "Snapshot replaced");
        self.guilds.insert(guild_id, snapshot);
    }

    /// Replace a guild's snapshot from a live invite listing
    pub fn replace_from_live(&self, guild_id: Snowflake, invites: &[LiveInvite]) {
        let snapshot = invites
            .iter()
            .map(|invite| (invite.code.clone(), invite.uses))
            .collect();
        self.replace(guild_id, snapshot);
    }

    /// Empty a guild's snapshot (degraded mode, nothing can be attributed)
    pub fn clear(&self, guild_id: Snowflake) {
        self.replace(guild_id, InviteSnapshot::new());
    }

    /// Record a newly created invite, creating the guild entry if missing
    pub fn apply_created(&self, guild_id: Snowflake, code: &str, uses: i64) {
        self.guilds
            .entry(guild_id)
            .or_default()
            .insert(code.to_string(), uses);

        tracing::trace!(guild_id = %guild_id, code = %code, uses, "Invite added to snapshot");
    }

    /// Put back the count a code had before a join was resolved against it
    ///
    /// Lets a redelivered join diff against the old count again.
    pub fn restore_uses(&self, guild_id: Snowflake, code: &str, uses: i64) {
        if let Some(mut entry) = self.guilds.get_mut(&guild_id) {
            entry.insert(code.to_string(), uses);
            tracing::debug!(guild_id = %guild_id, code = %code, uses, "Invite use count restored");
        }
    }

    /// Forget a deleted invite; no-op for unknown guilds or codes
    pub fn apply_deleted(&self, guild_id: Snowflake, code: &str) {
        if let Some(mut entry) = self.guilds.get_mut(&guild_id) {
            if entry.remove(code).is_some() {
                tracing::trace!(guild_id = %guild_id, code = %code, "Invite removed from snapshot");
            }
        }
    }
}
