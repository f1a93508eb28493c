//! Join attribution
//!
//! A join is attributed by diffing the cached use counts of a guild's invites
//! against a fresh listing. The code whose count went up is the one that was
//! used. Vanity URLs and invites created and consumed between two refreshes
//! produce no increase and stay unattributed.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use refcord_cache::InviteSnapshot;
use refcord_common::AttributionMode;
use refcord_core::entities::LiveInvite;
use refcord_core::Snowflake;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use super::context::ServiceContext;

// ============================================================================
// Resolution strategy
// ============================================================================

/// Picks the invite code that explains a join
pub trait ResolutionStrategy: Send + Sync + fmt::Debug {
    /// Compare the cached counts with a fresh listing (platform order)
    fn resolve(&self, before: &InviteSnapshot, after: &[LiveInvite]) -> Option<String>;
}

/// First invite, in platform listing order, whose use count strictly increased
///
/// Codes missing from `before` count as 0. Simultaneous increments resolve
/// to whichever code the platform lists first.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstIncrease;

impl ResolutionStrategy for FirstIncrease {
    fn resolve(&self, before: &InviteSnapshot, after: &[LiveInvite]) -> Option<String> {
        after
            .iter()
            .find(|invite| invite.uses > before.get(&invite.code).copied().unwrap_or(0))
            .map(|invite| invite.code.clone())
    }
}

// ============================================================================
// Per-guild locks
// ============================================================================

/// One async mutex per guild, created on first use
#[derive(Debug, Default)]
pub struct GuildLocks {
    locks: DashMap<Snowflake, Arc<Mutex<()>>>,
}

impl GuildLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock handle for a guild
    pub fn lock_for(&self, guild_id: Snowflake) -> Arc<Mutex<()>> {
        self.locks
            .entry(guild_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Number of guilds that have a lock
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

// ============================================================================
// Attribution service
// ============================================================================

/// A resolved join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub code: String,
    /// Cached use count of `code` before this join (0 if it was not cached)
    pub previous_uses: i64,
}

/// Attribution service
pub struct AttributionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AttributionService<'a> {
    /// Create a new AttributionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Work out which invite a new member used
    ///
    /// On success the guild's snapshot is replaced with the fresh listing,
    /// whether or not a code was found. If the listing cannot be fetched the
    /// snapshot is left as it was.
    #[instrument(skip(self))]
    pub async fn resolve_join(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> Option<Attribution> {
        match self.ctx.attribution_mode() {
            AttributionMode::BestEffort => self.diff_and_replace(guild_id).await,
            AttributionMode::Serialized => {
                let lock = self.ctx.guild_locks().lock_for(guild_id);
                let _guard = lock.lock().await;
                self.diff_and_replace(guild_id).await
            }
        }
    }

    async fn diff_and_replace(&self, guild_id: Snowflake) -> Option<Attribution> {
        let before = self.ctx.snapshots().snapshot(guild_id);

        let after = match self.ctx.platform().list_invites(guild_id).await {
            Ok(after) => after,
            Err(e) if e.is_forbidden() => {
                warn!(guild_id = %guild_id, error = %e, "Cannot list invites; join left unattributed");
                return None;
            }
            Err(e) => {
                error!(guild_id = %guild_id, error = %e, "Failed to list invites; join left unattributed");
                return None;
            }
        };

        let resolved = self.ctx.strategy().resolve(&before, &after);
        self.ctx.snapshots().replace_from_live(guild_id, &after);

        match resolved {
            Some(code) => {
                let previous_uses = before.get(&code).copied().unwrap_or(0);
                Some(Attribution {
                    code,
                    previous_uses,
                })
            }
            None => {
                info!(guild_id = %guild_id, "No invite use increased (vanity or uncached invite)");
                None
            }
        }
    }
}
