//! Service context - dependency container for services
//!
//! Holds the ledger, the platform port, and the process-wide in-memory state
//! (invite snapshots, reward policy, attribution locks).

use std::sync::Arc;

use refcord_cache::InviteSnapshotCache;
use refcord_common::AttributionMode;
use refcord_core::traits::{InvitePlatform, ReferralLedger};
use refcord_core::Snowflake;

use super::attribution::{FirstIncrease, GuildLocks, ResolutionStrategy};
use super::error::{ServiceError, ServiceResult};
use super::rewards::{RewardConfigStore, RewardSource};

/// Service context containing all dependencies
///
/// Cloning is cheap; every field is shared.
#[derive(Clone)]
pub struct ServiceContext {
    // Ports
    ledger: Arc<dyn ReferralLedger>,
    platform: Arc<dyn InvitePlatform>,

    // In-memory state
    snapshots: Arc<InviteSnapshotCache>,
    rewards: Arc<RewardConfigStore>,
    guild_locks: Arc<GuildLocks>,

    // Attribution policy
    strategy: Arc<dyn ResolutionStrategy>,
    attribution_mode: AttributionMode,

    owner_override: Option<Snowflake>,
}

impl ServiceContext {
    /// Create a new service context
    pub fn new(
        ledger: Arc<dyn ReferralLedger>,
        platform: Arc<dyn InvitePlatform>,
        snapshots: Arc<InviteSnapshotCache>,
        rewards: Arc<RewardConfigStore>,
    ) -> Self {
        Self {
            ledger,
            platform,
            snapshots,
            rewards,
            guild_locks: Arc::new(GuildLocks::new()),
            strategy: Arc::new(FirstIncrease),
            attribution_mode: AttributionMode::default(),
            owner_override: None,
        }
    }

    // === Ports ===

    /// Get the referral ledger
    pub fn ledger(&self) -> &dyn ReferralLedger {
        self.ledger.as_ref()
    }

    /// Get the chat platform
    pub fn platform(&self) -> &dyn InvitePlatform {
        self.platform.as_ref()
    }

    // === State ===

    /// Get the invite snapshot cache
    pub fn snapshots(&self) -> &InviteSnapshotCache {
        self.snapshots.as_ref()
    }

    /// Get the reward configuration store
    pub fn rewards(&self) -> &RewardConfigStore {
        self.rewards.as_ref()
    }

    /// Get the per-guild attribution locks
    pub fn guild_locks(&self) -> &GuildLocks {
        self.guild_locks.as_ref()
    }

    // === Policy ===

    /// Get the resolution strategy
    pub fn strategy(&self) -> &dyn ResolutionStrategy {
        self.strategy.as_ref()
    }

    pub fn attribution_mode(&self) -> AttributionMode {
        self.attribution_mode
    }

    /// User allowed to run owner-only commands, if configured locally
    pub fn owner_override(&self) -> Option<Snowflake> {
        self.owner_override
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("ledger", &"dyn ReferralLedger")
            .field("platform", &"dyn InvitePlatform")
            .field("cached_guilds", &self.snapshots.guild_count())
            .field("reward_version", &self.rewards.version())
            .field("strategy", &self.strategy)
            .field("attribution_mode", &self.attribution_mode)
            .field("owner_override", &self.owner_override)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    ledger: Option<Arc<dyn ReferralLedger>>,
    platform: Option<Arc<dyn InvitePlatform>>,
    snapshots: Option<Arc<InviteSnapshotCache>>,
    rewards: Option<Arc<RewardConfigStore>>,
    strategy: Option<Arc<dyn ResolutionStrategy>>,
    attribution_mode: AttributionMode,
    owner_override: Option<Snowflake>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(mut self, ledger: Arc<dyn ReferralLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn platform(mut self, platform: Arc<dyn InvitePlatform>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn snapshots(mut self, snapshots: Arc<InviteSnapshotCache>) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    pub fn rewards(mut self, rewards: Arc<RewardConfigStore>) -> Self {
        self.rewards = Some(rewards);
        self
    }

    pub fn strategy(mut self, strategy: Arc<dyn ResolutionStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn attribution_mode(mut self, mode: AttributionMode) -> Self {
        self.attribution_mode = mode;
        self
    }

    pub fn owner_override(mut self, owner: Option<Snowflake>) -> Self {
        self.owner_override = owner;
        self
    }

    /// Build the ServiceContext
    ///
    /// Snapshots default to an empty cache, rewards to an empty policy, and
    /// the strategy to [`FirstIncrease`].
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if the ledger or platform is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let ledger = self
            .ledger
            .ok_or_else(|| ServiceError::validation("ledger is required"))?;
        let platform = self
            .platform
            .ok_or_else(|| ServiceError::validation("platform is required"))?;
        let snapshots = self.snapshots.unwrap_or_else(InviteSnapshotCache::new_shared);
        let rewards = self.rewards.unwrap_or_else(|| {
            Arc::new(RewardConfigStore::new(RewardSource::Inline(String::new())))
        });

        let mut ctx = ServiceContext::new(ledger, platform, snapshots, rewards);
        if let Some(strategy) = self.strategy {
            ctx.strategy = strategy;
        }
        ctx.attribution_mode = self.attribution_mode;
        ctx.owner_override = self.owner_override;
        Ok(ctx)
    }
}
