//! Reward tiers and the versioned per-guild policy snapshot

use std::collections::{BTreeMap, HashMap};

use crate::value_objects::Snowflake;

/// Threshold → role mapping for one guild
///
/// Thresholds are referral counts; a tier is reached when the inviter's
/// total is greater than or equal to its threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardTiers {
    tiers: BTreeMap<u64, Snowflake>,
}

/// Outcome of evaluating a referral total against a guild's tiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardDecision {
    /// Role of the highest reached tier
    pub current: Option<Snowflake>,
    /// Roles of every reached tier, ascending by threshold
    pub eligible: Vec<Snowflake>,
}

impl RewardTiers {
    /// Create an empty set of tiers
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tier, replacing any role already mapped to the threshold
    pub fn insert(&mut self, threshold: u64, role_id: Snowflake) {
        self.tiers.insert(threshold, role_id);
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with_tier(mut self, threshold: u64, role_id: Snowflake) -> Self {
        self.insert(threshold, role_id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Iterate tiers ascending by threshold
    pub fn iter(&self) -> impl Iterator<Item = (u64, Snowflake)> + '_ {
        self.tiers.iter().map(|(threshold, role)| (*threshold, *role))
    }

    /// Evaluate a referral total
    pub fn evaluate(&self, total: i64) -> RewardDecision {
        let Ok(total) = u64::try_from(total) else {
            return RewardDecision::default();
        };

        let eligible: Vec<Snowflake> = self.tiers.range(..=total).map(|(_, role)| *role).collect();

        RewardDecision {
            current: eligible.last().copied(),
            eligible,
        }
    }

    /// Role of the highest threshold not above `total`
    pub fn next_role(&self, total: i64) -> Option<Snowflake> {
        let total = u64::try_from(total).ok()?;
        self.tiers.range(..=total).next_back().map(|(_, role)| *role)
    }
}

impl FromIterator<(u64, Snowflake)> for RewardTiers {
    fn from_iter<I: IntoIterator<Item = (u64, Snowflake)>>(iter: I) -> Self {
        Self {
            tiers: iter.into_iter().collect(),
        }
    }
}

/// Immutable, versioned snapshot of every guild's reward tiers
///
/// A reload builds a new snapshot and swaps it in whole; readers holding the
/// previous one keep a consistent view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardPolicy {
    version: u64,
    guilds: HashMap<Snowflake, RewardTiers>,
}

impl RewardPolicy {
    /// Policy with no tiers anywhere (version 0)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a policy from per-guild tiers; guilds with no tiers are skipped
    pub fn new(version: u64, guilds: HashMap<Snowflake, RewardTiers>) -> Self {
        Self {
            version,
            guilds: guilds.into_iter().filter(|(_, tiers)| !tiers.is_empty()).collect(),
        }
    }

    /// Same tiers under a different version number
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of guilds with at least one tier
    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }

    /// Tiers configured for a guild
    pub fn tiers(&self, guild_id: Snowflake) -> Option<&RewardTiers> {
        self.guilds.get(&guild_id)
    }

    /// Evaluate a referral total in a guild
    pub fn evaluate(&self, guild_id: Snowflake, total: i64) -> RewardDecision {
        self.tiers(guild_id)
            .map(|tiers| tiers.evaluate(total))
            .unwrap_or_default()
    }

    /// Single current-tier role for a referral total, if any
    pub fn next_role(&self, guild_id: Snowflake, total: i64) -> Option<Snowflake> {
        self.tiers(guild_id).and_then(|tiers| tiers.next_role(total))
    }
}
