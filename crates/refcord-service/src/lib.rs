//! # refcord-service
//!
//! Application layer: snapshot maintenance, join attribution, reward grants,
//! invite commands, and the reward configuration store. Services borrow a
//! shared [`ServiceContext`] that holds the ledger, the platform port, and
//! the in-memory state.

pub mod dto;
pub mod services;

pub use services::{
    Attribution, AttributionService, EventOutcome, EventService, FirstIncrease, GuildLocks,
    InviteService, JoinOutcome, PlatformEvent, ReferralService, RefreshOutcome,
    ResolutionStrategy, RewardConfigStore, RewardOutcome, RewardReload, RewardService, RewardSource,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, SnapshotService,
    WarmUpReport, GENERIC_APOLOGY,
};
