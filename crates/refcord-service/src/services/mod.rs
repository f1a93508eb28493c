//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] for the duration of one
//! use case. Services are cheap to construct; create one per call.

pub mod attribution;
pub mod context;
pub mod error;
pub mod events;
pub mod invite;
pub mod referral;
pub mod rewards;
pub mod snapshot;

pub use attribution::{Attribution, AttributionService, FirstIncrease, GuildLocks, ResolutionStrategy};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult, GENERIC_APOLOGY};
pub use events::{EventOutcome, EventService, PlatformEvent};
pub use invite::InviteService;
pub use referral::{JoinOutcome, ReferralService, RewardOutcome};
pub use rewards::{RewardConfigStore, RewardReload, RewardService, RewardSource};
pub use snapshot::{RefreshOutcome, SnapshotService, WarmUpReport};
