//! Reward policy - referral-count thresholds mapped to roles

mod config;
mod policy;

pub use config::{parse_reward_config, RewardConfigError, RewardConfigReport};
pub use policy::{RewardDecision, RewardPolicy, RewardTiers};
