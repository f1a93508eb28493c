//! Reward configuration store and the owner-only reload command
//!
//! The active [`RewardPolicy`] is an immutable, versioned snapshot. Readers
//! clone the `Arc` and never block a reload for longer than the pointer
//! swap; a reload that fails to parse leaves the previous snapshot active.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use refcord_common::{RewardsConfig, REWARDS_ENV_VAR};
use refcord_core::{parse_reward_config, RewardConfigError, RewardPolicy, Snowflake};
use tracing::{error, info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Where the reward JSON comes from
#[derive(Clone, PartialEq, Eq)]
pub enum RewardSource {
    /// A JSON file, re-read on every reload
    File(PathBuf),
    /// An environment variable, with a value to use when it is unset
    Env {
        var: &'static str,
        fallback: Option<String>,
    },
    /// Fixed JSON text
    Inline(String),
}

impl RewardSource {
    /// File when configured, otherwise the reward environment variable
    pub fn from_config(config: &RewardsConfig) -> Self {
        match &config.file {
            Some(path) => Self::File(path.clone()),
            None => Self::Env {
                var: REWARDS_ENV_VAR,
                fallback: config.inline_json.clone(),
            },
        }
    }

    /// Read the raw JSON text (empty when nothing is configured)
    pub fn read(&self) -> Result<String, RewardConfigError> {
        match self {
            Self::File(path) => std::fs::read_to_string(path)
                .map_err(|e| RewardConfigError::Unreadable(format!("{}: {e}", path.display()))),
            Self::Env { var, fallback } => Ok(std::env::var(var)
                .ok()
                .or_else(|| fallback.clone())
                .unwrap_or_default()),
            Self::Inline(raw) => Ok(raw.clone()),
        }
    }
}

impl fmt::Debug for RewardSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Env { var, .. } => f.debug_tuple("Env").field(var).finish(),
            Self::Inline(raw) => f.debug_tuple("Inline").field(&raw.len()).finish(),
        }
    }
}

/// Summary of a successful reload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardReload {
    pub version: u64,
    pub guilds: usize,
    /// Guilds dropped because of an invalid entry
    pub rejected: Vec<RewardConfigError>,
}

/// Holder of the active reward policy
#[derive(Debug)]
pub struct RewardConfigStore {
    source: RewardSource,
    current: RwLock<Arc<RewardPolicy>>,
}

impl RewardConfigStore {
    /// Create a store with an empty policy (version 0)
    pub fn new(source: RewardSource) -> Self {
        Self {
            source,
            current: RwLock::new(Arc::new(RewardPolicy::empty())),
        }
    }

    /// Create a store that starts from a given policy
    pub fn with_policy(source: RewardSource, policy: RewardPolicy) -> Self {
        Self {
            source,
            current: RwLock::new(Arc::new(policy)),
        }
    }

    /// Create a store and load the source once
    ///
    /// A source that cannot be read or parsed is logged and the store starts
    /// with no rewards configured.
    pub fn load(source: RewardSource) -> Self {
        let store = Self::new(source);
        if let Err(e) = store.reload() {
            error!(error = %e, source = ?store.source, "Reward config not loaded; no rewards active");
        }
        store
    }

    /// Active policy snapshot
    pub fn policy(&self) -> Arc<RewardPolicy> {
        Arc::clone(&self.current.read())
    }

    /// Version of the active policy
    pub fn version(&self) -> u64 {
        self.current.read().version()
    }

    pub fn source(&self) -> &RewardSource {
        &self.source
    }

    /// Re-read and re-parse the source, then swap in the new policy
    pub fn reload(&self) -> Result<RewardReload, RewardConfigError> {
        let raw = self.source.read()?;
        let report = parse_reward_config(&raw)?;

        for rejected in &report.rejected {
            warn!(error = %rejected, "Reward config entry dropped");
        }
        let rejected = report.rejected.clone();

        let mut current = self.current.write();
        let policy = Arc::new(report.into_policy(current.version() + 1));
        *current = Arc::clone(&policy);
        drop(current);

        info!(
            version = policy.version(),
            guilds = policy.guild_count(),
            rejected = rejected.len(),
            "Reward config loaded"
        );

        Ok(RewardReload {
            version: policy.version(),
            guilds: policy.guild_count(),
            rejected,
        })
    }
}

/// Reward service (privileged configuration commands)
pub struct RewardService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RewardService<'a> {
    /// Create a new RewardService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Reload the reward configuration on behalf of `requester`
    ///
    /// Only the application owner may reload. A parse failure keeps the
    /// previous policy active and is returned to the caller.
    #[instrument(skip(self))]
    pub async fn reload(&self, requester: Snowflake) -> ServiceResult<RewardReload> {
        let owner = self.owner().await?;
        if requester != owner {
            warn!(user_id = %requester, "Reward reload refused: not the application owner");
            return Err(refcord_core::DomainError::NotApplicationOwner.into());
        }

        self.ctx.rewards().reload().map_err(|e| {
            error!(error = %e, "Reward reload failed; previous config kept");
            ServiceError::from(e)
        })
    }

    /// Configured owner override, else the platform's application owner
    async fn owner(&self) -> ServiceResult<Snowflake> {
        if let Some(owner) = self.ctx.owner_override() {
            return Ok(owner);
        }
        Ok(self.ctx.platform().application_owner().await?)
    }
}
