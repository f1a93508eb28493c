//! In-process stand-ins for the platform and a failable ledger

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use refcord_core::traits::{InvitePlatform, PlatformResult, ReferralLedger, RepoResult};
use refcord_core::{
    DomainError, InviteDivergence, InviteOptions, JoinEvent, LeaderboardEntry, LiveInvite, Member,
    PlatformError, RecordedUse, Snowflake, TrackedInvite,
};

// ============================================================================
// Fake platform
// ============================================================================

#[derive(Debug, Default)]
struct PlatformState {
    /// Live invites per guild, in listing order
    invites: HashMap<Snowflake, Vec<LiveInvite>>,
    /// channel -> guild
    channels: HashMap<Snowflake, Snowflake>,
    members: HashMap<(Snowflake, Snowflake), Member>,
    forbidden: HashSet<Snowflake>,
    unavailable: HashSet<Snowflake>,
    forbid_create: bool,
    forbid_roles: bool,
    role_grants: Vec<(Snowflake, Snowflake, Snowflake, String)>,
}

/// Chat platform held in memory
///
/// Invites only gain uses when a test calls [`FakePlatform::consume`].
#[derive(Debug)]
pub struct FakePlatform {
    owner: Snowflake,
    state: Mutex<PlatformState>,
    next_code: AtomicU64,
    list_calls: AtomicU64,
    list_delay: Mutex<Option<Duration>>,
}

impl FakePlatform {
    pub fn new(owner: Snowflake) -> Self {
        Self {
            owner,
            state: Mutex::new(PlatformState::default()),
            next_code: AtomicU64::new(1),
            list_calls: AtomicU64::new(0),
            list_delay: Mutex::new(None),
        }
    }

    pub fn shared(owner: Snowflake) -> Arc<Self> {
        Arc::new(Self::new(owner))
    }

    pub fn add_channel(&self, guild_id: Snowflake, channel_id: Snowflake) {
        self.state.lock().channels.insert(channel_id, guild_id);
    }

    pub fn add_invite(&self, guild_id: Snowflake, code: &str, uses: i64) {
        self.state
            .lock()
            .invites
            .entry(guild_id)
            .or_default()
            .push(LiveInvite::new(code, uses).in_guild(guild_id));
    }

    pub fn remove_invite(&self, guild_id: Snowflake, code: &str) {
        if let Some(invites) = self.state.lock().invites.get_mut(&guild_id) {
            invites.retain(|invite| invite.code != code);
        }
    }

    /// Simulate someone joining through `code`
    pub fn consume(&self, guild_id: Snowflake, code: &str) {
        let mut state = self.state.lock();
        let invite = state
            .invites
            .get_mut(&guild_id)
            .and_then(|invites| invites.iter_mut().find(|invite| invite.code == code))
            .unwrap_or_else(|| panic!("no live invite {code} in guild {guild_id}"));
        invite.uses += 1;
    }

    pub fn uses(&self, guild_id: Snowflake, code: &str) -> Option<i64> {
        self.state
            .lock()
            .invites
            .get(&guild_id)
            .and_then(|invites| invites.iter().find(|invite| invite.code == code))
            .map(|invite| invite.uses)
    }

    pub fn add_member(&self, member: Member) {
        self.state
            .lock()
            .members
            .insert((member.guild_id, member.user_id), member);
    }

    /// Deny invite listing (Manage Server missing)
    pub fn set_forbidden(&self, guild_id: Snowflake, forbidden: bool) {
        let mut state = self.state.lock();
        if forbidden {
            state.forbidden.insert(guild_id);
        } else {
            state.forbidden.remove(&guild_id);
        }
    }

    /// Fail invite listing with a transport error
    pub fn set_unavailable(&self, guild_id: Snowflake, unavailable: bool) {
        let mut state = self.state.lock();
        if unavailable {
            state.unavailable.insert(guild_id);
        } else {
            state.unavailable.remove(&guild_id);
        }
    }

    pub fn forbid_invite_creation(&self, forbid: bool) {
        self.state.lock().forbid_create = forbid;
    }

    pub fn forbid_role_grants(&self, forbid: bool) {
        self.state.lock().forbid_roles = forbid;
    }

    /// Hold every invite listing for `delay` before answering
    pub fn set_list_delay(&self, delay: Option<Duration>) {
        *self.list_delay.lock() = delay;
    }

    /// (guild, user, role, reason) for every successful grant, in order
    pub fn role_grants(&self) -> Vec<(Snowflake, Snowflake, Snowflake, String)> {
        self.state.lock().role_grants.clone()
    }

    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InvitePlatform for FakePlatform {
    async fn list_invites(&self, guild_id: Snowflake) -> PlatformResult<Vec<LiveInvite>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.list_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock();
        if state.forbidden.contains(&guild_id) {
            return Err(PlatformError::forbidden("Missing Permissions"));
        }
        if state.unavailable.contains(&guild_id) {
            return Err(PlatformError::Http("connection reset".to_string()));
        }
        Ok(state.invites.get(&guild_id).cloned().unwrap_or_default())
    }

    async fn create_invite(
        &self,
        channel_id: Snowflake,
        options: &InviteOptions,
    ) -> PlatformResult<LiveInvite> {
        let mut state = self.state.lock();
        if state.forbid_create {
            return Err(PlatformError::forbidden("Missing Permissions"));
        }
        let guild_id = *state
            .channels
            .get(&channel_id)
            .ok_or_else(|| PlatformError::not_found(format!("channel {channel_id}")))?;

        let code = format!("inv{}", self.next_code.fetch_add(1, Ordering::SeqCst));
        let mut invite = LiveInvite::new(code, 0).in_guild(guild_id);
        invite.channel_id = Some(channel_id);
        invite.max_uses = options.max_uses;
        invite.max_age = options.max_age_secs;

        state
            .invites
            .entry(guild_id)
            .or_default()
            .push(invite.clone());
        Ok(invite)
    }

    async fn member(&self, guild_id: Snowflake, user_id: Snowflake) -> PlatformResult<Option<Member>> {
        Ok(self.state.lock().members.get(&(guild_id, user_id)).cloned())
    }

    async fn add_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()> {
        let mut state = self.state.lock();
        if state.forbid_roles {
            return Err(PlatformError::forbidden("Missing Permissions"));
        }
        let member = state
            .members
            .get_mut(&(guild_id, user_id))
            .ok_or_else(|| PlatformError::not_found(format!("member {user_id}")))?;
        if !member.has_role(role_id) {
            member.role_ids.push(role_id);
        }
        state
            .role_grants
            .push((guild_id, user_id, role_id, reason.to_string()));
        Ok(())
    }

    async fn application_owner(&self) -> PlatformResult<Snowflake> {
        Ok(self.owner)
    }

    async fn current_guilds(&self) -> PlatformResult<Vec<Snowflake>> {
        let state = self.state.lock();
        let mut guilds: Vec<Snowflake> = state
            .invites
            .keys()
            .chain(state.channels.values())
            .chain(state.forbidden.iter())
            .copied()
            .collect();
        guilds.sort();
        guilds.dedup();
        Ok(guilds)
    }
}

// ============================================================================
// Failable ledger
// ============================================================================

/// Ledger wrapper whose `record_use` can be switched to fail
pub struct FlakyLedger {
    inner: Arc<dyn ReferralLedger>,
    fail_record_use: AtomicBool,
    hang_record_use: AtomicBool,
}

impl FlakyLedger {
    pub fn new(inner: Arc<dyn ReferralLedger>) -> Self {
        Self {
            inner,
            fail_record_use: AtomicBool::new(false),
            hang_record_use: AtomicBool::new(false),
        }
    }

    pub fn fail_record_use(&self, fail: bool) {
        self.fail_record_use.store(fail, Ordering::SeqCst);
    }

    /// Make `record_use` never complete, like a write stuck on a lock
    pub fn hang_record_use(&self, hang: bool) {
        self.hang_record_use.store(hang, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReferralLedger for FlakyLedger {
    async fn register_ownership(
        &self,
        guild_id: Snowflake,
        owner_id: Snowflake,
        code: &str,
    ) -> RepoResult<()> {
        self.inner.register_ownership(guild_id, owner_id, code).await
    }

    async fn record_use(
        &self,
        guild_id: Snowflake,
        code: &str,
        joined_user_id: Snowflake,
    ) -> RepoResult<RecordedUse> {
        if self.hang_record_use.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_record_use.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("database is locked".to_string()));
        }
        self.inner.record_use(guild_id, code, joined_user_id).await
    }

    async fn find_invite(&self, code: &str) -> RepoResult<Option<TrackedInvite>> {
        self.inner.find_invite(code).await
    }

    async fn inviter_of(&self, guild_id: Snowflake, code: &str) -> RepoResult<Option<Snowflake>> {
        self.inner.inviter_of(guild_id, code).await
    }

    async fn total_referrals(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<i64> {
        self.inner.total_referrals(guild_id, user_id).await
    }

    async fn leaderboard(&self, guild_id: Snowflake, limit: u32) -> RepoResult<Vec<LeaderboardEntry>> {
        self.inner.leaderboard(guild_id, limit).await
    }

    async fn join_events(&self, guild_id: Snowflake, code: &str) -> RepoResult<Vec<JoinEvent>> {
        self.inner.join_events(guild_id, code).await
    }

    async fn divergent_invites(&self, guild_id: Snowflake) -> RepoResult<Vec<InviteDivergence>> {
        self.inner.divergent_invites(guild_id).await
    }
}
