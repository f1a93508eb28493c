//! End-to-end engine tests
//!
//! Services run over the in-process platform fake and a private in-memory
//! ledger; no network or external services are needed.
//!
//! Run with: cargo test -p integration-tests --test engine_tests

use std::io::Write;
use std::time::Duration;

use integration_tests::{EngineOptions, TestEngine, CHANNEL, GUILD, OWNER};
use refcord_core::traits::ReferralLedger;
use refcord_core::{Permissions, Snowflake};
use refcord_service::dto::CreatePublicInviteRequest;
use refcord_service::{
    EventOutcome, EventService, InviteService, JoinOutcome, PlatformEvent, ReferralService,
    RefreshOutcome, RewardOutcome, RewardService, RewardSource, SnapshotService,
};

const ALICE: Snowflake = Snowflake::new(2);
const BOB: Snowflake = Snowflake::new(3);
const CAROL: Snowflake = Snowflake::new(4);

const BRONZE: Snowflake = Snowflake::new(500);
const SILVER: Snowflake = Snowflake::new(501);

fn newcomer(n: i64) -> Snowflake {
    Snowflake::new(10_000 + n)
}

fn attributed_to(outcome: &JoinOutcome) -> Option<(&str, Option<Snowflake>)> {
    match outcome {
        JoinOutcome::Attributed {
            code, inviter_id, ..
        } => Some((code.as_str(), *inviter_id)),
        JoinOutcome::Unattributed => None,
    }
}

// ============================================================================
// Attribution
// ============================================================================

#[tokio::test]
async fn test_join_via_personal_invite_is_credited() {
    let engine = TestEngine::start().await.unwrap();
    engine.member(ALICE, "alice");
    let code = engine.personal_invite(ALICE).await.unwrap();

    let outcome = engine.join_via(&code, newcomer(1)).await.unwrap();

    assert_eq!(
        outcome,
        JoinOutcome::Attributed {
            code: code.clone(),
            inviter_id: Some(ALICE),
            total: Some(1),
            reward: Some(RewardOutcome::NoTier),
        }
    );
    let invite = engine.ledger.find_invite(&code).await.unwrap().unwrap();
    assert_eq!(invite.uses, 1);
    assert_eq!(engine.snapshots.uses(GUILD, &code), Some(1));
}

#[tokio::test]
async fn test_join_picks_the_invite_that_increased() {
    let engine = TestEngine::start().await.unwrap();
    engine.platform.add_invite(GUILD, "A", 5);
    engine.platform.add_invite(GUILD, "B", 2);
    engine.ledger.register_ownership(GUILD, ALICE, "A").await.unwrap();
    engine.ledger.register_ownership(GUILD, BOB, "B").await.unwrap();
    engine.refresh().await;

    let outcome = engine.join_via("B", newcomer(1)).await.unwrap();

    assert_eq!(attributed_to(&outcome), Some(("B", Some(BOB))));
    assert_eq!(engine.ledger.total_referrals(GUILD, BOB).await.unwrap(), 1);
    assert_eq!(engine.ledger.total_referrals(GUILD, ALICE).await.unwrap(), 0);
}

#[tokio::test]
async fn test_join_without_increase_is_unattributed() {
    let engine = TestEngine::start().await.unwrap();
    engine.platform.add_invite(GUILD, "A", 5);
    engine.ledger.register_ownership(GUILD, ALICE, "A").await.unwrap();
    engine.refresh().await;

    let outcome = engine.join(newcomer(1)).await.unwrap();

    assert_eq!(outcome, JoinOutcome::Unattributed);
    assert!(engine.ledger.join_events(GUILD, "A").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_uncached_invite_counts_from_zero() {
    let engine = TestEngine::start().await.unwrap();
    engine.refresh().await;
    // created without an invite-created event reaching us
    engine.platform.add_invite(GUILD, "fresh", 0);

    let outcome = engine.join_via("fresh", newcomer(1)).await.unwrap();

    assert_eq!(
        outcome,
        JoinOutcome::Attributed {
            code: "fresh".to_string(),
            inviter_id: None,
            total: None,
            reward: None,
        }
    );
    let events = engine.ledger.join_events(GUILD, "fresh").await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].joined_user_id, newcomer(1));
}

#[tokio::test]
async fn test_each_join_is_recorded_once() {
    let engine = TestEngine::start().await.unwrap();
    let code = engine.personal_invite(ALICE).await.unwrap();

    for n in 1..=3 {
        engine.join_via(&code, newcomer(n)).await.unwrap();
    }
    // a duplicate delivery of the last join finds nothing new
    let duplicate = engine.join(newcomer(3)).await.unwrap();

    assert_eq!(duplicate, JoinOutcome::Unattributed);
    assert_eq!(engine.ledger.total_referrals(GUILD, ALICE).await.unwrap(), 3);
    assert_eq!(engine.ledger.join_events(GUILD, &code).await.unwrap().len(), 3);
    assert!(engine.ledger.divergent_invites(GUILD).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_public_invite_is_not_credited() {
    let engine = TestEngine::start().await.unwrap();
    let response = InviteService::new(&engine.ctx)
        .create_public_invite(
            GUILD,
            CreatePublicInviteRequest {
                user_id: ALICE,
                channel_id: CHANNEL,
                max_uses: 10,
                max_age_minutes: 60,
                permissions: Permissions::CREATE_INSTANT_INVITE,
            },
        )
        .await
        .unwrap();
    assert!(!response.tracked);

    let outcome = engine.join_via(&response.code, newcomer(1)).await.unwrap();

    assert_eq!(attributed_to(&outcome), Some((response.code.as_str(), None)));
    assert_eq!(engine.ledger.total_referrals(GUILD, ALICE).await.unwrap(), 0);
}

// ============================================================================
// Degraded operation
// ============================================================================

#[tokio::test]
async fn test_forbidden_listing_on_join_leaves_snapshot() {
    let engine = TestEngine::start().await.unwrap();
    let code = engine.personal_invite(ALICE).await.unwrap();
    engine.platform.set_forbidden(GUILD, true);

    let outcome = engine.join_via(&code, newcomer(1)).await.unwrap();

    assert_eq!(outcome, JoinOutcome::Unattributed);
    assert_eq!(engine.snapshots.uses(GUILD, &code), Some(0));
    assert_eq!(engine.ledger.total_referrals(GUILD, ALICE).await.unwrap(), 0);
}

#[tokio::test]
async fn test_forbidden_refresh_degrades_guild() {
    let engine = TestEngine::start().await.unwrap();
    engine.platform.add_invite(GUILD, "A", 1);
    assert_eq!(engine.refresh().await, RefreshOutcome::Refreshed { invites: 1 });

    engine.platform.set_forbidden(GUILD, true);

    assert_eq!(engine.refresh().await, RefreshOutcome::Degraded);
    assert!(engine.snapshots.contains_guild(GUILD));
    assert_eq!(engine.snapshots.uses(GUILD, "A"), None);
}

#[tokio::test]
async fn test_transient_refresh_failure_keeps_snapshot() {
    let engine = TestEngine::start().await.unwrap();
    engine.platform.add_invite(GUILD, "A", 4);
    engine.refresh().await;
    engine.platform.set_unavailable(GUILD, true);

    assert_eq!(engine.refresh().await, RefreshOutcome::Unchanged);
    assert_eq!(engine.snapshots.uses(GUILD, "A"), Some(4));
}

#[tokio::test]
async fn test_storage_failure_allows_redelivery() {
    let engine = TestEngine::start().await.unwrap();
    let code = engine.personal_invite(ALICE).await.unwrap();
    engine.ledger.fail_record_use(true);

    let err = engine.join_via(&code, newcomer(1)).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.error_code(), "STORAGE_UNAVAILABLE");
    assert_eq!(engine.snapshots.uses(GUILD, &code), Some(0));

    engine.ledger.fail_record_use(false);
    let outcome = engine.join(newcomer(1)).await.unwrap();

    assert_eq!(attributed_to(&outcome), Some((code.as_str(), Some(ALICE))));
    assert_eq!(engine.ledger.total_referrals(GUILD, ALICE).await.unwrap(), 1);
}

#[tokio::test]
async fn test_cancelled_join_allows_redelivery() {
    let engine = TestEngine::start().await.unwrap();
    let code = engine.personal_invite(ALICE).await.unwrap();
    engine.ledger.hang_record_use(true);

    let first = tokio::time::timeout(
        Duration::from_millis(50),
        engine.join_via(&code, newcomer(1)),
    )
    .await;
    assert!(first.is_err());
    assert_eq!(engine.snapshots.uses(GUILD, &code), Some(0));

    engine.ledger.hang_record_use(false);
    let outcome = engine.join(newcomer(1)).await.unwrap();

    assert_eq!(attributed_to(&outcome), Some((code.as_str(), Some(ALICE))));
    assert_eq!(engine.ledger.total_referrals(GUILD, ALICE).await.unwrap(), 1);
}

#[tokio::test]
async fn test_serialized_mode_attributes_one_use_once() {
    let engine = TestEngine::start_with(EngineOptions::default().serialized())
        .await
        .unwrap();
    let code = engine.personal_invite(ALICE).await.unwrap();
    engine.platform.consume(GUILD, &code);
    engine.platform.set_list_delay(Some(Duration::from_millis(20)));

    let (first, second) = tokio::join!(engine.join(newcomer(1)), engine.join(newcomer(2)));
    let outcomes = [first.unwrap(), second.unwrap()];

    let attributed = outcomes
        .iter()
        .filter(|outcome| attributed_to(outcome).is_some())
        .count();
    assert_eq!(attributed, 1);
    assert_eq!(engine.ledger.total_referrals(GUILD, ALICE).await.unwrap(), 1);
    assert_eq!(engine.ctx.guild_locks().len(), 1);
}

// ============================================================================
// Rewards
// ============================================================================

fn tiered_engine_options() -> EngineOptions {
    EngineOptions::default().with_rewards_json(format!(
        r#"{{"{GUILD}": {{"1": "{BRONZE}", "3": {SILVER}}}}}"#
    ))
}

#[tokio::test]
async fn test_reward_tiers_granted_once() {
    let engine = TestEngine::start_with(tiered_engine_options()).await.unwrap();
    engine.member(ALICE, "alice");
    let code = engine.personal_invite(ALICE).await.unwrap();

    let mut rewards = Vec::new();
    for n in 1..=4 {
        match engine.join_via(&code, newcomer(n)).await.unwrap() {
            JoinOutcome::Attributed { reward, .. } => rewards.push(reward),
            JoinOutcome::Unattributed => panic!("join {n} was not attributed"),
        }
    }

    assert_eq!(
        rewards,
        vec![
            Some(RewardOutcome::Granted { role_id: BRONZE }),
            Some(RewardOutcome::AlreadyHeld { role_id: BRONZE }),
            Some(RewardOutcome::Granted { role_id: SILVER }),
            Some(RewardOutcome::AlreadyHeld { role_id: SILVER }),
        ]
    );

    let grants = engine.platform.role_grants();
    assert_eq!(grants.len(), 2);
    assert_eq!(grants[0].3, "RefCord: 1 referrals");
    assert_eq!(grants[1].2, SILVER);
}

#[tokio::test]
async fn test_reward_for_departed_inviter() {
    let engine = TestEngine::start_with(tiered_engine_options()).await.unwrap();
    let code = engine.personal_invite(ALICE).await.unwrap();

    let outcome = engine.join_via(&code, newcomer(1)).await.unwrap();

    assert!(matches!(
        outcome,
        JoinOutcome::Attributed {
            total: Some(1),
            reward: Some(RewardOutcome::MemberMissing { role_id: BRONZE }),
            ..
        }
    ));
    assert!(engine.platform.role_grants().is_empty());
}

#[tokio::test]
async fn test_forbidden_grant_is_retried_on_lookup() {
    let engine = TestEngine::start_with(tiered_engine_options()).await.unwrap();
    engine.member(ALICE, "alice");
    engine.platform.forbid_role_grants(true);
    let code = engine.personal_invite(ALICE).await.unwrap();

    let outcome = engine.join_via(&code, newcomer(1)).await.unwrap();
    assert!(matches!(
        outcome,
        JoinOutcome::Attributed {
            reward: Some(RewardOutcome::Failed { role_id: BRONZE }),
            ..
        }
    ));
    assert_eq!(engine.ledger.total_referrals(GUILD, ALICE).await.unwrap(), 1);

    engine.platform.forbid_role_grants(false);
    let summary = ReferralService::new(&engine.ctx)
        .my_total(GUILD, ALICE)
        .await
        .unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.current_role, Some(BRONZE));
    assert_eq!(summary.reward, RewardOutcome::Granted { role_id: BRONZE });
    assert_eq!(summary.message, "You have **1** referral(s).");
}

#[tokio::test]
async fn test_reload_is_owner_only_and_keeps_policy_on_failure() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"{GUILD}": {{"1": {BRONZE}}}}}"#).unwrap();
    let options = EngineOptions {
        rewards: RewardSource::File(file.path().to_path_buf()),
        ..EngineOptions::default()
    };
    let engine = TestEngine::start_with(options).await.unwrap();
    let service = RewardService::new(&engine.ctx);

    let err = service.reload(ALICE).await.unwrap_err();
    assert_eq!(err.error_code(), "OWNER_ONLY");
    assert_eq!(err.user_message(), "Owner only.");

    std::fs::write(file.path(), format!(r#"{{"{GUILD}": {{"2": {SILVER}}}}}"#)).unwrap();
    let reload = service.reload(OWNER).await.unwrap();
    assert_eq!(reload.version, 2);
    assert_eq!(reload.guilds, 1);
    assert_eq!(engine.ctx.rewards().policy().next_role(GUILD, 2), Some(SILVER));

    std::fs::write(file.path(), "[]").unwrap();
    let err = service.reload(OWNER).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_REWARD_CONFIG");
    assert_eq!(engine.ctx.rewards().version(), 2);
    assert_eq!(engine.ctx.rewards().policy().next_role(GUILD, 2), Some(SILVER));
}

// ============================================================================
// Leaderboard
// ============================================================================

#[tokio::test]
async fn test_leaderboard_orders_and_names() {
    let engine = TestEngine::start().await.unwrap();
    engine.member(ALICE, "alice");
    engine.member(CAROL, "carol");
    let alice = engine.personal_invite(ALICE).await.unwrap();
    let bob = engine.personal_invite(BOB).await.unwrap();
    let carol = engine.personal_invite(CAROL).await.unwrap();

    engine.join_via(&bob, newcomer(1)).await.unwrap();
    engine.join_via(&bob, newcomer(2)).await.unwrap();
    engine.join_via(&alice, newcomer(3)).await.unwrap();
    engine.join_via(&alice, newcomer(4)).await.unwrap();
    engine.join_via(&carol, newcomer(5)).await.unwrap();

    let board = ReferralService::new(&engine.ctx)
        .leaderboard(GUILD, 10)
        .await
        .unwrap();

    let names: Vec<_> = board.entries.iter().map(|e| e.display_name.as_str()).collect();
    assert_eq!(names, vec!["alice", "User(3)", "carol"]);
    assert_eq!(
        board.description,
        "🥇 **alice** - 2 referral(s)\n🥈 **User(3)** - 2 referral(s)\n🥉 **carol** - 1 referral(s)"
    );

    let top = ReferralService::new(&engine.ctx)
        .leaderboard(GUILD, 1)
        .await
        .unwrap();
    assert_eq!(top.entries.len(), 1);
}

#[tokio::test]
async fn test_leaderboard_limit_bounds() {
    let engine = TestEngine::start().await.unwrap();
    let service = ReferralService::new(&engine.ctx);

    for limit in [0, 26] {
        let err = service.leaderboard(GUILD, limit).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    let empty = service.leaderboard(GUILD, 25).await.unwrap();
    assert_eq!(empty.description, "No referral data yet.");
}

// ============================================================================
// Event dispatch
// ============================================================================

#[tokio::test]
async fn test_events_keep_snapshot_current() {
    let engine = TestEngine::start().await.unwrap();
    engine.platform.add_invite(GUILD, "A", 3);
    let events = EventService::new(&engine.ctx);

    let outcome = events
        .dispatch(PlatformEvent::GuildAvailable { guild_id: GUILD })
        .await
        .unwrap();
    assert_eq!(
        outcome,
        EventOutcome::SnapshotRefreshed(RefreshOutcome::Refreshed { invites: 1 })
    );

    events
        .dispatch(PlatformEvent::InviteCreated {
            guild_id: GUILD,
            code: "B".to_string(),
            uses: 0,
        })
        .await
        .unwrap();
    assert_eq!(engine.snapshots.uses(GUILD, "B"), Some(0));

    events
        .dispatch(PlatformEvent::InviteDeleted {
            guild_id: GUILD,
            code: "A".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(engine.snapshots.uses(GUILD, "A"), None);

    engine.platform.remove_invite(GUILD, "A");
    engine.platform.add_invite(GUILD, "B", 0);
    engine.ledger.register_ownership(GUILD, BOB, "B").await.unwrap();
    engine.platform.consume(GUILD, "B");

    let outcome = events
        .dispatch(PlatformEvent::MemberJoined {
            guild_id: GUILD,
            user_id: newcomer(1),
        })
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        EventOutcome::Join(JoinOutcome::Attributed {
            inviter_id: Some(BOB),
            ..
        })
    ));
}

#[tokio::test]
async fn test_warm_up_refreshes_every_guild() {
    let engine = TestEngine::start().await.unwrap();
    let other = Snowflake::new(200);
    engine.platform.add_invite(GUILD, "A", 1);
    engine.platform.add_invite(other, "B", 1);
    engine.platform.set_forbidden(other, true);

    let report = SnapshotService::new(&engine.ctx).warm_up().await.unwrap();

    assert_eq!(report.guilds, 2);
    assert_eq!(report.refreshed, 1);
    assert_eq!(report.degraded, 1);
    assert_eq!(engine.snapshots.uses(GUILD, "A"), Some(1));
}
