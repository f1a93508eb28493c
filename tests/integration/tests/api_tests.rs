//! API integration tests
//!
//! Each test serves a fresh engine (fake platform, in-memory ledger) on an
//! ephemeral local port and talks to it over HTTP.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{json_body, TestEngine, TestServer, GUILD};
use refcord_core::traits::ReferralLedger;
use reqwest::StatusCode;
use serde_json::json;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/health").await.unwrap();
    let body = json_body(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["message"], "🏓 Pong!");
}

// ============================================================================
// Shell Auth Tests
// ============================================================================

#[tokio::test]
async fn test_events_require_shell_token() {
    let engine = TestEngine::start().await.unwrap();
    let server = TestServer::start_with(engine, Some("secret")).await.unwrap();
    let event = json!({"type": "guild_available", "guild_id": GUILD.to_string()});

    let response = server.post_as("/api/v1/events", None, &event).await.unwrap();
    let body = json_body(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body["error"]["code"], "MISSING_AUTHORIZATION");

    let response = server
        .post_as("/api/v1/events", Some("wrong"), &event)
        .await
        .unwrap();
    let body = json_body(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");

    let response = server.post("/api/v1/events", &event).await.unwrap();
    json_body(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Event Ingestion Tests
// ============================================================================

#[tokio::test]
async fn test_member_join_event_is_attributed() {
    let server = TestServer::start().await.unwrap();
    server.engine.platform.add_invite(GUILD, "abc", 4);

    let response = server
        .post(
            "/api/v1/events",
            &json!({"type": "guild_available", "guild_id": GUILD.to_string()}),
        )
        .await
        .unwrap();
    let body = json_body(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["event"], "snapshot_refreshed");
    assert_eq!(body["result"]["status"], "refreshed");
    assert_eq!(body["result"]["invites"], 1);

    server.engine.platform.consume(GUILD, "abc");
    let response = server
        .post(
            "/api/v1/events",
            &json!({"type": "member_joined", "guild_id": GUILD.to_string(), "user_id": "900"}),
        )
        .await
        .unwrap();
    let body = json_body(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["event"], "join");
    assert_eq!(body["result"]["status"], "attributed");
    assert_eq!(body["result"]["code"], "abc");
    assert!(body["result"]["inviter_id"].is_null());
}

#[tokio::test]
async fn test_unknown_event_rejected() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .post("/api/v1/events", &json!({"type": "message_created", "guild_id": "1"}))
        .await
        .unwrap();
    let body = json_body(response, StatusCode::BAD_REQUEST).await.unwrap();

    assert_eq!(body["error"]["code"], "INVALID_BODY");
}

#[tokio::test]
async fn test_storage_failure_is_retryable() {
    let server = TestServer::start().await.unwrap();
    let code = server.engine.personal_invite(integration_tests::OWNER).await.unwrap();
    server.engine.ledger.fail_record_use(true);
    server.engine.platform.consume(GUILD, &code);

    let join = json!({"type": "member_joined", "guild_id": GUILD.to_string(), "user_id": "900"});
    let response = server.post("/api/v1/events", &join).await.unwrap();
    let body = json_body(response, StatusCode::SERVICE_UNAVAILABLE)
        .await
        .unwrap();
    assert_eq!(body["error"]["code"], "STORAGE_UNAVAILABLE");
    assert_eq!(body["error"]["message"], "❌ Error while processing your command.");

    server.engine.ledger.fail_record_use(false);
    let response = server.post("/api/v1/events", &join).await.unwrap();
    let body = json_body(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["result"]["status"], "attributed");
    assert_eq!(body["result"]["total"], 1);
}

// ============================================================================
// Invite Command Tests
// ============================================================================

#[tokio::test]
async fn test_create_personal_invite() {
    let server = TestServer::start().await.unwrap();
    let path = format!("/api/v1/guilds/{GUILD}/invites/personal");

    let response = server
        .post(
            &path,
            &json!({"user_id": "2", "channel_id": "110", "max_uses": 5, "user_tag": "alice"}),
        )
        .await
        .unwrap();
    let body = json_body(response, StatusCode::CREATED).await.unwrap();

    let code = body["code"].as_str().unwrap().to_string();
    assert_eq!(body["tracked"], true);
    assert_eq!(body["url"], format!("https://discord.gg/{code}"));
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("✅ Your personal invite:"));
    assert!(message.contains("- Max uses: 5"));
    assert!(message.contains("- Expires: Never"));

    let owner = server.engine.ctx.ledger().inviter_of(GUILD, &code).await.unwrap();
    assert_eq!(owner, Some(refcord_core::Snowflake::new(2)));
}

#[tokio::test]
async fn test_personal_invite_limits_validated() {
    let server = TestServer::start().await.unwrap();
    let path = format!("/api/v1/guilds/{GUILD}/invites/personal");

    let response = server
        .post(&path, &json!({"user_id": "2", "channel_id": "110", "max_uses": 1001}))
        .await
        .unwrap();
    let body = json_body(response, StatusCode::BAD_REQUEST).await.unwrap();

    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Max uses must be between 0 and 1000");
    assert_eq!(server.engine.platform.list_calls(), 0);
}

#[tokio::test]
async fn test_bot_without_create_invite() {
    let server = TestServer::start().await.unwrap();
    server.engine.platform.forbid_invite_creation(true);

    let response = server
        .post(
            &format!("/api/v1/guilds/{GUILD}/invites/personal"),
            &json!({"user_id": "2", "channel_id": "110"}),
        )
        .await
        .unwrap();
    let body = json_body(response, StatusCode::FORBIDDEN).await.unwrap();

    assert_eq!(body["error"]["code"], "BOT_MISSING_PERMISSIONS");
    assert_eq!(body["error"]["message"], "I need **Create Invite** in that channel.");
}

#[tokio::test]
async fn test_public_invite_requires_permission() {
    let server = TestServer::start().await.unwrap();
    let path = format!("/api/v1/guilds/{GUILD}/invites/public");

    let response = server
        .post(&path, &json!({"user_id": "2", "channel_id": "110", "permissions": "0"}))
        .await
        .unwrap();
    let body = json_body(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(
        body["error"]["message"],
        "You need the **Create Invite** permission."
    );

    // Administrator implies every permission
    let response = server
        .post(&path, &json!({"user_id": "2", "channel_id": "110", "permissions": "8"}))
        .await
        .unwrap();
    let body = json_body(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(body["tracked"], false);
    assert!(body["message"].as_str().unwrap().starts_with("🔗 Public invite created:"));
}

#[tokio::test]
async fn test_invalid_guild_path() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/api/v1/guilds/abc/leaderboard").await.unwrap();
    let body = json_body(response, StatusCode::BAD_REQUEST).await.unwrap();

    assert_eq!(body["error"]["code"], "INVALID_PATH_PARAMETER");
}

// ============================================================================
// Referral Query Tests
// ============================================================================

#[tokio::test]
async fn test_referral_total() {
    let server = TestServer::start().await.unwrap();
    let code = server.engine.personal_invite(refcord_core::Snowflake::new(2)).await.unwrap();
    server
        .engine
        .join_via(&code, refcord_core::Snowflake::new(900))
        .await
        .unwrap();

    let response = server
        .get(&format!("/api/v1/guilds/{GUILD}/referrals/2"))
        .await
        .unwrap();
    let body = json_body(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["total"], 1);
    assert_eq!(body["user_id"], "2");
    assert_eq!(body["message"], "You have **1** referral(s).");
    assert_eq!(body["reward"]["status"], "no_tier");
}

#[tokio::test]
async fn test_leaderboard_limits() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .get(&format!("/api/v1/guilds/{GUILD}/leaderboard"))
        .await
        .unwrap();
    let body = json_body(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["title"], "🏆 Referral Leaderboard");
    assert_eq!(body["description"], "No referral data yet.");

    let response = server
        .get(&format!("/api/v1/guilds/{GUILD}/leaderboard?limit=26"))
        .await
        .unwrap();
    let body = json_body(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"]["message"], "Limit must be between 1 and 25");
}

#[tokio::test]
async fn test_audit_of_consistent_ledger() {
    let server = TestServer::start().await.unwrap();
    let code = server.engine.personal_invite(refcord_core::Snowflake::new(2)).await.unwrap();
    server
        .engine
        .join_via(&code, refcord_core::Snowflake::new(900))
        .await
        .unwrap();

    let response = server
        .get(&format!("/api/v1/guilds/{GUILD}/audit"))
        .await
        .unwrap();
    let body = json_body(response, StatusCode::OK).await.unwrap();

    assert_eq!(body, json!([]));
}

// ============================================================================
// Reward Reload Tests
// ============================================================================

#[tokio::test]
async fn test_reload_rewards_owner_only() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .post("/api/v1/rewards/reload", &json!({"user_id": "2"}))
        .await
        .unwrap();
    let body = json_body(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body["error"]["code"], "OWNER_ONLY");
    assert_eq!(body["error"]["message"], "Owner only.");

    let response = server
        .post(
            "/api/v1/rewards/reload",
            &json!({"user_id": integration_tests::OWNER.to_string()}),
        )
        .await
        .unwrap();
    let body = json_body(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["version"], 2);
    assert_eq!(body["message"], "✅ Reward config v2 loaded for 0 guild(s).");
}
