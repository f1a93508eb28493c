//! Route definitions
//!
//! Shell-facing routes are mounted under /api/v1; the health check sits at
//! the root.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{events, health, invites, referrals, rewards};
use crate::state::AppState;

/// Create the main API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(events::ingest_event))
        .merge(guild_routes())
        .route("/rewards/reload", post(rewards::reload_rewards))
}

/// Per-guild command routes
fn guild_routes() -> Router<AppState> {
    Router::new()
        // Invites
        .route(
            "/guilds/:guild_id/invites/personal",
            post(invites::create_personal_invite),
        )
        .route(
            "/guilds/:guild_id/invites/public",
            post(invites::create_public_invite),
        )
        // Referrals
        .route(
            "/guilds/:guild_id/referrals/:user_id",
            get(referrals::get_referrals),
        )
        .route("/guilds/:guild_id/leaderboard", get(referrals::get_leaderboard))
        .route("/guilds/:guild_id/audit", get(referrals::get_audit))
}
