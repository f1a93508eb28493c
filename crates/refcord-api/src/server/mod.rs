//! Server setup and initialization
//!
//! Startup order: ledger connection and schema, reward policy, platform
//! client, invite snapshot warm-up, then the listener.

use std::sync::Arc;

use axum::Router;
use refcord_cache::InviteSnapshotCache;
use refcord_common::{AppConfig, AppError};
use refcord_core::Snowflake;
use refcord_db::{create_pool, run_migrations, SqliteReferralLedger};
use refcord_platform::{DiscordHttpConfig, DiscordHttpPlatform};
use refcord_service::{RewardConfigStore, RewardSource, ServiceContextBuilder, SnapshotService};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = create_router();
    let router = apply_middleware(router);
    router.with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!(url = %config.database.url, "Opening referral ledger...");
    let pool = create_pool(&refcord_db::DatabaseConfig::from(&config.database))
        .await
        .map_err(AppError::database)?;
    run_migrations(&pool).await.map_err(AppError::database)?;
    info!("Referral ledger ready");

    let rewards = Arc::new(RewardConfigStore::load(RewardSource::from_config(
        &config.rewards,
    )));

    let platform = DiscordHttpPlatform::new(DiscordHttpConfig::from(&config.discord))
        .map_err(AppError::platform)?;

    let service_context = ServiceContextBuilder::new()
        .ledger(Arc::new(SqliteReferralLedger::new(pool)))
        .platform(Arc::new(platform))
        .snapshots(InviteSnapshotCache::new_shared())
        .rewards(rewards)
        .attribution_mode(config.attribution)
        .owner_override(config.shell.owner_user_id.map(Snowflake::new))
        .build()
        .map_err(AppError::internal)?;

    Ok(AppState::new(service_context, config))
}

/// Refresh the invite snapshot of every guild the bot is in
///
/// A failure to enumerate guilds is logged; snapshots then fill in as
/// guild-available events arrive.
pub async fn warm_up(state: &AppState) {
    match SnapshotService::new(state.service_context()).warm_up().await {
        Ok(report) => info!(guilds = report.guilds, "Startup refresh complete"),
        Err(e) => warn!(error = %e, "Startup refresh skipped; could not enumerate guilds"),
    }
}

/// Run the HTTP server until Ctrl-C
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C; shutdown only by termination");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();

    let state = create_app_state(config).await?;
    warm_up(&state).await;

    let app = create_app(state);
    run_server(app, &addr).await
}
