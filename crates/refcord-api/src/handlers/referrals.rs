//! Referral command handlers: own total, leaderboard, ledger audit

use axum::{
    extract::{Path, State},
    Json,
};
use refcord_service::dto::{
    InviteDivergenceResponse, LeaderboardQuery, LeaderboardResponse, ReferralSummaryResponse,
};
use refcord_service::ReferralService;

use crate::extractors::{GuildIdPath, GuildUserPath, ShellAuth, ValidatedQuery};
use crate::response::ApiResult;
use crate::state::AppState;

/// A member's referral total; re-attempts a pending reward grant
///
/// GET /api/v1/guilds/{guild_id}/referrals/{user_id}
pub async fn get_referrals(
    State(state): State<AppState>,
    _auth: ShellAuth,
    Path(path): Path<GuildUserPath>,
) -> ApiResult<Json<ReferralSummaryResponse>> {
    let guild_id = path.guild_id()?;
    let user_id = path.user_id()?;

    let service = ReferralService::new(state.service_context());
    let summary = service.my_total(guild_id, user_id).await?;
    Ok(Json(summary))
}

/// Top referrers
///
/// GET /api/v1/guilds/{guild_id}/leaderboard?limit=N
pub async fn get_leaderboard(
    State(state): State<AppState>,
    _auth: ShellAuth,
    Path(path): Path<GuildIdPath>,
    ValidatedQuery(query): ValidatedQuery<LeaderboardQuery>,
) -> ApiResult<Json<LeaderboardResponse>> {
    let guild_id = path.guild_id()?;

    let service = ReferralService::new(state.service_context());
    let leaderboard = service.leaderboard(guild_id, query.limit).await?;
    Ok(Json(leaderboard))
}

/// Invites whose use count disagrees with the join log
///
/// GET /api/v1/guilds/{guild_id}/audit
pub async fn get_audit(
    State(state): State<AppState>,
    _auth: ShellAuth,
    Path(path): Path<GuildIdPath>,
) -> ApiResult<Json<Vec<InviteDivergenceResponse>>> {
    let guild_id = path.guild_id()?;

    let service = ReferralService::new(state.service_context());
    let divergent = service.audit(guild_id).await?;
    Ok(Json(divergent))
}
