//! Reward configuration handlers

use axum::{extract::State, Json};
use refcord_service::dto::{ReloadRewardsRequest, RewardReloadResponse};
use refcord_service::RewardService;

use crate::extractors::ShellAuth;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Reload the reward configuration (application owner only)
///
/// POST /api/v1/rewards/reload
pub async fn reload_rewards(
    State(state): State<AppState>,
    _auth: ShellAuth,
    body: Result<Json<ReloadRewardsRequest>, axum::extract::rejection::JsonRejection>,
) -> ApiResult<Json<RewardReloadResponse>> {
    let Json(request) = body.map_err(|e| ApiError::invalid_body(e.body_text()))?;

    let service = RewardService::new(state.service_context());
    let reload = service.reload(request.user_id).await?;
    Ok(Json(RewardReloadResponse::from(reload)))
}
