//! Invite command handlers

use axum::{
    extract::{Path, State},
    Json,
};
use refcord_service::dto::{CreatePersonalInviteRequest, CreatePublicInviteRequest, InviteResponse};
use refcord_service::InviteService;

use crate::extractors::{GuildIdPath, ShellAuth, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Create a personal, trackable invite
///
/// POST /api/v1/guilds/{guild_id}/invites/personal
pub async fn create_personal_invite(
    State(state): State<AppState>,
    _auth: ShellAuth,
    Path(path): Path<GuildIdPath>,
    ValidatedJson(request): ValidatedJson<CreatePersonalInviteRequest>,
) -> ApiResult<Created<Json<InviteResponse>>> {
    let guild_id = path.guild_id()?;

    let service = InviteService::new(state.service_context());
    let response = service.create_personal_invite(guild_id, request).await?;
    Ok(Created(Json(response)))
}

/// Create an untracked public invite
///
/// POST /api/v1/guilds/{guild_id}/invites/public
pub async fn create_public_invite(
    State(state): State<AppState>,
    _auth: ShellAuth,
    Path(path): Path<GuildIdPath>,
    ValidatedJson(request): ValidatedJson<CreatePublicInviteRequest>,
) -> ApiResult<Created<Json<InviteResponse>>> {
    let guild_id = path.guild_id()?;

    let service = InviteService::new(state.service_context());
    let response = service.create_public_invite(guild_id, request).await?;
    Ok(Created(Json(response)))
}
