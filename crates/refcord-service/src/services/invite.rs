//! Invite service
//!
//! Creates personal (owner-registered) and public (untracked) invites. Both
//! kinds are added to the snapshot cache right away so the first join through
//! them can be attributed without waiting for the platform's create event.

use refcord_core::entities::InviteOptions;
use refcord_core::{DomainError, Permissions, PlatformError, Snowflake};
use tracing::{error, info, instrument, warn};

use crate::dto::requests::{MAX_INVITE_AGE_MINUTES, MAX_INVITE_USES};
use crate::dto::{CreatePersonalInviteRequest, CreatePublicInviteRequest, InviteResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Invite service
pub struct InviteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> InviteService<'a> {
    /// Create a new InviteService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create an invite whose joins are credited to the requesting member
    #[instrument(skip(self, request), fields(user_id = %request.user_id, channel_id = %request.channel_id))]
    pub async fn create_personal_invite(
        &self,
        guild_id: Snowflake,
        request: CreatePersonalInviteRequest,
    ) -> ServiceResult<InviteResponse> {
        check_limits(request.max_uses, request.max_age_minutes)?;

        let requester = request
            .user_tag
            .clone()
            .unwrap_or_else(|| request.user_id.to_string());
        let options = InviteOptions::from_limits(request.max_uses, request.max_age_minutes)
            .with_reason(format!("RefCord personal referral for {requester}"));

        let invite = self.create(request.channel_id, &options).await?;

        self.ctx
            .ledger()
            .register_ownership(guild_id, request.user_id, &invite.code)
            .await?;
        self.ctx
            .snapshots()
            .apply_created(guild_id, &invite.code, invite.uses);

        info!(
            code = %invite.code,
            guild_id = %guild_id,
            user_id = %request.user_id,
            max_uses = request.max_uses,
            max_age_minutes = request.max_age_minutes,
            "Personal invite created"
        );

        let url = invite.url();
        let message = format!(
            "✅ Your personal invite:\n{url}\n- Max uses: {}\n- Expires: {}\n\nShare it: joins via this link will count for you.",
            InviteResponse::uses_label(request.max_uses),
            InviteResponse::expiry_label(request.max_age_minutes),
        );

        Ok(InviteResponse {
            code: invite.code,
            url,
            guild_id,
            channel_id: request.channel_id,
            max_uses: request.max_uses,
            max_age_minutes: request.max_age_minutes,
            tracked: true,
            message,
        })
    }

    /// Create an invite that is not credited to anyone
    ///
    /// The invoking member must hold Create Invite (or Administrator).
    #[instrument(skip(self, request), fields(user_id = %request.user_id, channel_id = %request.channel_id))]
    pub async fn create_public_invite(
        &self,
        guild_id: Snowflake,
        request: CreatePublicInviteRequest,
    ) -> ServiceResult<InviteResponse> {
        if !request.permissions.has(Permissions::CREATE_INSTANT_INVITE) {
            return Err(ServiceError::permission_denied("Create Invite"));
        }
        check_limits(request.max_uses, request.max_age_minutes)?;

        let options = InviteOptions::from_limits(request.max_uses, request.max_age_minutes);
        let invite = self.create(request.channel_id, &options).await?;

        self.ctx
            .snapshots()
            .apply_created(guild_id, &invite.code, invite.uses);

        info!(code = %invite.code, guild_id = %guild_id, user_id = %request.user_id, "Public invite created");

        let url = invite.url();
        let message = format!("🔗 Public invite created:\n{url}");

        Ok(InviteResponse {
            code: invite.code,
            url,
            guild_id,
            channel_id: request.channel_id,
            max_uses: request.max_uses,
            max_age_minutes: request.max_age_minutes,
            tracked: false,
            message,
        })
    }

    async fn create(
        &self,
        channel_id: Snowflake,
        options: &InviteOptions,
    ) -> ServiceResult<refcord_core::LiveInvite> {
        self.ctx
            .platform()
            .create_invite(channel_id, options)
            .await
            .map_err(|e: PlatformError| {
                if e.is_forbidden() {
                    warn!(channel_id = %channel_id, error = %e, "Missing Create Invite permission");
                    ServiceError::BotPermission {
                        permission: "Create Invite",
                    }
                } else {
                    error!(channel_id = %channel_id, error = %e, "Failed to create invite");
                    ServiceError::from(e)
                }
            })
    }
}

/// Reject limits outside 0..=1000 uses and 0..=10080 minutes
fn check_limits(max_uses: u32, max_age_minutes: u32) -> Result<(), DomainError> {
    if max_uses > MAX_INVITE_USES {
        return Err(DomainError::OutOfRange {
            field: "max_uses",
            min: 0,
            max: i64::from(MAX_INVITE_USES),
        });
    }
    if max_age_minutes > MAX_INVITE_AGE_MINUTES {
        return Err(DomainError::OutOfRange {
            field: "max_age_minutes",
            min: 0,
            max: i64::from(MAX_INVITE_AGE_MINUTES),
        });
    }
    Ok(())
}
