//! Discord REST client implementing InvitePlatform

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use refcord_core::entities::{InviteOptions, LiveInvite, Member};
use refcord_core::error::PlatformError;
use refcord_core::traits::{InvitePlatform, PlatformResult};
use refcord_core::value_objects::Snowflake;

use crate::config::DiscordHttpConfig;
use crate::wire::{
    ApplicationWire, CreateInviteBody, IdOnly, InviteWire, MemberWire, RateLimitBody,
};

/// Page size of `GET /users/@me/guilds`
const GUILD_PAGE_SIZE: usize = 200;

/// Discord REST API client
///
/// Every request carries the bot token and is bounded by the configured
/// timeout; callers layer no timeout of their own.
#[derive(Clone)]
pub struct DiscordHttpPlatform {
    config: DiscordHttpConfig,
    http_client: reqwest::Client,
}

impl DiscordHttpPlatform {
    /// Create a new client
    pub fn new(config: DiscordHttpConfig) -> PlatformResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PlatformError::Http(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, format!("{}{}", self.config.api_base, path))
            .header(header::AUTHORIZATION, format!("Bot {}", self.config.token))
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> PlatformResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| PlatformError::Http(format!("{what}: {e}")))?;

        check_status(response, what).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> PlatformResult<T> {
        self.send(builder, what)
            .await?
            .json()
            .await
            .map_err(|e| PlatformError::Decode(format!("{what}: {e}")))
    }
}

/// Map non-success statuses onto platform errors
async fn check_status(response: Response, what: &str) -> PlatformResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::FORBIDDEN => Err(PlatformError::Forbidden(what.to_string())),
        StatusCode::NOT_FOUND => Err(PlatformError::NotFound(what.to_string())),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = retry_after(response).await;
            warn!(retry_after = ?retry_after, request = %what, "Rate limited by platform");
            Err(PlatformError::RateLimited { retry_after })
        }
        _ => Err(PlatformError::Http(format!("HTTP {status} from {what}"))),
    }
}

/// Retry delay from the `Retry-After` header, else from the JSON body
async fn retry_after(response: Response) -> Duration {
    let from_header = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<f64>().ok());

    let seconds = match from_header {
        Some(seconds) => seconds,
        None => response
            .json::<RateLimitBody>()
            .await
            .map(|body| body.retry_after)
            .unwrap_or(1.0),
    };

    if seconds.is_finite() {
        Duration::from_secs_f64(seconds.clamp(0.0, 3600.0))
    } else {
        Duration::from_secs(1)
    }
}

#[async_trait]
impl InvitePlatform for DiscordHttpPlatform {
    #[instrument(skip(self))]
    async fn list_invites(&self, guild_id: Snowflake) -> PlatformResult<Vec<LiveInvite>> {
        let invites: Vec<InviteWire> = self
            .send_json(
                self.request(Method::GET, &format!("/guilds/{guild_id}/invites")),
                "list guild invites",
            )
            .await?;

        debug!(count = invites.len(), "Fetched live invites");
        Ok(invites.into_iter().map(LiveInvite::from).collect())
    }

    #[instrument(skip(self, options), fields(max_uses = options.max_uses, max_age = options.max_age_secs))]
    async fn create_invite(
        &self,
        channel_id: Snowflake,
        options: &InviteOptions,
    ) -> PlatformResult<LiveInvite> {
        let mut builder = self
            .request(Method::POST, &format!("/channels/{channel_id}/invites"))
            .json(&CreateInviteBody {
                max_uses: options.max_uses,
                max_age: options.max_age_secs,
                unique: options.unique,
            });
        if let Some(reason) = &options.reason {
            builder = builder.header("X-Audit-Log-Reason", urlencoding::encode(reason).into_owned());
        }

        let invite: InviteWire = self.send_json(builder, "create channel invite").await?;
        Ok(LiveInvite::from(invite))
    }

    #[instrument(skip(self))]
    async fn member(&self, guild_id: Snowflake, user_id: Snowflake) -> PlatformResult<Option<Member>> {
        let result: PlatformResult<MemberWire> = self
            .send_json(
                self.request(Method::GET, &format!("/guilds/{guild_id}/members/{user_id}")),
                "get guild member",
            )
            .await;

        match result {
            Ok(wire) => Ok(Some(wire.into_member(guild_id, user_id))),
            Err(PlatformError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, reason))]
    async fn add_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()> {
        let builder = self
            .request(
                Method::PUT,
                &format!("/guilds/{guild_id}/members/{user_id}/roles/{role_id}"),
            )
            .header(header::CONTENT_LENGTH, 0)
            .header("X-Audit-Log-Reason", urlencoding::encode(reason).into_owned());

        self.send(builder, "add member role").await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn application_owner(&self) -> PlatformResult<Snowflake> {
        let app: ApplicationWire = self
            .send_json(
                self.request(Method::GET, "/oauth2/applications/@me"),
                "get application",
            )
            .await?;

        app.owner_id()
            .ok_or_else(|| PlatformError::Decode("application has no owner".to_string()))
    }

    #[instrument(skip(self))]
    async fn current_guilds(&self) -> PlatformResult<Vec<Snowflake>> {
        let mut guilds = Vec::new();
        let mut after: Option<Snowflake> = None;

        loop {
            let mut path = format!("/users/@me/guilds?limit={GUILD_PAGE_SIZE}");
            if let Some(after) = after {
                path.push_str(&format!("&after={after}"));
            }

            let page: Vec<IdOnly> = self
                .send_json(self.request(Method::GET, &path), "list current guilds")
                .await?;
            let full_page = page.len() == GUILD_PAGE_SIZE;

            guilds.extend(page.into_iter().map(|g| g.id));
            after = guilds.last().copied();

            if !full_page {
                break;
            }
        }

        debug!(count = guilds.len(), "Enumerated current guilds");
        Ok(guilds)
    }
}
