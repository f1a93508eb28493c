//! Shell authentication extractor
//!
//! The integration shell authenticates with a static bearer token. When no
//! token is configured the ingress is open (local development).

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::response::ApiError;
use crate::state::AppState;

/// Proof that the request came from the configured shell
#[derive(Debug, Clone, Copy)]
pub struct ShellAuth;

#[async_trait]
impl<S> FromRequestParts<S> for ShellAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Some(expected) = app_state.shell_token() else {
            return Ok(ShellAuth);
        };

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        if bearer.token() != expected {
            tracing::warn!("Rejected request with invalid shell token");
            return Err(ApiError::InvalidToken);
        }

        Ok(ShellAuth)
    }
}
