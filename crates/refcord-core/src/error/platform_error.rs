//! Platform errors - failures reported by the chat platform port

use std::time::Duration;

use thiserror::Error;

/// Errors returned by an [`InvitePlatform`](crate::traits::InvitePlatform)
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The bot lacks the permission needed for this call
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The guild, channel, member, or role does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The platform asked us to back off
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// Transport failure or unexpected status
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl PlatformError {
    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Check if this is a permission failure
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    /// Check if this is a not found failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "PLATFORM_FORBIDDEN",
            Self::NotFound(_) => "PLATFORM_NOT_FOUND",
            Self::RateLimited { .. } => "PLATFORM_RATE_LIMITED",
            Self::Http(_) | Self::Decode(_) => "PLATFORM_ERROR",
        }
    }
}
