//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use refcord_common::AppError;
use refcord_core::{DomainError, PlatformError, RewardConfigError};
use std::fmt;

/// Reply shown to users for any failure they cannot act on
pub const GENERIC_APOLOGY: &str = "❌ Error while processing your command.";

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation or ledger failure
    Domain(DomainError),

    /// Chat platform call failed
    Platform(PlatformError),

    /// Reward configuration could not be read or parsed
    RewardConfig(RewardConfigError),

    /// The bot itself lacks a platform permission
    BotPermission { permission: &'static str },

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// The invoking member lacks a permission
    PermissionDenied { permission: String },

    /// Validation error
    Validation(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::Platform(e) => write!(f, "{e}"),
            Self::RewardConfig(e) => write!(f, "{e}"),
            Self::BotPermission { permission } => {
                write!(f, "Bot is missing platform permission: {permission}")
            }
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::PermissionDenied { permission } => {
                write!(f, "Missing required permission: {permission}")
            }
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::Platform(e) => Some(e),
            Self::RewardConfig(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(permission: impl Into<String>) -> Self {
        Self::PermissionDenied {
            permission: permission.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_storage(),
            Self::Platform(e) => matches!(e, PlatformError::RateLimited { .. }),
            _ => false,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => {
                if e.is_not_found() {
                    404
                } else if e.is_authorization() {
                    403
                } else if e.is_validation() {
                    400
                } else if e.is_storage() {
                    503
                } else {
                    500
                }
            }
            Self::Platform(e) => match e {
                PlatformError::Forbidden(_) => 403,
                PlatformError::NotFound(_) => 404,
                PlatformError::RateLimited { .. } => 429,
                PlatformError::Http(_) | PlatformError::Decode(_) => 502,
            },
            Self::RewardConfig(_) => 422,
            Self::BotPermission { .. } | Self::PermissionDenied { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Platform(e) => e.code(),
            Self::RewardConfig(_) => "INVALID_REWARD_CONFIG",
            Self::BotPermission { .. } => "BOT_MISSING_PERMISSIONS",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::PermissionDenied { .. } => "MISSING_PERMISSIONS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Text safe to show the invoking user
    ///
    /// Input and permission problems get a specific hint; everything else
    /// collapses to [`GENERIC_APOLOGY`].
    pub fn user_message(&self) -> String {
        match self {
            Self::Domain(DomainError::NotApplicationOwner) => "Owner only.".to_string(),
            Self::Domain(DomainError::MissingPermission(permission))
            | Self::PermissionDenied { permission } => {
                format!("You need the **{permission}** permission.")
            }
            Self::Domain(e) if e.is_validation() => e.to_string(),
            Self::BotPermission { permission } => {
                format!("I need **{permission}** in that channel.")
            }
            Self::Validation(msg) => msg.clone(),
            Self::NotFound { resource, .. } => format!("{resource} not found."),
            Self::RewardConfig(_) => {
                "Reward configuration is invalid; the previous one is still active.".to_string()
            }
            _ => GENERIC_APOLOGY.to_string(),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<PlatformError> for ServiceError {
    fn from(err: PlatformError) -> Self {
        Self::Platform(err)
    }
}

impl From<RewardConfigError> for ServiceError {
    fn from(err: RewardConfigError) -> Self {
        Self::RewardConfig(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Domain(e) => Self::Domain(e),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
