//! Error handling utilities for repositories

use refcord_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
///
/// Every ledger failure is a storage failure; the message keeps enough of the
/// cause to tell a locked database from a broken one in the logs.
pub fn map_db_error(e: SqlxError) -> DomainError {
    let detail = match &e {
        SqlxError::PoolTimedOut => "connection pool exhausted".to_string(),
        SqlxError::Database(db) if db.message().contains("locked") => {
            format!("database busy: {}", db.message())
        }
        other => other.to_string(),
    };
    tracing::debug!(error = %e, "Ledger query failed");
    DomainError::DatabaseError(detail)
}
