//! # refcord-db
//!
//! Referral ledger implemented on SQLite via SQLx.
//!
//! ## Overview
//!
//! This crate provides the SQLite implementation of the `ReferralLedger`
//! port defined in `refcord-core`. It handles:
//!
//! - Connection pool management and schema setup
//! - Database models with SQLx `FromRow` derives
//! - Model → entity mappers
//! - The ledger itself (ownership upserts, atomic use recording, aggregates)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use refcord_db::{create_pool, run_migrations, DatabaseConfig, SqliteReferralLedger};
//! use refcord_common::AppConfig;
//! use refcord_core::traits::ReferralLedger;
//!
//! async fn example(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from(&config.database)).await?;
//!     run_migrations(&pool).await?;
//!     let ledger = SqliteReferralLedger::new(pool);
//!
//!     let total = ledger.total_referrals(guild_id, user_id).await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, DatabaseConfig, SqlitePool, SCHEMA};
pub use repositories::SqliteReferralLedger;
