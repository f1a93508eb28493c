//! Repository implementations
//!
//! SQLite implementation of the ledger port defined in refcord-core.

mod error;
mod ledger;

pub use ledger::SqliteReferralLedger;
