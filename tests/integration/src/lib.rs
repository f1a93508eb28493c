//! Integration test utilities for RefCord
//!
//! This crate provides an in-process fake of the chat platform, a ledger
//! wrapper that can be told to fail, and helpers for running the engine and
//! the ingress API end to end against an in-memory SQLite ledger.

pub mod fakes;

pub use fakes::*;
pub use helpers::*;
