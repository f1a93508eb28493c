//! Axum extractors for request handling
//!
//! Custom extractors for shell authentication, path parsing, and validation.

mod auth;
mod path;
mod validated;

pub use auth::ShellAuth;
pub use path::{GuildIdPath, GuildUserPath};
pub use validated::{ValidatedJson, ValidatedQuery};
