//! Model to entity mappers
//!
//! `From<Model> for Entity` conversions from database rows to domain objects.

mod invite;
mod join_event;

pub use join_event::{timestamp_from_unix, JoinEventInsert};
