//! Per-guild invite code -> use count snapshots

mod invite_snapshot;

pub use invite_snapshot::{InviteSnapshot, InviteSnapshotCache};
