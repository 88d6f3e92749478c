//! Roster editing and reconciliation for Courtside.
//!
//! A user edits a *working selection* (at most [`MAX_ROSTER_SIZE`]
//! player ids) locally, then saves it to the authoritative store as one
//! replacement set. After a successful save the session's profile is
//! re-read, so the roster and aggregate score shown everywhere else come
//! from the same server record.
//!
//! # Key types
//!
//! - [`RosterEngine`]: one editing session: add/remove/save/discard
//! - [`WorkingSelection`]: the bounded id set being edited
//! - [`EditorState`]: lifecycle state machine
//! - [`PlayerCatalog`]: cached read-only player pool
//! - [`RosterError`]: everything that can go wrong

mod catalog;
mod engine;
mod error;
mod selection;
mod state;

pub use catalog::PlayerCatalog;
pub use engine::RosterEngine;
pub use error::RosterError;
pub use selection::WorkingSelection;
pub use state::EditorState;

/// The most players a roster may hold.
pub const MAX_ROSTER_SIZE: usize = 10;
