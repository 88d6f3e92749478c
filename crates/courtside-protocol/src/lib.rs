//! Wire protocol for Courtside.
//!
//! This crate defines the "language" the client core and the fantasy API
//! speak:
//!
//! - **Types** ([`UserProfile`], [`Player`], [`Credential`],
//!   [`RosterUpdate`], etc.): the structures that travel over HTTP.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those structures
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding or when a message breaks a protocol rule.
//!
//! # Architecture
//!
//! The protocol layer sits under both the transport (which moves the
//! bytes) and the session/roster layers (which give the messages
//! meaning). It knows nothing about sessions or editing.
//!
//! ```text
//! Transport (HTTP) → Protocol (UserProfile, Player, ...) → Session / Roster
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
#[cfg(feature = "json")]
pub use types::ErrorBody;
pub use types::{
    Credential, LoginRequest, Player, PlayerId, Role, RosterReply, RosterUpdate,
    TokenGrant, UserId, UserProfile,
};
