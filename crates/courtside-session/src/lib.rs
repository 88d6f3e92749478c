//! Session management for Courtside.
//!
//! This crate owns the two pieces of state every authenticated operation
//! depends on:
//!
//! 1. **The credential**: the opaque bearer token from a login exchange.
//! 2. **The user profile**: identity, role, roster and aggregate score,
//!    as last reported by the server.
//!
//! Both live in a [`SessionManager`]. The application creates one and
//! passes it (it's a cheap handle) to whatever needs authenticated calls;
//! there is no global session.
//!
//! # How it fits in the stack
//!
//! ```text
//! Roster layer (above)   ← asks for tickets, reports expiry, triggers refreshes
//!     ↕
//! Session layer (this crate)  ← owns credential + profile
//!     ↕
//! Transport layer (below)  ← AuthApi: login, register, current user
//! ```
//!
//! [`AdminConsole`] rides on the same session for the account
//! administration calls, which only administrators may make.

mod admin;
mod auth;
mod error;
mod manager;
mod session;

pub use admin::AdminConsole;
pub use error::{AdminError, AuthError};
pub use manager::SessionManager;
pub use session::SessionTicket;
