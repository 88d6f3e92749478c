//! Collaborator interfaces for Courtside.
//!
//! The client core talks to these remote collaborators:
//!
//! - the **authentication store** ([`AuthApi`]): login, registration and
//!   the current user's profile
//! - the **player catalog** ([`CatalogApi`]): the read-only player pool
//! - the **roster store** ([`RosterApi`]): the authoritative team
//! - the **account administration** endpoints ([`AdminApi`]), which the
//!   server only honors for administrator credentials
//!
//! Each is a trait so the session and roster layers never depend on
//! HTTP directly. [`HttpApi`] implements all of them against the REST
//! API; tests substitute in-memory fakes.
//!
//! Every authenticated method takes the [`Credential`] explicitly. The
//! transport never stores one.

mod error;
mod http;

pub use error::TransportError;
pub use http::{HttpApi, HttpConfig};

use std::future::Future;

use courtside_protocol::{
    Credential, LoginRequest, Player, RosterReply, RosterUpdate, TokenGrant, UserId, UserProfile,
};

/// The authentication store.
///
/// # Trait bounds
///
/// - `Send + Sync` → one client is shared by every task of the session.
/// - `'static` → it doesn't borrow temporary data; it lives as long as
///   the application context that owns it.
///
/// The methods return `impl Future + Send` (instead of being plain
/// `async fn`) so callers may move the futures into spawned tasks.
pub trait AuthApi: Send + Sync + 'static {
    /// Exchanges identity + secret for a token (`POST /login`).
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<TokenGrant, TransportError>> + Send;

    /// Creates a new account (`POST /register`). Does not log in.
    fn register(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Fetches the profile the credential belongs to (`GET /users/me`).
    fn current_user(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<UserProfile, TransportError>> + Send;
}

/// The read-only player catalog.
pub trait CatalogApi: Send + Sync + 'static {
    /// Lists every player in the pool (`GET /players`).
    fn list_players(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<Vec<Player>, TransportError>> + Send;
}

/// The authoritative roster store.
pub trait RosterApi: Send + Sync + 'static {
    /// Reads the stored roster (`GET /me/team`).
    fn fetch_roster(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<Vec<Player>, TransportError>> + Send;

    /// Replaces the stored roster with `update` (`POST /me/team`).
    ///
    /// All-or-nothing: on error the stored roster is unchanged, and any
    /// 2xx means it was stored. The reply is `None` when the success body
    /// doesn't carry the roster (a bare acknowledgement).
    fn replace_roster(
        &self,
        credential: &Credential,
        update: &RosterUpdate,
    ) -> impl Future<Output = Result<Option<RosterReply>, TransportError>> + Send;
}

/// Account administration. Every call needs an administrator credential;
/// the server answers 403 for anyone else.
pub trait AdminApi: Send + Sync + 'static {
    /// Lists every account (`GET /admin/users`).
    fn list_users(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<Vec<UserProfile>, TransportError>> + Send;

    /// Deletes an account (`DELETE /admin/users/{id}`).
    fn delete_user(
        &self,
        credential: &Credential,
        user: UserId,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Resets an account's password to the server's default
    /// (`POST /admin/users/{id}/reset-password`).
    fn reset_password(
        &self,
        credential: &Credential,
        user: UserId,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
