//! Error types for the roster layer.

use courtside_session::AuthError;
use courtside_transport::TransportError;

/// Errors that can occur while editing or saving a roster.
///
/// `CapacityExceeded` and `SaveInProgress` are local: they are returned
/// before any request is made and leave the selection untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    /// The selection already holds the maximum number of players.
    #[error("roster is full ({max} players max)")]
    CapacityExceeded { max: usize },

    /// The store refused an id that isn't in the player catalog.
    #[error("unknown player: {0}")]
    PlayerUnknown(String),

    /// The store refused the roster for another reason (e.g. a
    /// server-side rule the client doesn't know about).
    #[error("roster rejected: {0}")]
    Rejected(String),

    /// The store couldn't be reached or answered with a server error.
    /// Nothing was changed; safe to retry.
    #[error("network failure: {0}")]
    Network(String),

    /// A save the caller stopped waiting for is still running. Local
    /// edits are refused until it lands.
    #[error("a save is still in progress")]
    SaveInProgress,

    /// The store accepted the roster, but re-reading the profile failed.
    /// The save is durable; only the cached profile is behind.
    #[error("roster saved but profile refresh failed: {0}")]
    RefreshFailed(AuthError),

    /// No usable session: never logged in, logged out, or expired.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl RosterError {
    /// Returns `true` if the error means the session is gone and the
    /// user has to log in again.
    pub fn is_session_loss(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::NoSession | AuthError::SessionExpired)
        )
    }
}

/// Maps a failed `POST /me/team` that wasn't an authorization failure.
///
/// 404 and 422 are what the store answers for ids outside the catalog.
pub(crate) fn save_failure(error: TransportError) -> RosterError {
    match error {
        TransportError::Rejected {
            status: 404 | 422,
            detail,
        } => RosterError::PlayerUnknown(detail),
        TransportError::Rejected { detail, .. } => RosterError::Rejected(detail),
        other => RosterError::Network(other.to_string()),
    }
}

/// Lifts a session-classified failure into the roster taxonomy.
pub(crate) fn call_failure(error: AuthError) -> RosterError {
    match error {
        AuthError::Network(message) => RosterError::Network(message),
        other => RosterError::Auth(other),
    }
}
