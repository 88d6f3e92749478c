//! Unified error type for Courtside.

use courtside_protocol::ProtocolError;
use courtside_roster::RosterError;
use courtside_session::{AdminError, AuthError};
use courtside_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `courtside` crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant generates the `From` impls, so `?`
/// converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CourtsideError {
    /// HTTP-level failure (bad base URL, connection, status).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Encode/decode failure or a malformed message.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Login, registration or session failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Roster editing or saving failure.
    #[error(transparent)]
    Roster(#[from] RosterError),

    /// Account administration failure.
    #[error(transparent)]
    Admin(#[from] AdminError),
}

impl CourtsideError {
    /// Returns `true` if the user has to log in (again) before retrying.
    pub fn needs_login(&self) -> bool {
        match self {
            Self::Auth(e) => matches!(e, AuthError::NoSession | AuthError::SessionExpired),
            Self::Roster(e) => e.is_session_loss(),
            Self::Admin(AdminError::Auth(e)) => {
                matches!(e, AuthError::NoSession | AuthError::SessionExpired)
            }
            _ => false,
        }
    }
}
