//! Error types for the session layer.

/// Errors that can occur while acquiring, using or refreshing a session.
///
/// `NoSession` is the only purely local variant: it is returned before
/// any request is made. Every other variant comes back from the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The authentication store rejected the email/password pair.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// There is no credential to make the call with: never logged in,
    /// logged out, or the session was replaced while the call was in
    /// flight.
    #[error("no active session")]
    NoSession,

    /// The server refused the credential (401/403). The credential has
    /// been discarded; the user must log in again.
    #[error("session expired")]
    SessionExpired,

    /// The call never got a usable answer (connection failure, timeout,
    /// 5xx, undecodable body). Safe to retry.
    #[error("network failure: {0}")]
    Network(String),

    /// The authentication store refused to create the account (e.g. the
    /// email is already registered).
    #[error("registration rejected: {0}")]
    RegistrationRejected(String),
}

/// Errors from the account administration calls.
///
/// `NotAdmin` is local: the session's cached profile doesn't have the
/// administrator role, so no request is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminError {
    #[error("administrator role required")]
    NotAdmin,

    /// The account the call names doesn't exist.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// The server refused the call for another reason.
    #[error("admin request rejected: {0}")]
    Rejected(String),

    /// No session, an expired one (which has been logged out), or a
    /// network failure.
    #[error(transparent)]
    Auth(#[from] AuthError),
}
