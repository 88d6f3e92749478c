//! Classification of transport failures into [`AuthError`]s.
//!
//! The transport only knows HTTP classes (unauthorized, rejected, server,
//! network). What those mean depends on the call: a 401 on login is a
//! wrong password, a 401 on anything else is a dead credential.

use courtside_transport::TransportError;

use crate::AuthError;

/// Maps a failed `POST /login`.
pub(crate) fn login_failure(error: TransportError) -> AuthError {
    match error {
        TransportError::Unauthorized { .. } => {
            AuthError::InvalidCredentials("incorrect email or password".into())
        }
        TransportError::Rejected { detail, .. } => AuthError::InvalidCredentials(detail),
        other => AuthError::Network(other.to_string()),
    }
}

/// Maps a failed `POST /register`.
pub(crate) fn registration_failure(error: TransportError) -> AuthError {
    match error {
        TransportError::Rejected { detail, .. } => AuthError::RegistrationRejected(detail),
        other => AuthError::Network(other.to_string()),
    }
}

/// Maps a failed authenticated call, *other* than an authorization
/// failure. Callers handle `Unauthorized` themselves because it has a
/// side effect (the session is expired).
pub(crate) fn network_failure(error: TransportError) -> AuthError {
    AuthError::Network(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_failure_unauthorized_is_invalid_credentials() {
        let err = login_failure(TransportError::from_status(401, None));
        assert!(matches!(err, AuthError::InvalidCredentials(_)));
    }

    #[test]
    fn test_login_failure_rejected_keeps_server_detail() {
        let err = login_failure(TransportError::from_status(
            400,
            Some("Incorrect email or password".into()),
        ));
        assert_eq!(
            err,
            AuthError::InvalidCredentials("Incorrect email or password".into())
        );
    }

    #[test]
    fn test_login_failure_server_error_is_network() {
        let err = login_failure(TransportError::from_status(503, None));
        assert!(matches!(err, AuthError::Network(_)));
    }

    #[test]
    fn test_registration_failure_rejected_is_registration_rejected() {
        let err = registration_failure(TransportError::from_status(
            400,
            Some("Email already registered".into()),
        ));
        assert_eq!(
            err,
            AuthError::RegistrationRejected("Email already registered".into())
        );
        assert!(matches!(
            registration_failure(TransportError::Network("refused".into())),
            AuthError::Network(_)
        ));
    }
}
