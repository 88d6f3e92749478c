//! Account administration under the current session.

use std::sync::Arc;

use courtside_protocol::{UserId, UserProfile};
use courtside_transport::{AdminApi, AuthApi, TransportError};

use crate::{AdminError, AuthError, SessionManager, SessionTicket};

/// The administrator's view of every account.
///
/// The role check is local: if the session's cached profile isn't an
/// administrator, every call fails with [`AdminError::NotAdmin`] before a
/// request is made. A 401/403 from the server still expires the session,
/// as it does for any authenticated call.
pub struct AdminConsole<A, M> {
    session: SessionManager<A>,
    api: Arc<M>,
}

impl<A: AuthApi, M: AdminApi> AdminConsole<A, M> {
    pub fn new(session: SessionManager<A>, api: Arc<M>) -> Self {
        Self { session, api }
    }

    /// Lists every account. Rosters are not included; only identity,
    /// role and aggregate score.
    ///
    /// # Errors
    /// - [`AdminError::NotAdmin`]: the session isn't an administrator's
    /// - [`AdminError::Auth`]: no session, expired, or network failure
    pub async fn users(&self) -> Result<Vec<UserProfile>, AdminError> {
        let ticket = self.ticket()?;
        let users = self
            .api
            .list_users(ticket.credential())
            .await
            .map_err(|e| self.failure(&ticket, e))?;
        tracing::debug!(users = users.len(), "accounts listed");
        Ok(users)
    }

    /// Deletes an account.
    ///
    /// # Errors
    /// As [`users`](Self::users), plus [`AdminError::UserNotFound`].
    pub async fn delete_user(&self, user: UserId) -> Result<(), AdminError> {
        let ticket = self.ticket()?;
        self.api
            .delete_user(ticket.credential(), user)
            .await
            .map_err(|e| self.failure(&ticket, e))?;
        tracing::info!(%user, "account deleted");
        Ok(())
    }

    /// Resets an account's password to the server's default.
    ///
    /// # Errors
    /// As [`delete_user`](Self::delete_user).
    pub async fn reset_password(&self, user: UserId) -> Result<(), AdminError> {
        let ticket = self.ticket()?;
        self.api
            .reset_password(ticket.credential(), user)
            .await
            .map_err(|e| self.failure(&ticket, e))?;
        tracing::info!(%user, "account password reset");
        Ok(())
    }

    /// Issues a ticket, provided the session it belongs to is an
    /// administrator's.
    fn ticket(&self) -> Result<SessionTicket, AdminError> {
        let ticket = self.session.ticket()?;
        let profile = self
            .session
            .current_profile()
            .ok_or(AuthError::NoSession)?;
        if !self.session.is_current(&ticket) {
            return Err(AuthError::NoSession.into());
        }
        if !profile.is_admin() {
            tracing::debug!(user_id = %profile.id, role = %profile.role, "admin call refused locally");
            return Err(AdminError::NotAdmin);
        }
        Ok(ticket)
    }

    fn failure(&self, ticket: &SessionTicket, error: TransportError) -> AdminError {
        match error {
            TransportError::Rejected {
                status: 404,
                detail,
            } => AdminError::UserNotFound(detail),
            TransportError::Rejected { detail, .. } => AdminError::Rejected(detail),
            other => AdminError::Auth(self.session.classify_failure(ticket, other)),
        }
    }
}
