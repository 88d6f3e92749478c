//! Session types: what the manager holds and what it hands out.

use std::sync::Arc;

use courtside_protocol::{Credential, UserProfile};

// ---------------------------------------------------------------------------
// SessionTicket
// ---------------------------------------------------------------------------

/// A snapshot of "who am I calling as", taken before an authenticated
/// call.
///
/// The `epoch` identifies the session the credential belongs to. Every
/// login, logout and expiry starts a new epoch. When a call returns, the
/// manager only applies its outcome if the epoch still matches, so a slow
/// response can never resurrect a session that was logged out (or
/// overwrite a newer login) while it was in flight.
#[derive(Debug, Clone)]
pub struct SessionTicket {
    pub(crate) credential: Credential,
    pub(crate) epoch: u64,
}

impl SessionTicket {
    /// The credential to send with the call.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// The session epoch this ticket was issued in.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Everything the manager owns, kept under one lock so the credential and
/// the profile always change together.
///
/// The profile sits behind an `Arc`: replacing it is a single pointer
/// swap, and readers keep whatever snapshot they grabbed. Nobody can
/// observe a roster from one response next to a score from another.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) credential: Option<Credential>,
    pub(crate) profile: Option<Arc<UserProfile>>,
    pub(crate) epoch: u64,
}

impl SessionState {
    /// Installs a freshly logged-in session.
    pub(crate) fn install(&mut self, credential: Credential, profile: UserProfile) -> u64 {
        self.epoch += 1;
        self.credential = Some(credential);
        self.profile = Some(Arc::new(profile));
        self.epoch
    }

    /// Drops the credential and profile. Returns `true` if there was a
    /// session to drop.
    pub(crate) fn clear(&mut self) -> bool {
        let had_session = self.credential.is_some();
        self.epoch += 1;
        self.credential = None;
        self.profile = None;
        had_session
    }

    /// Returns a ticket for the current session, if any.
    pub(crate) fn ticket(&self) -> Option<SessionTicket> {
        self.credential.as_ref().map(|credential| SessionTicket {
            credential: credential.clone(),
            epoch: self.epoch,
        })
    }

    /// Returns `true` if `ticket` was issued for the session that is
    /// still active.
    pub(crate) fn is_current(&self, ticket: &SessionTicket) -> bool {
        self.credential.is_some() && self.epoch == ticket.epoch
    }
}
