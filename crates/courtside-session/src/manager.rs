//! The session manager: owns the credential and the cached profile.
//!
//! It's responsible for:
//! - Exchanging email/password for a credential (login)
//! - Keeping the authoritative profile cached and replacing it wholesale
//!   on refresh
//! - Discarding everything on logout, or when any authenticated call
//!   reports the credential is dead
//!
//! # Concurrency note
//!
//! `SessionManager` is a handle: cloning it is cheap and every clone sees
//! the same session. The state sits behind a `std::sync::RwLock` that is
//! never held across an `.await`, so [`current_profile`] can stay
//! synchronous.
//!
//! Login and refresh run their network call inside a spawned Tokio task.
//! If the caller stops waiting (drops the future), the task still runs to
//! completion and its result is still applied, so an authoritative
//! update is never lost halfway.
//!
//! [`current_profile`]: SessionManager::current_profile

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use courtside_protocol::{Credential, LoginRequest, UserProfile};
use courtside_transport::{AuthApi, TransportError};

use crate::auth::{login_failure, network_failure, registration_failure};
use crate::session::SessionState;
use crate::{AuthError, SessionTicket};

/// Owns the session of one user.
///
/// ## Lifecycle
///
/// ```text
///              login() ok
///  [LoggedOut] ───────────→ [Active] ──refresh_profile()──→ [Active]
///       ↑                      │
///       └──── logout() ────────┤
///       └──── 401/403 from any authenticated call
/// ```
pub struct SessionManager<A> {
    inner: Arc<Inner<A>>,
}

/// Shared state behind every clone of a [`SessionManager`].
struct Inner<A> {
    api: Arc<A>,
    state: RwLock<SessionState>,
}

impl<A> Clone for SessionManager<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: AuthApi> SessionManager<A> {
    /// Creates a logged-out session manager that talks to `api`.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                state: RwLock::new(SessionState::default()),
            }),
        }
    }

    /// Logs in and caches the user's profile.
    ///
    /// On success the previous session (if any) is replaced and the new
    /// credential is returned. On failure the manager is left exactly as
    /// it was.
    ///
    /// # Errors
    /// - [`AuthError::InvalidCredentials`]: email/password rejected
    /// - [`AuthError::Network`]: the store couldn't be reached
    pub async fn login(&self, request: LoginRequest) -> Result<Credential, AuthError> {
        let inner = Arc::clone(&self.inner);
        run_detached(async move { inner.login(&request).await }).await
    }

    /// Creates an account. Does not log in.
    ///
    /// # Errors
    /// - [`AuthError::RegistrationRejected`]: e.g. the email is taken
    /// - [`AuthError::Network`]: the store couldn't be reached
    pub async fn register(&self, request: &LoginRequest) -> Result<(), AuthError> {
        self.inner
            .api
            .register(request)
            .await
            .map_err(registration_failure)?;
        tracing::info!(email = %request.email, "account registered");
        Ok(())
    }

    /// Re-fetches the profile and replaces the cached copy in one step.
    ///
    /// # Errors
    /// - [`AuthError::NoSession`]: not logged in (no request is made)
    /// - [`AuthError::SessionExpired`]: the credential was refused; the
    ///   session has been discarded
    /// - [`AuthError::Network`]: the cached profile is left untouched
    pub async fn refresh_profile(&self) -> Result<Arc<UserProfile>, AuthError> {
        let ticket = self.ticket()?;
        let inner = Arc::clone(&self.inner);
        run_detached(async move { inner.refresh_with(&ticket).await }).await
    }

    /// Refreshes the profile under an already-issued ticket.
    ///
    /// Unlike [`refresh_profile`](Self::refresh_profile) this runs on the
    /// caller's task. It's meant for callers that are themselves running
    /// detached (the roster engine's save task).
    ///
    /// # Errors
    /// Same as [`refresh_profile`](Self::refresh_profile); additionally
    /// [`AuthError::NoSession`] if the ticket's session ended while the
    /// request was in flight.
    pub async fn refresh_with(
        &self,
        ticket: &SessionTicket,
    ) -> Result<Arc<UserProfile>, AuthError> {
        self.inner.refresh_with(ticket).await
    }

    /// Discards the credential and the cached profile.
    ///
    /// Calling it when already logged out is a no-op.
    pub fn logout(&self) {
        if self.inner.write().clear() {
            tracing::info!("logged out");
        }
    }

    /// Returns the last fetched profile, or `None` if there is no session.
    ///
    /// The returned `Arc` is a snapshot: a later refresh swaps in a new
    /// profile and leaves this one as it was.
    pub fn current_profile(&self) -> Option<Arc<UserProfile>> {
        self.inner.read().profile.clone()
    }

    /// Returns the credential, or `None` if there is no session.
    pub fn credential(&self) -> Option<Credential> {
        self.inner.read().credential.clone()
    }

    /// Returns `true` if a credential is held.
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().credential.is_some()
    }

    /// Issues a ticket for an authenticated call.
    ///
    /// # Errors
    /// [`AuthError::NoSession`] if not logged in. This check is local;
    /// callers use it to fail before touching the network.
    pub fn ticket(&self) -> Result<SessionTicket, AuthError> {
        self.inner.read().ticket().ok_or(AuthError::NoSession)
    }

    /// Returns `true` if `ticket` belongs to the session still active.
    pub fn is_current(&self, ticket: &SessionTicket) -> bool {
        self.inner.read().is_current(ticket)
    }

    /// Classifies a failed authenticated call made with `ticket`.
    ///
    /// A 401/403 expires the session (if the ticket's session is still
    /// the active one) and yields [`AuthError::SessionExpired`]; anything
    /// else is an [`AuthError::Network`] with no side effect.
    pub fn classify_failure(&self, ticket: &SessionTicket, error: TransportError) -> AuthError {
        self.inner.classify_failure(ticket, error)
    }

    /// Expires the session `ticket` was issued for.
    ///
    /// Always returns [`AuthError::SessionExpired`] so callers can write
    /// `return Err(session.expire(&ticket).into())`.
    pub fn expire(&self, ticket: &SessionTicket) -> AuthError {
        self.inner.expire(ticket)
    }
}

impl<A: AuthApi> Inner<A> {
    async fn login(&self, request: &LoginRequest) -> Result<Credential, AuthError> {
        let grant = self.api.login(request).await.map_err(login_failure)?;
        let credential = grant
            .into_credential()
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let profile = match self.api.current_user(&credential).await {
            Ok(profile) => profile,
            Err(e) if e.is_unauthorized() => {
                return Err(AuthError::InvalidCredentials(
                    "credential was not accepted by the server".into(),
                ));
            }
            Err(e) => return Err(network_failure(e)),
        };

        let user_id = profile.id;
        let roster_size = profile.roster.len();
        let epoch = self.write().install(credential.clone(), profile);
        tracing::info!(%user_id, roster_size, epoch, "logged in");
        Ok(credential)
    }

    async fn refresh_with(&self, ticket: &SessionTicket) -> Result<Arc<UserProfile>, AuthError> {
        match self.api.current_user(&ticket.credential).await {
            Ok(profile) => self.replace_profile(ticket, profile),
            Err(e) => Err(self.classify_failure(ticket, e)),
        }
    }

    /// Swaps in a new profile, unless the ticket's session is gone.
    fn replace_profile(
        &self,
        ticket: &SessionTicket,
        profile: UserProfile,
    ) -> Result<Arc<UserProfile>, AuthError> {
        let mut state = self.write();
        if !state.is_current(ticket) {
            tracing::debug!(
                epoch = ticket.epoch,
                "dropping profile fetched for a session that ended"
            );
            return Err(AuthError::NoSession);
        }
        let profile = Arc::new(profile);
        state.profile = Some(Arc::clone(&profile));
        tracing::info!(
            user_id = %profile.id,
            roster_size = profile.roster.len(),
            total_score = profile.total_score,
            "profile refreshed"
        );
        Ok(profile)
    }

    fn classify_failure(&self, ticket: &SessionTicket, error: TransportError) -> AuthError {
        if error.is_unauthorized() {
            self.expire(ticket)
        } else {
            network_failure(error)
        }
    }

    fn expire(&self, ticket: &SessionTicket) -> AuthError {
        let mut state = self.write();
        if state.is_current(ticket) {
            state.clear();
            tracing::warn!(epoch = ticket.epoch, "session expired, credential discarded");
        }
        AuthError::SessionExpired
    }

    // A panic elsewhere while holding the lock leaves the state itself
    // consistent (every mutation is a handful of assignments), so a
    // poisoned lock is simply taken over.
    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs `fut` on its own task and waits for it.
///
/// If the caller's future is dropped, the task keeps going.
async fn run_detached<T, F>(fut: F) -> Result<T, AuthError>
where
    F: std::future::Future<Output = Result<T, AuthError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(fut)
        .await
        .map_err(|e| AuthError::Network(format!("session task failed: {e}")))?
}

// =========================================================================
// Tests
// =========================================================================
