//! `Courtside` application context and its builder.
//!
//! This is the entry point for a Courtside client. It ties together all
//! the layers: transport → protocol → session → roster.

use std::sync::Arc;
use std::time::Duration;

use courtside_protocol::{Credential, LoginRequest, Player, UserProfile};
use courtside_roster::{PlayerCatalog, RosterEngine};
use courtside_session::{AdminConsole, SessionManager};
use courtside_transport::{AdminApi, AuthApi, CatalogApi, HttpApi, HttpConfig, RosterApi};

use crate::CourtsideError;

/// Builder for configuring a [`Courtside`] context.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use courtside::prelude::*;
///
/// # fn main() -> Result<(), CourtsideError> {
/// let app = Courtside::builder()
///     .base_url("https://fantasy.example.com/api")
///     .timeout(Duration::from_secs(5))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CourtsideBuilder {
    http: HttpConfig,
}

impl CourtsideBuilder {
    /// Creates a builder with default settings (`http://localhost:8000`,
    /// 10 s timeout).
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from `COURTSIDE_API_URL` / `COURTSIDE_TIMEOUT_SECS`.
    ///
    /// # Errors
    /// Returns an error if `COURTSIDE_TIMEOUT_SECS` isn't a number.
    pub fn from_env() -> Result<Self, CourtsideError> {
        Ok(Self {
            http: HttpConfig::from_env()?,
        })
    }

    /// Sets the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.http.base_url = url.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = timeout;
        self
    }

    /// Replaces the whole HTTP configuration.
    pub fn http_config(mut self, config: HttpConfig) -> Self {
        self.http = config;
        self
    }

    /// Builds the HTTP client and a logged-out session.
    ///
    /// # Errors
    /// Returns an error if the base URL doesn't parse.
    pub fn build(self) -> Result<Courtside, CourtsideError> {
        let api = HttpApi::new(&self.http)?;
        tracing::debug!(base_url = %api.base_url(), "courtside client built");
        Ok(Courtside::with_backend(Arc::new(api)))
    }
}

/// The application context: one backend, one session.
///
/// Cheap to clone; clones share the session. Pass it (or the
/// [`SessionManager`] it holds) to whatever needs authenticated calls.
pub struct Courtside<B = HttpApi> {
    api: Arc<B>,
    session: SessionManager<B>,
}

impl<B> Clone for Courtside<B> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            session: self.session.clone(),
        }
    }
}

impl Courtside<HttpApi> {
    /// Creates a new builder.
    pub fn builder() -> CourtsideBuilder {
        CourtsideBuilder::new()
    }
}

impl<B> Courtside<B>
where
    B: AuthApi + CatalogApi + RosterApi,
{
    /// Wraps an existing backend. Useful for in-memory backends in tests.
    pub fn with_backend(api: Arc<B>) -> Self {
        let session = SessionManager::new(Arc::clone(&api));
        Self { api, session }
    }

    pub fn session(&self) -> &SessionManager<B> {
        &self.session
    }

    /// Logs in and caches the profile.
    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Credential, CourtsideError> {
        Ok(self
            .session
            .login(LoginRequest::new(email, password))
            .await?)
    }

    /// Creates an account. Call [`login`](Self::login) afterwards.
    pub async fn register(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<(), CourtsideError> {
        Ok(self
            .session
            .register(&LoginRequest::new(email, password))
            .await?)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    pub fn current_profile(&self) -> Option<Arc<UserProfile>> {
        self.session.current_profile()
    }

    pub async fn refresh_profile(&self) -> Result<Arc<UserProfile>, CourtsideError> {
        Ok(self.session.refresh_profile().await?)
    }

    /// Opens a roster editor seeded from the cached profile.
    pub fn editor(&self) -> RosterEngine<B, B> {
        RosterEngine::open(self.session.clone(), Arc::clone(&self.api))
    }

    /// Returns an empty player catalog bound to this session.
    pub fn catalog(&self) -> PlayerCatalog<B, B> {
        PlayerCatalog::new(self.session.clone(), Arc::clone(&self.api))
    }

    /// Reads the stored roster straight from the roster store.
    ///
    /// Doesn't touch the cached profile.
    pub async fn stored_roster(&self) -> Result<Vec<Player>, CourtsideError> {
        let ticket = self.session.ticket()?;
        self.api
            .fetch_roster(ticket.credential())
            .await
            .map_err(|e| self.session.classify_failure(&ticket, e).into())
    }
}

impl<B> Courtside<B>
where
    B: AuthApi + AdminApi,
{
    /// Returns the account administration console for this session.
    ///
    /// Every call on it fails locally unless the logged-in profile has
    /// the administrator role.
    pub fn admin(&self) -> AdminConsole<B, B> {
        AdminConsole::new(self.session.clone(), Arc::clone(&self.api))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_local_api() {
        let builder = CourtsideBuilder::new();
        assert_eq!(builder.http.base_url, "http://localhost:8000");
        assert_eq!(builder.http.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_builder_overrides_url_and_timeout() {
        let builder = Courtside::builder()
            .base_url("https://fantasy.example.com/api")
            .timeout(Duration::from_secs(3));
        assert_eq!(builder.http.base_url, "https://fantasy.example.com/api");
        assert_eq!(builder.http.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_build_rejects_bad_base_url() {
        let result = Courtside::builder().base_url("::not a url::").build();
        assert!(matches!(result, Err(CourtsideError::Transport(_))));
    }

    #[test]
    fn test_build_starts_logged_out() {
        let app = Courtside::builder().build().expect("default config builds");
        assert!(!app.session().is_authenticated());
        assert!(app.current_profile().is_none());
    }
}
