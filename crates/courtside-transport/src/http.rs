//! Reqwest-backed implementation of the collaborator traits.
//!
//! This adapter owns transport details only: URL building, the bearer
//! header, body encoding through a [`Codec`], and mapping HTTP statuses
//! onto [`TransportError`].

use std::time::Duration;

use courtside_protocol::{
    Codec, Credential, ErrorBody, JsonCodec, LoginRequest, Player, RosterReply, RosterUpdate,
    TokenGrant, UserId, UserProfile,
};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{Serialize, de::DeserializeOwned};

use crate::{AdminApi, AuthApi, CatalogApi, RosterApi, TransportError};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_USER_AGENT: &str = concat!("courtside/", env!("CARGO_PKG_VERSION"));

const LOGIN_PATH: &str = "login";
const REGISTER_PATH: &str = "register";
const CURRENT_USER_PATH: &str = "users/me";
const PLAYERS_PATH: &str = "players";
const TEAM_PATH: &str = "me/team";
const ADMIN_USERS_PATH: &str = "admin/users";

// ---------------------------------------------------------------------------
// HttpConfig
// ---------------------------------------------------------------------------

/// Where the API lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL of the API. Endpoint paths are resolved relative to it,
    /// so a prefix such as `https://host/api` is kept.
    pub base_url: String,

    /// Per-request timeout. A request that takes longer fails with
    /// [`TransportError::Network`].
    pub timeout: Duration,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    /// Builds a config from `COURTSIDE_API_URL` and
    /// `COURTSIDE_TIMEOUT_SECS`, falling back to the defaults for
    /// anything unset.
    ///
    /// # Errors
    /// Returns [`TransportError::InvalidUrl`] if the timeout is set but is
    /// not a whole number of seconds.
    pub fn from_env() -> Result<Self, TransportError> {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("COURTSIDE_API_URL") {
            config.base_url = url;
        }
        if let Ok(raw) = std::env::var("COURTSIDE_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                TransportError::InvalidUrl(format!(
                    "COURTSIDE_TIMEOUT_SECS must be a number of seconds, got {raw:?}"
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// HttpApi
// ---------------------------------------------------------------------------

/// HTTP client for the fantasy API. Implements every collaborator trait
/// of this crate.
///
/// `reqwest::Client` pools connections internally, so one `HttpApi` is
/// meant to be shared (behind an `Arc`) by the whole application.
#[derive(Debug, Clone)]
pub struct HttpApi<C: Codec = JsonCodec> {
    client: Client,
    base: Url,
    codec: C,
}

impl HttpApi<JsonCodec> {
    /// Builds a JSON client from the given config.
    ///
    /// # Errors
    /// - [`TransportError::InvalidUrl`]: `base_url` doesn't parse
    /// - [`TransportError::Network`]: the TLS backend failed to initialize
    pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
        Self::with_codec(config, JsonCodec)
    }
}

impl<C: Codec> HttpApi<C> {
    /// Builds a client that encodes bodies with `codec`.
    ///
    /// # Errors
    /// Same as [`HttpApi::new`].
    pub fn with_codec(config: &HttpConfig, codec: C) -> Result<Self, TransportError> {
        let base = parse_base_url(&config.base_url)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base,
            codec,
        })
    }

    /// Returns the base URL endpoint paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base
            .join(path)
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))
    }

    fn authorized(
        &self,
        method: Method,
        path: &str,
        credential: &Credential,
    ) -> Result<RequestBuilder, TransportError> {
        Ok(self
            .client
            .request(method, self.endpoint(path)?)
            .header(AUTHORIZATION, credential.bearer()))
    }

    fn get(&self, path: &str, credential: &Credential) -> Result<RequestBuilder, TransportError> {
        self.authorized(Method::GET, path, credential)
    }

    fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<RequestBuilder, TransportError> {
        Ok(self
            .client
            .post(self.endpoint(path)?)
            .header(CONTENT_TYPE, self.codec.content_type())
            .body(self.codec.encode(body)?))
    }

    /// Sends the request and returns the raw body of a 2xx response.
    async fn execute_raw(&self, request: RequestBuilder) -> Result<Vec<u8>, TransportError> {
        let response = request
            .header(ACCEPT, self.codec.content_type())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            tracing::debug!(
                path = %url,
                status = status.as_u16(),
                "request failed"
            );
            return Err(TransportError::from_status(
                status.as_u16(),
                self.error_detail(body.as_ref()),
            ));
        }
        Ok(body.to_vec())
    }

    /// Sends the request and decodes the 2xx body as `T`.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, TransportError> {
        let body = self.execute_raw(request).await?;
        Ok(self.codec.decode(&body)?)
    }

    /// Pulls a human-readable reason out of an error body: the `detail`
    /// field when the body is an API error, else a short preview of
    /// whatever came back.
    fn error_detail(&self, body: &[u8]) -> Option<String> {
        if let Ok(parsed) = self.codec.decode::<ErrorBody>(body) {
            if let Some(message) = parsed.message() {
                return Some(message);
            }
        }
        let preview = body_preview(body);
        (!preview.is_empty()).then_some(preview)
    }
}

impl<C: Codec> AuthApi for HttpApi<C> {
    async fn login(&self, request: &LoginRequest) -> Result<TokenGrant, TransportError> {
        self.execute(self.post(LOGIN_PATH, request)?).await
    }

    async fn register(&self, request: &LoginRequest) -> Result<(), TransportError> {
        // The body (the created account) isn't needed; the caller logs in
        // separately.
        self.execute_raw(self.post(REGISTER_PATH, request)?).await?;
        Ok(())
    }

    async fn current_user(&self, credential: &Credential) -> Result<UserProfile, TransportError> {
        self.execute(self.get(CURRENT_USER_PATH, credential)?).await
    }
}

impl<C: Codec> CatalogApi for HttpApi<C> {
    async fn list_players(&self, credential: &Credential) -> Result<Vec<Player>, TransportError> {
        self.execute(self.get(PLAYERS_PATH, credential)?).await
    }
}

impl<C: Codec> RosterApi for HttpApi<C> {
    async fn fetch_roster(&self, credential: &Credential) -> Result<Vec<Player>, TransportError> {
        self.execute(self.get(TEAM_PATH, credential)?).await
    }

    async fn replace_roster(
        &self,
        credential: &Credential,
        update: &RosterUpdate,
    ) -> Result<Option<RosterReply>, TransportError> {
        let request = self
            .post(TEAM_PATH, update)?
            .header(AUTHORIZATION, credential.bearer());
        let body = self.execute_raw(request).await?;
        match self.codec.decode::<RosterReply>(&body) {
            Ok(reply) => Ok(Some(reply)),
            Err(error) => {
                tracing::debug!(%error, "roster stored, reply carries no roster");
                Ok(None)
            }
        }
    }
}

impl<C: Codec> AdminApi for HttpApi<C> {
    async fn list_users(&self, credential: &Credential) -> Result<Vec<UserProfile>, TransportError> {
        self.execute(self.get(ADMIN_USERS_PATH, credential)?).await
    }

    async fn delete_user(&self, credential: &Credential, user: UserId) -> Result<(), TransportError> {
        let path = format!("{ADMIN_USERS_PATH}/{}", user.0);
        self.execute_raw(self.authorized(Method::DELETE, &path, credential)?)
            .await?;
        Ok(())
    }

    async fn reset_password(
        &self,
        credential: &Credential,
        user: UserId,
    ) -> Result<(), TransportError> {
        let path = format!("{ADMIN_USERS_PATH}/{}/reset-password", user.0);
        self.execute_raw(self.authorized(Method::POST, &path, credential)?)
            .await?;
        Ok(())
    }
}

/// Parses the base URL and makes sure it ends with `/`, so
/// `Url::join("players")` appends instead of replacing the last segment.
fn parse_base_url(raw: &str) -> Result<Url, TransportError> {
    let mut base =
        Url::parse(raw.trim()).map_err(|e| TransportError::InvalidUrl(format!("{raw}: {e}")))?;
    if base.cannot_be_a_base() {
        return Err(TransportError::InvalidUrl(format!(
            "{raw}: not usable as a base url"
        )));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn map_transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Network(format!("request timed out: {error}"))
    } else {
        TransportError::Network(error.to_string())
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
