//! Core protocol types for Courtside's wire format.
//!
//! This module defines every type that travels "on the wire" between the
//! client core and the fantasy API: login exchanges, the user profile,
//! catalog players, and roster replacement requests.
//!
//! Field names on the Rust side describe what the value means; the
//! `#[serde(rename = ...)]` attributes pin them to the names the API uses.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a catalog player.
///
/// This is a "newtype wrapper" around the API's numeric id. It keeps
/// player ids and user ids from being mixed up even though both are
/// `u64` underneath.
///
/// `Ord` is derived so ids can live in a `BTreeSet`, which gives roster
/// selections a stable iteration order (handy for logs and for sending
/// the same request body for the same set).
///
/// `#[serde(transparent)]` serializes a `PlayerId(42)` as just `42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for an account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// An opaque bearer token.
///
/// The client never parses or validates the token; it only forwards it
/// in the `Authorization` header and throws it away on logout. The one
/// rule enforced here is that a credential is never empty, so holding a
/// `Credential` always means "there is something to send".
///
/// `Debug` is implemented by hand so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw token.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] if the token is empty or
    /// only whitespace.
    pub fn new(token: impl Into<String>) -> Result<Self, ProtocolError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "credential token must not be empty".into(),
            ));
        }
        Ok(Self(token))
    }

    /// Returns the raw token for use in an `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Formats the token as a bearer authorization value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

// ---------------------------------------------------------------------------
// Login exchange
// ---------------------------------------------------------------------------

/// Identity + secret sent to `POST /login` (and `POST /register`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Successful answer to a login exchange.
///
/// The API answers `{ "access_token": "...", "token_type": "bearer" }`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".into()
}

impl TokenGrant {
    /// Converts the grant into a [`Credential`].
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] when the token is empty
    /// or the token type is not a bearer token.
    pub fn into_credential(self) -> Result<Credential, ProtocolError> {
        if !self.token_type.eq_ignore_ascii_case("bearer") {
            return Err(ProtocolError::InvalidMessage(format!(
                "unsupported token type: {}",
                self.token_type
            )));
        }
        Credential::new(self.access_token)
    }
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"***")
            .field("token_type", &self.token_type)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Players and profiles
// ---------------------------------------------------------------------------

/// A player from the read-only catalog.
///
/// The core never edits players; it only refers to them by [`PlayerId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(rename = "full_name")]
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(rename = "team_name", default)]
    pub team: Option<String>,
    #[serde(rename = "average_fantasy_points", default)]
    pub average_score: f64,
    #[serde(rename = "last_game_fantasy_points", default)]
    pub last_game_score: Option<f64>,
}

/// Account role.
///
/// The API sends lowercase strings. Anything other than `"admin"` is
/// treated as an ordinary account, so a new role on the server never
/// breaks profile decoding (and never grants admin by accident).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    #[serde(other)]
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// The authoritative view of one account: identity, role, roster and the
/// server-computed aggregate score.
///
/// `total_score` and `roster` always come from the same response. The
/// client replaces a profile wholesale and never patches single fields,
/// so the two can't drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(rename = "total_fantasy_points", default)]
    pub total_score: f64,
    #[serde(rename = "players", default)]
    pub roster: Vec<Player>,
}

impl UserProfile {
    /// Returns the ids of every rostered player.
    pub fn roster_ids(&self) -> BTreeSet<PlayerId> {
        self.roster.iter().map(|p| p.id).collect()
    }

    /// Returns `true` if the account has the administrator role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// ---------------------------------------------------------------------------
// Roster store messages
// ---------------------------------------------------------------------------

/// Body of `POST /me/team`: the complete replacement roster.
///
/// This is a replacement set, not a diff. The store applies it
/// all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterUpdate {
    pub player_ids: Vec<PlayerId>,
}

impl RosterUpdate {
    /// Builds a replacement body from any collection of ids.
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a PlayerId>) -> Self {
        Self {
            player_ids: ids.into_iter().copied().collect(),
        }
    }
}

/// Answer to a roster replacement.
///
/// Depending on the server version the store answers with the bare
/// roster (`Player[]`) or with the whole updated profile. `untagged`
/// lets serde try each shape in order: a JSON object can only be a
/// profile, an array can only be a roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RosterReply {
    Profile(UserProfile),
    Players(Vec<Player>),
}

impl RosterReply {
    /// Returns the roster carried by the reply, whatever its shape.
    pub fn players(&self) -> &[Player] {
        match self {
            Self::Profile(profile) => &profile.roster,
            Self::Players(players) => players,
        }
    }

    /// Returns the ids of the roster carried by the reply.
    pub fn roster_ids(&self) -> BTreeSet<PlayerId> {
        self.players().iter().map(|p| p.id).collect()
    }
}

// ---------------------------------------------------------------------------
// Error bodies
// ---------------------------------------------------------------------------

/// Error body returned by the API on 4xx/5xx responses.
///
/// `detail` is usually a string ("Incorrect email or password") but
/// validation failures send a structured list, so it is kept as a raw
/// JSON value and rendered on demand.
#[cfg(feature = "json")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

#[cfg(feature = "json")]
impl ErrorBody {
    /// Renders `detail` as a human-readable message, if present.
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}
