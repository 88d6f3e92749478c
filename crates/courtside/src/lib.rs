//! # Courtside
//!
//! Client core for a fantasy basketball league.
//!
//! Courtside keeps two things consistent: the user's session (credential
//! plus the profile it authorizes) and the roster being edited (at most
//! ten players, saved to the server as one replacement set and then
//! reconciled by re-reading the profile).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courtside::prelude::*;
//!
//! # async fn run() -> Result<(), CourtsideError> {
//! let app = Courtside::builder().base_url("http://localhost:8000").build()?;
//! app.login("fan@example.com", "secret").await?;
//!
//! let mut editor = app.editor();
//! editor.add(PlayerId(23))?;
//! let profile = editor.save().await?;
//! println!("{} points", profile.total_score);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{Courtside, CourtsideBuilder};
pub use error::CourtsideError;

/// Installs a `tracing` subscriber that prints to stderr.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Calling it
/// twice is harmless; the second call does nothing.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Re-exports of the most common types.
///
/// ```rust
/// use courtside::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Courtside, CourtsideBuilder, CourtsideError};
    pub use courtside_protocol::{Player, PlayerId, Role, UserId, UserProfile};
    pub use courtside_roster::{
        EditorState, MAX_ROSTER_SIZE, PlayerCatalog, RosterEngine, RosterError, WorkingSelection,
    };
    pub use courtside_session::{AdminConsole, AdminError, AuthError, SessionManager};
    pub use courtside_transport::{HttpApi, HttpConfig, TransportError};
}
