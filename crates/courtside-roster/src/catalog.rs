//! Cached view of the read-only player catalog.

use std::collections::BTreeMap;
use std::sync::Arc;

use courtside_protocol::{Player, PlayerId};
use courtside_session::SessionManager;
use courtside_transport::{AuthApi, CatalogApi};

use crate::RosterError;
use crate::error::call_failure;

/// The player pool, fetched under the session's credential and indexed
/// by id.
///
/// The catalog is never edited locally. [`load`](Self::load) replaces the
/// whole cache.
pub struct PlayerCatalog<A, C> {
    session: SessionManager<A>,
    api: Arc<C>,
    players: BTreeMap<PlayerId, Player>,
}

impl<A: AuthApi, C: CatalogApi> PlayerCatalog<A, C> {
    /// Creates an empty catalog. Call [`load`](Self::load) to fill it.
    pub fn new(session: SessionManager<A>, api: Arc<C>) -> Self {
        Self {
            session,
            api,
            players: BTreeMap::new(),
        }
    }

    /// Fetches the catalog and replaces the cache. Returns the number of
    /// players loaded.
    ///
    /// # Errors
    /// - [`RosterError::Auth`]: no session, or the credential was
    ///   refused (the session has been logged out)
    /// - [`RosterError::Network`]: the cache is left as it was
    pub async fn load(&mut self) -> Result<usize, RosterError> {
        let ticket = self.session.ticket()?;
        let players = self
            .api
            .list_players(ticket.credential())
            .await
            .map_err(|e| call_failure(self.session.classify_failure(&ticket, e)))?;

        self.players = players.into_iter().map(|p| (p.id, p)).collect();
        tracing::debug!(players = self.players.len(), "player catalog loaded");
        Ok(self.players.len())
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// All players, ordered by id.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Looks up every id in `ids`.
    ///
    /// # Errors
    /// [`RosterError::PlayerUnknown`] naming the first id not in the
    /// cache.
    pub fn resolve(
        &self,
        ids: impl IntoIterator<Item = PlayerId>,
    ) -> Result<Vec<&Player>, RosterError> {
        ids.into_iter()
            .map(|id| {
                self.get(id)
                    .ok_or_else(|| RosterError::PlayerUnknown(format!("{id} is not in the catalog")))
            })
            .collect()
    }
}
