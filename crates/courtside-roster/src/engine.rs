//! The roster engine: edits a working selection and saves it.
//!
//! Edits are batch-replace: `add` and `remove` only touch the local
//! selection, and `save` sends the whole selection to the store as a
//! replacement set. After the store accepts it, the engine asks the
//! session to re-read the profile, so the cached roster and the cached
//! aggregate score are replaced together.
//!
//! # Concurrency note
//!
//! The engine's state lives in an `Arc<Mutex<EngineCore>>` shared with
//! the task that performs a save. The save task applies its own outcome
//! (commit or failure) to that state, so the outcome lands even if the
//! caller stopped waiting for `save()`. The engine keeps the task's
//! `JoinHandle` and waits on it before the next save, so saves never
//! overlap. The outcome of a save nobody waited for is kept until
//! [`RosterEngine::settle`] hands it out.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use courtside_protocol::{PlayerId, RosterUpdate, UserProfile};
use courtside_session::{AuthError, SessionManager, SessionTicket};
use courtside_transport::{AuthApi, RosterApi};
use tokio::task::{JoinError, JoinHandle};

use crate::error::save_failure;
use crate::{EditorState, MAX_ROSTER_SIZE, RosterError, WorkingSelection};

type SaveResult = Result<Arc<UserProfile>, RosterError>;

// ---------------------------------------------------------------------------
// EngineCore
// ---------------------------------------------------------------------------

/// Everything the engine and its save task share.
#[derive(Debug)]
struct EngineCore {
    selection: WorkingSelection,
    /// The authoritative roster the selection was seeded from (or last
    /// committed to). Used for `is_dirty`.
    baseline: BTreeSet<PlayerId>,
    state: EditorState,
    /// Session epoch the editor was seeded under. A ticket from any other
    /// epoch belongs to someone else's session.
    epoch: Option<u64>,
    blocked_by: Option<RosterError>,
}

impl EngineCore {
    fn seeded(profile: &UserProfile, epoch: u64) -> Self {
        let baseline = profile.roster_ids();
        match WorkingSelection::seeded(baseline.iter().copied(), MAX_ROSTER_SIZE) {
            Ok(selection) => Self {
                selection,
                baseline,
                state: EditorState::Seeded,
                epoch: Some(epoch),
                blocked_by: None,
            },
            Err(reason) => {
                tracing::warn!(
                    size = baseline.len(),
                    max = MAX_ROSTER_SIZE,
                    "stored roster is larger than allowed, editor blocked"
                );
                let mut core = Self::blocked(reason);
                core.epoch = Some(epoch);
                core
            }
        }
    }

    fn blocked(reason: RosterError) -> Self {
        Self {
            selection: WorkingSelection::default(),
            baseline: BTreeSet::new(),
            state: EditorState::Blocked,
            epoch: None,
            blocked_by: Some(reason),
        }
    }

    fn block(&mut self, reason: RosterError) {
        self.state = EditorState::Blocked;
        self.blocked_by = Some(reason);
    }

    fn commit(&mut self, roster: BTreeSet<PlayerId>) {
        self.selection.mirror(roster.clone());
        self.baseline = roster;
        self.state = EditorState::Committed;
    }

    /// Records a failed save. The selection keeps the user's edits.
    ///
    /// Once the session is lost, later operations report `NoSession`.
    fn fail(&mut self, error: &RosterError) {
        if error.is_session_loss() {
            self.block(RosterError::Auth(AuthError::NoSession));
        } else {
            self.state = EditorState::Failed;
        }
    }

    fn is_dirty(&self) -> bool {
        self.selection.ids() != &self.baseline
    }
}

fn lock(core: &Mutex<EngineCore>) -> MutexGuard<'_, EngineCore> {
    core.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Seeds a core from whatever the session currently holds.
fn seed<A: AuthApi>(session: &SessionManager<A>) -> EngineCore {
    let Ok(ticket) = session.ticket() else {
        return EngineCore::blocked(AuthError::NoSession.into());
    };
    match session.current_profile() {
        Some(profile) if session.is_current(&ticket) => {
            EngineCore::seeded(&profile, ticket.epoch())
        }
        _ => EngineCore::blocked(AuthError::NoSession.into()),
    }
}

// ---------------------------------------------------------------------------
// RosterEngine
// ---------------------------------------------------------------------------

/// A roster editor for one editing session.
///
/// Each editor owns its selection; two editors over the same session are
/// independent and the last save to reach the store wins.
pub struct RosterEngine<A, R> {
    session: SessionManager<A>,
    store: Arc<R>,
    core: Arc<Mutex<EngineCore>>,
    in_flight: Option<JoinHandle<SaveResult>>,
    /// Outcome of an abandoned save, reaped by a later `save()` before
    /// anyone called `settle()`.
    abandoned: Option<SaveResult>,
}

impl<A: AuthApi, R: RosterApi> RosterEngine<A, R> {
    /// Opens an editor seeded from the session's cached roster.
    ///
    /// Without a session the editor opens [`EditorState::Blocked`] and
    /// every operation fails with [`AuthError::NoSession`].
    pub fn open(session: SessionManager<A>, store: Arc<R>) -> Self {
        let core = seed(&session);
        tracing::debug!(state = %core.state, size = core.selection.len(), "roster editor opened");
        Self {
            session,
            store,
            core: Arc::new(Mutex::new(core)),
            in_flight: None,
            abandoned: None,
        }
    }

    pub fn state(&self) -> EditorState {
        lock(&self.core).state
    }

    /// Why the editor is blocked, if it is.
    pub fn blocked_reason(&self) -> Option<RosterError> {
        lock(&self.core).blocked_by.clone()
    }

    /// A snapshot of the working selection.
    pub fn selection(&self) -> WorkingSelection {
        lock(&self.core).selection.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.core).selection.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.core).selection.is_empty()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        lock(&self.core).selection.contains(id)
    }

    pub fn remaining(&self) -> usize {
        lock(&self.core).selection.remaining()
    }

    /// Returns `true` if the selection differs from the authoritative
    /// roster it was seeded from (or last committed to).
    pub fn is_dirty(&self) -> bool {
        lock(&self.core).is_dirty()
    }

    pub fn session(&self) -> &SessionManager<A> {
        &self.session
    }

    /// Selects `id`. Returns `Ok(false)` if it was already selected.
    ///
    /// Local only: no request is made.
    ///
    /// # Errors
    /// - [`RosterError::CapacityExceeded`]: already at the limit
    /// - [`RosterError::Auth`] with `NoSession`: no usable session
    /// - [`RosterError::SaveInProgress`]: an abandoned save is running
    pub fn add(&mut self, id: PlayerId) -> Result<bool, RosterError> {
        self.edit(id, "add", |selection| selection.add(id))
    }

    /// Deselects `id`. Returns `Ok(false)` if it wasn't selected.
    ///
    /// # Errors
    /// Same as [`add`](Self::add), minus `CapacityExceeded`.
    pub fn remove(&mut self, id: PlayerId) -> Result<bool, RosterError> {
        self.edit(id, "remove", |selection| Ok(selection.remove(id)))
    }

    /// Sends the selection to the store as a replacement set, then
    /// refreshes the session's profile.
    ///
    /// Returns the refreshed profile. If an earlier save is still
    /// running, this waits for it first and keeps its outcome for
    /// [`settle`](Self::settle).
    ///
    /// # Errors
    /// - [`RosterError::PlayerUnknown`] / [`RosterError::Rejected`]:
    ///   the store refused the set; nothing was stored
    /// - [`RosterError::Network`]: nothing was stored; retry
    /// - [`RosterError::Auth`]: no session, or it expired during the
    ///   call (the session has been logged out)
    /// - [`RosterError::RefreshFailed`]: stored, but the profile
    ///   couldn't be re-read
    ///
    /// In every failure case except `RefreshFailed` the selection keeps
    /// the user's edits.
    pub async fn save(&mut self) -> SaveResult {
        if let Some(previous) = self.in_flight.as_mut() {
            tracing::debug!("waiting for an earlier save to land");
            let outcome = landed(previous.await);
            self.in_flight = None;
            match &outcome {
                Ok(profile) => tracing::debug!(
                    roster_size = profile.roster.len(),
                    "earlier save landed"
                ),
                Err(error) => tracing::debug!(%error, "earlier save failed"),
            }
            self.abandoned = Some(outcome);
        }

        let ticket = self.ticket()?;
        let update = {
            let mut core = lock(&self.core);
            core.state = EditorState::Saving;
            core.selection.to_update()
        };
        tracing::info!(size = update.player_ids.len(), "saving roster");

        let task = tokio::spawn(run_save(
            self.session.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.core),
            ticket,
            update,
        ));
        // Kept in `in_flight` while awaited: if this future is dropped,
        // the next call still finds the task and waits for it.
        let joined = self.in_flight.insert(task).await;
        self.in_flight = None;

        joined.unwrap_or_else(|e| {
            let error = task_failure(&e);
            lock(&self.core).fail(&error);
            Err(error)
        })
    }

    /// Drops unsaved edits and re-seeds from the session's cached roster.
    ///
    /// This is also how a blocked editor recovers after a new login.
    ///
    /// # Errors
    /// - [`RosterError::SaveInProgress`]: an abandoned save is running
    /// - [`RosterError::Auth`] with `NoSession`: still no session; the
    ///   editor stays blocked
    pub fn discard(&mut self) -> Result<(), RosterError> {
        self.check_idle()?;
        let core = seed(&self.session);
        let outcome = core.blocked_by.clone().map_or(Ok(()), Err);
        tracing::debug!(state = %core.state, size = core.selection.len(), "roster editor re-seeded");
        *lock(&self.core) = core;
        outcome
    }

    /// Returns the outcome of a save the caller stopped waiting for,
    /// waiting for it first if it is still running.
    ///
    /// A later `save()` waits for such a save before sending its own; the
    /// earlier outcome is kept here until this is called. Returns `None`
    /// when there is nothing to report. The outcome has already been
    /// applied to the editor either way.
    pub async fn settle(&mut self) -> Option<SaveResult> {
        if let Some(outcome) = self.abandoned.take() {
            return Some(outcome);
        }
        let pending = self.in_flight.as_mut()?;
        let outcome = landed(pending.await);
        self.in_flight = None;
        Some(outcome)
    }

    fn edit(
        &mut self,
        id: PlayerId,
        action: &'static str,
        apply: impl FnOnce(&mut WorkingSelection) -> Result<bool, RosterError>,
    ) -> Result<bool, RosterError> {
        self.check_idle()?;
        self.ticket()?;

        let mut core = lock(&self.core);
        match apply(&mut core.selection) {
            Ok(changed) => {
                if changed {
                    core.state = EditorState::Editing;
                }
                tracing::debug!(
                    player_id = %id,
                    action,
                    changed,
                    size = core.selection.len(),
                    "selection edited"
                );
                Ok(changed)
            }
            Err(error) => {
                tracing::debug!(player_id = %id, action, %error, "edit rejected");
                Err(error)
            }
        }
    }

    /// Fails if a save the caller abandoned hasn't landed yet.
    ///
    /// A finished handle stays in `in_flight` so `settle` can still
    /// report its outcome.
    fn check_idle(&self) -> Result<(), RosterError> {
        match &self.in_flight {
            Some(handle) if !handle.is_finished() => Err(RosterError::SaveInProgress),
            _ => Ok(()),
        }
    }

    /// Issues a ticket for the session this editor was seeded under.
    ///
    /// Blocks the editor if that session is gone.
    fn ticket(&self) -> Result<SessionTicket, RosterError> {
        let mut core = lock(&self.core);
        if core.state == EditorState::Blocked {
            return Err(core
                .blocked_by
                .clone()
                .unwrap_or(RosterError::Auth(AuthError::NoSession)));
        }
        match self.session.ticket() {
            Ok(ticket) if core.epoch == Some(ticket.epoch()) => Ok(ticket),
            _ => {
                let error = RosterError::Auth(AuthError::NoSession);
                tracing::debug!("session gone, roster editor blocked");
                core.block(error.clone());
                Err(error)
            }
        }
    }
}

fn task_failure(error: &JoinError) -> RosterError {
    RosterError::Network(format!("save task failed: {error}"))
}

fn landed(joined: Result<SaveResult, JoinError>) -> SaveResult {
    joined.unwrap_or_else(|e| Err(task_failure(&e)))
}

/// The body of a save task.
///
/// Any 2xx from the store is a commit, whether or not its body carries
/// the stored roster. When it doesn't, the set that was sent is what the
/// store now holds.
async fn run_save<A: AuthApi, R: RosterApi>(
    session: SessionManager<A>,
    store: Arc<R>,
    core: Arc<Mutex<EngineCore>>,
    ticket: SessionTicket,
    update: RosterUpdate,
) -> SaveResult {
    let reply = match store.replace_roster(ticket.credential(), &update).await {
        Ok(reply) => reply,
        Err(error) => {
            let error = if error.is_unauthorized() {
                RosterError::Auth(session.expire(&ticket))
            } else {
                save_failure(error)
            };
            tracing::warn!(%error, "roster save failed");
            lock(&core).fail(&error);
            return Err(error);
        }
    };

    let stored = match reply {
        Some(reply) => reply.roster_ids(),
        None => update.player_ids.iter().copied().collect(),
    };
    tracing::info!(size = stored.len(), "roster committed");

    match session.refresh_with(&ticket).await {
        Ok(profile) => {
            lock(&core).commit(profile.roster_ids());
            Ok(profile)
        }
        Err(error) => {
            tracing::warn!(%error, "roster committed but profile refresh failed");
            lock(&core).commit(stored);
            Err(RosterError::RefreshFailed(error))
        }
    }
}

#[cfg(test)]
mod tests {
    use courtside_protocol::{Player, Role, UserId};

    use super::*;

    fn profile(ids: &[u64]) -> UserProfile {
        UserProfile {
            id: UserId(1),
            email: "fan@example.com".into(),
            role: Role::User,
            total_score: 0.0,
            roster: ids
                .iter()
                .map(|id| Player {
                    id: PlayerId(*id),
                    name: format!("Player {id}"),
                    position: None,
                    team: None,
                    average_score: 0.0,
                    last_game_score: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_seeded_core_copies_roster_and_is_clean() {
        let core = EngineCore::seeded(&profile(&[4, 2]), 3);

        assert_eq!(core.state, EditorState::Seeded);
        assert_eq!(core.epoch, Some(3));
        assert_eq!(core.selection.len(), 2);
        assert!(!core.is_dirty());
    }

    #[test]
    fn test_seeded_core_over_capacity_is_blocked() {
        let ids: Vec<u64> = (1..=11).collect();
        let core = EngineCore::seeded(&profile(&ids), 1);

        assert_eq!(core.state, EditorState::Blocked);
        assert_eq!(
            core.blocked_by,
            Some(RosterError::CapacityExceeded { max: 10 })
        );
    }

    #[test]
    fn test_fail_keeps_selection_and_marks_failed() {
        let mut core = EngineCore::seeded(&profile(&[1]), 1);
        core.selection.add(PlayerId(2)).unwrap();

        core.fail(&RosterError::Network("down".into()));

        assert_eq!(core.state, EditorState::Failed);
        assert!(core.selection.contains(PlayerId(2)));
        assert!(core.is_dirty());
    }

    #[test]
    fn test_fail_with_session_loss_blocks() {
        let mut core = EngineCore::seeded(&profile(&[]), 1);

        core.fail(&RosterError::Auth(AuthError::SessionExpired));

        assert_eq!(core.state, EditorState::Blocked);
        assert_eq!(
            core.blocked_by,
            Some(RosterError::Auth(AuthError::NoSession))
        );
    }

    #[test]
    fn test_commit_mirrors_authoritative_roster() {
        let mut core = EngineCore::seeded(&profile(&[1]), 1);
        core.selection.add(PlayerId(2)).unwrap();

        core.commit([PlayerId(1), PlayerId(2)].into_iter().collect());

        assert_eq!(core.state, EditorState::Committed);
        assert!(!core.is_dirty());
    }
}
