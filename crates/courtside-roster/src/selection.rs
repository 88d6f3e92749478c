//! The working selection: the set of player ids being edited.

use std::collections::BTreeSet;

use courtside_protocol::{PlayerId, RosterUpdate};

use crate::{MAX_ROSTER_SIZE, RosterError};

/// A bounded set of player ids.
///
/// The bound is enforced on every insertion, so `len() <= capacity()`
/// holds after any sequence of [`add`](Self::add) and
/// [`remove`](Self::remove) calls. Ids are kept sorted, which makes the
/// saved body deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingSelection {
    ids: BTreeSet<PlayerId>,
    capacity: usize,
}

impl Default for WorkingSelection {
    fn default() -> Self {
        Self::new(MAX_ROSTER_SIZE)
    }
}

impl WorkingSelection {
    /// Creates an empty selection holding at most `capacity` ids.
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: BTreeSet::new(),
            capacity,
        }
    }

    /// Creates a selection pre-filled with `ids`.
    ///
    /// # Errors
    /// [`RosterError::CapacityExceeded`] if there are more distinct ids
    /// than `capacity`.
    pub fn seeded(
        ids: impl IntoIterator<Item = PlayerId>,
        capacity: usize,
    ) -> Result<Self, RosterError> {
        let ids: BTreeSet<PlayerId> = ids.into_iter().collect();
        if ids.len() > capacity {
            return Err(RosterError::CapacityExceeded { max: capacity });
        }
        Ok(Self { ids, capacity })
    }

    /// Adds `id`. Returns `Ok(false)` if it was already selected.
    ///
    /// # Errors
    /// [`RosterError::CapacityExceeded`] if the selection is full; the
    /// selection is unchanged.
    pub fn add(&mut self, id: PlayerId) -> Result<bool, RosterError> {
        if self.ids.contains(&id) {
            return Ok(false);
        }
        if self.is_full() {
            return Err(RosterError::CapacityExceeded {
                max: self.capacity,
            });
        }
        Ok(self.ids.insert(id))
    }

    /// Removes `id`. Returns `false` if it wasn't selected.
    pub fn remove(&mut self, id: PlayerId) -> bool {
        self.ids.remove(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.ids.len() >= self.capacity
    }

    /// How many more players fit.
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.ids.len())
    }

    pub fn ids(&self) -> &BTreeSet<PlayerId> {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.ids.iter().copied()
    }

    /// The replacement body for `POST /me/team`.
    pub fn to_update(&self) -> RosterUpdate {
        RosterUpdate::from_ids(&self.ids)
    }

    /// Overwrites the ids with the store's roster after a commit.
    ///
    /// The store is authoritative here, so the bound isn't checked.
    pub(crate) fn mirror(&mut self, ids: BTreeSet<PlayerId>) {
        self.ids = ids;
    }
}
