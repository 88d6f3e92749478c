//! Editor state machine.

// ---------------------------------------------------------------------------
// EditorState
// ---------------------------------------------------------------------------

/// The lifecycle state of a roster editor.
///
/// ```text
///            add/remove              save()
/// Seeded ──────────────→ Editing ──────────→ Saving ──┬──→ Committed
///    │                     ↑                          └──→ Failed
///    │                     └── add/remove ── Committed / Failed
///    │
///    └── (no session, or session lost) ──→ Blocked
/// ```
///
/// - **Seeded**: the selection is a copy of the authoritative roster.
/// - **Editing**: the selection has local, unsaved changes.
/// - **Saving**: a replacement set has been sent to the store.
/// - **Committed**: the store accepted the last save and the selection
///   mirrors the authoritative roster.
/// - **Failed**: the last save was refused or never arrived. The
///   selection still holds the user's edits.
/// - **Blocked**: no usable session (or an unusable seed). Nothing is
///   accepted until the editor is re-seeded with
///   [`RosterEngine::discard`](crate::RosterEngine::discard).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Seeded,
    Editing,
    Saving,
    Committed,
    Failed,
    Blocked,
}

impl EditorState {
    /// Returns `true` if local edits and saves are accepted.
    pub fn accepts_edits(&self) -> bool {
        !matches!(self, Self::Saving | Self::Blocked)
    }

    /// Returns `true` if the last save has resolved one way or the other.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Committed | Self::Failed)
    }
}

impl std::fmt::Display for EditorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seeded => write!(f, "Seeded"),
            Self::Editing => write!(f, "Editing"),
            Self::Saving => write!(f, "Saving"),
            Self::Committed => write!(f, "Committed"),
            Self::Failed => write!(f, "Failed"),
            Self::Blocked => write!(f, "Blocked"),
        }
    }
}
