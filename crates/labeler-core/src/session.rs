//! Labeling Session and Save/Advance Gate
//!
//! One session exists per work item. It composes the label array, the edit
//! state machine, and the cursor, and it owns the saved snapshot the dirty
//! check compares against. Hosts drive it single-threaded, one action per
//! tick, strictly after refreshing the tick's loaded count from the loading
//! collaborator; rendering only observes the session through
//! [`LabelSession::state`] and the read accessors.
//!
//! # Example
//!
//! ```rust
//! use labeler_core::{Action, ActionOutcome, LabelSession, MemorySpotStore};
//!
//! let mut store = MemorySpotStore::default();
//! let mut session = LabelSession::new(10);
//! session.set_loaded_count(10);
//!
//! session.apply(Action::Begin, &mut store).unwrap();
//! session.apply(Action::Step { delta: 4 }, &mut store).unwrap();
//! session.apply(Action::End, &mut store).unwrap();
//! assert!(session.is_dirty());
//!
//! session.apply(Action::Save, &mut store).unwrap();
//! assert_eq!(
//!     session.apply(Action::Advance, &mut store).unwrap(),
//!     ActionOutcome::Advance
//! );
//! ```

use crate::cursor::Cursor;
use crate::editor::{EditOutcome, IntervalEditor};
use crate::labels::{LabelArray, LabelCode};
use crate::spots::{Spot, SpotError, SpotStore, StoreError, labels_from_spots, spots_from_labels};

/// One input action, applied at most once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Open, cancel, or seek-to-start of an interval at the cursor.
    Begin,
    /// Commit, reopen, or seek-to-end of an interval at the cursor.
    End,
    /// Delete the interval containing the cursor (inner positions only).
    Delete,
    /// Move the cursor within the loaded prefix.
    Step {
        /// Signed step size; hosts pass their configured big step here too.
        delta: isize,
    },
    /// Persist the current labeling if the save gate allows it.
    Save,
    /// Ask to move on to the next work item.
    Advance,
    /// Leave the tool.
    Quit,
}

/// What one applied action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Labels changed.
    Applied,
    /// Preconditions not met; state unchanged.
    Ignored,
    /// The cursor moved to this position (stepping or boundary seek).
    CursorMoved(usize),
    /// The labeling was persisted and the saved snapshot refreshed.
    Saved,
    /// The save gate refused: an interval is pending or boundaries are
    /// unbalanced. Nothing was persisted.
    SaveBlocked,
    /// Clean session; the host may tear it down and open the next work item.
    Advance,
    /// Unsaved changes exist; the host must warn and stay on this work item.
    AdvanceBlocked,
    /// The host should exit.
    Quit,
}

/// Session-level failure.
///
/// Only the persistence boundary can fail; user-driven edits never do.
#[derive(Debug)]
pub enum SessionError {
    /// The persistence collaborator failed while saving.
    Store(StoreError),
    /// The label array could not be encoded (corrupted structure).
    Encoding(SpotError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Store(err) => write!(f, "Save failed: {}", err),
            SessionError::Encoding(err) => write!(f, "Label structure invalid: {}", err),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Store(err) => Some(err),
            SessionError::Encoding(err) => Some(err),
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        SessionError::Store(err)
    }
}

impl From<SpotError> for SessionError {
    fn from(err: SpotError) -> Self {
        SessionError::Encoding(err)
    }
}

/// Snapshot of session state for rendering and host messaging.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Current cursor position.
    pub cursor: usize,
    /// Loaded prefix length as of this tick.
    pub loaded_count: usize,
    /// Total sequence length.
    pub total_len: usize,
    /// Whether an interval is open and waiting for its end.
    pub waiting_end: bool,
    /// Position of the pending start mark, while one exists.
    pub pending_start: Option<usize>,
    /// Number of committed intervals.
    pub interval_count: usize,
    /// Whether the labeling differs from the last saved snapshot.
    pub is_dirty: bool,
    /// Whether the save gate would currently allow persisting.
    pub can_save: bool,
}

/// One work item's labeling session.
pub struct LabelSession {
    labels: LabelArray,
    saved: LabelArray,
    cursor: Cursor,
    editor: IntervalEditor,
    loaded_count: usize,
}

impl LabelSession {
    /// Open a fresh session over a sequence of `len` positions.
    pub fn new(len: usize) -> Self {
        let labels = LabelArray::new(len);
        Self {
            saved: labels.clone(),
            labels,
            cursor: Cursor::new(),
            editor: IntervalEditor::new(),
            loaded_count: 0,
        }
    }

    /// Open a session over a previously saved labeling.
    ///
    /// The decoded array becomes both the working state and the saved
    /// snapshot, so the session starts clean.
    pub fn from_spots(len: usize, spots: &[Spot]) -> Result<Self, SpotError> {
        let labels = labels_from_spots(len, spots)?;
        Ok(Self {
            saved: labels.clone(),
            labels,
            cursor: Cursor::new(),
            editor: IntervalEditor::new(),
            loaded_count: 0,
        })
    }

    /// The label array, for rendering.
    pub fn labels(&self) -> &LabelArray {
        &self.labels
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor.pos()
    }

    /// Loaded prefix length as of the last [`LabelSession::set_loaded_count`].
    pub fn loaded_count(&self) -> usize {
        self.loaded_count
    }

    /// Whether an interval is open and waiting for its end.
    pub fn waiting_end(&self) -> bool {
        self.editor.waiting_end()
    }

    /// Refresh the tick's loaded count from the loading collaborator.
    ///
    /// The count is monotonic and never exceeds the sequence length; a stale
    /// or overshooting value is clamped rather than trusted.
    pub fn set_loaded_count(&mut self, loaded: usize) {
        self.loaded_count = self.loaded_count.max(loaded.min(self.labels.len()));
    }

    /// Save gate: no pending interval, and start/end marks balanced over the
    /// full array.
    pub fn can_save(&self) -> bool {
        !self.editor.waiting_end()
            && self.labels.count(LabelCode::IntervalStart)
                == self.labels.count(LabelCode::IntervalEnd)
    }

    /// Whether the labeling differs from the last saved snapshot.
    pub fn is_dirty(&self) -> bool {
        self.labels != self.saved
    }

    /// Advance gate: the labeling is element-wise equal to the last saved
    /// snapshot.
    pub fn can_advance(&self) -> bool {
        !self.is_dirty()
    }

    /// Snapshot of the session for rendering and host messaging.
    pub fn state(&self) -> SessionState {
        SessionState {
            cursor: self.cursor.pos(),
            loaded_count: self.loaded_count,
            total_len: self.labels.len(),
            waiting_end: self.editor.waiting_end(),
            pending_start: self.editor.pending_start(),
            interval_count: self.labels.count(LabelCode::IntervalStart),
            is_dirty: self.is_dirty(),
            can_save: self.can_save(),
        }
    }

    /// Apply one action against the current state.
    ///
    /// Labeling actions resolve at the current cursor position; navigation
    /// resolves against the tick's loaded count; save and advance consult
    /// their gates. Only a failing persistence hand-off returns an error -
    /// every user-driven precondition violation comes back as
    /// [`ActionOutcome::Ignored`] (or the specific blocked outcome) with the
    /// state unchanged.
    pub fn apply(
        &mut self,
        action: Action,
        store: &mut dyn SpotStore,
    ) -> Result<ActionOutcome, SessionError> {
        match action {
            Action::Begin => {
                let pos = self.cursor.pos();
                let outcome = self.editor.begin(&mut self.labels, pos);
                Ok(self.resolve_edit(outcome))
            }
            Action::End => {
                let pos = self.cursor.pos();
                let outcome = self.editor.end(&mut self.labels, pos);
                Ok(self.resolve_edit(outcome))
            }
            Action::Delete => {
                let pos = self.cursor.pos();
                let outcome = self.editor.delete(&mut self.labels, pos);
                Ok(self.resolve_edit(outcome))
            }
            Action::Step { delta } => {
                self.cursor.step(delta, self.loaded_count);
                Ok(ActionOutcome::CursorMoved(self.cursor.pos()))
            }
            Action::Save => {
                if !self.can_save() {
                    return Ok(ActionOutcome::SaveBlocked);
                }
                let spots = spots_from_labels(&self.labels)?;
                store.save(&spots)?;
                self.saved = self.labels.clone();
                Ok(ActionOutcome::Saved)
            }
            Action::Advance => Ok(if self.can_advance() {
                ActionOutcome::Advance
            } else {
                ActionOutcome::AdvanceBlocked
            }),
            Action::Quit => Ok(ActionOutcome::Quit),
        }
    }

    fn resolve_edit(&mut self, outcome: EditOutcome) -> ActionOutcome {
        match outcome {
            EditOutcome::Changed => ActionOutcome::Applied,
            EditOutcome::MovedTo(index) => {
                self.cursor.jump(index);
                ActionOutcome::CursorMoved(index)
            }
            EditOutcome::Ignored => ActionOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spots::MemorySpotStore;

    fn raws(session: &LabelSession) -> Vec<i8> {
        session.labels().codes().iter().map(|c| c.as_raw()).collect()
    }

    fn loaded_session(len: usize) -> LabelSession {
        let mut session = LabelSession::new(len);
        session.set_loaded_count(len);
        session
    }

    #[test]
    fn test_full_scenario() {
        // begin at 2, end at 6, save, delete at 4.
        let mut store = MemorySpotStore::default();
        let mut session = loaded_session(10);

        session.apply(Action::Step { delta: 2 }, &mut store).unwrap();
        assert_eq!(
            session.apply(Action::Begin, &mut store).unwrap(),
            ActionOutcome::Applied
        );
        assert_eq!(raws(&session), vec![0, 0, 2, 0, 0, 0, 0, 0, 0, 0]);
        assert!(session.waiting_end());

        session.apply(Action::Step { delta: 4 }, &mut store).unwrap();
        assert_eq!(
            session.apply(Action::End, &mut store).unwrap(),
            ActionOutcome::Applied
        );
        assert_eq!(raws(&session), vec![0, 0, 1, 3, 3, 3, -1, 0, 0, 0]);
        assert!(!session.waiting_end());
        assert!(session.can_save());

        session.apply(Action::Step { delta: -2 }, &mut store).unwrap();
        assert_eq!(session.cursor(), 4);
        assert_eq!(
            session.apply(Action::Delete, &mut store).unwrap(),
            ActionOutcome::Applied
        );
        assert_eq!(raws(&session), vec![0; 10]);
    }

    #[test]
    fn test_save_gate_blocks_pending_interval() {
        let mut store = MemorySpotStore::default();
        let mut session = loaded_session(10);

        session.apply(Action::Begin, &mut store).unwrap();
        assert!(!session.can_save());
        assert_eq!(
            session.apply(Action::Save, &mut store).unwrap(),
            ActionOutcome::SaveBlocked
        );
        assert_eq!(store.save_count, 0);
    }

    #[test]
    fn test_save_refreshes_snapshot() {
        let mut store = MemorySpotStore::default();
        let mut session = loaded_session(10);

        session.apply(Action::Step { delta: 2 }, &mut store).unwrap();
        session.apply(Action::Begin, &mut store).unwrap();
        session.apply(Action::Step { delta: 4 }, &mut store).unwrap();
        session.apply(Action::End, &mut store).unwrap();
        assert!(session.is_dirty());

        assert_eq!(
            session.apply(Action::Save, &mut store).unwrap(),
            ActionOutcome::Saved
        );
        assert_eq!(store.saved, Some(vec![Spot::new(2, 6)]));
        assert!(!session.is_dirty());
        assert!(session.can_advance());
    }

    #[test]
    fn test_failing_store_leaves_snapshot_stale() {
        struct FailingStore;
        impl SpotStore for FailingStore {
            fn load(&mut self) -> Result<Option<Vec<Spot>>, StoreError> {
                Ok(None)
            }
            fn save(&mut self, _spots: &[Spot]) -> Result<(), StoreError> {
                Err(StoreError::Io("disk full".to_string()))
            }
        }

        let mut store = FailingStore;
        let mut session = loaded_session(10);
        session.apply(Action::Begin, &mut store).unwrap();
        session.apply(Action::Step { delta: 3 }, &mut store).unwrap();
        session.apply(Action::End, &mut store).unwrap();

        assert!(matches!(
            session.apply(Action::Save, &mut store),
            Err(SessionError::Store(StoreError::Io(_)))
        ));
        assert!(session.is_dirty());
    }

    #[test]
    fn test_advance_blocked_while_dirty() {
        let mut store = MemorySpotStore::default();
        let mut session = loaded_session(10);

        assert_eq!(
            session.apply(Action::Advance, &mut store).unwrap(),
            ActionOutcome::Advance
        );

        session.apply(Action::Begin, &mut store).unwrap();
        assert_eq!(
            session.apply(Action::Advance, &mut store).unwrap(),
            ActionOutcome::AdvanceBlocked
        );

        // Cancelling the pending mark restores the saved state exactly.
        session.apply(Action::Begin, &mut store).unwrap();
        assert_eq!(
            session.apply(Action::Advance, &mut store).unwrap(),
            ActionOutcome::Advance
        );
    }

    #[test]
    fn test_from_spots_starts_clean() {
        let mut store = MemorySpotStore::default();
        let mut session = LabelSession::from_spots(10, &[Spot::new(2, 6)]).unwrap();
        session.set_loaded_count(10);

        assert_eq!(raws(&session), vec![0, 0, 1, 3, 3, 3, -1, 0, 0, 0]);
        assert!(!session.is_dirty());
        assert_eq!(
            session.apply(Action::Advance, &mut store).unwrap(),
            ActionOutcome::Advance
        );
    }

    #[test]
    fn test_boundary_seek_moves_cursor() {
        let mut store = MemorySpotStore::default();
        let mut session = LabelSession::from_spots(10, &[Spot::new(2, 6)]).unwrap();
        session.set_loaded_count(10);

        session.apply(Action::Step { delta: 4 }, &mut store).unwrap();
        assert_eq!(
            session.apply(Action::Begin, &mut store).unwrap(),
            ActionOutcome::CursorMoved(2)
        );
        assert_eq!(session.cursor(), 2);
        assert_eq!(
            session.apply(Action::End, &mut store).unwrap(),
            ActionOutcome::CursorMoved(6)
        );
        assert_eq!(session.cursor(), 6);
    }

    #[test]
    fn test_loaded_count_is_monotonic_and_clamped() {
        let mut session = LabelSession::new(10);
        session.set_loaded_count(4);
        assert_eq!(session.loaded_count(), 4);
        session.set_loaded_count(2);
        assert_eq!(session.loaded_count(), 4);
        session.set_loaded_count(25);
        assert_eq!(session.loaded_count(), 10);
    }

    #[test]
    fn test_stepping_is_bounded_by_loaded_count() {
        let mut store = MemorySpotStore::default();
        let mut session = LabelSession::new(10);
        session.set_loaded_count(3);

        session.apply(Action::Step { delta: 1 }, &mut store).unwrap();
        session.apply(Action::Step { delta: 1 }, &mut store).unwrap();
        assert_eq!(session.cursor(), 2);
        assert_eq!(
            session.apply(Action::Step { delta: 1 }, &mut store).unwrap(),
            ActionOutcome::CursorMoved(0)
        );
    }

    #[test]
    fn test_labeling_ignored_reports_ignored() {
        let mut store = MemorySpotStore::default();
        let mut session = loaded_session(5);

        assert_eq!(
            session.apply(Action::End, &mut store).unwrap(),
            ActionOutcome::Ignored
        );
        assert_eq!(
            session.apply(Action::Delete, &mut store).unwrap(),
            ActionOutcome::Ignored
        );
    }

    #[test]
    fn test_quit_passes_through() {
        let mut store = MemorySpotStore::default();
        let mut session = loaded_session(5);
        session.apply(Action::Begin, &mut store).unwrap();
        // Quit is unconditional even while dirty.
        assert_eq!(
            session.apply(Action::Quit, &mut store).unwrap(),
            ActionOutcome::Quit
        );
    }

    #[test]
    fn test_state_view() {
        let mut store = MemorySpotStore::default();
        let mut session = loaded_session(10);
        session.apply(Action::Step { delta: 2 }, &mut store).unwrap();
        session.apply(Action::Begin, &mut store).unwrap();

        let state = session.state();
        assert_eq!(state.cursor, 2);
        assert_eq!(state.loaded_count, 10);
        assert_eq!(state.total_len, 10);
        assert!(state.waiting_end);
        assert_eq!(state.pending_start, Some(2));
        assert_eq!(state.interval_count, 0);
        assert!(state.is_dirty);
        assert!(!state.can_save);
    }
}
