//! Interval Edit State Machine
//!
//! Turns labeling actions at the current cursor position into label-array
//! mutations: opening an interval, cancelling a just-opened one, committing a
//! close, reopening a committed interval at its end mark, and deleting a whole
//! interval from an inner position.
//!
//! Every transition is a pure precondition check. A violated precondition is
//! a silent no-op ([`EditOutcome::Ignored`]), never an error: the host
//! re-renders the unchanged state and the operator retries.

use crate::labels::{LabelArray, LabelCode};

/// Result of one labeling transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Labels (and possibly the pending state) were mutated.
    Changed,
    /// Nothing was mutated; the caller should move the cursor to this index.
    MovedTo(usize),
    /// Preconditions not met; nothing happened.
    Ignored,
}

/// The edit state machine.
///
/// Holds the pending-interval state (`waiting_end` plus the remembered start
/// index) as explicit fields rather than ambient state, and is the only thing
/// that mutates a [`LabelArray`]. At most one pending start exists at any
/// time.
#[derive(Debug, Clone, Default)]
pub struct IntervalEditor {
    waiting_end: bool,
    pending_start: usize,
}

impl IntervalEditor {
    /// Create an editor with no pending interval.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while an interval has been opened but not yet closed.
    pub fn waiting_end(&self) -> bool {
        self.waiting_end
    }

    /// Index of the pending start mark, while one exists.
    pub fn pending_start(&self) -> Option<usize> {
        self.waiting_end.then_some(self.pending_start)
    }

    /// The begin action at position `pos`.
    ///
    /// - On an unlabeled position with no pending interval: opens a new
    ///   interval (marks the position pending).
    /// - On the pending start mark itself: cancels the just-opened interval.
    /// - On an end or inner position with no pending interval: requests a
    ///   cursor move to the start of that interval.
    pub fn begin(&mut self, labels: &mut LabelArray, pos: usize) -> EditOutcome {
        match labels.get(pos) {
            LabelCode::Unlabeled if !self.waiting_end => {
                labels.set(pos, LabelCode::PendingStart);
                self.pending_start = pos;
                self.waiting_end = true;
                EditOutcome::Changed
            }
            LabelCode::PendingStart if self.waiting_end && pos == self.pending_start => {
                labels.set(pos, LabelCode::Unlabeled);
                self.waiting_end = false;
                EditOutcome::Changed
            }
            LabelCode::IntervalEnd | LabelCode::IntervalInner if !self.waiting_end => {
                match labels.last_index_with_code_before(pos, LabelCode::IntervalStart) {
                    Some(start) => EditOutcome::MovedTo(start),
                    None => EditOutcome::Ignored,
                }
            }
            _ => EditOutcome::Ignored,
        }
    }

    /// The end action at position `pos`.
    ///
    /// - On an unlabeled position strictly after the pending start: commits
    ///   the pending interval. Closing at or before the open point is
    ///   ignored.
    /// - On a committed end mark with no pending interval: reopens that
    ///   interval, discarding its inner span and re-marking its start
    ///   pending.
    /// - On a start or inner position with no pending interval: requests a
    ///   cursor move to the matching end.
    pub fn end(&mut self, labels: &mut LabelArray, pos: usize) -> EditOutcome {
        match labels.get(pos) {
            LabelCode::Unlabeled if self.waiting_end => {
                if pos <= self.pending_start {
                    return EditOutcome::Ignored;
                }
                labels.set(self.pending_start, LabelCode::IntervalStart);
                labels.set(pos, LabelCode::IntervalEnd);
                labels.fill_range(self.pending_start + 1, pos, LabelCode::IntervalInner);
                self.waiting_end = false;
                EditOutcome::Changed
            }
            LabelCode::IntervalEnd if !self.waiting_end => {
                let Some(start) = labels.last_index_with_code_before(pos, LabelCode::IntervalStart)
                else {
                    return EditOutcome::Ignored;
                };
                labels.set(pos, LabelCode::Unlabeled);
                labels.set(start, LabelCode::PendingStart);
                labels.fill_range(start + 1, pos, LabelCode::Unlabeled);
                self.pending_start = start;
                self.waiting_end = true;
                EditOutcome::Changed
            }
            LabelCode::IntervalStart | LabelCode::IntervalInner if !self.waiting_end => {
                match labels.first_index_with_code_from(pos, LabelCode::IntervalEnd) {
                    Some(end) => EditOutcome::MovedTo(end),
                    None => EditOutcome::Ignored,
                }
            }
            _ => EditOutcome::Ignored,
        }
    }

    /// The delete action at position `pos`.
    ///
    /// Clears the whole interval containing `pos` back to unlabeled. Only
    /// reachable from an inner position, never from a boundary mark, and only
    /// while no interval is pending.
    pub fn delete(&self, labels: &mut LabelArray, pos: usize) -> EditOutcome {
        if self.waiting_end || labels.get(pos) != LabelCode::IntervalInner {
            return EditOutcome::Ignored;
        }
        let (Some(start), Some(end)) = (
            labels.last_index_with_code_before(pos, LabelCode::IntervalStart),
            labels.first_index_with_code_from(pos, LabelCode::IntervalEnd),
        ) else {
            return EditOutcome::Ignored;
        };
        labels.fill_range(start, end + 1, LabelCode::Unlabeled);
        EditOutcome::Changed
    }
}
