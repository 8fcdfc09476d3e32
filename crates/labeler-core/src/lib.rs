#![warn(missing_docs)]
//! Labeler Core - Headless Interval-Labeling Kernel
//!
//! # Overview
//!
//! `labeler-core` is the headless kernel of a sequence-labeling tool: an operator
//! marks temporal intervals (e.g. gesture occurrences) over a per-item sequence
//! whose total length is known up front but whose content streams in
//! progressively. The kernel owns the label data model, the edit transitions,
//! the cursor bounded by the loaded prefix, and the save/advance consistency
//! gate. It does not decode, draw, or poll input; hosts drive it one action per
//! tick and render from its state views.
//!
//! # Core Features
//!
//! - **Label Array**: fixed-length per-position codes with narrow mutation
//!   primitives and linear boundary searches
//! - **Edit State Machine**: open/commit/cancel/reopen/delete transitions with
//!   silent no-ops on precondition failure
//! - **Cursor Control**: stepping with wraparound inside the loaded prefix
//! - **Save/Advance Gate**: structural balance check before persistence, dirty
//!   comparison against the last saved snapshot before moving on
//!
//! # Quick Start
//!
//! ```rust
//! use labeler_core::{Action, ActionOutcome, LabelSession, MemorySpotStore};
//!
//! let mut store = MemorySpotStore::default();
//! let mut session = LabelSession::new(10);
//! session.set_loaded_count(10);
//!
//! // Open an interval at position 2, close it at position 6.
//! session.apply(Action::Step { delta: 2 }, &mut store).unwrap();
//! session.apply(Action::Begin, &mut store).unwrap();
//! session.apply(Action::Step { delta: 4 }, &mut store).unwrap();
//! session.apply(Action::End, &mut store).unwrap();
//!
//! assert!(session.can_save());
//! assert_eq!(
//!     session.apply(Action::Save, &mut store).unwrap(),
//!     ActionOutcome::Saved
//! );
//! assert!(session.can_advance());
//! ```
//!
//! # Module Description
//!
//! - [`labels`] - the per-position label code array
//! - [`editor`] - interval edit transitions (begin/end/delete)
//! - [`cursor`] - inspection position over the loaded prefix
//! - [`session`] - action dispatch, state views, and the save/advance gate
//! - [`spots`] - canonical `(begin, end)` encoding and the persistence seam
//! - [`source`] - the progressive sequence source consumed per tick

pub mod cursor;
pub mod editor;
pub mod labels;
pub mod session;
pub mod source;
pub mod spots;

pub use cursor::Cursor;
pub use editor::{EditOutcome, IntervalEditor};
pub use labels::{LabelArray, LabelCode};
pub use session::{Action, ActionOutcome, LabelSession, SessionError, SessionState};
pub use source::SequenceSource;
pub use spots::{
    MemorySpotStore, Spot, SpotError, SpotStore, StoreError, labels_from_spots, spots_from_labels,
};
