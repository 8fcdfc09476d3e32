//! Canonical Spot Encoding
//!
//! The persisted form of a labeling: an ordered list of `(begin, end)` index
//! pairs, `begin < end`, non-overlapping, sorted by `begin`. A label array is
//! converted to and from this form at the persistence boundary; conversion
//! validates the structural invariants and rejects arrays or spot lists that
//! break them.
//!
//! The byte format (JSON framing, file naming) belongs to the host; this
//! module only fixes the semantic shape via serde derives on [`Spot`].

use serde::{Deserialize, Serialize};

use crate::labels::{LabelArray, LabelCode};

/// One committed interval in canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spot {
    /// Index of the position carrying the interval's start mark.
    pub begin: usize,
    /// Index of the position carrying the interval's end mark. Strictly
    /// greater than `begin`.
    pub end: usize,
}

impl Spot {
    /// Create a spot from its boundary indices.
    pub const fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }
}

/// Structural error found while converting between a label array and spots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpotError {
    /// The array still carries a pending start mark.
    PendingMark {
        /// Position of the pending mark.
        index: usize,
    },
    /// A start mark while a prior interval is still open.
    NestedStart {
        /// Position of the offending start mark.
        index: usize,
    },
    /// An end mark with no open interval.
    UnmatchedEnd {
        /// Position of the offending end mark.
        index: usize,
    },
    /// An inner code outside any interval.
    StrayInner {
        /// Position of the offending inner code.
        index: usize,
    },
    /// An unlabeled position inside an open interval.
    GapInside {
        /// Position of the gap.
        index: usize,
    },
    /// A start mark that never closes.
    UnclosedStart {
        /// Position of the unclosed start mark.
        index: usize,
    },
    /// A spot reaching past the end of the sequence.
    OutOfBounds {
        /// The spot's begin index.
        begin: usize,
        /// The spot's end index.
        end: usize,
        /// Sequence length.
        len: usize,
    },
    /// A spot whose end does not lie strictly after its begin.
    EmptySpot {
        /// The spot's begin index.
        begin: usize,
        /// The spot's end index.
        end: usize,
    },
    /// A spot out of order or overlapping its predecessor.
    Overlap {
        /// The spot's begin index.
        begin: usize,
        /// The spot's end index.
        end: usize,
    },
}

impl std::fmt::Display for SpotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpotError::PendingMark { index } => {
                write!(f, "Pending start mark at position {}", index)
            }
            SpotError::NestedStart { index } => {
                write!(f, "Start mark inside an open interval at position {}", index)
            }
            SpotError::UnmatchedEnd { index } => {
                write!(f, "End mark with no open interval at position {}", index)
            }
            SpotError::StrayInner { index } => {
                write!(f, "Inner code outside any interval at position {}", index)
            }
            SpotError::GapInside { index } => {
                write!(f, "Unlabeled position {} inside an open interval", index)
            }
            SpotError::UnclosedStart { index } => {
                write!(f, "Start mark at position {} never closes", index)
            }
            SpotError::OutOfBounds { begin, end, len } => {
                write!(f, "Spot {}..{} exceeds sequence length {}", begin, end, len)
            }
            SpotError::EmptySpot { begin, end } => {
                write!(f, "Spot {}..{} must end strictly after its begin", begin, end)
            }
            SpotError::Overlap { begin, end } => {
                write!(f, "Spot {}..{} overlaps or precedes an earlier spot", begin, end)
            }
        }
    }
}

impl std::error::Error for SpotError {}

/// Convert a balanced label array to its canonical spot list.
///
/// Walks positions in order, pairing each start with its end. Any structural
/// violation (pending mark, dangling boundary, hole in an interval) is
/// rejected; the save gate checks balance before ever calling this, so an
/// error here means the array was corrupted externally.
pub fn spots_from_labels(labels: &LabelArray) -> Result<Vec<Spot>, SpotError> {
    let mut spots = Vec::new();
    let mut open: Option<usize> = None;
    for (index, &code) in labels.codes().iter().enumerate() {
        match (code, open) {
            (LabelCode::Unlabeled, None) => {}
            (LabelCode::Unlabeled, Some(_)) => return Err(SpotError::GapInside { index }),
            (LabelCode::IntervalStart, None) => open = Some(index),
            (LabelCode::IntervalStart, Some(_)) => return Err(SpotError::NestedStart { index }),
            (LabelCode::IntervalInner, Some(_)) => {}
            (LabelCode::IntervalInner, None) => return Err(SpotError::StrayInner { index }),
            (LabelCode::IntervalEnd, Some(begin)) => {
                spots.push(Spot::new(begin, index));
                open = None;
            }
            (LabelCode::IntervalEnd, None) => return Err(SpotError::UnmatchedEnd { index }),
            (LabelCode::PendingStart, _) => return Err(SpotError::PendingMark { index }),
        }
    }
    if let Some(index) = open {
        return Err(SpotError::UnclosedStart { index });
    }
    Ok(spots)
}

/// Expand a canonical spot list into a label array of `len` positions.
///
/// The list must be sorted by `begin` with strictly positive extents and no
/// overlap, and every spot must fit inside the sequence.
pub fn labels_from_spots(len: usize, spots: &[Spot]) -> Result<LabelArray, SpotError> {
    let mut labels = LabelArray::new(len);
    let mut prev_end: Option<usize> = None;
    for spot in spots {
        if spot.end <= spot.begin {
            return Err(SpotError::EmptySpot {
                begin: spot.begin,
                end: spot.end,
            });
        }
        if spot.end >= len {
            return Err(SpotError::OutOfBounds {
                begin: spot.begin,
                end: spot.end,
                len,
            });
        }
        if let Some(prev) = prev_end
            && spot.begin <= prev
        {
            return Err(SpotError::Overlap {
                begin: spot.begin,
                end: spot.end,
            });
        }
        labels.set(spot.begin, LabelCode::IntervalStart);
        labels.fill_range(spot.begin + 1, spot.end, LabelCode::IntervalInner);
        labels.set(spot.end, LabelCode::IntervalEnd);
        prev_end = Some(spot.end);
    }
    Ok(labels)
}

/// Error from the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Reading or writing the backing store failed.
    Io(String),
    /// The persisted form could not be decoded.
    Malformed(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "Spot store I/O failure: {}", msg),
            StoreError::Malformed(msg) => write!(f, "Malformed spot file: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Persistence collaborator for one work item's spot list.
///
/// One store instance is bound to one work item (one label file); the session
/// hands it the canonical spot list on save and reads it back when a work
/// item is reopened.
pub trait SpotStore {
    /// Decode the previously saved spot list, `None` when nothing has been
    /// saved yet.
    fn load(&mut self) -> Result<Option<Vec<Spot>>, StoreError>;

    /// Persist the spot list, replacing any prior save.
    fn save(&mut self, spots: &[Spot]) -> Result<(), StoreError>;
}

/// In-memory [`SpotStore`], for tests and examples.
#[derive(Debug, Clone, Default)]
pub struct MemorySpotStore {
    /// Last saved spot list, `None` until the first save.
    pub saved: Option<Vec<Spot>>,
    /// Number of successful saves.
    pub save_count: usize,
}

impl SpotStore for MemorySpotStore {
    fn load(&mut self) -> Result<Option<Vec<Spot>>, StoreError> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, spots: &[Spot]) -> Result<(), StoreError> {
        self.saved = Some(spots.to_vec());
        self.save_count += 1;
        Ok(())
    }
}
