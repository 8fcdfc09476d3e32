//! Label Array Storage
//!
//! One small discrete code per sequence position. The array exposes read
//! access plus a narrow set of mutation primitives used only by the edit
//! state machine; it enforces no structural invariants itself - those hold by
//! construction of which transitions the state machine permits.
//!
//! The boundary searches are linear scans. Arrays are bounded by a single
//! sequence's length, so nothing here needs an auxiliary index.

/// Per-position label code.
///
/// The numeric values are the codes used by the persisted form and by
/// existing label files; keep them stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum LabelCode {
    /// No interval claims this position.
    Unlabeled = 0,
    /// Committed start of a closed interval.
    IntervalStart = 1,
    /// An interval has been opened here but not yet closed.
    PendingStart = 2,
    /// Strictly inside a closed interval.
    IntervalInner = 3,
    /// Committed end of a closed interval.
    IntervalEnd = -1,
}

impl LabelCode {
    /// Raw numeric code.
    pub const fn as_raw(self) -> i8 {
        self as i8
    }

    /// Decode a raw numeric code; `None` for codes no label file may contain.
    pub const fn from_raw(raw: i8) -> Option<Self> {
        match raw {
            0 => Some(LabelCode::Unlabeled),
            1 => Some(LabelCode::IntervalStart),
            2 => Some(LabelCode::PendingStart),
            3 => Some(LabelCode::IntervalInner),
            -1 => Some(LabelCode::IntervalEnd),
            _ => None,
        }
    }
}

/// Fixed-length array of label codes, one per sequence position.
///
/// Created once per work item (all [`LabelCode::Unlabeled`], or decoded from a
/// prior save) and mutated in place for the lifetime of the labeling session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelArray {
    codes: Vec<LabelCode>,
}

impl LabelArray {
    /// Create an array of `len` positions, all unlabeled.
    pub fn new(len: usize) -> Self {
        Self {
            codes: vec![LabelCode::Unlabeled; len],
        }
    }

    /// Create an array from explicit codes.
    pub fn from_codes(codes: Vec<LabelCode>) -> Self {
        Self { codes }
    }

    /// Number of sequence positions.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns `true` for a zero-length sequence.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Code at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn get(&self, index: usize) -> LabelCode {
        self.codes[index]
    }

    /// Set the code at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn set(&mut self, index: usize, code: LabelCode) {
        self.codes[index] = code;
    }

    /// Assign `code` to every position in the half-open range `start..end`.
    ///
    /// An empty range (`start >= end`) assigns nothing.
    ///
    /// # Panics
    ///
    /// Panics if `end` exceeds the array length.
    pub fn fill_range(&mut self, start: usize, end: usize, code: LabelCode) {
        if start < end {
            self.codes[start..end].fill(code);
        }
    }

    /// Index of the last position strictly before `index` carrying `code`.
    ///
    /// This is how the matching start for an end (or inner) position is
    /// located.
    pub fn last_index_with_code_before(&self, index: usize, code: LabelCode) -> Option<usize> {
        self.codes[..index.min(self.codes.len())]
            .iter()
            .rposition(|&c| c == code)
    }

    /// Index of the first position at or after `index` carrying `code`.
    ///
    /// This is how the matching end for a start (or inner) position is
    /// located.
    pub fn first_index_with_code_from(&self, index: usize, code: LabelCode) -> Option<usize> {
        let from = index.min(self.codes.len());
        self.codes[from..]
            .iter()
            .position(|&c| c == code)
            .map(|offset| from + offset)
    }

    /// Number of positions carrying `code`.
    pub fn count(&self, code: LabelCode) -> usize {
        self.codes.iter().filter(|&&c| c == code).count()
    }

    /// All codes, in position order.
    pub fn codes(&self) -> &[LabelCode] {
        &self.codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_code_round_trip() {
        for code in [
            LabelCode::Unlabeled,
            LabelCode::IntervalStart,
            LabelCode::PendingStart,
            LabelCode::IntervalInner,
            LabelCode::IntervalEnd,
        ] {
            assert_eq!(LabelCode::from_raw(code.as_raw()), Some(code));
        }
        assert_eq!(LabelCode::from_raw(4), None);
        assert_eq!(LabelCode::from_raw(-2), None);
    }

    #[test]
    fn test_new_array_is_unlabeled() {
        let labels = LabelArray::new(5);
        assert_eq!(labels.len(), 5);
        assert!(labels.codes().iter().all(|&c| c == LabelCode::Unlabeled));
    }

    #[test]
    fn test_set_and_get() {
        let mut labels = LabelArray::new(4);
        labels.set(2, LabelCode::PendingStart);
        assert_eq!(labels.get(2), LabelCode::PendingStart);
        assert_eq!(labels.get(1), LabelCode::Unlabeled);
    }

    #[test]
    fn test_fill_range_is_half_open() {
        let mut labels = LabelArray::new(6);
        labels.fill_range(1, 4, LabelCode::IntervalInner);
        assert_eq!(labels.get(0), LabelCode::Unlabeled);
        assert_eq!(labels.get(1), LabelCode::IntervalInner);
        assert_eq!(labels.get(3), LabelCode::IntervalInner);
        assert_eq!(labels.get(4), LabelCode::Unlabeled);
    }

    #[test]
    fn test_fill_range_empty() {
        let mut labels = LabelArray::new(3);
        labels.fill_range(2, 2, LabelCode::IntervalInner);
        labels.fill_range(2, 1, LabelCode::IntervalInner);
        assert!(labels.codes().iter().all(|&c| c == LabelCode::Unlabeled));
    }

    #[test]
    fn test_backward_search_excludes_index() {
        let mut labels = LabelArray::new(6);
        labels.set(1, LabelCode::IntervalStart);
        labels.set(4, LabelCode::IntervalStart);
        assert_eq!(
            labels.last_index_with_code_before(4, LabelCode::IntervalStart),
            Some(1)
        );
        assert_eq!(
            labels.last_index_with_code_before(5, LabelCode::IntervalStart),
            Some(4)
        );
        assert_eq!(
            labels.last_index_with_code_before(1, LabelCode::IntervalStart),
            None
        );
    }

    #[test]
    fn test_forward_search_includes_index() {
        let mut labels = LabelArray::new(6);
        labels.set(3, LabelCode::IntervalEnd);
        assert_eq!(
            labels.first_index_with_code_from(3, LabelCode::IntervalEnd),
            Some(3)
        );
        assert_eq!(
            labels.first_index_with_code_from(0, LabelCode::IntervalEnd),
            Some(3)
        );
        assert_eq!(
            labels.first_index_with_code_from(4, LabelCode::IntervalEnd),
            None
        );
    }

    #[test]
    fn test_count() {
        let mut labels = LabelArray::new(5);
        labels.set(0, LabelCode::IntervalStart);
        labels.set(2, LabelCode::IntervalEnd);
        labels.set(4, LabelCode::IntervalStart);
        assert_eq!(labels.count(LabelCode::IntervalStart), 2);
        assert_eq!(labels.count(LabelCode::IntervalEnd), 1);
        assert_eq!(labels.count(LabelCode::Unlabeled), 2);
    }
}
