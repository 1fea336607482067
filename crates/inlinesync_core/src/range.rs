//! Logical text ranges over the flattened delta buffer.

use serde::{Deserialize, Serialize};

/// Half-open span `[index, index + length)` over the flattened logical text.
///
/// `length == 0` denotes a caret. Embeds count as exactly one unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InlineRange {
    pub index: usize,
    pub length: usize,
}

impl InlineRange {
    /// Creates a range from an index and a length.
    pub const fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }

    /// Creates a collapsed range at `index`.
    pub const fn caret(index: usize) -> Self {
        Self { index, length: 0 }
    }

    /// Creates a normalized range spanning two logical offsets in any order.
    pub fn between(a: usize, b: usize) -> Self {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self {
            index: start,
            length: end - start,
        }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.index.saturating_add(self.length)
    }

    /// True when the range is a caret.
    pub fn is_collapsed(&self) -> bool {
        self.length == 0
    }

    /// True when `index + length` fits inside a buffer of `total_len` units.
    pub fn fits(&self, total_len: usize) -> bool {
        self.index
            .checked_add(self.length)
            .is_some_and(|end| end <= total_len)
    }
}

/// Tolerant equality that treats two missing ranges as equal.
pub fn is_maybe_inline_range_equal(a: Option<InlineRange>, b: Option<InlineRange>) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn between_normalizes_direction() {
        assert_eq!(InlineRange::between(8, 3), InlineRange::new(3, 5));
        assert_eq!(InlineRange::between(4, 4), InlineRange::caret(4));
    }

    #[test]
    fn fits_rejects_overflowing_ranges() {
        assert!(InlineRange::new(2, 3).fits(5));
        assert!(!InlineRange::new(2, 4).fits(5));
        assert!(!InlineRange::new(usize::MAX, 1).fits(usize::MAX));
    }

    #[test]
    fn maybe_equal_handles_missing_ranges() {
        assert!(is_maybe_inline_range_equal(None, None));
        assert!(!is_maybe_inline_range_equal(None, Some(InlineRange::caret(0))));
        assert!(is_maybe_inline_range_equal(
            Some(InlineRange::new(1, 2)),
            Some(InlineRange::new(1, 2))
        ));
    }
}
