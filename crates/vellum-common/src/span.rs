//! Stable node identities.
//!
//! A [`Span`] identifies a syntax node within a file. It is a single `u64`:
//! the 16 high bits hold the file id (zero meaning detached), the 48 low
//! bits hold a number. The number space has three disjoint regions:
//!
//! - `0` marks a detached span,
//! - `[2, 2^47)` is a *numbered* span, a free identifier assigned by the
//!   numbering pass after parsing,
//! - `[2^47, 2^48)` is a *range* span directly encoding a byte range with
//!   two saturating 23-bit halves, for files that aren't source documents.
//!
//! Numbered spans are assigned so that numeric order matches document
//! order with gaps on both sides of every node. An edited subtree can then
//! be renumbered into the gap left by the old one without touching the
//! rest of the file, which keeps spans stable under distant edits.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::file::FileId;

/// A unique identifier for a syntax node within a file.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct Span(u64);

impl Span {
    /// The full range of numbers available for span numbering.
    pub const FULL: Range<u64> = 2..(1 << 47);

    /// The first number of the range-span region.
    const RANGE_BASE: u64 = 1 << 47;

    /// The saturation point for each half of a range span.
    const RANGE_PART_MAX: usize = (1 << 23) - 1;

    /// Create a span that does not point into any file.
    pub const fn detached() -> Self {
        Self(0)
    }

    /// Create a numbered span.
    ///
    /// Returns `None` if the number is outside the numbered region
    /// [`Span::FULL`].
    pub const fn from_number(id: FileId, number: u64) -> Option<Self> {
        if number < Self::FULL.start || number >= Self::FULL.end {
            return None;
        }
        Some(Self::pack(id, number))
    }

    /// Create a span that directly encodes a byte range within a file.
    ///
    /// Each bound saturates at `2^23 - 1`.
    pub const fn from_range(id: FileId, range: Range<usize>) -> Self {
        let max = Self::RANGE_PART_MAX;
        let start = if range.start > max { max } else { range.start } as u64;
        let end = if range.end > max { max } else { range.end } as u64;
        Self::pack(id, Self::RANGE_BASE | (start << 23) | end)
    }

    /// Pack a file id and a 48-bit number into a span.
    const fn pack(id: FileId, number: u64) -> Self {
        debug_assert!(number < (1 << 48));
        Self(((id.into_raw() as u64) << 48) | number)
    }

    /// Whether the span is detached.
    pub const fn is_detached(self) -> bool {
        self.0 == 0
    }

    /// The file the span points into, unless it is detached.
    pub const fn id(self) -> Option<FileId> {
        FileId::from_raw((self.0 >> 48) as u16)
    }

    /// The span's 48-bit number.
    ///
    /// Zero for detached spans; in `[2, 2^47)` for numbered spans; at or
    /// above `2^47` for range spans.
    pub const fn number(self) -> u64 {
        self.0 & ((1 << 48) - 1)
    }

    /// The byte range this span directly encodes, if it is a range span.
    pub const fn range(self) -> Option<(usize, usize)> {
        let number = self.number();
        if number < Self::RANGE_BASE {
            return None;
        }
        let payload = number - Self::RANGE_BASE;
        Some(((payload >> 23) as usize & Self::RANGE_PART_MAX, payload as usize & Self::RANGE_PART_MAX))
    }

    /// Return `other` if `self` is detached and `self` otherwise.
    pub const fn or(self, other: Self) -> Self {
        if self.is_detached() { other } else { self }
    }

    /// Extract the raw underlying number.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Construct from a raw number.
    ///
    /// Exact inverse of [`raw`](Self::raw).
    pub const fn from_raw(v: u64) -> Self {
        Self(v)
    }
}

/// Result of numbering a tree within a span-number range.
pub type NumberingResult = Result<(), Unnumberable>;

/// Indicates that a node cannot be numbered within a given interval.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Unnumberable;

impl fmt::Display for Unnumberable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("cannot number within this interval")
    }
}

impl std::error::Error for Unnumberable {}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> FileId {
        FileId::unique()
    }

    #[test]
    fn detached_span() {
        let span = Span::detached();
        assert!(span.is_detached());
        assert_eq!(span.id(), None);
        assert_eq!(span.number(), 0);
        assert_eq!(span.range(), None);
    }

    #[test]
    fn numbered_span_round_trip() {
        let id = id();
        for number in [2, 5, 1000, Span::FULL.end - 1] {
            let span = Span::from_number(id, number).unwrap();
            assert_eq!(span.id(), Some(id));
            assert_eq!(span.number(), number);
            assert_eq!(Span::from_raw(span.raw()), span);
        }
    }

    #[test]
    fn numbered_span_rejects_out_of_region() {
        let id = id();
        assert_eq!(Span::from_number(id, 0), None);
        assert_eq!(Span::from_number(id, 1), None);
        assert_eq!(Span::from_number(id, Span::FULL.end), None);
    }

    #[test]
    fn range_span_round_trip() {
        let id = id();
        let span = Span::from_range(id, 17..42);
        assert_eq!(span.id(), Some(id));
        assert_eq!(span.range(), Some((17, 42)));
    }

    #[test]
    fn range_span_saturates() {
        let id = id();
        let huge = usize::MAX;
        let span = Span::from_range(id, huge..huge);
        let max = (1 << 23) - 1;
        assert_eq!(span.range(), Some((max, max)));
        assert_eq!(span.id(), Some(id));
    }

    #[test]
    fn or_prefers_the_attached_span() {
        let id = id();
        let a = Span::from_number(id, 2).unwrap();
        assert_eq!(Span::detached().or(a), a);
        assert_eq!(a.or(Span::detached()), a);
    }
}
