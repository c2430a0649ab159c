//! Accumulation of regions owed a reparse between highlight passes.

use std::ops::Range;

use crate::range::RangeSet;

/// The regions edited since the last completed highlight pass.
///
/// Edits can arrive in bursts faster than highlight passes are requested. Each
/// [`append`](Self::append) first maps the already tracked ranges into the post-edit coordinates
/// and then unions in the new edited range, so no edited region is skipped regardless of how many
/// edits accumulate before the next pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffectedRanges {
    ranges: RangeSet,
}

impl AffectedRanges {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit whose inserted text occupies `edited_range` (post-edit coordinates) and
    /// changed the content length by `delta`.
    pub fn append(&mut self, edited_range: Range<usize>, delta: isize) {
        let pre_len = (edited_range.len() as isize - delta).max(0) as usize;
        let pre_edit = edited_range.start..edited_range.start + pre_len;

        self.ranges.map_through_edit(&pre_edit, &edited_range);
        self.ranges.insert(edited_range);
    }

    /// Replace everything tracked by `range`.
    pub fn invalidate(&mut self, range: Range<usize>) {
        self.ranges = RangeSet::from_range(range);
    }

    /// The disjoint tracked ranges.
    pub fn ranges(&self) -> &RangeSet {
        &self.ranges
    }

    /// A single range spanning every tracked range, or `None` if nothing is tracked.
    pub fn union_range(&self) -> Option<Range<usize>> {
        self.ranges.union_range()
    }

    /// Returns `true` if no edit is pending.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Forget every tracked range. Called once per completed highlight pass.
    pub fn clear(&mut self) {
        self.ranges.clear();
    }
}
