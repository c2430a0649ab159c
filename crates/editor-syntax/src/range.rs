//! Sorted sets of half-open offset ranges.
//!
//! [`RangeSet`] is the bookkeeping structure shared by the affected-range tracker and the
//! language layers' invalidation reports. Ranges are kept sorted by start, and overlapping or
//! touching ranges are coalesced on insertion. Zero-length ranges are kept: a pure deletion
//! leaves a zero-length mark at the deletion point, and that point still owes a reparse.

use std::ops::Range;

/// Returns the smallest range covering both `a` and `b`.
pub fn union_bounds(a: &Range<usize>, b: &Range<usize>) -> Range<usize> {
    a.start.min(b.start)..a.end.max(b.end)
}

/// Maps a pre-edit offset into post-edit coordinates.
///
/// `pre_edit` is the replaced range in the old text and `post_edit` the range its replacement
/// occupies in the new text (both share the same start). Offsets inside the replaced range
/// collapse onto the start (for lower bounds) or the end (for upper bounds) of `post_edit`.
fn map_offset(
    offset: usize,
    pre_edit: &Range<usize>,
    post_edit: &Range<usize>,
    lower_bound: bool,
) -> usize {
    if offset <= pre_edit.start {
        offset
    } else if offset >= pre_edit.end {
        offset - pre_edit.end + post_edit.end
    } else if lower_bound {
        post_edit.start
    } else {
        post_edit.end
    }
}

/// Maps a range through an edit that replaced `pre_edit` by text now occupying `post_edit`.
pub fn map_range(
    range: &Range<usize>,
    pre_edit: &Range<usize>,
    post_edit: &Range<usize>,
) -> Range<usize> {
    let start = map_offset(range.start, pre_edit, post_edit, true);
    let end = map_offset(range.end, pre_edit, post_edit, false);
    start..end.max(start)
}

/// An ordered collection of disjoint, non-adjacent half-open ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    ranges: Vec<Range<usize>>,
}

impl RangeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Create a set holding a single range.
    pub fn from_range(range: Range<usize>) -> Self {
        let mut set = Self::new();
        set.insert(range);
        set
    }

    /// Returns `true` if the set holds no range (not even a zero-length one).
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of disjoint ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// The disjoint ranges, sorted by start.
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Iterate over the disjoint ranges.
    pub fn iter(&self) -> std::slice::Iter<'_, Range<usize>> {
        self.ranges.iter()
    }

    /// The single range spanning every tracked range, or `None` if the set is empty.
    pub fn union_range(&self) -> Option<Range<usize>> {
        let first = self.ranges.first()?;
        let last = self.ranges.last()?;
        Some(first.start..last.end)
    }

    /// Remove every range.
    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// Union `range` into the set, coalescing overlapping and touching ranges.
    pub fn insert(&mut self, range: Range<usize>) {
        if range.start > range.end {
            return;
        }

        // First range that could touch `range`.
        let idx = self.ranges.partition_point(|r| r.end < range.start);

        let mut merged = range;
        let mut last = idx;
        while last < self.ranges.len() && self.ranges[last].start <= merged.end {
            merged = union_bounds(&merged, &self.ranges[last]);
            last += 1;
        }

        self.ranges.splice(idx..last, std::iter::once(merged));
    }

    /// Union every range of `other` into the set.
    pub fn union(&mut self, other: &RangeSet) {
        for range in other.iter() {
            self.insert(range.clone());
        }
    }

    /// Returns `true` if any tracked range overlaps or touches `range`.
    pub fn intersects(&self, range: &Range<usize>) -> bool {
        let idx = self.ranges.partition_point(|r| r.end < range.start);
        self.ranges
            .get(idx)
            .is_some_and(|r| r.start <= range.end)
    }

    /// Map every range through an edit (see [`map_range`]) and re-coalesce.
    pub fn map_through_edit(&mut self, pre_edit: &Range<usize>, post_edit: &Range<usize>) {
        if self.ranges.is_empty() {
            return;
        }

        let mapped = std::mem::take(&mut self.ranges);
        for range in mapped {
            self.insert(map_range(&range, pre_edit, post_edit));
        }
    }
}

impl FromIterator<Range<usize>> for RangeSet {
    fn from_iter<T: IntoIterator<Item = Range<usize>>>(iter: T) -> Self {
        let mut set = Self::new();
        for range in iter {
            set.insert(range);
        }
        set
    }
}

impl<'a> IntoIterator for &'a RangeSet {
    type Item = &'a Range<usize>;
    type IntoIter = std::slice::Iter<'a, Range<usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}
