//! Line-start index over the mirrored content.
//!
//! Offsets are UTF-8 byte offsets. `"\n"`, `"\r\n"` and a lone `"\r"` each terminate a line,
//! and the offset right after a terminator is a line start, even when it equals the text length.

use std::ops::Range;

/// A zero-based `(row, column)` position, with the column counted in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    /// Zero-based line number.
    pub row: usize,
    /// Byte offset from the start of the line.
    pub column: usize,
}

impl Point {
    /// Create a point.
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Ordered line-start offsets of a text.
///
/// Invariant: strictly increasing, and the first element is always `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionIndex {
    line_starts: Vec<usize>,
}

impl PositionIndex {
    /// Index of an empty text.
    pub fn new() -> Self {
        Self {
            line_starts: vec![0],
        }
    }

    /// Build the index for `text`.
    pub fn from_text(text: &str) -> Self {
        Self {
            line_starts: line_starts_in(text),
        }
    }

    /// Rebuild the index from scratch for `text`.
    pub fn rebuild(&mut self, text: &str) {
        self.line_starts = line_starts_in(text);
    }

    /// All line-start offsets.
    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Start offset of `row`.
    pub fn line_start(&self, row: usize) -> Option<usize> {
        self.line_starts.get(row).copied()
    }

    /// Offsets of `row`, including its terminator. `text_len` closes the last line.
    pub fn line_range(&self, row: usize, text_len: usize) -> Option<Range<usize>> {
        let start = self.line_start(row)?;
        let end = self.line_start(row + 1).unwrap_or(text_len);
        Some(start..end.max(start))
    }

    /// Convert an offset to a point.
    ///
    /// The row is the position of the last line start at or before `offset`.
    /// Returns `None` if no such line start exists.
    pub fn point_for_offset(&self, offset: usize) -> Option<Point> {
        let row = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .checked_sub(1)?;
        Some(Point::new(row, offset - self.line_starts[row]))
    }

    /// Convert a point back to an offset.
    pub fn offset_for_point(&self, point: Point) -> Option<usize> {
        self.line_start(point.row)
            .map(|start| start.saturating_add(point.column))
    }

    /// Drop every line start inside `range`.
    pub(crate) fn remove_in(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let lower = self.line_starts.partition_point(|&start| start < range.start);
        let upper = self.line_starts.partition_point(|&start| start < range.end);
        self.line_starts.drain(lower..upper);
    }

    /// Move every line start at or after `from` by `delta`.
    pub(crate) fn shift_from(&mut self, from: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        let lower = self.line_starts.partition_point(|&start| start < from);
        for start in &mut self.line_starts[lower..] {
            *start = start.saturating_add_signed(delta);
        }
    }

    pub(crate) fn insert(&mut self, offset: usize) {
        if let Err(idx) = self.line_starts.binary_search(&offset) {
            self.line_starts.insert(idx, offset);
        }
    }

    pub(crate) fn remove(&mut self, offset: usize) {
        if let Ok(idx) = self.line_starts.binary_search(&offset) {
            self.line_starts.remove(idx);
        }
    }
}

impl Default for PositionIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan `text` for line starts. Always includes `0`.
pub(crate) fn line_starts_in(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut starts = vec![0];

    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\n' => starts.push(idx + 1),
            b'\r' => {
                if bytes.get(idx + 1) == Some(&b'\n') {
                    idx += 1;
                }
                starts.push(idx + 1);
            }
            _ => {}
        }
        idx += 1;
    }

    starts
}

/// Whether `offset` starts a line, given the bytes on either side of it.
pub(crate) fn is_line_start(before: Option<u8>, at: Option<u8>) -> bool {
    match before {
        None => true,
        Some(b'\n') => true,
        Some(b'\r') => at != Some(b'\n'),
        Some(_) => false,
    }
}
