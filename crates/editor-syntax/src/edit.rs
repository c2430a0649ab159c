//! Edit notifications and their translation into parser edit descriptors.
//!
//! An editor reports each change as `(edited_range, delta, inserted_text)`:
//! - `edited_range` is the range the inserted text occupies **after** the edit,
//! - `delta` is `new_len - old_len`,
//! - `inserted_text` is the exact replacement text.
//!
//! [`MirroredContent::apply_edit`] checks that notification against its copy of the text, patches
//! the [`PositionIndex`] without rescanning the document, and returns the [`EditDescriptor`] an
//! incremental parser needs.

use std::ops::Range;

use crate::error::EditError;
use crate::position_index::{PositionIndex, Point, is_line_start, line_starts_in};

/// A single edit notification, in byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Range occupied by `inserted_text` in the post-edit content.
    pub edited_range: Range<usize>,
    /// Length change (`post_len - pre_len`).
    pub delta: isize,
    /// The replacement text.
    pub inserted_text: String,
}

impl TextEdit {
    /// Create an edit notification from its raw parts.
    pub fn new(edited_range: Range<usize>, delta: isize, inserted_text: impl Into<String>) -> Self {
        Self {
            edited_range,
            delta,
            inserted_text: inserted_text.into(),
        }
    }

    /// Insert `text` at `offset`.
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            edited_range: offset..offset + text.len(),
            delta: text.len() as isize,
            inserted_text: text,
        }
    }

    /// Delete `len` bytes starting at `offset`.
    pub fn delete(offset: usize, len: usize) -> Self {
        Self {
            edited_range: offset..offset,
            delta: -(len as isize),
            inserted_text: String::new(),
        }
    }

    /// Replace the pre-edit range `replaced` by `text`.
    pub fn replace(replaced: Range<usize>, text: impl Into<String>) -> Self {
        let text = text.into();
        let start = replaced.start;
        Self {
            edited_range: start..start + text.len(),
            delta: text.len() as isize - replaced.len() as isize,
            inserted_text: text,
        }
    }

    /// The range this edit replaced, in pre-edit coordinates, if its arithmetic is consistent.
    pub fn pre_edit_range(&self) -> Option<Range<usize>> {
        if self.edited_range.start > self.edited_range.end {
            return None;
        }
        let pre_len = (self.edited_range.len() as isize).checked_sub(self.delta)?;
        let pre_len = usize::try_from(pre_len).ok()?;
        let end = self.edited_range.start.checked_add(pre_len)?;
        Some(self.edited_range.start..end)
    }
}

/// Byte and point offsets describing one edit, in the shape incremental parsers expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditDescriptor {
    /// Start of the edit.
    pub start_byte: usize,
    /// End of the replaced text in the old content.
    pub old_end_byte: usize,
    /// End of the inserted text in the new content.
    pub new_end_byte: usize,
    /// Point of `start_byte`.
    pub start_position: Point,
    /// Point of `old_end_byte`, in the old content.
    pub old_end_position: Point,
    /// Point of `new_end_byte`, in the new content.
    pub new_end_position: Point,
}

impl EditDescriptor {
    /// Replaced range in old-content coordinates.
    pub fn pre_edit_range(&self) -> Range<usize> {
        self.start_byte..self.old_end_byte
    }

    /// Inserted range in new-content coordinates.
    pub fn post_edit_range(&self) -> Range<usize> {
        self.start_byte..self.new_end_byte
    }
}

/// The engine's private copy of the document text plus its line-start index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirroredContent {
    text: String,
    index: PositionIndex,
}

impl MirroredContent {
    /// Mirror `text`.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let index = PositionIndex::from_text(&text);
        Self { text, index }
    }

    /// The mirrored text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte length of the mirrored text.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` if the mirrored text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The line-start index of the mirrored text.
    pub fn index(&self) -> &PositionIndex {
        &self.index
    }

    /// Replace the mirror wholesale and rescan it.
    pub fn reset(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.index.rebuild(&self.text);
    }

    fn invalid(&self, edit: &TextEdit) -> EditError {
        EditError::InvalidRange {
            start: edit.edited_range.start,
            end: edit.edited_range.end,
            delta: edit.delta,
            inserted_len: edit.inserted_text.len(),
            content_len: self.text.len(),
        }
    }

    fn point(&self, offset: usize) -> Result<Point, EditError> {
        self.index
            .point_for_offset(offset)
            .ok_or(EditError::PointCalculationFailed { offset })
    }

    /// Apply an edit notification.
    ///
    /// On success the text and index describe the post-edit content. On `Err` nothing changed.
    pub fn apply_edit(&mut self, edit: &TextEdit) -> Result<EditDescriptor, EditError> {
        if edit.inserted_text.len() != edit.edited_range.len() {
            return Err(self.invalid(edit));
        }
        let Some(pre_edit) = edit.pre_edit_range() else {
            return Err(self.invalid(edit));
        };
        if pre_edit.end > self.text.len()
            || !self.text.is_char_boundary(pre_edit.start)
            || !self.text.is_char_boundary(pre_edit.end)
        {
            return Err(self.invalid(edit));
        }

        let start = pre_edit.start;
        let old_end = pre_edit.end;
        let new_end = edit.edited_range.end;
        let inserted = edit.inserted_text.as_str();

        // Points against the old index.
        let start_position = self.point(start)?;
        let old_end_position = self.point(old_end)?;

        // Bytes on both sides of the two seams, as they will read in the new text.
        let old_bytes = self.text.as_bytes();
        let before_start = start.checked_sub(1).map(|i| old_bytes[i]);
        let after_old_end = old_bytes.get(old_end).copied();
        let at_start = inserted.as_bytes().first().copied().or(after_old_end);
        let before_new_end = inserted.as_bytes().last().copied().or(before_start);

        self.index.remove_in(start + 1..old_end + 1);
        self.index.shift_from(old_end, edit.delta);
        self.splice_inserted_starts(start, new_end, inserted);
        self.set_line_start(start, is_line_start(before_start, at_start));
        self.set_line_start(new_end, is_line_start(before_new_end, after_old_end));
        self.index.insert(0);

        let new_end_position = match self.index.point_for_offset(new_end) {
            Some(point) => point,
            None => {
                // The text is still the old one.
                self.index.rebuild(&self.text);
                return Err(EditError::PointCalculationFailed { offset: new_end });
            }
        };

        self.text.replace_range(start..old_end, inserted);

        Ok(EditDescriptor {
            start_byte: start,
            old_end_byte: old_end,
            new_end_byte: new_end,
            start_position,
            old_end_position,
            new_end_position,
        })
    }

    /// Insert the interior line starts of `inserted` (placed at `start`).
    fn splice_inserted_starts(&mut self, start: usize, new_end: usize, inserted: &str) {
        let new_starts: Vec<usize> = line_starts_in(inserted)
            .into_iter()
            .skip(1)
            .map(|offset| start + offset)
            .filter(|&offset| offset < new_end)
            .collect();
        if new_starts.is_empty() {
            return;
        }
        for offset in new_starts {
            self.index.insert(offset);
        }
    }

    fn set_line_start(&mut self, offset: usize, is_start: bool) {
        if is_start {
            self.index.insert(offset);
        } else {
            self.index.remove(offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_consistent(content: &MirroredContent) {
        assert_eq!(
            content.index(),
            &PositionIndex::from_text(content.text()),
            "index diverged for {:?}",
            content.text()
        );
    }

    #[test]
    fn test_text_edit_constructors() {
        assert_eq!(TextEdit::insert(3, "\n"), TextEdit::new(3..4, 1, "\n"));
        assert_eq!(TextEdit::delete(5, 2), TextEdit::new(5..5, -2, ""));
        assert_eq!(TextEdit::replace(2..6, "xy"), TextEdit::new(2..4, -2, "xy"));
        assert_eq!(TextEdit::replace(2..6, "xy").pre_edit_range(), Some(2..6));
        assert_eq!(TextEdit::new(2..3, 2, "x").pre_edit_range(), None);
        assert_eq!(TextEdit::new(usize::MAX..usize::MAX, -1, "").pre_edit_range(), None);
    }

    #[test]
    fn test_insert_newline_at_end() {
        let mut content = MirroredContent::new("abc");
        let desc = content.apply_edit(&TextEdit::insert(3, "\n")).unwrap();

        assert_eq!(content.text(), "abc\n");
        assert_eq!(content.index().line_starts(), &[0, 4]);
        assert_eq!(desc.start_byte, 3);
        assert_eq!(desc.old_end_byte, 3);
        assert_eq!(desc.new_end_byte, 4);
        assert_eq!(desc.start_position, Point::new(0, 3));
        assert_eq!(desc.old_end_position, Point::new(0, 3));
        assert_eq!(desc.new_end_position, Point::new(1, 0));
    }

    #[test]
    fn test_delete_on_single_line() {
        let mut content = MirroredContent::new("0123456789");
        let desc = content.apply_edit(&TextEdit::delete(5, 2)).unwrap();

        assert_eq!(content.text(), "01234789");
        assert_eq!(content.index().line_starts(), &[0]);
        assert_eq!(desc.pre_edit_range(), 5..7);
        assert_eq!(desc.post_edit_range(), 5..5);
        assert_eq!(desc.old_end_position, Point::new(0, 7));
        assert_eq!(desc.new_end_position, Point::new(0, 5));
    }

    #[test]
    fn test_delete_line_break_joins_lines() {
        let mut content = MirroredContent::new("ab\ncd\nef");
        let desc = content.apply_edit(&TextEdit::delete(2, 1)).unwrap();

        assert_eq!(content.text(), "abcd\nef");
        assert_eq!(content.index().line_starts(), &[0, 5]);
        assert_eq!(desc.old_end_position, Point::new(1, 0));
        assert_eq!(desc.new_end_position, Point::new(0, 2));
    }

    #[test]
    fn test_multiline_replacement() {
        let mut content = MirroredContent::new("one\ntwo\nthree\nfour");
        content
            .apply_edit(&TextEdit::replace(5..11, "X\nY\nZ"))
            .unwrap();

        assert_eq!(content.text(), "one\ntX\nY\nZee\nfour");
        assert_consistent(&content);
    }

    #[test]
    fn test_insert_at_line_start_keeps_that_start() {
        let mut content = MirroredContent::new("ab\ncd");
        content.apply_edit(&TextEdit::insert(3, "xy")).unwrap();

        assert_eq!(content.text(), "ab\nxycd");
        assert_eq!(content.index().line_starts(), &[0, 3]);

        content.apply_edit(&TextEdit::insert(0, "zz")).unwrap();
        assert_eq!(content.index().line_starts(), &[0, 5]);
    }

    #[test]
    fn test_crlf_joined_by_insertion() {
        let mut content = MirroredContent::new("a\rb");
        assert_eq!(content.index().line_starts(), &[0, 2]);

        content.apply_edit(&TextEdit::insert(2, "\n")).unwrap();
        assert_eq!(content.text(), "a\r\nb");
        assert_eq!(content.index().line_starts(), &[0, 3]);
    }

    #[test]
    fn test_crlf_split_by_insertion() {
        let mut content = MirroredContent::new("a\r\nb");
        content.apply_edit(&TextEdit::insert(2, "x")).unwrap();

        assert_eq!(content.text(), "a\rx\nb");
        assert_consistent(&content);
    }

    #[test]
    fn test_crlf_joined_by_deletion() {
        let mut content = MirroredContent::new("a\rx\nb");
        content.apply_edit(&TextEdit::delete(2, 1)).unwrap();

        assert_eq!(content.text(), "a\r\nb");
        assert_eq!(content.index().line_starts(), &[0, 3]);
    }

    #[test]
    fn test_inserted_cr_before_lf() {
        let mut content = MirroredContent::new("ab\ncd");
        content.apply_edit(&TextEdit::insert(2, "\r")).unwrap();

        assert_eq!(content.text(), "ab\r\ncd");
        assert_eq!(content.index().line_starts(), &[0, 4]);
    }

    #[test]
    fn test_mismatched_inserted_length_is_invalid() {
        let mut content = MirroredContent::new("hello");
        let before = content.clone();

        let err = content.apply_edit(&TextEdit::new(1..3, 2, "x")).unwrap_err();
        assert!(matches!(err, EditError::InvalidRange { .. }));
        assert_eq!(content, before);
    }

    #[test]
    fn test_negative_pre_edit_length_is_invalid() {
        let mut content = MirroredContent::new("hello");
        let err = content.apply_edit(&TextEdit::new(1..2, 3, "x")).unwrap_err();
        assert!(matches!(err, EditError::InvalidRange { .. }));
        assert_eq!(content.text(), "hello");
    }

    #[test]
    fn test_out_of_bounds_pre_edit_is_invalid() {
        let mut content = MirroredContent::new("hello");
        let err = content.apply_edit(&TextEdit::delete(4, 3)).unwrap_err();
        assert!(matches!(err, EditError::InvalidRange { content_len: 5, .. }));
        assert_eq!(content.text(), "hello");
    }

    #[test]
    fn test_non_char_boundary_is_invalid() {
        let mut content = MirroredContent::new("你好");
        let err = content.apply_edit(&TextEdit::insert(1, "x")).unwrap_err();
        assert!(matches!(err, EditError::InvalidRange { .. }));
        assert_eq!(content.text(), "你好");
    }

    #[test]
    fn test_reset() {
        let mut content = MirroredContent::new("abc");
        content.reset("x\ny\r\nz");
        assert_eq!(content.text(), "x\ny\r\nz");
        assert_eq!(content.index().line_starts(), &[0, 2, 5]);
    }
}
