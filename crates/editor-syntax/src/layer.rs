//! The parser capability consumed by the [`SyntaxClient`](crate::SyntaxClient).

use std::ops::Range;

use crate::edit::EditDescriptor;
use crate::highlight::{NamedRange, SyntaxType};
use crate::range::RangeSet;

/// A per-language parse engine (incremental parser, regex rule set, ...).
///
/// The client owns exactly one layer per document and only calls it from the thread that owns
/// the client, so implementations need `Send` but not `Sync`.
pub trait LanguageLayer: Send {
    /// Adjust the layer's retained state for an edit that has already been applied to the
    /// mirrored content.
    fn apply_edit(&mut self, edit: &EditDescriptor);

    /// Bring the layer up to date with `content`.
    ///
    /// `affecting` lists the regions edited since the last pass. With `resolve_sublayers` the
    /// layer also refreshes nested/injected languages. Returns every region whose derived
    /// structure may have changed (at least `affecting`, possibly wider).
    fn reparse(&mut self, content: &str, affecting: &RangeSet, resolve_sublayers: bool)
    -> RangeSet;

    /// Named captures overlapping `range`.
    fn captures(&self, range: Range<usize>, text: &str) -> Vec<NamedRange>;

    /// Discard all retained state and parse `content` from scratch.
    fn replace_content(&mut self, content: &str);

    /// Map a capture name to a category. Defaults to [`SyntaxType::from_capture_name`].
    fn category_for(&self, capture_name: &str) -> Option<SyntaxType> {
        SyntaxType::from_capture_name(capture_name)
    }
}

impl<L: LanguageLayer + ?Sized> LanguageLayer for Box<L> {
    fn apply_edit(&mut self, edit: &EditDescriptor) {
        (**self).apply_edit(edit);
    }

    fn reparse(
        &mut self,
        content: &str,
        affecting: &RangeSet,
        resolve_sublayers: bool,
    ) -> RangeSet {
        (**self).reparse(content, affecting, resolve_sublayers)
    }

    fn captures(&self, range: Range<usize>, text: &str) -> Vec<NamedRange> {
        (**self).captures(range, text)
    }

    fn replace_content(&mut self, content: &str) {
        (**self).replace_content(content);
    }

    fn category_for(&self, capture_name: &str) -> Option<SyntaxType> {
        (**self).category_for(capture_name)
    }
}
