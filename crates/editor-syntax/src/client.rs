//! Per-document orchestration of edit ingestion and highlight passes.

use std::ops::Range;

use crate::edit::{MirroredContent, TextEdit};
use crate::error::EditError;
use crate::highlight::{HighlightResult, extract_highlights};
use crate::layer::LanguageLayer;
use crate::position_index::PositionIndex;
use crate::range::{RangeSet, union_bounds};
use crate::tracker::AffectedRanges;

const LOG_TARGET: &str = "editor_syntax::client";

/// Configuration for [`SyntaxClient`] and [`SyntaxHandle`](crate::SyntaxHandle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxClientConfig {
    /// Whether reparse passes refresh nested/injected languages.
    pub resolve_sublayers: bool,
    /// Thread name used by [`SyntaxHandle`](crate::SyntaxHandle) for its worker.
    pub worker_name: String,
}

impl SyntaxClientConfig {
    /// Create a config with the defaults:
    /// - `resolve_sublayers` is `true`
    /// - `worker_name` is `"editor-syntax"`
    pub fn new() -> Self {
        Self {
            resolve_sublayers: true,
            worker_name: "editor-syntax".to_string(),
        }
    }

    /// Control sublayer resolution during reparse.
    pub fn with_resolve_sublayers(mut self, resolve: bool) -> Self {
        self.resolve_sublayers = resolve;
        self
    }

    /// Set the worker thread name.
    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }
}

impl Default for SyntaxClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// How the client handled the last edit ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// The content already matched the mirror; nothing was done.
    Unchanged,
    /// The edit was translated and forwarded incrementally.
    Incremental,
    /// The mirror and the layer were reset from the full content.
    FullResync,
}

/// The single owner of a document's syntax state.
///
/// Holds the mirrored content, its position index, the affected-range tracker and the language
/// layer. Every method takes `&mut self`, so ingestion and highlight passes never interleave;
/// [`SyntaxHandle`](crate::SyntaxHandle) serializes callers from other threads onto one client.
pub struct SyntaxClient<L> {
    layer: L,
    content: MirroredContent,
    affected: AffectedRanges,
    config: SyntaxClientConfig,
    last_ingest_mode: IngestMode,
}

impl<L: LanguageLayer> SyntaxClient<L> {
    /// Create a client for `content`. The layer parses it in full; nothing is pending.
    pub fn new(mut layer: L, content: &str, config: SyntaxClientConfig) -> Self {
        layer.replace_content(content);
        Self {
            layer,
            content: MirroredContent::new(content),
            affected: AffectedRanges::new(),
            config,
            last_ingest_mode: IngestMode::Unchanged,
        }
    }

    /// The mirrored content.
    pub fn content(&self) -> &str {
        self.content.text()
    }

    /// The line-start index of the mirrored content.
    pub fn position_index(&self) -> &PositionIndex {
        self.content.index()
    }

    /// Regions still owed a reparse.
    pub fn affected_ranges(&self) -> &AffectedRanges {
        &self.affected
    }

    /// The language layer.
    pub fn layer(&self) -> &L {
        &self.layer
    }

    /// The client configuration.
    pub fn config(&self) -> &SyntaxClientConfig {
        &self.config
    }

    /// How the last ingestion was handled (useful for tests and instrumentation).
    pub fn last_ingest_mode(&self) -> IngestMode {
        self.last_ingest_mode
    }

    /// Translate and forward one edit.
    ///
    /// On `Err` neither the mirror, the layer nor the tracker changed.
    pub fn note_edit(&mut self, edit: &TextEdit) -> Result<(), EditError> {
        let descriptor = self.content.apply_edit(edit)?;
        self.layer.apply_edit(&descriptor);
        self.affected.append(edit.edited_range.clone(), edit.delta);
        self.last_ingest_mode = IngestMode::Incremental;

        tracing::trace!(
            target: LOG_TARGET,
            start = descriptor.start_byte,
            old_end = descriptor.old_end_byte,
            new_end = descriptor.new_end_byte,
            "edit applied"
        );
        Ok(())
    }

    /// Ingest an edit notification together with the caller's post-edit content.
    ///
    /// Never fails: an edit that cannot be applied incrementally, or that leaves the mirror
    /// different from `content`, triggers a full resync.
    pub fn ingest_edit(&mut self, edit: &TextEdit, content: &str) {
        if self.content.text() == content {
            self.last_ingest_mode = IngestMode::Unchanged;
            return;
        }

        match self.note_edit(edit) {
            Ok(()) if self.content.text() == content => {}
            Ok(()) => {
                tracing::debug!(
                    target: LOG_TARGET,
                    "mirrored content diverged from the editor after an edit, resyncing"
                );
                self.full_resync(content);
            }
            Err(err) => self.recover(err, content),
        }
    }

    /// Bring the mirror up to `content`, feeding the whole content as a single edit.
    pub fn update(&mut self, content: &str) {
        if self.content.text() == content {
            self.last_ingest_mode = IngestMode::Unchanged;
            return;
        }

        let edit = TextEdit::new(
            0..content.len(),
            content.len() as isize - self.content.len() as isize,
            content,
        );
        if let Err(err) = self.note_edit(&edit) {
            self.recover(err, content);
        }
    }

    /// Switch to another language layer. The whole content becomes affected.
    ///
    /// Returns the previous layer.
    pub fn replace_layer(&mut self, mut layer: L) -> L {
        layer.replace_content(self.content.text());
        self.affected.invalidate(0..self.content.len());
        std::mem::replace(&mut self.layer, layer)
    }

    /// Run a highlight pass over `range` of `content`.
    ///
    /// `is_cancelled` is checked before and after the reparse. A cancelled pass returns `None`
    /// and leaves the affected ranges in place.
    pub fn parse_highlights(
        &mut self,
        content: &str,
        range: Range<usize>,
        is_cancelled: impl Fn() -> bool,
    ) -> Option<HighlightResult> {
        if self.content.text() != content {
            tracing::debug!(
                target: LOG_TARGET,
                "highlight request raced ahead of edit ingestion, resyncing"
            );
            self.full_resync(content);
        }

        if is_cancelled() {
            tracing::trace!(target: LOG_TARGET, "highlight pass cancelled before reparse");
            return None;
        }

        let invalidated = if self.affected.is_empty() {
            RangeSet::new()
        } else {
            self.layer.reparse(
                self.content.text(),
                self.affected.ranges(),
                self.config.resolve_sublayers,
            )
        };

        if is_cancelled() {
            tracing::trace!(target: LOG_TARGET, "highlight pass cancelled after reparse");
            return None;
        }
        self.affected.clear();

        let len = self.content.len();
        let requested = clamp(range, len);
        let update_range = match invalidated.union_range() {
            Some(invalid) => clamp(union_bounds(&invalid, &requested), len),
            None => requested,
        };

        let text = self.content.text();
        let captures = self.layer.captures(update_range.clone(), text);
        let layer = &self.layer;
        let highlights = extract_highlights(captures, |name| layer.category_for(name));

        tracing::trace!(
            target: LOG_TARGET,
            invalidated = invalidated.len(),
            update_start = update_range.start,
            update_end = update_range.end,
            spans = highlights.len(),
            "highlight pass"
        );

        Some(HighlightResult {
            highlights,
            update_range,
        })
    }

    fn recover(&mut self, err: EditError, content: &str) {
        match &err {
            EditError::InvalidRange { .. } => {
                tracing::debug!(target: LOG_TARGET, error = %err, "falling back to full resync");
            }
            EditError::PointCalculationFailed { .. } => {
                tracing::error!(
                    target: LOG_TARGET,
                    error = %err,
                    "position index inconsistent with mirrored content, falling back to full resync"
                );
            }
        }
        self.full_resync(content);
    }

    fn full_resync(&mut self, content: &str) {
        self.content.reset(content);
        self.layer.replace_content(content);
        self.affected.invalidate(0..content.len());
        self.last_ingest_mode = IngestMode::FullResync;
    }
}

fn clamp(range: Range<usize>, len: usize) -> Range<usize> {
    let end = range.end.min(len);
    range.start.min(end)..end
}
