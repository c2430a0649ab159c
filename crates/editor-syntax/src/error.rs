//! Error types for edit translation.

use thiserror::Error;

/// Errors produced while translating an edit notification against the mirrored content.
///
/// Both variants are recovered locally by the [`SyntaxClient`](crate::SyntaxClient) through a
/// full resync; they only surface from the raw [`MirroredContent::apply_edit`](crate::MirroredContent::apply_edit)
/// and [`SyntaxClient::note_edit`](crate::SyntaxClient::note_edit) entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The edit arithmetic does not fit the mirrored content.
    #[error(
        "invalid edit: range {start}..{end} with delta {delta} and {inserted_len} inserted bytes \
         does not fit content of {content_len} bytes"
    )]
    InvalidRange {
        /// Start of the edited range (post-edit coordinates).
        start: usize,
        /// End of the edited range (post-edit coordinates).
        end: usize,
        /// Length change of the edit.
        delta: isize,
        /// Byte length of the inserted text.
        inserted_len: usize,
        /// Byte length of the mirrored content before the edit.
        content_len: usize,
    },
    /// No line start exists at or before `offset`.
    #[error("no line start at or before offset {offset}")]
    PointCalculationFailed {
        /// The offset whose point could not be computed.
        offset: usize,
    },
}
