#![warn(missing_docs)]
//! Editor Syntax - incremental syntax state for a single open document.
//!
//! # Overview
//!
//! `editor-syntax` sits between a text editor and an incremental parse engine. It keeps a private
//! mirror of the document, translates each edit notification into the byte/point descriptor an
//! incremental parser needs, remembers which regions still owe a reparse, and turns the parser's
//! named captures into sorted, categorized highlight spans.
//!
//! The parse engine itself is pluggable through [`LanguageLayer`]; see `editor-syntax-treesitter`
//! and `editor-syntax-regex` for implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  SyntaxHandle (worker thread + queue)       │  ← async front end
//! ├─────────────────────────────────────────────┤
//! │  SyntaxClient                               │  ← ingestion / highlight passes
//! ├──────────────────────┬──────────────────────┤
//! │  MirroredContent     │  AffectedRanges      │  ← edit translation / bookkeeping
//! │  + PositionIndex     │  (RangeSet)          │
//! ├──────────────────────┴──────────────────────┤
//! │  LanguageLayer (tree-sitter, regex, ...)    │  ← parse engine
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Offsets
//!
//! All offsets are UTF-8 byte offsets. `"\n"`, `"\r\n"` and a lone `"\r"` terminate lines.
//!
//! # Quick Start
//!
//! ```rust
//! use editor_syntax::{AffectedRanges, MirroredContent, Point, TextEdit};
//!
//! let mut content = MirroredContent::new("abc");
//! let mut affected = AffectedRanges::new();
//!
//! let edit = TextEdit::insert(3, "\n");
//! let descriptor = content.apply_edit(&edit).unwrap();
//! affected.append(edit.edited_range.clone(), edit.delta);
//!
//! assert_eq!(content.index().line_starts(), &[0, 4]);
//! assert_eq!(descriptor.new_end_position, Point::new(1, 0));
//! assert_eq!(affected.union_range(), Some(3..4));
//! ```

pub mod client;
pub mod edit;
pub mod error;
pub mod handle;
pub mod highlight;
pub mod layer;
pub mod position_index;
pub mod range;
pub mod tracker;

pub use client::{IngestMode, SyntaxClient, SyntaxClientConfig};
pub use edit::{EditDescriptor, MirroredContent, TextEdit};
pub use error::EditError;
pub use handle::{ClientSnapshot, SyntaxHandle};
pub use highlight::{
    HighlightResult, HighlightSpan, NamedRange, SyntaxType, UnknownSyntaxType, extract_highlights,
};
pub use layer::LanguageLayer;
pub use position_index::{Point, PositionIndex};
pub use range::{RangeSet, map_range, union_bounds};
pub use tracker::AffectedRanges;
