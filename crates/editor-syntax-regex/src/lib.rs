#![warn(missing_docs)]
//! `editor-syntax-regex` - Regex-based language layer for `editor-syntax`.
//!
//! Syntax definitions are YAML documents listing highlight rules per category (plain words,
//! regular expressions, begin/end delimited regions), comment delimiters, and outline rules.
//! A compiled [`RegexSyntax`] backs a [`RegexLayer`], which plugs into
//! `editor_syntax::SyntaxClient`, and also extracts the document outline.
//!
//! ```rust
//! use editor_syntax::{SyntaxClient, SyntaxClientConfig, SyntaxType};
//! use editor_syntax_regex::RegexLayer;
//!
//! let layer = RegexLayer::from_yaml_str("highlights:\n  keywords:\n    - beginString: foo\n").unwrap();
//! let mut client = SyntaxClient::new(layer, "foo bar", SyntaxClientConfig::default());
//!
//! let result = client.parse_highlights("foo bar", 0..7, || false).unwrap();
//! assert_eq!(result.highlights.len(), 1);
//! assert_eq!(result.highlights[0].category, SyntaxType::Keywords);
//! assert_eq!(result.highlights[0].range, 0..3);
//! ```

mod definition;
mod error;
mod extractor;
mod layer;
mod nestable;
mod outline;
mod syntax;

pub use definition::{
    BlockComment, CommentDelimiters, HighlightRule, InlineComment, OutlineKind, OutlineRule,
    SyntaxDefinition, SyntaxKind,
};
pub use error::RegexSyntaxError;
pub use layer::RegexLayer;
pub use outline::{OutlineExtractor, OutlineItem};
pub use syntax::RegexSyntax;
