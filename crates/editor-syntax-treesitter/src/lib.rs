#![warn(missing_docs)]
//! `editor-syntax-treesitter` - Tree-sitter language layer for `editor-syntax`.
//!
//! This crate provides a [`TreeSitterLayer`] that plugs into `editor_syntax::SyntaxClient`:
//!
//! - edits are forwarded to the retained trees with `Tree::edit`
//! - reparses are incremental, and `Tree::changed_ranges` widens the reported invalidations
//! - injection queries spawn nested sublayers in other languages, resolved by name through a
//!   lazily compiling [`LanguageRegistry`]
//! - highlight queries produce named captures mapped onto `editor_syntax::SyntaxType`

mod error;
mod layer;
mod registry;

pub use error::TreeSitterError;
pub use layer::{DEFAULT_MAX_INJECTION_DEPTH, TreeSitterLayer};
pub use registry::{CompiledLanguage, LanguageConfig, LanguageRegistry};
