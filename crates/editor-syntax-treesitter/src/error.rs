use thiserror::Error;

/// Errors produced while setting up Tree-sitter languages.
///
/// Only construction can fail; once a [`TreeSitterLayer`](crate::TreeSitterLayer) exists, parse
/// problems inside injected languages are logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeSitterError {
    /// Setting the Tree-sitter language failed.
    #[error("tree-sitter language error: {0}")]
    Language(String),
    /// Compiling a Tree-sitter query failed.
    #[error("tree-sitter query error: {0}")]
    Query(String),
    /// No language is registered under this name.
    #[error("unknown tree-sitter language: {0}")]
    UnknownLanguage(String),
}
