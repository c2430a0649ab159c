//! Language configurations and the lazily compiling registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tree_sitter::{Language, Query};

use crate::error::TreeSitterError;

/// Configuration for one Tree-sitter language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Name used to look the language up, including from injection queries.
    pub name: String,
    /// Tree-sitter language.
    pub language: Language,
    /// Syntax highlighting query (`.scm`).
    pub highlights_query: String,
    /// Optional injection query (`.scm`) using `@injection.content` and either
    /// `@injection.language` or `(#set! injection.language "...")`.
    pub injections_query: Option<String>,
}

impl LanguageConfig {
    /// Create a config with a name, language and highlights query.
    pub fn new(
        name: impl Into<String>,
        language: Language,
        highlights_query: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            language,
            highlights_query: highlights_query.into(),
            injections_query: None,
        }
    }

    /// Set an injection query.
    pub fn with_injections_query(mut self, injections_query: impl Into<String>) -> Self {
        self.injections_query = Some(injections_query.into());
        self
    }
}

/// A language with its queries compiled.
pub struct CompiledLanguage {
    name: String,
    language: Language,
    highlights: Query,
    injections: Option<Query>,
    injection_content: Option<u32>,
    injection_language: Option<u32>,
}

impl CompiledLanguage {
    /// Compile the queries of `config`.
    pub fn compile(config: &LanguageConfig) -> Result<Self, TreeSitterError> {
        let highlights = Query::new(&config.language, &config.highlights_query)
            .map_err(|e| TreeSitterError::Query(e.to_string()))?;

        let injections = match config.injections_query.as_deref() {
            Some(q) if !q.trim().is_empty() => Some(
                Query::new(&config.language, q)
                    .map_err(|e| TreeSitterError::Query(e.to_string()))?,
            ),
            _ => None,
        };
        let injection_content = injections
            .as_ref()
            .and_then(|q| q.capture_index_for_name("injection.content"));
        let injection_language = injections
            .as_ref()
            .and_then(|q| q.capture_index_for_name("injection.language"));

        Ok(Self {
            name: config.name.clone(),
            language: config.language.clone(),
            highlights,
            injections,
            injection_content,
            injection_language,
        })
    }

    /// Registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tree-sitter language.
    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Compiled highlights query.
    pub fn highlights(&self) -> &Query {
        &self.highlights
    }

    /// Compiled injection query, if any.
    pub fn injections(&self) -> Option<&Query> {
        self.injections.as_ref()
    }

    pub(crate) fn injection_content_capture(&self) -> Option<u32> {
        self.injection_content
    }

    pub(crate) fn injection_language_capture(&self) -> Option<u32> {
        self.injection_language
    }
}

impl fmt::Debug for CompiledLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledLanguage")
            .field("name", &self.name)
            .field("injections", &self.injections.is_some())
            .finish_non_exhaustive()
    }
}

type Loader = Box<dyn Fn() -> LanguageConfig + Send + Sync>;

enum Entry {
    Pending(Loader),
    Ready(Arc<CompiledLanguage>),
}

/// Name → language provider, shared by a layer and its injected sublayers.
///
/// Languages are compiled on first use and cached.
#[derive(Default)]
pub struct LanguageRegistry {
    entries: Mutex<HashMap<String, Entry>>,
}

impl LanguageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a language config under its name, replacing any previous entry.
    pub fn register(&self, config: LanguageConfig) {
        let name = config.name.clone();
        self.register_with(name, move || config.clone());
    }

    /// Register a loader called the first time `name` is requested.
    pub fn register_with<F>(&self, name: impl Into<String>, loader: F)
    where
        F: Fn() -> LanguageConfig + Send + Sync + 'static,
    {
        self.entries()
            .insert(name.into(), Entry::Pending(Box::new(loader)));
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries().keys().cloned().collect();
        names.sort();
        names
    }

    /// Look up `name`, compiling it on first use.
    ///
    /// A loader whose queries fail to compile stays registered, so the error is returned again
    /// on the next lookup.
    pub fn language(&self, name: &str) -> Result<Arc<CompiledLanguage>, TreeSitterError> {
        let mut entries = self.entries();
        let entry = entries
            .get_mut(name)
            .ok_or_else(|| TreeSitterError::UnknownLanguage(name.to_string()))?;

        match &*entry {
            Entry::Ready(language) => Ok(language.clone()),
            Entry::Pending(loader) => {
                let compiled = Arc::new(CompiledLanguage::compile(&loader())?);
                tracing::debug!(
                    target: "editor_syntax_treesitter::registry",
                    language = name,
                    "compiled language queries"
                );
                *entry = Entry::Ready(compiled.clone());
                Ok(compiled)
            }
        }
    }
}

impl fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageRegistry")
            .field("names", &self.names())
            .finish()
    }
}
