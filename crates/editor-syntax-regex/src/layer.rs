use std::ops::Range;
use std::sync::Arc;

use editor_syntax::{EditDescriptor, LanguageLayer, NamedRange, RangeSet};

use crate::definition::SyntaxDefinition;
use crate::error::RegexSyntaxError;
use crate::outline::OutlineItem;
use crate::syntax::{RegexSyntax, line_bounds};

const LOG_TARGET: &str = "editor_syntax_regex::layer";

/// A [`LanguageLayer`] driven by a [`RegexSyntax`].
///
/// The layer keeps no parse state: each pass rescans the text around the affected regions.
/// Matches are confined to lines unless the syntax has multi-line rules, in which case an edit
/// invalidates everything after the line it touched.
#[derive(Debug, Clone)]
pub struct RegexLayer {
    syntax: Arc<RegexSyntax>,
}

impl RegexLayer {
    /// Create a layer sharing a compiled syntax.
    pub fn new(syntax: Arc<RegexSyntax>) -> Self {
        Self { syntax }
    }

    /// Compile `definition` into a fresh layer.
    pub fn from_definition(definition: &SyntaxDefinition) -> Result<Self, RegexSyntaxError> {
        Ok(Self::new(Arc::new(RegexSyntax::compile(definition)?)))
    }

    /// Parse and compile a YAML definition.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RegexSyntaxError> {
        Self::from_definition(&SyntaxDefinition::from_yaml_str(yaml)?)
    }

    /// A layer that highlights nothing.
    pub fn empty() -> Self {
        Self::new(Arc::new(RegexSyntax::empty()))
    }

    /// The compiled syntax.
    pub fn syntax(&self) -> &Arc<RegexSyntax> {
        &self.syntax
    }

    /// Outline items of `text`.
    pub fn outline(&self, text: &str) -> Vec<OutlineItem> {
        self.syntax.outline(text)
    }
}

impl LanguageLayer for RegexLayer {
    fn apply_edit(&mut self, _edit: &EditDescriptor) {}

    fn reparse(&mut self, content: &str, affecting: &RangeSet, _resolve_sublayers: bool) -> RangeSet {
        let invalidated: RangeSet = if self.syntax.has_multiline_rules() {
            affecting
                .iter()
                .map(|range| {
                    let start = line_bounds(content, range.clone()).start;
                    start..content.len()
                })
                .collect()
        } else {
            affecting
                .iter()
                .map(|range| line_bounds(content, range.clone()))
                .collect()
        };

        tracing::trace!(
            target: LOG_TARGET,
            affecting = affecting.len(),
            invalidated = invalidated.len(),
            "widened affected ranges"
        );
        invalidated
    }

    fn captures(&self, range: Range<usize>, text: &str) -> Vec<NamedRange> {
        self.syntax.highlight(text, range)
    }

    fn replace_content(&mut self, _content: &str) {}
}
