use std::collections::{BTreeMap, VecDeque};
use std::ops::Range;
use std::sync::Arc;

use editor_syntax::{EditDescriptor, LanguageLayer, NamedRange, RangeSet, SyntaxType, map_range};
use streaming_iterator::StreamingIterator;
use tree_sitter::{InputEdit, Parser, Point, QueryCursor, Tree};

use crate::error::TreeSitterError;
use crate::registry::{CompiledLanguage, LanguageConfig, LanguageRegistry};

const LOG_TARGET: &str = "editor_syntax_treesitter::layer";

/// Default nesting limit for injected languages.
pub const DEFAULT_MAX_INJECTION_DEPTH: usize = 3;

/// A parser plus the tree it last produced.
struct ParsedTree {
    language: Arc<CompiledLanguage>,
    parser: Parser,
    tree: Option<Tree>,
}

impl ParsedTree {
    fn new(language: Arc<CompiledLanguage>) -> Result<Self, TreeSitterError> {
        let mut parser = Parser::new();
        parser
            .set_language(language.language())
            .map_err(|e| TreeSitterError::Language(e.to_string()))?;
        Ok(Self {
            language,
            parser,
            tree: None,
        })
    }

    /// Parse `text`, reusing the edited old tree, and report the ranges whose structure changed.
    fn reparse(&mut self, text: &str) -> Vec<Range<usize>> {
        let old = self.tree.take();
        self.tree = self.parser.parse(text, old.as_ref());

        match (old.as_ref(), self.tree.as_ref()) {
            (Some(old), Some(new)) => old
                .changed_ranges(new)
                .map(|r| r.start_byte..r.end_byte)
                .collect(),
            _ => vec![0..text.len()],
        }
    }

    fn parse_fresh(&mut self, text: &str) {
        self.tree = self.parser.parse(text, None);
    }
}

/// An injected language region.
struct Sublayer {
    depth: usize,
    byte_range: Range<usize>,
    parsed: ParsedTree,
}

struct Injection {
    language: String,
    ranges: Vec<tree_sitter::Range>,
}

impl Injection {
    fn byte_range(&self) -> Range<usize> {
        let start = self.ranges.first().map_or(0, |r| r.start_byte);
        let end = self.ranges.last().map_or(start, |r| r.end_byte);
        start..end
    }
}

/// A [`LanguageLayer`] backed by Tree-sitter.
///
/// The root language parses the whole document. Regions matched by a language's injection query
/// become sublayers parsed with their own language through `Parser::set_included_ranges`, nested
/// up to [`max_depth`](Self::with_max_depth) levels. Languages are resolved by name through a
/// shared [`LanguageRegistry`].
pub struct TreeSitterLayer {
    registry: Arc<LanguageRegistry>,
    root: ParsedTree,
    sublayers: Vec<Sublayer>,
    capture_categories: BTreeMap<String, SyntaxType>,
    max_depth: usize,
}

impl TreeSitterLayer {
    /// Create a layer for the language registered as `name`.
    pub fn new(registry: Arc<LanguageRegistry>, name: &str) -> Result<Self, TreeSitterError> {
        let language = registry.language(name)?;
        Ok(Self {
            registry,
            root: ParsedTree::new(language)?,
            sublayers: Vec::new(),
            capture_categories: BTreeMap::new(),
            max_depth: DEFAULT_MAX_INJECTION_DEPTH,
        })
    }

    /// Create a layer from a single config, with a private registry holding only that language.
    pub fn from_config(config: LanguageConfig) -> Result<Self, TreeSitterError> {
        let name = config.name.clone();
        let registry = Arc::new(LanguageRegistry::new());
        registry.register(config);
        Self::new(registry, &name)
    }

    /// Add capture name → category overrides, consulted before the default mapping.
    ///
    /// A key matches either the full capture name or its first dotted component.
    pub fn with_capture_categories<const N: usize>(
        mut self,
        categories: [(&'static str, SyntaxType); N],
    ) -> Self {
        for (name, category) in categories {
            self.capture_categories.insert(name.to_string(), category);
        }
        self
    }

    /// Limit how deeply injections may nest.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Name of the root language.
    pub fn language_name(&self) -> &str {
        self.root.language.name()
    }

    /// The current root tree.
    pub fn tree(&self) -> Option<&Tree> {
        self.root.tree.as_ref()
    }

    /// Language name and byte range of every injected sublayer, in document order.
    pub fn sublayers(&self) -> Vec<(&str, Range<usize>)> {
        let mut out: Vec<_> = self
            .sublayers
            .iter()
            .map(|s| (s.parsed.language.name(), s.byte_range.clone()))
            .collect();
        out.sort_by_key(|(_, range)| (range.start, range.end));
        out
    }

    fn resolve_sublayers(&mut self, text: &str, invalidated: &mut RangeSet) {
        let mut previous = std::mem::take(&mut self.sublayers);
        let mut pending: VecDeque<(usize, Injection)> = collect_injections(&self.root, text)
            .into_iter()
            .map(|injection| (1, injection))
            .collect();

        while let Some((depth, injection)) = pending.pop_front() {
            if depth > self.max_depth {
                continue;
            }
            let byte_range = injection.byte_range();
            let reused = previous.iter().position(|s| {
                s.depth == depth
                    && s.byte_range == byte_range
                    && s.parsed.language.name() == injection.language
            });

            let fresh = reused.is_none();
            let mut sublayer = match reused {
                Some(idx) => previous.swap_remove(idx),
                None => {
                    let language = match self.registry.language(&injection.language) {
                        Ok(language) => language,
                        Err(err) => {
                            tracing::debug!(target: LOG_TARGET, error = %err, "skipping injection");
                            continue;
                        }
                    };
                    let parsed = match ParsedTree::new(language) {
                        Ok(parsed) => parsed,
                        Err(err) => {
                            tracing::warn!(target: LOG_TARGET, error = %err, "skipping injection");
                            continue;
                        }
                    };
                    invalidated.insert(byte_range.clone());
                    Sublayer {
                        depth,
                        byte_range: byte_range.clone(),
                        parsed,
                    }
                }
            };

            if let Err(err) = sublayer.parsed.parser.set_included_ranges(&injection.ranges) {
                tracing::debug!(target: LOG_TARGET, error = ?err, "invalid injection ranges");
                invalidated.insert(byte_range);
                continue;
            }
            if fresh {
                sublayer.parsed.parse_fresh(text);
            } else {
                for changed in sublayer.parsed.reparse(text) {
                    invalidated.insert(changed);
                }
            }

            if depth < self.max_depth {
                pending.extend(
                    collect_injections(&sublayer.parsed, text)
                        .into_iter()
                        .map(|nested| (depth + 1, nested)),
                );
            }
            self.sublayers.push(sublayer);
        }

        for removed in previous {
            invalidated.insert(removed.byte_range);
        }

        tracing::trace!(
            target: LOG_TARGET,
            sublayers = self.sublayers.len(),
            "resolved injections"
        );
    }
}

impl LanguageLayer for TreeSitterLayer {
    fn apply_edit(&mut self, edit: &EditDescriptor) {
        let input = InputEdit {
            start_byte: edit.start_byte,
            old_end_byte: edit.old_end_byte,
            new_end_byte: edit.new_end_byte,
            start_position: Point::new(edit.start_position.row, edit.start_position.column),
            old_end_position: Point::new(edit.old_end_position.row, edit.old_end_position.column),
            new_end_position: Point::new(edit.new_end_position.row, edit.new_end_position.column),
        };

        if let Some(tree) = self.root.tree.as_mut() {
            tree.edit(&input);
        }

        let pre_edit = edit.pre_edit_range();
        let post_edit = edit.post_edit_range();
        for sublayer in &mut self.sublayers {
            if let Some(tree) = sublayer.parsed.tree.as_mut() {
                tree.edit(&input);
            }
            sublayer.byte_range = map_range(&sublayer.byte_range, &pre_edit, &post_edit);
        }
    }

    fn reparse(&mut self, content: &str, affecting: &RangeSet, resolve_sublayers: bool) -> RangeSet {
        let mut invalidated = affecting.clone();
        for changed in self.root.reparse(content) {
            invalidated.insert(changed);
        }

        if resolve_sublayers {
            self.resolve_sublayers(content, &mut invalidated);
        }

        tracing::trace!(
            target: LOG_TARGET,
            affecting = affecting.len(),
            invalidated = invalidated.len(),
            "reparsed"
        );
        invalidated
    }

    fn captures(&self, range: Range<usize>, text: &str) -> Vec<NamedRange> {
        let mut out = Vec::new();
        collect_captures(&self.root, range.clone(), text, &mut out);
        for sublayer in &self.sublayers {
            if sublayer.byte_range.start <= range.end && range.start <= sublayer.byte_range.end {
                collect_captures(&sublayer.parsed, range.clone(), text, &mut out);
            }
        }
        out
    }

    fn replace_content(&mut self, content: &str) {
        self.root.parse_fresh(content);
        self.sublayers.clear();
        let mut invalidated = RangeSet::new();
        self.resolve_sublayers(content, &mut invalidated);
    }

    fn category_for(&self, capture_name: &str) -> Option<SyntaxType> {
        if let Some(category) = self.capture_categories.get(capture_name) {
            return Some(*category);
        }
        let head = capture_name.split('.').next().unwrap_or(capture_name);
        if let Some(category) = self.capture_categories.get(head) {
            return Some(*category);
        }
        SyntaxType::from_capture_name(capture_name)
    }
}

fn collect_captures(parsed: &ParsedTree, range: Range<usize>, text: &str, out: &mut Vec<NamedRange>) {
    let Some(tree) = parsed.tree.as_ref() else {
        return;
    };
    let query = parsed.language.highlights();
    let names = query.capture_names();

    let mut cursor = QueryCursor::new();
    cursor.set_byte_range(range);
    let mut matches = cursor.matches(query, tree.root_node(), text.as_bytes());
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let Some(name) = names.get(capture.index as usize) else {
                continue;
            };
            let node_range = capture.node.byte_range();
            if node_range.is_empty() {
                continue;
            }
            out.push(NamedRange::new(*name, node_range));
        }
    }
}

fn collect_injections(parsed: &ParsedTree, text: &str) -> Vec<Injection> {
    let Some(query) = parsed.language.injections() else {
        return Vec::new();
    };
    let Some(tree) = parsed.tree.as_ref() else {
        return Vec::new();
    };
    let content_capture = parsed.language.injection_content_capture();
    let language_capture = parsed.language.injection_language_capture();

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root_node(), text.as_bytes());
    let mut out = Vec::new();
    while let Some(m) = matches.next() {
        let mut language = None;
        let mut ranges = Vec::new();
        for capture in m.captures {
            if Some(capture.index) == language_capture {
                language = capture
                    .node
                    .utf8_text(text.as_bytes())
                    .ok()
                    .map(|s| s.trim().to_string());
            } else if Some(capture.index) == content_capture {
                ranges.push(capture.node.range());
            }
        }

        if language.is_none() {
            language = query
                .property_settings(m.pattern_index)
                .iter()
                .find(|p| &*p.key == "injection.language")
                .and_then(|p| p.value.as_deref())
                .map(str::to_string);
        }

        let Some(language) = language else {
            continue;
        };
        if ranges.is_empty() {
            continue;
        }
        ranges.sort_by_key(|r| r.start_byte);
        ranges.dedup_by_key(|r| r.start_byte);
        out.push(Injection { language, ranges });
    }
    out
}
