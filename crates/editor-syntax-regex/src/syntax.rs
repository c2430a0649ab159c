//! A compiled syntax definition.

use std::ops::Range;

use editor_syntax::{NamedRange, SyntaxType};

use crate::definition::{SyntaxDefinition, SyntaxKind};
use crate::error::RegexSyntaxError;
use crate::extractor::Extractor;
use crate::nestable::{NestableToken, Nestables};
use crate::outline::{OutlineExtractor, OutlineItem};

const LOG_TARGET: &str = "editor_syntax_regex::syntax";

/// Highlight extractors and outline rules compiled from a [`SyntaxDefinition`].
#[derive(Debug, Clone, Default)]
pub struct RegexSyntax {
    kind: SyntaxKind,
    extractors: Vec<(SyntaxType, Extractor)>,
    nestables: Nestables,
    outlines: Vec<OutlineExtractor>,
    spans_lines: bool,
}

impl RegexSyntax {
    /// A syntax without any rule.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile every rule of `definition`.
    ///
    /// Plain words of a category are merged into one whole-word pattern per case mode. Symbol
    /// delimited rules such as quotes join the comment delimiters in one shared sweep; the first
    /// category to claim a delimiter pair keeps it, and comment delimiters override any category.
    pub fn compile(definition: &SyntaxDefinition) -> Result<Self, RegexSyntaxError> {
        let mut extractors = Vec::new();
        let mut nestables = Nestables::default();

        for (name, rules) in &definition.highlights {
            let category = SyntaxType::from_name(name)
                .ok_or_else(|| RegexSyntaxError::UnknownCategory(name.clone()))?;

            let mut words = Vec::new();
            let mut caseless_words = Vec::new();
            for rule in rules {
                if let Some(token) = NestableToken::from_rule(rule)
                    && nestables.insert(token, category, false)
                {
                    continue;
                }
                if rule.is_word() {
                    if rule.ignore_case {
                        caseless_words.push(rule.begin_string.as_str());
                    } else {
                        words.push(rule.begin_string.as_str());
                    }
                } else if let Some(extractor) = Extractor::from_rule(rule)? {
                    extractors.push((category, extractor));
                }
            }
            for (words, ignore_case) in [(words, false), (caseless_words, true)] {
                if let Some(extractor) = Extractor::words(&words, ignore_case)? {
                    extractors.push((category, extractor));
                }
            }
        }

        let delimiters = &definition.comment_delimiters;
        for comment in &delimiters.blocks {
            if let Some(token) = NestableToken::block_comment(comment) {
                nestables.insert(token, SyntaxType::Comments, true);
            }
        }
        for comment in &delimiters.inlines {
            if let Some(token) = NestableToken::inline_comment(comment)? {
                nestables.insert(token, SyntaxType::Comments, true);
            }
        }

        let outlines = definition
            .outlines
            .iter()
            .filter(|rule| !rule.begin_string.is_empty())
            .map(OutlineExtractor::compile)
            .collect::<Result<Vec<_>, _>>()?;

        let spans_lines =
            extractors.iter().any(|(_, e)| e.spans_lines()) || nestables.spans_lines();
        tracing::debug!(
            target: LOG_TARGET,
            extractors = extractors.len(),
            nestables = nestables.len(),
            outlines = outlines.len(),
            spans_lines,
            "compiled syntax definition"
        );

        Ok(Self {
            kind: definition.kind,
            extractors,
            nestables,
            outlines,
            spans_lines,
        })
    }

    /// Kind declared by the definition.
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// Returns `true` if there is no highlight rule.
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty() && self.nestables.is_empty()
    }

    /// Whether some highlight rule can match across lines.
    pub fn has_multiline_rules(&self) -> bool {
        self.spans_lines
    }

    /// The region that must be rescanned to cover every match overlapping `range`.
    ///
    /// Whole lines, or everything from the start of the text when a rule can span lines.
    pub fn scan_window(&self, text: &str, range: Range<usize>) -> Range<usize> {
        if self.spans_lines {
            return 0..text.len();
        }
        line_bounds(text, range)
    }

    /// Category-named matches overlapping `range`.
    pub fn highlight(&self, text: &str, range: Range<usize>) -> Vec<NamedRange> {
        let window = self.scan_window(text, range.clone());
        let mut out = Vec::new();
        for (category, extractor) in &self.extractors {
            for found in extractor.ranges(text, window.clone()) {
                if overlaps(&found, &range) {
                    out.push(NamedRange::new(category.as_str(), found));
                }
            }
        }
        for (category, found) in self.nestables.ranges(text, window) {
            if overlaps(&found, &range) {
                out.push(NamedRange::new(category.as_str(), found));
            }
        }
        out
    }

    /// Outline items of the whole `text`, sorted by position.
    pub fn outline(&self, text: &str) -> Vec<OutlineItem> {
        let mut items: Vec<OutlineItem> = self
            .outlines
            .iter()
            .flat_map(|extractor| extractor.items(text))
            .collect();
        items.sort_by_key(|item| (item.range.start, item.range.end));
        items
    }
}

/// Expand `range` to the enclosing lines, terminators included.
pub(crate) fn line_bounds(text: &str, range: Range<usize>) -> Range<usize> {
    let bytes = text.as_bytes();
    let end = range.end.min(bytes.len());
    let start = range.start.min(end);

    let line_start = bytes[..start]
        .iter()
        .rposition(|b| matches!(b, b'\n' | b'\r'))
        .map_or(0, |p| p + 1);
    let line_end = match bytes[end..].iter().position(|b| matches!(b, b'\n' | b'\r')) {
        Some(p) => {
            let terminator = end + p;
            if bytes[terminator] == b'\r' && bytes.get(terminator + 1) == Some(&b'\n') {
                terminator + 2
            } else {
                terminator + 1
            }
        }
        None => bytes.len(),
    };
    line_start..line_end
}

fn overlaps(found: &Range<usize>, range: &Range<usize>) -> bool {
    if range.is_empty() {
        found.start <= range.start && range.start < found.end
    } else {
        found.start < range.end && range.start < found.end
    }
}
