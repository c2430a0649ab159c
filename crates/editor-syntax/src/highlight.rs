//! Syntax categories and highlight span extraction.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// The closed set of semantic categories a highlight can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SyntaxType {
    /// Language keywords.
    Keywords,
    /// Commands / function-like builtins.
    Commands,
    /// Type names.
    Types,
    /// Attributes and annotations.
    Attributes,
    /// Variables and identifiers.
    Variables,
    /// Constant values (`true`, `nil`, ...).
    Values,
    /// Numeric literals.
    Numbers,
    /// String literals.
    Strings,
    /// Character literals.
    Characters,
    /// Comments.
    Comments,
}

impl SyntaxType {
    /// Every category, in display-priority order.
    pub const ALL: [SyntaxType; 10] = [
        SyntaxType::Keywords,
        SyntaxType::Commands,
        SyntaxType::Types,
        SyntaxType::Attributes,
        SyntaxType::Variables,
        SyntaxType::Values,
        SyntaxType::Numbers,
        SyntaxType::Strings,
        SyntaxType::Characters,
        SyntaxType::Comments,
    ];

    /// The canonical (plural) name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keywords => "keywords",
            Self::Commands => "commands",
            Self::Types => "types",
            Self::Attributes => "attributes",
            Self::Variables => "variables",
            Self::Values => "values",
            Self::Numbers => "numbers",
            Self::Strings => "strings",
            Self::Characters => "characters",
            Self::Comments => "comments",
        }
    }

    /// Look up a category by its canonical name or singular alias.
    ///
    /// The singular forms are accepted on purpose: tree-sitter queries conventionally capture
    /// `@keyword` and `@string`.
    pub fn from_name(name: &str) -> Option<Self> {
        let category = match name {
            "keywords" | "keyword" => Self::Keywords,
            "commands" | "command" => Self::Commands,
            "types" | "type" => Self::Types,
            "attributes" | "attribute" => Self::Attributes,
            "variables" | "variable" => Self::Variables,
            "values" | "value" => Self::Values,
            "numbers" | "number" => Self::Numbers,
            "strings" | "string" => Self::Strings,
            "characters" | "character" => Self::Characters,
            "comments" | "comment" => Self::Comments,
            _ => return None,
        };
        Some(category)
    }

    /// Map a dotted capture name (`"string.special"`) by its first component.
    pub fn from_capture_name(capture_name: &str) -> Option<Self> {
        let head = capture_name.split('.').next().unwrap_or(capture_name);
        Self::from_name(head)
    }
}

impl fmt::Display for SyntaxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown syntax category: {0}")]
pub struct UnknownSyntaxType(pub String);

impl FromStr for SyntaxType {
    type Err = UnknownSyntaxType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownSyntaxType(s.to_string()))
    }
}

/// A raw capture produced by a language layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRange {
    /// Dotted capture name, e.g. `"keyword"` or `"string.special"`.
    pub name: String,
    /// Byte range of the capture.
    pub range: Range<usize>,
}

impl NamedRange {
    /// Create a capture.
    pub fn new(name: impl Into<String>, range: Range<usize>) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }
}

/// A categorized span ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Semantic category.
    pub category: SyntaxType,
    /// Byte range.
    pub range: Range<usize>,
}

impl HighlightSpan {
    /// Create a span.
    pub fn new(category: SyntaxType, range: Range<usize>) -> Self {
        Self { category, range }
    }
}

/// The outcome of one highlight pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightResult {
    /// Spans inside `update_range`, sorted by start then length.
    pub highlights: Vec<HighlightSpan>,
    /// The region whose rendering must be refreshed. May exceed the requested range.
    pub update_range: Range<usize>,
}

/// Turn raw captures into sorted highlight spans.
///
/// `category_for` receives the full capture name. Captures it does not map, and empty captures,
/// are dropped. The sort is stable on `(start, len)`; overlapping spans are all kept.
pub fn extract_highlights<I, F>(captures: I, category_for: F) -> Vec<HighlightSpan>
where
    I: IntoIterator<Item = NamedRange>,
    F: Fn(&str) -> Option<SyntaxType>,
{
    let mut spans: Vec<HighlightSpan> = captures
        .into_iter()
        .filter(|capture| !capture.range.is_empty())
        .filter_map(|capture| {
            category_for(&capture.name).map(|category| HighlightSpan::new(category, capture.range))
        })
        .collect();

    spans.sort_by_key(|span| (span.range.start, span.range.len()));
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_aliases() {
        for category in SyntaxType::ALL {
            assert_eq!(SyntaxType::from_name(category.as_str()), Some(category));
            assert_eq!(category.as_str().parse::<SyntaxType>(), Ok(category));
        }
        assert_eq!(SyntaxType::from_name("keyword"), Some(SyntaxType::Keywords));
        assert_eq!(SyntaxType::from_name("type"), Some(SyntaxType::Types));
        assert_eq!(SyntaxType::from_name("punctuation"), None);
        assert!("bogus".parse::<SyntaxType>().is_err());
    }

    #[test]
    fn test_capture_name_uses_first_component() {
        assert_eq!(
            SyntaxType::from_capture_name("string.special.path"),
            Some(SyntaxType::Strings)
        );
        assert_eq!(
            SyntaxType::from_capture_name("comment.documentation"),
            Some(SyntaxType::Comments)
        );
        assert_eq!(SyntaxType::from_capture_name("injection.content"), None);
        assert_eq!(SyntaxType::from_capture_name("keywordx"), None);
    }

    #[test]
    fn test_extract_drops_unknown_and_empty() {
        let captures = vec![
            NamedRange::new("punctuation.bracket", 0..1),
            NamedRange::new("keyword", 4..4),
            NamedRange::new("keyword", 1..3),
        ];
        let spans = extract_highlights(captures, SyntaxType::from_capture_name);
        assert_eq!(spans, vec![HighlightSpan::new(SyntaxType::Keywords, 1..3)]);
    }

    #[test]
    fn test_extract_sorts_by_start_then_length() {
        let captures = vec![
            NamedRange::new("string", 10..20),
            NamedRange::new("comment", 0..30),
            NamedRange::new("variable", 10..12),
            NamedRange::new("type", 0..4),
        ];
        let spans = extract_highlights(captures, SyntaxType::from_capture_name);
        let ranges: Vec<_> = spans.iter().map(|span| span.range.clone()).collect();
        assert_eq!(ranges, vec![0..4, 0..30, 10..12, 10..20]);
    }

    #[test]
    fn test_extract_keeps_duplicates_in_input_order() {
        let captures = vec![
            NamedRange::new("variable", 2..5),
            NamedRange::new("type", 2..5),
            NamedRange::new("variable", 2..5),
        ];
        let spans = extract_highlights(captures, SyntaxType::from_capture_name);
        assert_eq!(
            spans,
            vec![
                HighlightSpan::new(SyntaxType::Variables, 2..5),
                HighlightSpan::new(SyntaxType::Types, 2..5),
                HighlightSpan::new(SyntaxType::Variables, 2..5),
            ]
        );
    }
}
