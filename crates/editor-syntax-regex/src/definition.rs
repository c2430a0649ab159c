//! Serde model of a YAML syntax definition.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::RegexSyntaxError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A regex-based syntax definition.
///
/// ```yaml
/// kind: code
/// highlights:
///   keywords:
///     - beginString: fn
///     - beginString: "\\bimpl\\b"
///       regularExpression: true
///   strings:
///     - beginString: "\""
///       endString: "\""
/// outlines:
///   - beginString: "^fn (\\w+)"
///     keyString: "$1"
///     kind: function
/// commentDelimiters:
///   inlines:
///     - begin: "//"
///   blocks:
///     - begin: "/*"
///       end: "*/"
/// ```
pub struct SyntaxDefinition {
    #[serde(default)]
    /// Whether this is a programming language or a general text format.
    pub kind: SyntaxKind,

    #[serde(default)]
    /// Highlight rules keyed by category name (`keywords`, `types`, ...).
    pub highlights: BTreeMap<String, Vec<HighlightRule>>,

    #[serde(default)]
    /// Outline (structure) rules.
    pub outlines: Vec<OutlineRule>,

    #[serde(default)]
    /// Comment delimiters, highlighted as comments.
    pub comment_delimiters: CommentDelimiters,
}

impl SyntaxDefinition {
    /// Parse a definition from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RegexSyntaxError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Returns `true` if the definition has no highlight, comment or outline rules.
    pub fn is_empty(&self) -> bool {
        self.highlights.values().all(Vec::is_empty)
            && self.outlines.is_empty()
            && self.comment_delimiters.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Broad kind of a syntax.
pub enum SyntaxKind {
    /// Prose or markup.
    #[default]
    General,
    /// A programming language.
    Code,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One highlight rule.
///
/// Without `endString` and `regularExpression` the rule is a plain word.
pub struct HighlightRule {
    #[serde(default)]
    /// The word, the begin string, or the (begin) pattern.
    pub begin_string: String,

    #[serde(default)]
    /// End string or pattern of a delimited rule.
    pub end_string: Option<String>,

    #[serde(default)]
    /// Treat `beginString`/`endString` as regular expressions.
    pub regular_expression: bool,

    #[serde(default)]
    /// Match case-insensitively.
    pub ignore_case: bool,

    #[serde(default)]
    /// Allow the match to span lines.
    pub is_multiline: bool,

    #[serde(default)]
    /// Free-form note.
    pub description: Option<String>,
}

impl HighlightRule {
    /// A plain word rule.
    pub fn word(word: impl Into<String>) -> Self {
        Self {
            begin_string: word.into(),
            ..Self::default()
        }
    }

    /// A regular-expression rule.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            begin_string: pattern.into(),
            regular_expression: true,
            ..Self::default()
        }
    }

    pub(crate) fn is_word(&self) -> bool {
        !self.regular_expression && self.end_string.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One outline rule.
pub struct OutlineRule {
    #[serde(default)]
    /// Pattern matched against the document.
    pub begin_string: String,

    #[serde(default)]
    /// Title template (`$1`, `${name}`, `$LN`); empty means the matched text.
    pub key_string: String,

    #[serde(default)]
    /// Match case-insensitively.
    pub ignore_case: bool,

    #[serde(default)]
    /// Kind of the produced items.
    pub kind: Option<OutlineKind>,

    #[serde(default)]
    /// Free-form note.
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Kind of an outline item.
pub enum OutlineKind {
    /// Class, module, section container.
    Container,
    /// Function or method.
    Function,
    /// Constant or variable.
    Value,
    /// Document heading.
    Heading,
    /// Bookmark-like mark comment.
    Mark,
    /// Link or reference.
    Reference,
    /// Visual separator; the template is used verbatim as the title.
    Separator,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
/// Inline and block comment delimiters.
pub struct CommentDelimiters {
    #[serde(default)]
    /// Comments running to the end of the line.
    pub inlines: Vec<InlineComment>,

    #[serde(default)]
    /// Comments between a begin and an end delimiter, possibly spanning lines.
    pub blocks: Vec<BlockComment>,
}

impl CommentDelimiters {
    /// Returns `true` if no delimiter is defined.
    pub fn is_empty(&self) -> bool {
        self.inlines.is_empty() && self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
/// An inline comment delimiter such as `//` or `#`.
pub struct InlineComment {
    /// Delimiter text.
    pub begin: String,

    #[serde(default)]
    /// Only recognise the delimiter at the start of a line (after indentation).
    pub leading_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
/// A block comment delimiter pair such as `/*` `*/`.
pub struct BlockComment {
    /// Opening delimiter.
    pub begin: String,
    /// Closing delimiter.
    pub end: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_definition() {
        let yaml = r##"
kind: code
highlights:
  keywords:
    - beginString: let
    - beginString: "\\bfn\\b"
      regularExpression: true
  strings:
    - beginString: '"'
      endString: '"'
      isMultiline: true
outlines:
  - beginString: "^fn (\\w+)"
    keyString: "$1"
    kind: function
commentDelimiters:
  inlines:
    - begin: "#"
      leadingOnly: true
  blocks:
    - begin: "/*"
      end: "*/"
"##;
        let definition = SyntaxDefinition::from_yaml_str(yaml).unwrap();

        assert_eq!(definition.kind, SyntaxKind::Code);
        assert_eq!(
            definition.highlights["keywords"],
            vec![HighlightRule::word("let"), HighlightRule::pattern("\\bfn\\b")]
        );
        let string = &definition.highlights["strings"][0];
        assert_eq!(string.end_string.as_deref(), Some("\""));
        assert!(string.is_multiline);
        assert_eq!(definition.outlines[0].key_string, "$1");
        assert_eq!(definition.outlines[0].kind, Some(OutlineKind::Function));
        assert!(definition.comment_delimiters.inlines[0].leading_only);
        assert_eq!(definition.comment_delimiters.blocks[0].end, "*/");
        assert!(!definition.is_empty());
    }

    #[test]
    fn test_empty_definition() {
        let definition = SyntaxDefinition::from_yaml_str("{}").unwrap();
        assert!(definition.is_empty());
        assert_eq!(definition.kind, SyntaxKind::General);
    }

    #[test]
    fn test_invalid_yaml() {
        let err = SyntaxDefinition::from_yaml_str("highlights: [").unwrap_err();
        assert!(matches!(err, RegexSyntaxError::Yaml(_)));
    }
}
