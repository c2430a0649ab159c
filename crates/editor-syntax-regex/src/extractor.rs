//! Compiled highlight rules.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

use crate::definition::HighlightRule;
use crate::error::RegexSyntaxError;

/// A compiled rule that finds highlight ranges inside a window of the text.
#[derive(Debug, Clone)]
pub(crate) enum Extractor {
    /// Every match of a pattern, or of one capture group of it.
    Pattern {
        regex: Regex,
        group: Option<usize>,
        spans_lines: bool,
    },
    /// From a begin match to the next end match.
    BeginEnd {
        begin: Regex,
        end: Regex,
        multiline: bool,
        /// Skip delimiters preceded by an odd number of backslashes.
        escapable: bool,
    },
}

impl Extractor {
    /// Compile a non-word rule. Plain words are grouped by [`word_pattern`] instead.
    pub(crate) fn from_rule(rule: &HighlightRule) -> Result<Option<Self>, RegexSyntaxError> {
        if rule.begin_string.is_empty() {
            return Ok(None);
        }
        let end = rule.end_string.as_deref().filter(|end| !end.is_empty());

        let extractor = match (rule.regular_expression, end) {
            (true, Some(end)) => Self::BeginEnd {
                begin: build_regex(&rule.begin_string, rule.ignore_case, false)?,
                end: build_regex(end, rule.ignore_case, false)?,
                multiline: rule.is_multiline,
                escapable: false,
            },
            (true, None) => Self::Pattern {
                regex: build_regex(&rule.begin_string, rule.ignore_case, rule.is_multiline)?,
                group: None,
                spans_lines: rule.is_multiline,
            },
            (false, Some(end)) => Self::BeginEnd {
                begin: build_regex(&regex::escape(&rule.begin_string), rule.ignore_case, false)?,
                end: build_regex(&regex::escape(end), rule.ignore_case, false)?,
                multiline: rule.is_multiline,
                escapable: true,
            },
            (false, None) => return Ok(None),
        };
        Ok(Some(extractor))
    }

    /// Plain words of one category, matched as whole words.
    pub(crate) fn words(words: &[&str], ignore_case: bool) -> Result<Option<Self>, RegexSyntaxError> {
        let Some(pattern) = word_pattern(words) else {
            return Ok(None);
        };
        Ok(Some(Self::Pattern {
            regex: build_regex(&pattern, ignore_case, false)?,
            group: None,
            spans_lines: false,
        }))
    }

    /// Whether a match may cross a line terminator.
    pub(crate) fn spans_lines(&self) -> bool {
        match self {
            Self::Pattern { spans_lines, .. } => *spans_lines,
            Self::BeginEnd { multiline, .. } => *multiline,
        }
    }

    /// Non-empty ranges found in `window`, which must start and end on char boundaries.
    pub(crate) fn ranges(&self, text: &str, window: Range<usize>) -> Vec<Range<usize>> {
        let window = window.start.min(text.len())..window.end.min(text.len());
        match self {
            Self::Pattern { regex, group, .. } => {
                let haystack = &text[..window.end];
                match group {
                    Some(group) => regex
                        .captures_iter(&haystack[window.start..])
                        .filter_map(|caps| caps.get(*group))
                        .map(|m| window.start + m.start()..window.start + m.end())
                        .filter(|r| !r.is_empty())
                        .collect(),
                    None => regex
                        .find_iter(&haystack[window.start..])
                        .map(|m| window.start + m.start()..window.start + m.end())
                        .filter(|r| !r.is_empty())
                        .collect(),
                }
            }
            Self::BeginEnd {
                begin,
                end,
                multiline,
                escapable,
            } => begin_end_ranges(text, window, begin, end, *multiline, *escapable),
        }
    }
}

fn begin_end_ranges(
    text: &str,
    window: Range<usize>,
    begin: &Regex,
    end: &Regex,
    multiline: bool,
    escapable: bool,
) -> Vec<Range<usize>> {
    let haystack = &text[..window.end];
    let mut out = Vec::new();
    let mut at = window.start;

    while at < window.end {
        let Some(open) = begin.find_at(haystack, at) else {
            break;
        };
        let search_from = if open.is_empty() {
            step(text, open.end())
        } else {
            open.end()
        };
        if escapable && is_escaped(text, open.start()) {
            at = search_from;
            continue;
        }

        let upper = if multiline {
            window.end
        } else {
            line_content_end(text, open.end()).min(window.end)
        };
        if search_from > upper {
            at = search_from;
            continue;
        }

        let mut from = search_from;
        let close = loop {
            match end.find_at(&text[..upper], from) {
                Some(m) if escapable && !m.is_empty() && is_escaped(text, m.start()) => from = m.end(),
                found => break found,
            }
        };

        match close {
            Some(close) => {
                out.push(open.start()..close.end());
                at = close.end().max(search_from);
            }
            None => at = search_from,
        }
    }
    out
}

/// Alternation of `words` as one pattern, longest first, with word boundaries where a word
/// starts or ends with a word character.
pub(crate) fn word_pattern(words: &[&str]) -> Option<String> {
    let mut words: Vec<&str> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return None;
    }
    words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    words.dedup();

    let alternatives: Vec<String> = words
        .iter()
        .map(|word| {
            let lead = if word.chars().next().is_some_and(is_word_char) {
                r"\b"
            } else {
                ""
            };
            let trail = if word.chars().next_back().is_some_and(is_word_char) {
                r"\b"
            } else {
                ""
            };
            format!("{lead}{}{trail}", regex::escape(word))
        })
        .collect();
    Some(format!("(?:{})", alternatives.join("|")))
}

/// Compile with `^`/`$` matching at `\n`, `\r\n` and `\r` line boundaries.
pub(crate) fn build_regex(
    pattern: &str,
    ignore_case: bool,
    dot_matches_new_line: bool,
) -> Result<Regex, RegexSyntaxError> {
    RegexBuilder::new(pattern)
        .multi_line(true)
        .crlf(true)
        .case_insensitive(ignore_case)
        .dot_matches_new_line(dot_matches_new_line)
        .build()
        .map_err(|source| RegexSyntaxError::Regex {
            pattern: pattern.to_string(),
            source,
        })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether the byte at `at` follows an odd run of backslashes.
pub(crate) fn is_escaped(text: &str, at: usize) -> bool {
    let backslashes = text.as_bytes()[..at]
        .iter()
        .rev()
        .take_while(|b| **b == b'\\')
        .count();
    backslashes % 2 == 1
}

/// Offset of the first line terminator at or after `from`, or the end of `text`.
pub(crate) fn line_content_end(text: &str, from: usize) -> usize {
    text.as_bytes()[from..]
        .iter()
        .position(|b| matches!(b, b'\n' | b'\r'))
        .map_or(text.len(), |p| from + p)
}

/// The next char boundary after `at`.
fn step(text: &str, at: usize) -> usize {
    text.get(at..)
        .and_then(|rest| rest.chars().next())
        .map_or(at + 1, |c| at + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ranges_in(extractor: &Extractor, text: &str) -> Vec<Range<usize>> {
        extractor.ranges(text, 0..text.len())
    }

    #[test]
    fn test_word_pattern_prefers_longer_words() {
        let extractor = Extractor::words(&["in", "int", "in"], false).unwrap().unwrap();
        assert_eq!(ranges_in(&extractor, "int in inside"), vec![0..3, 4..6]);
    }

    #[test]
    fn test_word_pattern_with_symbols() {
        let pattern = word_pattern(&["@end", "->"]).unwrap();
        assert_eq!(pattern, r"(?:@end\b|\->)");

        let extractor = Extractor::words(&["@end", "->"], false).unwrap().unwrap();
        assert_eq!(ranges_in(&extractor, "a->b @ending @end"), vec![1..3, 13..17]);
    }

    #[test]
    fn test_word_ignore_case() {
        let extractor = Extractor::words(&["select"], true).unwrap().unwrap();
        assert_eq!(ranges_in(&extractor, "SELECT x; Select"), vec![0..6, 10..16]);
    }

    #[test]
    fn test_begin_end_string_single_line() {
        let rule = HighlightRule {
            begin_string: "\"".into(),
            end_string: Some("\"".into()),
            ..HighlightRule::default()
        };
        let extractor = Extractor::from_rule(&rule).unwrap().unwrap();
        let text = "a \"b\\\"c\" d \"open\nclosed\"";
        assert_eq!(ranges_in(&extractor, text), vec![2..8]);
    }

    #[test]
    fn test_begin_end_string_multiline() {
        let rule = HighlightRule {
            begin_string: "<!--".into(),
            end_string: Some("-->".into()),
            is_multiline: true,
            ..HighlightRule::default()
        };
        let extractor = Extractor::from_rule(&rule).unwrap().unwrap();
        assert!(extractor.spans_lines());
        assert_eq!(ranges_in(&extractor, "x <!-- a\nb --> y"), vec![2..14]);
    }

    #[test]
    fn test_begin_end_regex() {
        let rule = HighlightRule {
            begin_string: r"\bbegin\b".into(),
            end_string: Some(r"\bend\b".into()),
            regular_expression: true,
            ..HighlightRule::default()
        };
        let extractor = Extractor::from_rule(&rule).unwrap().unwrap();
        assert_eq!(
            ranges_in(&extractor, "begin x end\nbegin\nend"),
            vec![0..11]
        );
    }

    #[test]
    fn test_zero_width_begin_makes_progress() {
        let rule = HighlightRule {
            begin_string: "^".into(),
            end_string: Some("$".into()),
            regular_expression: true,
            ..HighlightRule::default()
        };
        let extractor = Extractor::from_rule(&rule).unwrap().unwrap();
        assert_eq!(ranges_in(&extractor, "ab\ncd"), vec![0..2, 3..5]);
    }

    #[test]
    fn test_window_is_respected() {
        let extractor = Extractor::words(&["foo"], false).unwrap().unwrap();
        let text = "foo\nfoo\nfoo";
        assert_eq!(extractor.ranges(text, 4..8), vec![4..7]);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Extractor::from_rule(&HighlightRule::pattern("(")).unwrap_err();
        assert!(matches!(err, RegexSyntaxError::Regex { pattern, .. } if pattern == "("));
    }
}
