//! Quotes and comments resolved together in one left-to-right sweep.
//!
//! A delimiter that falls inside an earlier string or comment does not open a region of its
//! own, so `"http://x"` stays a string and `// don't` stays a comment.

use std::ops::Range;

use editor_syntax::SyntaxType;
use regex::Regex;

use crate::definition::{BlockComment, HighlightRule, InlineComment};
use crate::error::RegexSyntaxError;
use crate::extractor::{build_regex, is_escaped, line_content_end};

/// A delimiter token taking part in the sweep.
#[derive(Debug, Clone)]
pub(crate) enum NestableToken {
    /// Runs from the delimiter to the end of its line.
    Inline {
        delimiter: String,
        /// Set when only a delimiter at the start of a line, after blanks, counts.
        leading: Option<Regex>,
    },
    /// A begin/end pair. Distinct delimiters nest.
    Pair {
        begin: String,
        end: String,
        multiline: bool,
    },
}

impl NestableToken {
    /// A symbol-only, non-regex begin/end rule. Other rules are compiled as plain extractors.
    pub(crate) fn from_rule(rule: &HighlightRule) -> Option<Self> {
        if rule.regular_expression || rule.begin_string.is_empty() {
            return None;
        }
        let end = rule.end_string.as_deref().filter(|end| !end.is_empty())?;
        let is_symbol = |s: &str| !s.chars().any(char::is_alphanumeric);
        if !is_symbol(&rule.begin_string) || !is_symbol(end) {
            return None;
        }
        Some(Self::Pair {
            begin: rule.begin_string.clone(),
            end: end.to_string(),
            multiline: rule.is_multiline,
        })
    }

    pub(crate) fn inline_comment(comment: &InlineComment) -> Result<Option<Self>, RegexSyntaxError> {
        if comment.begin.is_empty() {
            return Ok(None);
        }
        let leading = if comment.leading_only {
            let pattern = format!(r"^[ \t]*({})", regex::escape(&comment.begin));
            Some(build_regex(&pattern, false, false)?)
        } else {
            None
        };
        Ok(Some(Self::Inline {
            delimiter: comment.begin.clone(),
            leading,
        }))
    }

    pub(crate) fn block_comment(comment: &BlockComment) -> Option<Self> {
        if comment.begin.is_empty() || comment.end.is_empty() {
            return None;
        }
        Some(Self::Pair {
            begin: comment.begin.clone(),
            end: comment.end.clone(),
            multiline: true,
        })
    }

    pub(crate) fn spans_lines(&self) -> bool {
        matches!(self, Self::Pair { multiline: true, .. })
    }

    /// Tokens are told apart by their delimiters alone.
    pub(crate) fn same_delimiters(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Inline { delimiter: a, leading: la },
                Self::Inline { delimiter: b, leading: lb },
            ) => a == b && la.is_some() == lb.is_some(),
            (Self::Pair { begin: ab, end: ae, .. }, Self::Pair { begin: bb, end: be, .. }) => {
                ab == bb && ae == be
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Begin,
    End,
    Both,
}

impl Role {
    fn opens(self) -> bool {
        matches!(self, Self::Begin | Self::Both)
    }

    fn closes(self) -> bool {
        matches!(self, Self::End | Self::Both)
    }
}

#[derive(Debug, Clone)]
struct Position {
    token: usize,
    role: Role,
    range: Range<usize>,
}

/// Every nestable token of a syntax with the category it highlights.
#[derive(Debug, Clone, Default)]
pub(crate) struct Nestables {
    tokens: Vec<(NestableToken, SyntaxType)>,
}

impl Nestables {
    /// Register `token`. A token already present keeps its first category unless `replace`.
    pub(crate) fn insert(&mut self, token: NestableToken, category: SyntaxType, replace: bool) -> bool {
        match self.tokens.iter_mut().find(|(t, _)| t.same_delimiters(&token)) {
            Some(existing) if replace => {
                *existing = (token, category);
                true
            }
            Some(_) => false,
            None => {
                self.tokens.push((token, category));
                true
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tokens.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub(crate) fn spans_lines(&self) -> bool {
        self.tokens.iter().any(|(token, _)| token.spans_lines())
    }

    /// Regions found in `window`, which must start at a line start and end on a char boundary.
    pub(crate) fn ranges(&self, text: &str, window: Range<usize>) -> Vec<(SyntaxType, Range<usize>)> {
        let window = window.start.min(text.len())..window.end.min(text.len());
        let positions = self.positions(text, window.clone());

        let mut out = Vec::new();
        let mut seek = window.start;
        let mut index = 0;
        while index < positions.len() {
            let open = &positions[index];
            index += 1;
            if !open.role.opens() || open.range.start < seek {
                continue;
            }

            let Some(close) = self.find_close(text, &window, &positions, index, open) else {
                continue;
            };
            let range = open.range.start..positions[close].range.end;
            out.push((self.tokens[open.token].1, range.clone()));
            seek = range.end;
            index = close;
        }
        out
    }

    fn find_close(
        &self,
        text: &str,
        window: &Range<usize>,
        positions: &[Position],
        from: usize,
        open: &Position,
    ) -> Option<usize> {
        let upper = if self.tokens[open.token].0.spans_lines() {
            window.end
        } else {
            line_content_end(text, open.range.end).min(window.end)
        };

        let mut depth = 0usize;
        for (offset, position) in positions[from..].iter().enumerate() {
            if position.token != open.token {
                continue;
            }
            if position.range.start > upper {
                return None;
            }
            if position.role.closes() {
                if depth == 0 {
                    return Some(from + offset);
                }
                depth -= 1;
            } else {
                depth += 1;
            }
        }
        None
    }

    /// Delimiter occurrences in `window`, unescaped, ordered by start then longest first.
    fn positions(&self, text: &str, window: Range<usize>) -> Vec<Position> {
        let haystack = &text[window.clone()];
        let found = |needle: &str| {
            haystack
                .match_indices(needle)
                .map(|(at, m)| window.start + at..window.start + at + m.len())
                .collect::<Vec<_>>()
        };

        let mut positions = Vec::new();
        for (token, (kind, _)) in self.tokens.iter().enumerate() {
            match kind {
                NestableToken::Inline { delimiter, leading } => {
                    let opens = match leading {
                        Some(regex) => regex
                            .captures_iter(haystack)
                            .filter_map(|caps| caps.get(1))
                            .map(|m| window.start + m.start()..window.start + m.end())
                            .collect(),
                        None => found(delimiter),
                    };
                    for range in opens {
                        if !stands_alone(text, &range) {
                            continue;
                        }
                        let line_end = line_content_end(text, range.end);
                        positions.push(Position {
                            token,
                            role: Role::Begin,
                            range,
                        });
                        positions.push(Position {
                            token,
                            role: Role::End,
                            range: line_end..line_end,
                        });
                    }
                }
                NestableToken::Pair { begin, end, .. } if begin == end => {
                    positions.extend(found(begin).into_iter().map(|range| Position {
                        token,
                        role: Role::Both,
                        range,
                    }));
                }
                NestableToken::Pair { begin, end, .. } => {
                    positions.extend(found(begin).into_iter().map(|range| Position {
                        token,
                        role: Role::Begin,
                        range,
                    }));
                    positions.extend(found(end).into_iter().map(|range| Position {
                        token,
                        role: Role::End,
                        range,
                    }));
                }
            }
        }

        positions.retain(|p| p.range.is_empty() || !is_escaped(text, p.range.start));
        positions.sort_by(|a, b| {
            a.range
                .start
                .cmp(&b.range.start)
                .then_with(|| b.range.len().cmp(&a.range.len()))
        });
        positions
    }
}

/// A one-character inline delimiter right after a non-blank character is not a comment.
fn stands_alone(text: &str, range: &Range<usize>) -> bool {
    range.len() > 1
        || text[..range.start]
            .chars()
            .next_back()
            .is_none_or(char::is_whitespace)
}
