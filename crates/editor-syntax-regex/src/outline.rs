//! Outline (document structure) extraction.

use std::ops::Range;

use regex::Regex;

use crate::definition::{OutlineKind, OutlineRule};
use crate::error::RegexSyntaxError;
use crate::extractor::build_regex;

/// One structural item of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    /// Display title.
    pub title: String,
    /// Byte range of the whole match.
    pub range: Range<usize>,
    /// Kind from the producing rule.
    pub kind: Option<OutlineKind>,
}

/// A compiled outline rule.
#[derive(Debug, Clone)]
pub struct OutlineExtractor {
    regex: Regex,
    template: String,
    kind: Option<OutlineKind>,
}

impl OutlineExtractor {
    /// Compile an outline rule.
    pub fn compile(rule: &OutlineRule) -> Result<Self, RegexSyntaxError> {
        Ok(Self {
            regex: build_regex(&rule.begin_string, rule.ignore_case, false)?,
            template: rule.key_string.clone(),
            kind: rule.kind,
        })
    }

    /// Items found in `text`, in match order.
    pub fn items(&self, text: &str) -> Vec<OutlineItem> {
        let mut out = Vec::new();
        for caps in self.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.is_empty() {
                continue;
            }
            let title = if self.kind == Some(OutlineKind::Separator) {
                self.template.clone()
            } else if self.template.is_empty() {
                whole.as_str().to_string()
            } else {
                let template = if self.template.contains("$LN") {
                    let line = line_number(text, whole.start());
                    self.template.replace("$LN", &line.to_string())
                } else {
                    self.template.clone()
                };
                let mut title = String::new();
                caps.expand(&template, &mut title);
                title
            };
            out.push(OutlineItem {
                title: title.replace(['\r', '\n'], " "),
                range: whole.range(),
                kind: self.kind,
            });
        }
        out
    }
}

/// 1-based line number of `offset`.
fn line_number(text: &str, offset: usize) -> usize {
    let bytes = &text.as_bytes()[..offset];
    let mut line = 1;
    for (i, byte) in bytes.iter().enumerate() {
        match byte {
            b'\n' => line += 1,
            b'\r' if bytes.get(i + 1) != Some(&b'\n') => line += 1,
            _ => {}
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule(pattern: &str, template: &str) -> OutlineRule {
        OutlineRule {
            begin_string: pattern.into(),
            key_string: template.into(),
            ..OutlineRule::default()
        }
    }

    #[test]
    fn test_template_expansion() {
        let extractor = OutlineExtractor::compile(&rule(r"^fn (?<name>\w+)\((.*)\)", "${name}: $2")).unwrap();
        let items = extractor.items("fn main()\nfn add(a, b)\n");
        assert_eq!(
            items,
            vec![
                OutlineItem {
                    title: "main: ".into(),
                    range: 0..9,
                    kind: None,
                },
                OutlineItem {
                    title: "add: a, b".into(),
                    range: 10..22,
                    kind: None,
                },
            ]
        );
    }

    #[test]
    fn test_empty_template_uses_match() {
        let extractor = OutlineExtractor::compile(&rule("^TODO.*", "")).unwrap();
        let items = extractor.items("x\nTODO later");
        assert_eq!(items[0].title, "TODO later");
        assert_eq!(items[0].range, 2..12);
    }

    #[test]
    fn test_line_number_template() {
        let extractor = OutlineExtractor::compile(&rule("^MARK: (.*)", "$1 @$LN")).unwrap();
        let items = extractor.items("a\r\nb\rMARK: here");
        assert_eq!(items[0].title, "here @3");
    }

    #[test]
    fn test_separator_and_case() {
        let mut separator = rule("^-{3,}$", "-");
        separator.kind = Some(OutlineKind::Separator);
        let extractor = OutlineExtractor::compile(&separator).unwrap();
        assert_eq!(extractor.items("a\n----\nb")[0].title, "-");

        let mut heading = rule("^section (.*)", "$1");
        heading.ignore_case = true;
        let extractor = OutlineExtractor::compile(&heading).unwrap();
        assert_eq!(extractor.items("SECTION One")[0].title, "One");
    }
}
