//! Inline span tokenization.

use crate::model::Span;
use regex::Regex;

/// Parse a block's text into inline spans with default rules.
///
/// Convenience wrapper around [`InlineParser`].
pub fn parse_spans(text: &str) -> Vec<Span> {
    InlineParser::new().parse(text)
}

/// Tokenizes inline markup in a single left-to-right scan.
///
/// One combined pattern is matched with leftmost-first alternation, so
/// precedence is the branch order: link > bold (`**`/`__`) > italic
/// (`*`/`_`). A `**` run is always claimed by the bold branch before the
/// italic branch can see it, which is what keeps `**bold**` from being
/// read as nested italics. Text between matches becomes verbatim
/// [`Span::Text`]; unmatched delimiters stay literal.
pub struct InlineParser {
    pattern: Regex,
}

/// Capture-group layout of the combined pattern, in priority order:
/// 1,2 = link label/url; 3 = `**bold**`; 4 = `__bold__`;
/// 5 = `*italic*`; 6 = `_italic_`.
const INLINE_PATTERN: &str =
    r"\[([^\]]+)\]\(([^)]+)\)|\*\*([^*]+)\*\*|__([^_]+)__|\*([^*]+)\*|_([^_]+)_";

impl InlineParser {
    /// Create a parser with its pattern compiled.
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(INLINE_PATTERN).unwrap(),
        }
    }

    /// Scan `text` and return its spans in source order.
    ///
    /// Every character of the input (minus consumed markup delimiters)
    /// lands in exactly one span. Text without any markup comes back as
    /// a single [`Span::Text`].
    pub fn parse(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut pos = 0;

        for caps in self.pattern.captures_iter(text) {
            let m = caps.get(0).expect("match group 0 always present");
            if m.start() > pos {
                spans.push(Span::text(&text[pos..m.start()]));
            }

            if let (Some(label), Some(url)) = (caps.get(1), caps.get(2)) {
                spans.push(Span::link(label.as_str(), url.as_str()));
            } else if let Some(bold) = caps.get(3).or_else(|| caps.get(4)) {
                spans.push(Span::bold(bold.as_str()));
            } else if let Some(italic) = caps.get(5).or_else(|| caps.get(6)) {
                spans.push(Span::italic(italic.as_str()));
            }

            pos = m.end();
        }

        if pos < text.len() {
            spans.push(Span::text(&text[pos..]));
        }

        if spans.is_empty() {
            spans.push(Span::text(text));
        }

        spans
    }
}

impl Default for InlineParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Concatenated span contents with markup stripped.
    fn stripped(spans: &[Span]) -> String {
        spans.iter().map(|s| s.content()).collect()
    }

    #[test]
    fn test_no_markup_single_span() {
        let spans = parse_spans("nothing fancy here");
        assert_eq!(spans, vec![Span::text("nothing fancy here")]);
    }

    #[test]
    fn test_empty_text() {
        let spans = parse_spans("");
        assert_eq!(spans, vec![Span::text("")]);
    }

    #[test]
    fn test_mixed_markup_order_and_reconstruction() {
        let spans = parse_spans("**a** and *b* and [c](http://x)");
        assert_eq!(
            spans,
            vec![
                Span::bold("a"),
                Span::text(" and "),
                Span::italic("b"),
                Span::text(" and "),
                Span::link("c", "http://x"),
            ]
        );
        assert_eq!(stripped(&spans), "a and b and c");
    }

    #[test]
    fn test_underscore_variants() {
        let spans = parse_spans("__strong__ and _soft_");
        assert_eq!(
            spans,
            vec![
                Span::bold("strong"),
                Span::text(" and "),
                Span::italic("soft"),
            ]
        );
    }

    #[test]
    fn test_bold_not_read_as_nested_italics() {
        let spans = parse_spans("**bold**");
        assert_eq!(spans, vec![Span::bold("bold")]);
    }

    #[test]
    fn test_link_has_priority_over_emphasis() {
        let spans = parse_spans("[*label*](http://x)");
        // The link branch wins at the bracket; the starred label is kept
        // verbatim as the link text.
        assert_eq!(spans, vec![Span::link("*label*", "http://x")]);
    }

    #[test]
    fn test_unmatched_delimiters_stay_literal() {
        let spans = parse_spans("a * lone star");
        assert_eq!(spans, vec![Span::text("a * lone star")]);

        let spans = parse_spans("broken [link(no close");
        assert_eq!(spans, vec![Span::text("broken [link(no close")]);
    }

    #[test]
    fn test_triple_star_policy() {
        // Documented resolution: the bold branch wins at the first
        // matchable position, leaving the outer stars literal.
        let spans = parse_spans("***x***");
        assert_eq!(
            spans,
            vec![Span::text("*"), Span::bold("x"), Span::text("*")]
        );
    }

    #[test]
    fn test_spans_cover_input_without_overlap() {
        let text = "pre **b** mid _i_ [l](u) post";
        let spans = parse_spans(text);
        assert_eq!(stripped(&spans), "pre b mid i l post");
        // Source order: formatted spans alternate with the plain gaps.
        assert!(spans.len() == 7);
    }

    #[test]
    fn test_multiple_links() {
        let spans = parse_spans("[a](x) then [b](y)");
        assert_eq!(
            spans,
            vec![
                Span::link("a", "x"),
                Span::text(" then "),
                Span::link("b", "y"),
            ]
        );
    }
}
