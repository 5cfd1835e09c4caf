//! Inline span types.

use serde::{Deserialize, Serialize};

/// An inline-formatting unit within a block's text.
///
/// Spans are produced by a single left-to-right scan over the block text;
/// they never overlap, and concatenating their content fields reconstructs
/// the source text with markup delimiters stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Span {
    /// Unformatted text, verbatim
    Text {
        /// The text content
        content: String,
    },

    /// Bold text (`**x**` or `__x__`)
    Bold {
        /// The text between the delimiters
        content: String,
    },

    /// Italic text (`*x*` or `_x_`)
    Italic {
        /// The text between the delimiters
        content: String,
    },

    /// A hyperlink (`[label](url)`)
    Link {
        /// The link label
        label: String,
        /// The link target
        url: String,
    },
}

impl Span {
    /// Create a plain text span.
    pub fn text(content: impl Into<String>) -> Self {
        Span::Text {
            content: content.into(),
        }
    }

    /// Create a bold span.
    pub fn bold(content: impl Into<String>) -> Self {
        Span::Bold {
            content: content.into(),
        }
    }

    /// Create an italic span.
    pub fn italic(content: impl Into<String>) -> Self {
        Span::Italic {
            content: content.into(),
        }
    }

    /// Create a link span.
    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Span::Link {
            label: label.into(),
            url: url.into(),
        }
    }

    /// The visible text of the span (the label for links).
    pub fn content(&self) -> &str {
        match self {
            Span::Text { content } | Span::Bold { content } | Span::Italic { content } => content,
            Span::Link { label, .. } => label,
        }
    }

    /// Check if the span carries any formatting.
    pub fn is_formatted(&self) -> bool {
        !matches!(self, Span::Text { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_content() {
        assert_eq!(Span::text("plain").content(), "plain");
        assert_eq!(Span::bold("strong").content(), "strong");
        assert_eq!(Span::link("docs", "https://example.com").content(), "docs");
    }

    #[test]
    fn test_is_formatted() {
        assert!(!Span::text("a").is_formatted());
        assert!(Span::italic("a").is_formatted());
        assert!(Span::link("a", "b").is_formatted());
    }
}
