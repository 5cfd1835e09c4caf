//! Document-level types.

use super::Block;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when the caller provides an empty or blank one.
pub const DEFAULT_TITLE: &str = "Report";

/// A fully parsed document, ready for layout.
///
/// Created once per render call and owned exclusively by it; the layout
/// engine reads it but never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document title, shown in the page header and the PDF metadata
    pub title: String,

    /// Generation timestamp, shown under the title
    pub generated_at: DateTime<Utc>,

    /// Parsed content blocks in source order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a document from already-parsed blocks.
    ///
    /// A blank title is replaced with [`DEFAULT_TITLE`].
    pub fn new(title: impl Into<String>, generated_at: DateTime<Utc>, blocks: Vec<Block>) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title
        };
        Self {
            title,
            generated_at,
            blocks,
        }
    }

    /// Get the number of content blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has no content blocks.
    ///
    /// An empty document still renders: the output is a header-only page.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Serialize the parsed document to JSON for inspection.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The formatted timestamp line rendered under the title.
    pub fn timestamp_line(&self) -> String {
        format!("Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_blank_title_defaults() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let doc = Document::new("  ", ts, Vec::new());
        assert_eq!(doc.title, DEFAULT_TITLE);

        let doc = Document::new("Answer", ts, Vec::new());
        assert_eq!(doc.title, "Answer");
    }

    #[test]
    fn test_timestamp_line() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let doc = Document::new("x", ts, Vec::new());
        assert_eq!(doc.timestamp_line(), "Generated: 2024-05-01 09:30");
    }

    #[test]
    fn test_to_json_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let doc = Document::new(
            "x",
            ts,
            vec![Block::Paragraph {
                text: "hello".to_string(),
            }],
        );
        let json = doc.to_json().unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.block_count(), 1);
        assert_eq!(back.title, "x");
    }
}
