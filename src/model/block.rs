//! Block-level model types.

use serde::{Deserialize, Serialize};

/// Heading depth in the simplified grammar.
///
/// `#` and `##` both map to [`HeadingLevel::H1`]; `###` maps to
/// [`HeadingLevel::H2`]. Deeper headings are not part of the grammar and
/// parse as plain paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    /// Top-level heading
    H1,
    /// Sub-heading
    H2,
}

/// A paragraph-level unit of parsed markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A heading line
    Heading {
        /// Heading depth
        level: HeadingLevel,
        /// Heading text, markup not interpreted
        text: String,
    },

    /// A run of plain text lines joined into one paragraph
    Paragraph {
        /// Paragraph text with inline markup still embedded
        text: String,
    },

    /// A bulleted list item
    Bullet {
        /// Item text with inline markup still embedded
        text: String,
        /// Nesting depth (0 = top level; the grammar emits 0 only)
        indent: u8,
    },

    /// A numbered list item
    Numbered {
        /// The literal number label from the source (without the dot)
        number: String,
        /// Item text with inline markup still embedded
        text: String,
    },

    /// A pipe table. Rows are kept exactly as parsed; unequal cell
    /// counts across rows are allowed and rendered as given.
    Table {
        /// Data rows (the alignment-separator row is never included)
        rows: Vec<Vec<String>>,
    },

    /// A horizontal rule
    Separator,
}

impl Block {
    /// Check if this block is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading { .. })
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table { .. })
    }

    /// Check if this block is a list item (bulleted or numbered).
    pub fn is_list_item(&self) -> bool {
        matches!(self, Block::Bullet { .. } | Block::Numbered { .. })
    }

    /// Get plain text content of the block, markup characters included.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading { text, .. } | Block::Paragraph { text } | Block::Bullet { text, .. } => {
                text.clone()
            }
            Block::Numbered { number, text } => format!("{}. {}", number, text),
            Block::Table { rows } => rows
                .iter()
                .map(|row| row.join("\t"))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Separator => String::new(),
        }
    }

    /// Number of columns of a table block, counted from its first row.
    ///
    /// Returns 0 for non-table blocks and empty tables.
    pub fn column_count(&self) -> usize {
        match self {
            Block::Table { rows } => rows.first().map(|r| r.len()).unwrap_or(0),
            _ => 0,
        }
    }
}
