//! Line-oriented block segmentation.

use crate::model::{Block, HeadingLevel};
use regex::Regex;

/// Parse markdown text into a sequence of blocks with default rules.
///
/// Convenience wrapper around [`BlockParser`].
pub fn parse_blocks(text: &str) -> Vec<Block> {
    BlockParser::new().parse(text)
}

/// Splits raw markdown into paragraph-level blocks.
///
/// The parser walks the input line by line. Blank lines separate blocks
/// and are otherwise dropped. Per line, the first matching rule wins:
/// heading prefixes, horizontal rules, pipe tables, bullet markers,
/// numbered items, and finally paragraph accumulation. Empty input
/// produces zero blocks.
pub struct BlockParser {
    numbered_item: Regex,
    table_separator: Regex,
}

impl BlockParser {
    /// Create a parser with its patterns compiled.
    pub fn new() -> Self {
        Self {
            numbered_item: Regex::new(r"^(\d+)\.\s+(.+)$").unwrap(),
            // A row whose leading section is only pipes, dashes, colons
            // and whitespace is an alignment separator, not data.
            table_separator: Regex::new(r"^\|[-:\s|]+\|").unwrap(),
        }
    }

    /// Parse `text` into an ordered sequence of blocks.
    pub fn parse(&self, text: &str) -> Vec<Block> {
        let lines: Vec<&str> = text.lines().collect();
        let mut blocks = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].trim();

            if line.is_empty() {
                i += 1;
                continue;
            }

            // `## ` is checked before `# ` so the longer prefix wins.
            if let Some(rest) = line.strip_prefix("## ") {
                blocks.push(Block::Heading {
                    level: HeadingLevel::H1,
                    text: rest.trim().to_string(),
                });
                i += 1;
                continue;
            }

            if let Some(rest) = line.strip_prefix("### ") {
                blocks.push(Block::Heading {
                    level: HeadingLevel::H2,
                    text: rest.trim().to_string(),
                });
                i += 1;
                continue;
            }

            if let Some(rest) = line.strip_prefix("# ") {
                blocks.push(Block::Heading {
                    level: HeadingLevel::H1,
                    text: rest.trim().to_string(),
                });
                i += 1;
                continue;
            }

            if matches!(line, "---" | "***" | "___") {
                blocks.push(Block::Separator);
                i += 1;
                continue;
            }

            if line.starts_with('|') {
                i = self.capture_table(&lines, i, &mut blocks);
                continue;
            }

            if let Some(text) = bullet_text(line) {
                blocks.push(Block::Bullet {
                    text: text.trim().to_string(),
                    indent: 0,
                });
                i += 1;
                continue;
            }

            if let Some(caps) = self.numbered_item.captures(line) {
                blocks.push(Block::Numbered {
                    number: caps[1].to_string(),
                    text: caps[2].trim().to_string(),
                });
                i += 1;
                continue;
            }

            i = self.accumulate_paragraph(&lines, i, &mut blocks);
        }

        blocks
    }

    /// Consume consecutive lines containing `|` starting at `start`.
    ///
    /// Alignment-separator rows are discarded. Each remaining row is split
    /// on `|`, the segments before the first and after the last pipe are
    /// dropped, and the inner cells trimmed. Rows left with zero cells are
    /// dropped silently. Returns the index of the first unconsumed line.
    fn capture_table(&self, lines: &[&str], start: usize, blocks: &mut Vec<Block>) -> usize {
        let mut rows = Vec::new();
        let mut i = start;

        while i < lines.len() && lines[i].contains('|') {
            let row_line = lines[i].trim();
            i += 1;

            if self.table_separator.is_match(row_line) {
                continue;
            }

            let segments: Vec<&str> = row_line.split('|').collect();
            if segments.len() < 3 {
                continue;
            }
            let cells: Vec<String> = segments[1..segments.len() - 1]
                .iter()
                .map(|c| c.trim().to_string())
                .collect();
            if !cells.is_empty() {
                rows.push(cells);
            }
        }

        if !rows.is_empty() {
            blocks.push(Block::Table { rows });
        }
        i
    }

    /// Join this line and following non-blank, non-block lines into one
    /// paragraph. Returns the index of the first unconsumed line.
    fn accumulate_paragraph(&self, lines: &[&str], start: usize, blocks: &mut Vec<Block>) -> usize {
        let mut parts = vec![lines[start].trim()];
        let mut i = start + 1;

        while i < lines.len() {
            let next = lines[i].trim();
            if next.is_empty() || self.starts_block(next) {
                break;
            }
            parts.push(next);
            i += 1;
        }

        blocks.push(Block::Paragraph {
            text: parts.join(" "),
        });
        i
    }

    /// Whether a trimmed line matches one of the non-paragraph rules.
    fn starts_block(&self, line: &str) -> bool {
        line.starts_with("# ")
            || line.starts_with("## ")
            || line.starts_with("### ")
            || matches!(line, "---" | "***" | "___")
            || line.starts_with('|')
            || bullet_text(line).is_some()
            || self.numbered_item.is_match(line)
    }
}

impl Default for BlockParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip a bullet marker (`• `, `- `, `* `) from a trimmed line.
fn bullet_text(line: &str) -> Option<&str> {
    line.strip_prefix("\u{2022} ")
        .or_else(|| line.strip_prefix("- "))
        .or_else(|| line.strip_prefix("* "))
}
