//! # mdpress
//!
//! Renders the constrained markdown subset an LLM answer is written in
//! into a paginated A4 PDF report.
//!
//! The pipeline is a two-stage parser (block segmentation, then inline
//! span tokenization) feeding a stateful, paginating layout engine:
//! headings, paragraphs, bullet and numbered lists, pipe tables,
//! horizontal rules, and bold/italic/link spans. Everything is lenient:
//! malformed markup renders as plain text, unequal table rows render as
//! given, and empty input still yields a valid header-only document.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> mdpress::Result<()> {
//!     let markdown = "# Summary\n\nThe answer is **42**.";
//!     let pdf = mdpress::render_markdown(markdown, "Answer")?;
//!     std::fs::write("answer.pdf", pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Fonts
//!
//! A fixed list of filesystem locations is probed once per render setup
//! for a Unicode-capable family (DejaVu Sans, Arial Unicode). If none is
//! found, rendering falls back to the built-in Helvetica family: output
//! is still produced, but non-Latin text degrades. The fallback is
//! reported on [`RenderResult::font_fallback`] and logged.
//!
//! ## Determinism
//!
//! Given a fixed timestamp ([`Mdpress::with_timestamp`]), rendering the
//! same input twice produces byte-identical output.

pub mod error;
pub mod model;
pub mod parser;
pub mod render;

pub use error::{Error, Result};
pub use model::{Block, Document, HeadingLevel, Span, DEFAULT_TITLE};
pub use parser::{parse_blocks, parse_spans, BlockParser, InlineParser};
pub use render::{
    Color, FontCatalog, FontPaths, FontStyle, PageSize, PdfRenderer, RenderOptions, RenderResult,
    RenderStats, Theme,
};

use chrono::{DateTime, Utc};

/// Parse markdown text into its block sequence without rendering.
///
/// # Example
///
/// ```
/// let blocks = mdpress::parse_markdown("# Title\n\nBody text");
/// assert_eq!(blocks.len(), 2);
/// ```
pub fn parse_markdown(text: &str) -> Vec<Block> {
    parser::parse_blocks(text)
}

/// Render markdown to PDF bytes with default options.
///
/// Fonts are probed from the default system locations and the current
/// time is used as the generation timestamp. For control over either,
/// use the [`Mdpress`] builder.
///
/// # Example
///
/// ```no_run
/// let pdf = mdpress::render_markdown("Some **answer** text", "Report").unwrap();
/// assert!(pdf.starts_with(b"%PDF-"));
/// ```
pub fn render_markdown(text: &str, title: &str) -> Result<Vec<u8>> {
    Ok(Mdpress::new().render(text, title)?.pdf)
}

/// Builder for configuring and running renders.
///
/// # Example
///
/// ```no_run
/// use mdpress::{Mdpress, PageSize};
///
/// let result = Mdpress::new()
///     .with_page_size(PageSize::Letter)
///     .ascii_only()
///     .render("- one\n- two", "List")?;
/// assert_eq!(result.page_count(), 1);
/// # Ok::<(), mdpress::Error>(())
/// ```
pub struct Mdpress {
    options: RenderOptions,
}

impl Mdpress {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self {
            options: RenderOptions::default(),
        }
    }

    /// Set the page size.
    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.options = self.options.with_page_size(size);
        self
    }

    /// Set the theme (colors and font sizes).
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.options = self.options.with_theme(theme);
        self
    }

    /// Inject a fixed generation timestamp, making output reproducible.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.options = self.options.with_timestamp(timestamp);
        self
    }

    /// Override the font candidate paths.
    pub fn with_font_paths(mut self, paths: FontPaths) -> Self {
        self.options = self.options.with_font_paths(paths);
        self
    }

    /// Skip font probing and render with the built-in Latin-only fonts.
    pub fn ascii_only(mut self) -> Self {
        self.options = self.options.ascii_only();
        self
    }

    /// Parse `text`, lay it out, and return the finished PDF together
    /// with layout statistics.
    pub fn render(self, text: &str, title: &str) -> Result<RenderResult> {
        let generated_at = self.options.timestamp.unwrap_or_else(Utc::now);
        let blocks = parser::parse_blocks(text);
        let doc = Document::new(title, generated_at, blocks);
        let renderer = PdfRenderer::new(self.options);
        renderer.render(&doc)
    }
}

impl Default for Mdpress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_builder_options() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let press = Mdpress::new()
            .with_page_size(PageSize::Letter)
            .with_timestamp(ts)
            .ascii_only();
        assert_eq!(press.options.page_size, PageSize::Letter);
        assert_eq!(press.options.timestamp, Some(ts));
        assert!(press.options.font_paths.regular.is_empty());
    }

    #[test]
    fn test_parse_markdown_surface() {
        let blocks = parse_markdown("# H\n\ntext\n\n- a");
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].is_heading());
    }

    #[test]
    fn test_render_via_builder() {
        let result = Mdpress::new()
            .ascii_only()
            .render("plain text", "Title")
            .unwrap();
        assert!(result.pdf.starts_with(b"%PDF-"));
        assert!(result.font_fallback);
        assert_eq!(result.stats.paragraph_count, 1);
    }
}
