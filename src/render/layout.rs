//! The paginating layout engine.
//!
//! Blocks are laid out top to bottom on a descending cursor. Before any
//! renderable unit is drawn (a wrapped line of text, a table row, a
//! horizontal rule) the engine checks whether the unit would cross the
//! bottom margin and starts a new page if so. The check happens per
//! unit, not per block, so a single long paragraph or table spans pages
//! naturally.
//!
//! The engine's state (current content stream, cursor position, pending
//! link rectangles, finished pages) lives and dies inside a single
//! [`LayoutEngine::run`] call and is never exposed.

use pdf_writer::{Content, Name, Str};

use crate::model::{Block, Document, HeadingLevel, Span};
use crate::parser;

use super::fonts::{FontCatalog, FontStyle};
use super::result::RenderStats;
use super::theme::{Color, PageMetrics, Theme, MM};

// Vertical grid, converted from the report format's millimetre values.
const BODY_LINE_H: f32 = 5.0 * MM;
const H1_LINE_H: f32 = 8.0 * MM;
const H2_LINE_H: f32 = 6.0 * MM;
const TABLE_ROW_H: f32 = 7.0 * MM;
const TITLE_LINE_H: f32 = 12.0 * MM;
const TIMESTAMP_LINE_H: f32 = 5.0 * MM;

const H1_SPACE_BEFORE: f32 = 4.0 * MM;
const H1_SPACE_AFTER: f32 = 2.0 * MM;
const H2_SPACE_BEFORE: f32 = 3.0 * MM;
const H2_SPACE_AFTER: f32 = 1.0 * MM;
const PARA_SPACE_AFTER: f32 = 2.0 * MM;
const LIST_SPACE_AFTER: f32 = 1.0 * MM;
const TABLE_SPACE_AFTER: f32 = 2.0 * MM;
const RULE_SPACE_BEFORE: f32 = 3.0 * MM;
const RULE_SPACE_AFTER: f32 = 5.0 * MM;
const TITLE_GAP: f32 = 3.0 * MM;
const HEADER_GAP: f32 = 8.0 * MM;

const LIST_INDENT: f32 = 5.0 * MM;
const CELL_PAD: f32 = 1.0 * MM;
const RULE_WIDTH: f32 = 0.5;

/// A clickable region to attach to the finished page.
pub(crate) struct PageLink {
    /// `[x1, y1, x2, y2]` in page coordinates
    pub rect: [f32; 4],
    /// Link target
    pub url: String,
}

/// A finished page: its content stream plus its link regions.
pub(crate) struct PageBuild {
    pub content: Content,
    pub links: Vec<PageLink>,
}

/// One styled run of words committed to the current line.
struct LineChunk {
    style: FontStyle,
    color: Color,
    link: Option<String>,
    text: String,
    width: f32,
}

pub(crate) struct LayoutEngine<'a> {
    catalog: &'a FontCatalog,
    theme: &'a Theme,
    metrics: PageMetrics,
    content: Content,
    links: Vec<PageLink>,
    cursor_y: f32,
    finished: Vec<PageBuild>,
    stats: RenderStats,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(catalog: &'a FontCatalog, theme: &'a Theme, metrics: PageMetrics) -> Self {
        Self {
            catalog,
            theme,
            metrics,
            content: Content::new(),
            links: Vec::new(),
            cursor_y: metrics.top_y(),
            finished: Vec::new(),
            stats: RenderStats::default(),
        }
    }

    /// Lay out the whole document and return the finished pages.
    pub fn run(mut self, doc: &Document) -> (Vec<PageBuild>, RenderStats) {
        self.render_header(doc);
        for block in &doc.blocks {
            self.render_block(block);
        }
        self.finish_page();
        self.stats.page_count = self.finished.len() as u32;
        let stats = self.stats;
        (std::mem::take(&mut self.finished), stats)
    }

    // ------------------------------------------------------------------
    // Page state

    fn finish_page(&mut self) {
        let content = std::mem::replace(&mut self.content, Content::new());
        let links = std::mem::take(&mut self.links);
        self.finished.push(PageBuild { content, links });
        self.cursor_y = self.metrics.top_y();
    }

    /// Start a new page if `needed` points would cross the bottom
    /// margin. At the top of a fresh page the unit is drawn regardless,
    /// so an oversized unit cannot loop forever.
    fn ensure_room(&mut self, needed: f32) {
        let at_top = (self.cursor_y - self.metrics.top_y()).abs() < 0.5;
        if !at_top && self.cursor_y - needed < self.metrics.bottom_y() {
            log::debug!(
                "page break: {:.1}pt needed, {:.1}pt left",
                needed,
                self.cursor_y - self.metrics.bottom_y()
            );
            self.finish_page();
        }
    }

    /// Move the cursor down without drawing. Gaps never force a page
    /// break on their own; the next drawn unit does.
    fn advance(&mut self, dy: f32) {
        self.cursor_y -= dy;
    }

    /// Vertical drop from a line's top edge to its text baseline,
    /// centering the glyph box in the line.
    fn baseline_drop(&self, style: FontStyle, size: f32, line_h: f32) -> f32 {
        (line_h - size).max(0.0) / 2.0 + self.catalog.ascent_ratio(style) * size
    }

    // ------------------------------------------------------------------
    // Drawing primitives

    fn draw_text(&mut self, x: f32, baseline: f32, style: FontStyle, size: f32, color: Color, text: &str) {
        let (r, g, b) = color.to_unit_rgb();
        let bytes = self.catalog.encode(style, text);
        self.content.begin_text();
        self.content.set_fill_rgb(r, g, b);
        self.content
            .set_font(Name(style.resource_name().as_bytes()), size);
        self.content.next_line(x, baseline);
        self.content.show(Str(&bytes));
        self.content.end_text();
    }

    /// Word-wrap plain text to `width` points.
    fn wrap_text(&self, text: &str, style: FontStyle, size: f32, width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_w = 0.0;

        for word in text.split_inclusive(' ') {
            if current.is_empty() && word.trim().is_empty() {
                continue;
            }
            let w = self.catalog.measure(style, word, size);
            if !current.is_empty() && current_w + w > width && !word.trim().is_empty() {
                lines.push(current.trim_end().to_string());
                current.clear();
                current_w = 0.0;
            }
            current.push_str(word);
            current_w += w;
        }
        if !current.trim().is_empty() {
            lines.push(current.trim_end().to_string());
        }
        lines
    }

    // ------------------------------------------------------------------
    // Document header

    fn render_header(&mut self, doc: &Document) {
        let size = self.theme.title_size;
        let w = self.catalog.measure(FontStyle::Bold, &doc.title, size);
        let x = (self.metrics.margin_left + (self.metrics.content_width() - w) / 2.0)
            .max(self.metrics.margin_left);
        let baseline = self.cursor_y - self.baseline_drop(FontStyle::Bold, size, TITLE_LINE_H);
        self.draw_text(x, baseline, FontStyle::Bold, size, self.theme.accent, &doc.title);
        self.advance(TITLE_LINE_H + TITLE_GAP);

        let line = doc.timestamp_line();
        let size = self.theme.timestamp_size;
        let w = self.catalog.measure(FontStyle::Regular, &line, size);
        let x = (self.metrics.margin_left + (self.metrics.content_width() - w) / 2.0)
            .max(self.metrics.margin_left);
        let baseline =
            self.cursor_y - self.baseline_drop(FontStyle::Regular, size, TIMESTAMP_LINE_H);
        self.draw_text(x, baseline, FontStyle::Regular, size, self.theme.muted, &line);
        self.advance(TIMESTAMP_LINE_H + HEADER_GAP);
    }

    // ------------------------------------------------------------------
    // Block dispatch

    fn render_block(&mut self, block: &Block) {
        match block {
            Block::Heading { level, text } => self.render_heading(*level, text),
            Block::Paragraph { text } => {
                self.stats.paragraph_count += 1;
                let spans = parser::parse_spans(text);
                self.render_spans(&spans, self.metrics.margin_left);
                self.advance(PARA_SPACE_AFTER);
            }
            Block::Bullet { text, indent } => {
                self.stats.list_item_count += 1;
                let x = self.metrics.margin_left + LIST_INDENT * (1.0 + *indent as f32);
                let mut spans = vec![Span::text("\u{2022} ")];
                spans.extend(parser::parse_spans(text));
                self.render_spans(&spans, x);
                self.advance(LIST_SPACE_AFTER);
            }
            Block::Numbered { number, text } => {
                self.stats.list_item_count += 1;
                let x = self.metrics.margin_left + LIST_INDENT;
                let mut spans = vec![Span::text(format!("{}. ", number))];
                spans.extend(parser::parse_spans(text));
                self.render_spans(&spans, x);
                self.advance(LIST_SPACE_AFTER);
            }
            Block::Table { rows } => self.render_table(rows),
            Block::Separator => self.render_rule(),
        }
    }

    fn render_heading(&mut self, level: HeadingLevel, text: &str) {
        self.stats.heading_count += 1;
        let (size, line_h, before, after) = match level {
            HeadingLevel::H1 => (self.theme.h1_size, H1_LINE_H, H1_SPACE_BEFORE, H1_SPACE_AFTER),
            HeadingLevel::H2 => (self.theme.h2_size, H2_LINE_H, H2_SPACE_BEFORE, H2_SPACE_AFTER),
        };
        self.advance(before);
        let lines = self.wrap_text(text, FontStyle::Bold, size, self.metrics.content_width());
        for line in lines {
            self.ensure_room(line_h);
            let baseline = self.cursor_y - self.baseline_drop(FontStyle::Bold, size, line_h);
            self.draw_text(
                self.metrics.margin_left,
                baseline,
                FontStyle::Bold,
                size,
                self.theme.accent,
                &line,
            );
            self.cursor_y -= line_h;
        }
        self.advance(after);
    }

    /// Render inline spans with word wrapping, starting each line at
    /// `x_origin`. Fonts and colors switch per span; link spans record a
    /// clickable rectangle per rendered segment.
    fn render_spans(&mut self, spans: &[Span], x_origin: f32) {
        let size = self.theme.body_size;
        let width = (self.metrics.content_right() - x_origin).max(1.0);

        let mut line: Vec<LineChunk> = Vec::new();
        let mut line_w = 0.0;

        for span in spans {
            let (style, color, link) = match span {
                Span::Text { .. } => (FontStyle::Regular, self.theme.body, None),
                Span::Bold { .. } => (FontStyle::Bold, self.theme.body, None),
                Span::Italic { .. } => (FontStyle::Italic, self.theme.body, None),
                Span::Link { url, .. } => (FontStyle::Regular, self.theme.link, Some(url.clone())),
            };

            for word in span.content().split_inclusive(' ') {
                if line.is_empty() && word.trim().is_empty() {
                    continue;
                }
                let w = self.catalog.measure(style, word, size);
                if !line.is_empty() && line_w + w > width && !word.trim().is_empty() {
                    self.flush_line(&line, x_origin, size);
                    line.clear();
                    line_w = 0.0;
                }

                let mergeable = matches!(
                    line.last(),
                    Some(last) if last.style == style && last.color == color && last.link == link
                );
                if mergeable {
                    let last = line.last_mut().expect("checked non-empty");
                    last.text.push_str(word);
                    last.width += w;
                } else {
                    line.push(LineChunk {
                        style,
                        color,
                        link: link.clone(),
                        text: word.to_string(),
                        width: w,
                    });
                }
                line_w += w;
            }
        }

        if !line.is_empty() {
            self.flush_line(&line, x_origin, size);
        }
    }

    /// Draw one assembled line and advance the cursor below it.
    fn flush_line(&mut self, chunks: &[LineChunk], x_origin: f32, size: f32) {
        self.ensure_room(BODY_LINE_H);
        let baseline = self.cursor_y - self.baseline_drop(FontStyle::Regular, size, BODY_LINE_H);

        self.content.begin_text();
        self.content.next_line(x_origin, baseline);
        let mut x = x_origin;
        for chunk in chunks {
            let (r, g, b) = chunk.color.to_unit_rgb();
            self.content.set_fill_rgb(r, g, b);
            self.content
                .set_font(Name(chunk.style.resource_name().as_bytes()), size);
            let bytes = self.catalog.encode(chunk.style, &chunk.text);
            self.content.show(Str(&bytes));

            if let Some(url) = &chunk.link {
                self.links.push(PageLink {
                    rect: [
                        x,
                        baseline - 0.25 * size,
                        x + chunk.width,
                        baseline + 0.8 * size,
                    ],
                    url: url.clone(),
                });
                self.stats.link_count += 1;
            }
            x += chunk.width;
        }
        self.content.end_text();
        self.cursor_y -= BODY_LINE_H;
    }

    // ------------------------------------------------------------------
    // Tables and rules

    fn render_table(&mut self, rows: &[Vec<String>]) {
        if rows.is_empty() {
            return;
        }
        self.stats.table_count += 1;

        // Uniform column width, counted from the first row. Rows with
        // more cells draw past the right margin, as the format allows.
        let cols = rows[0].len().max(1);
        let col_w = self.metrics.content_width() / cols as f32;
        let size = self.theme.table_size;

        for (i, row) in rows.iter().enumerate() {
            self.ensure_room(TABLE_ROW_H);
            let header = i == 0;
            let style = if header {
                FontStyle::Bold
            } else {
                FontStyle::Regular
            };
            let y_top = self.cursor_y;
            let y_bottom = y_top - TABLE_ROW_H;

            for (j, cell) in row.iter().enumerate() {
                let x = self.metrics.margin_left + j as f32 * col_w;

                self.content.save_state();
                if header {
                    let (r, g, b) = self.theme.table_header.to_unit_rgb();
                    self.content.set_fill_rgb(r, g, b);
                    self.content.rect(x, y_bottom, col_w, TABLE_ROW_H);
                    self.content.fill_nonzero();
                }
                let (r, g, b) = self.theme.table_border.to_unit_rgb();
                self.content.set_line_width(RULE_WIDTH);
                self.content.set_stroke_rgb(r, g, b);
                self.content.rect(x, y_bottom, col_w, TABLE_ROW_H);
                self.content.stroke();
                self.content.restore_state();

                // Cell text is not wrapped; long content overflows the
                // fixed-height cell by design.
                let baseline = y_top - self.baseline_drop(style, size, TABLE_ROW_H);
                self.draw_text(x + CELL_PAD, baseline, style, size, self.theme.body, cell);
            }
            self.cursor_y -= TABLE_ROW_H;
        }
        self.advance(TABLE_SPACE_AFTER);
    }

    fn render_rule(&mut self) {
        self.stats.rule_count += 1;
        self.advance(RULE_SPACE_BEFORE);
        self.ensure_room(RULE_SPACE_AFTER);
        let y = self.cursor_y;
        let (r, g, b) = self.theme.table_border.to_unit_rgb();
        self.content.save_state();
        self.content.set_line_width(RULE_WIDTH);
        self.content.set_stroke_rgb(r, g, b);
        self.content.move_to(self.metrics.margin_left, y);
        self.content.line_to(self.metrics.content_right(), y);
        self.content.stroke();
        self.content.restore_state();
        self.advance(RULE_SPACE_AFTER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;
    use crate::render::theme::PageSize;
    use chrono::{TimeZone, Utc};

    fn test_doc(blocks: Vec<Block>) -> Document {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Document::new("Test", ts, blocks)
    }

    #[test]
    fn test_wrap_text_breaks_long_lines() {
        let catalog = FontCatalog::builtin();
        let theme = Theme::default();
        let metrics = PageMetrics::for_size(PageSize::A4);
        let engine = LayoutEngine::new(&catalog, &theme, metrics);

        // 11pt * 0.6 = 6.6pt per char; 40 chars per word group.
        let text = "word ".repeat(40);
        let lines = engine.wrap_text(&text, FontStyle::Regular, 11.0, 200.0);
        assert!(lines.len() > 1, "long text should wrap");
        for line in &lines {
            let w = catalog.measure(FontStyle::Regular, line, 11.0);
            assert!(w <= 200.0 + 1.0, "wrapped line exceeds width: {}", w);
        }
    }

    #[test]
    fn test_wrap_text_keeps_short_line() {
        let catalog = FontCatalog::builtin();
        let theme = Theme::default();
        let metrics = PageMetrics::for_size(PageSize::A4);
        let engine = LayoutEngine::new(&catalog, &theme, metrics);

        let lines = engine.wrap_text("short", FontStyle::Bold, 16.0, 400.0);
        assert_eq!(lines, vec!["short".to_string()]);
    }

    #[test]
    fn test_empty_document_is_single_header_page() {
        let catalog = FontCatalog::builtin();
        let theme = Theme::default();
        let metrics = PageMetrics::for_size(PageSize::A4);
        let engine = LayoutEngine::new(&catalog, &theme, metrics);

        let (pages, stats) = engine.run(&test_doc(Vec::new()));
        assert_eq!(pages.len(), 1);
        assert_eq!(stats.page_count, 1);
        assert_eq!(stats.paragraph_count, 0);
    }

    #[test]
    fn test_long_paragraph_spans_pages() {
        let catalog = FontCatalog::builtin();
        let theme = Theme::default();
        let metrics = PageMetrics::for_size(PageSize::A4);
        let engine = LayoutEngine::new(&catalog, &theme, metrics);

        let text = "Lorem ipsum ".repeat(2000);
        let (pages, stats) = engine.run(&test_doc(vec![Block::Paragraph { text }]));
        assert!(pages.len() > 1, "oversized paragraph must paginate");
        assert_eq!(stats.page_count, pages.len() as u32);
    }

    #[test]
    fn test_unequal_table_rows_render() {
        let catalog = FontCatalog::builtin();
        let theme = Theme::default();
        let metrics = PageMetrics::for_size(PageSize::A4);
        let engine = LayoutEngine::new(&catalog, &theme, metrics);

        let rows = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string(), "d".to_string(), "e".to_string()],
        ];
        let (pages, stats) = engine.run(&test_doc(vec![Block::Table { rows }]));
        assert_eq!(pages.len(), 1);
        assert_eq!(stats.table_count, 1);
    }

    #[test]
    fn test_links_are_collected() {
        let catalog = FontCatalog::builtin();
        let theme = Theme::default();
        let metrics = PageMetrics::for_size(PageSize::A4);
        let engine = LayoutEngine::new(&catalog, &theme, metrics);

        let text = "see [the docs](https://example.com) for details".to_string();
        let (pages, stats) = engine.run(&test_doc(vec![Block::Paragraph { text }]));
        assert_eq!(stats.link_count, 1);
        assert_eq!(pages[0].links.len(), 1);
        assert_eq!(pages[0].links[0].url, "https://example.com");
    }

    #[test]
    fn test_many_table_rows_paginate() {
        let catalog = FontCatalog::builtin();
        let theme = Theme::default();
        let metrics = PageMetrics::for_size(PageSize::A4);
        let engine = LayoutEngine::new(&catalog, &theme, metrics);

        let rows: Vec<Vec<String>> = (0..80)
            .map(|i| vec![format!("row {}", i), "value".to_string()])
            .collect();
        let (pages, _) = engine.run(&test_doc(vec![Block::Table { rows }]));
        assert!(pages.len() > 1, "80 fixed-height rows exceed one page");
    }
}
