//! PDF document assembly.
//!
//! Assembly runs in three phases: collect the characters the document
//! will draw, register fonts (embedded TrueType with Identity-H
//! encoding, or the built-in WinAnsi Helvetica family when the resolver
//! fell back), then lay out pages and write the object tree. Streams
//! are written uncompressed, so identical input produces identical
//! bytes.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Timelike, Utc};
use pdf_writer::types::{ActionType, AnnotationType, CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Date, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::Result;
use crate::model::{Block, Document};

use super::fonts::{FontCatalog, FontStyle, LoadedFont};
use super::layout::{LayoutEngine, PageBuild};
use super::options::RenderOptions;
use super::result::RenderResult;
use super::theme::PageMetrics;

/// Renders parsed documents to PDF bytes.
///
/// Fonts are resolved once at construction; the renderer can then be
/// used for any number of documents.
pub struct PdfRenderer {
    options: RenderOptions,
    catalog: FontCatalog,
}

impl PdfRenderer {
    /// Create a renderer, probing the option's font candidate paths.
    pub fn new(options: RenderOptions) -> Self {
        let catalog = FontCatalog::resolve_with(&options.font_paths);
        Self { options, catalog }
    }

    /// Create a renderer around an already-built font capability.
    ///
    /// Lets callers (and tests) control the font source without
    /// touching the filesystem.
    pub fn with_catalog(options: RenderOptions, catalog: FontCatalog) -> Self {
        Self { options, catalog }
    }

    /// Whether this renderer draws with the Latin-only fallback.
    pub fn is_font_fallback(&self) -> bool {
        self.catalog.is_fallback()
    }

    /// Render a document into a finished PDF.
    pub fn render(&self, doc: &Document) -> Result<RenderResult> {
        let metrics = PageMetrics::for_size(self.options.page_size);
        let engine = LayoutEngine::new(&self.catalog, &self.options.theme, metrics);
        let (pages, stats) = engine.run(doc);

        let pdf = self.assemble(doc, pages, metrics)?;
        Ok(RenderResult {
            pdf,
            stats,
            font_fallback: self.catalog.is_fallback(),
        })
    }

    fn assemble(&self, doc: &Document, pages: Vec<PageBuild>, metrics: PageMetrics) -> Result<Vec<u8>> {
        let mut pdf = Pdf::new();
        let mut next_id = 1;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let info_id = alloc();

        let used = collect_used_chars(doc);
        let font_refs = register_fonts(&mut pdf, &mut alloc, &self.catalog, &used);

        let n = pages.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

        let page_annot_refs: Vec<Vec<Ref>> = pages
            .iter()
            .map(|page| {
                page.links
                    .iter()
                    .map(|link| {
                        let annot_ref = alloc();
                        let mut annot = pdf.annotation(annot_ref);
                        annot
                            .subtype(AnnotationType::Link)
                            .rect(Rect::new(
                                link.rect[0],
                                link.rect[1],
                                link.rect[2],
                                link.rect[3],
                            ))
                            .border(0.0, 0.0, 0.0, None);
                        annot
                            .action()
                            .action_type(ActionType::Uri)
                            .uri(Str(link.url.as_bytes()));
                        annot_ref
                    })
                    .collect()
            })
            .collect();

        for (i, page) in pages.into_iter().enumerate() {
            let data = page.content.finish();
            pdf.stream(content_ids[i], &data);
        }

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        for i in 0..n {
            let mut page = pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, metrics.width, metrics.height))
                .parent(pages_id)
                .contents(content_ids[i]);
            if !page_annot_refs[i].is_empty() {
                page.annotations(page_annot_refs[i].iter().copied());
            }
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            for style in FontStyle::ALL {
                fonts.pair(
                    Name(style.resource_name().as_bytes()),
                    font_refs[style.index()],
                );
            }
        }

        {
            let mut info = pdf.document_info(info_id);
            info.title(TextStr(&doc.title));
            info.producer(TextStr("mdpress"));
            info.creation_date(pdf_date(doc.generated_at));
        }

        Ok(pdf.finish())
    }
}

/// Every character the layout pass can draw: block text, the header
/// lines, and the fixed prefixes the engine adds itself. Collecting a
/// superset is harmless; it only widens the embedded character map.
fn collect_used_chars(doc: &Document) -> BTreeSet<char> {
    let mut used: BTreeSet<char> = BTreeSet::new();
    let mut add = |s: &str| used.extend(s.chars());

    add(&doc.title);
    add(&doc.timestamp_line());
    add("\u{2022} .0123456789?");

    for block in &doc.blocks {
        match block {
            Block::Heading { text, .. } | Block::Paragraph { text } => add(text),
            Block::Bullet { text, .. } => add(text),
            Block::Numbered { number, text } => {
                add(number);
                add(text);
            }
            Block::Table { rows } => {
                for row in rows {
                    for cell in row {
                        add(cell);
                    }
                }
            }
            Block::Separator => {}
        }
    }
    used.insert(' ');
    used
}

/// Register one PDF font object per style and return their refs indexed
/// by [`FontStyle::index`]. Styles sharing a file (missing bold/italic
/// variants) share one embedded font object.
fn register_fonts(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
    catalog: &FontCatalog,
    used: &BTreeSet<char>,
) -> [Ref; 3] {
    let mut refs = [Ref::new(1); 3];

    if catalog.is_fallback() {
        for style in FontStyle::ALL {
            let font_ref = alloc();
            pdf.type1_font(font_ref)
                .base_font(Name(style.builtin_base().as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
            refs[style.index()] = font_ref;
        }
        return refs;
    }

    // Styles may point at the same loaded font; embed each file once.
    let mut embedded: Vec<(*const LoadedFont, Ref)> = Vec::new();
    for style in FontStyle::ALL {
        let font = catalog
            .font(style)
            .expect("embedded catalog has a font per style");
        let key = std::sync::Arc::as_ptr(font);
        let font_ref = match embedded.iter().find(|(k, _)| *k == key) {
            Some((_, r)) => *r,
            None => {
                let r = embed_font(pdf, alloc, font, used, style);
                embedded.push((key, r));
                r
            }
        };
        refs[style.index()] = font_ref;
    }
    refs
}

/// Embed a TrueType font as a Type0/CIDFontType2 with Identity-H
/// encoding and a ToUnicode map covering the used characters.
fn embed_font(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
    font: &LoadedFont,
    used: &BTreeSet<char>,
    style: FontStyle,
) -> Ref {
    let type0_ref = alloc();
    let cid_ref = alloc();
    let desc_ref = alloc();
    let cmap_ref = alloc();
    let data_ref = alloc();

    let base_name = font.postscript_name.clone();
    let system_info = || SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    };

    let mut gid_widths: BTreeMap<u16, f32> = BTreeMap::new();
    gid_widths.insert(0, font.default_advance());
    let mut cmap = UnicodeCmap::new(Name(b"Adobe-Identity-UCS"), system_info());
    for &ch in used {
        if let Some((gid, advance)) = font.glyph(ch) {
            gid_widths.insert(gid, advance);
            cmap.pair(gid, ch);
        }
    }
    pdf.cmap(cmap_ref, &cmap.finish());

    {
        let mut stream = pdf.stream(data_ref, &font.data);
        stream.pair(Name(b"Length1"), font.data.len() as i32);
    }

    {
        let mut type0 = pdf.type0_font(type0_ref);
        type0.base_font(Name(base_name.as_bytes()));
        type0.encoding_predefined(Name(b"Identity-H"));
        type0.descendant_font(cid_ref);
        type0.to_unicode(cmap_ref);
    }

    {
        let mut cid = pdf.cid_font(cid_ref);
        cid.subtype(CidFontType::Type2);
        cid.base_font(Name(base_name.as_bytes()));
        cid.system_info(system_info());
        cid.font_descriptor(desc_ref);
        cid.default_width(font.default_advance());
        cid.cid_to_gid_map_predefined(Name(b"Identity"));

        // Contiguous gid runs compress the widths array.
        let mut runs: Vec<(u16, Vec<f32>)> = Vec::new();
        for (&gid, &w) in &gid_widths {
            let contiguous = matches!(
                runs.last(),
                Some((start, ws)) if *start as usize + ws.len() == gid as usize
            );
            if contiguous {
                runs.last_mut().expect("checked non-empty").1.push(w);
            } else {
                runs.push((gid, vec![w]));
            }
        }
        let mut widths = cid.widths();
        for (start, ws) in runs {
            widths.consecutive(start, ws);
        }
    }

    {
        let mut desc = pdf.font_descriptor(desc_ref);
        desc.name(Name(base_name.as_bytes()));
        let mut flags = FontFlags::NON_SYMBOLIC;
        if style == FontStyle::Italic {
            flags |= FontFlags::ITALIC;
        }
        desc.flags(flags);
        desc.bbox(Rect::new(font.bbox[0], font.bbox[1], font.bbox[2], font.bbox[3]));
        desc.italic_angle(if style == FontStyle::Italic { -12.0 } else { 0.0 });
        desc.ascent(font.ascent);
        desc.descent(font.descent);
        desc.cap_height(font.cap_height);
        desc.stem_v(if style == FontStyle::Bold { 120.0 } else { 80.0 });
        desc.font_file2(data_ref);
    }

    type0_ref
}

fn pdf_date(ts: DateTime<Utc>) -> Date {
    Date::new(ts.year().clamp(0, u16::MAX as i32) as u16)
        .month(ts.month() as u8)
        .day(ts.day() as u8)
        .hour(ts.hour() as u8)
        .minute(ts.minute() as u8)
        .second(ts.second() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn builtin_renderer() -> PdfRenderer {
        PdfRenderer::with_catalog(RenderOptions::new(), FontCatalog::builtin())
    }

    fn doc_from(text: &str, title: &str) -> Document {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Document::new(title, ts, crate::parser::parse_blocks(text))
    }

    #[test]
    fn test_render_produces_pdf_magic() {
        let renderer = builtin_renderer();
        let result = renderer.render(&doc_from("hello world", "T")).unwrap();
        assert!(result.pdf.starts_with(b"%PDF-"));
        assert!(result.font_fallback);
    }

    #[test]
    fn test_empty_input_renders_header_only_page() {
        let renderer = builtin_renderer();
        let result = renderer.render(&doc_from("", "")).unwrap();
        assert!(!result.is_empty());
        assert_eq!(result.page_count(), 1);
    }

    #[test]
    fn test_collect_used_chars_covers_blocks() {
        let doc = doc_from("# Head\n\n| a | b |\n\n1. item", "Title");
        let used = collect_used_chars(&doc);
        for ch in ['H', 'a', 'b', 'i', 'T', '\u{2022}', ' '] {
            assert!(used.contains(&ch), "missing {:?}", ch);
        }
    }

    #[test]
    fn test_deterministic_output() {
        let renderer = builtin_renderer();
        let doc = doc_from("# Title\n\nSome **bold** text\n\n- a\n- b", "Same");
        let first = renderer.render(&doc).unwrap();
        let second = renderer.render(&doc).unwrap();
        assert_eq!(first.pdf, second.pdf);
    }

    #[test]
    fn test_link_annotation_written() {
        let renderer = builtin_renderer();
        let result = renderer
            .render(&doc_from("see [docs](https://example.com)", "T"))
            .unwrap();
        assert_eq!(result.stats.link_count, 1);
        // Uncompressed object tree: the URI action must appear verbatim.
        let text = String::from_utf8_lossy(&result.pdf);
        assert!(text.contains("https://example.com"));
    }
}
