//! Font resolution, metrics, and text encoding.
//!
//! A small fixed list of filesystem locations is probed once for a
//! Unicode-capable family (DejaVu Sans, with Arial Unicode as the macOS
//! fallback). The first existing, parseable file wins per style; a
//! missing bold or italic variant reuses the regular file. When no
//! regular candidate is found at all, rendering falls back to the
//! built-in Helvetica family. The fallback is Latin-only, so non-Latin
//! text will display incorrectly, but the render still completes; it is
//! logged and flagged on the catalog so callers can surface it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};

/// The three font styles the layout engine switches between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    /// Regular body text
    Regular,
    /// Bold text and headings
    Bold,
    /// Italic text
    Italic,
}

impl FontStyle {
    /// All styles, in the order fonts are registered in the PDF.
    pub const ALL: [FontStyle; 3] = [FontStyle::Regular, FontStyle::Bold, FontStyle::Italic];

    /// Base font name of the built-in fallback for this style.
    pub(crate) fn builtin_base(self) -> &'static str {
        match self {
            FontStyle::Regular => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
            FontStyle::Italic => "Helvetica-Oblique",
        }
    }

    /// PDF resource name the style is registered under on every page.
    pub(crate) fn resource_name(self) -> &'static str {
        match self {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
            FontStyle::Italic => "F3",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            FontStyle::Regular => 0,
            FontStyle::Bold => 1,
            FontStyle::Italic => 2,
        }
    }
}

/// Candidate font file locations per style, probed in order.
#[derive(Debug, Clone)]
pub struct FontPaths {
    /// Candidates for the regular style
    pub regular: Vec<PathBuf>,
    /// Candidates for the bold style
    pub bold: Vec<PathBuf>,
    /// Candidates for the italic style
    pub italic: Vec<PathBuf>,
}

impl FontPaths {
    /// An empty candidate list, forcing the built-in fallback.
    ///
    /// Useful for tests and for deliberately ASCII-only output.
    pub fn none() -> Self {
        Self {
            regular: Vec::new(),
            bold: Vec::new(),
            italic: Vec::new(),
        }
    }

    fn for_style(&self, style: FontStyle) -> &[PathBuf] {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

impl Default for FontPaths {
    fn default() -> Self {
        let paths = |names: &[&str]| -> Vec<PathBuf> {
            names.iter().map(PathBuf::from).collect()
        };
        Self {
            regular: paths(&[
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
                "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
                "/Library/Fonts/Arial Unicode.ttf",
            ]),
            bold: paths(&[
                "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
                "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
                "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
                "/Library/Fonts/Arial Unicode.ttf",
            ]),
            italic: paths(&[
                "/usr/share/fonts/truetype/dejavu/DejaVuSans-Oblique.ttf",
                "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Oblique.ttf",
                "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
                "/Library/Fonts/Arial Unicode.ttf",
            ]),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct GlyphMetrics {
    gid: u16,
    /// Horizontal advance scaled to 1000 units per em
    advance: f32,
}

/// A parsed TrueType font: raw data for embedding plus the metrics the
/// layout engine needs. All metric fields are scaled to 1000 units per
/// em, the scale PDF font dictionaries use.
pub struct LoadedFont {
    /// Raw font file bytes, embedded verbatim into the PDF
    pub data: Vec<u8>,
    /// PostScript name, used as the PDF base font name
    pub postscript_name: String,
    /// Typographic ascent
    pub ascent: f32,
    /// Typographic descent (negative)
    pub descent: f32,
    /// Capital height
    pub cap_height: f32,
    /// Font bounding box `[x_min, y_min, x_max, y_max]`
    pub bbox: [f32; 4],
    /// Total number of glyphs in the font
    pub glyph_count: u16,
    glyphs: BTreeMap<char, GlyphMetrics>,
    default_advance: f32,
}

impl LoadedFont {
    /// Parse a font from raw bytes, extracting the character map and
    /// advances up front so the face does not need to be re-parsed.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| Error::FontParse(e.to_string()))?;

        let scale = 1000.0 / face.units_per_em() as f32;
        let default_advance = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .unwrap_or(500) as f32
            * scale;

        let mut glyphs = BTreeMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|cp| {
                    let Some(ch) = char::from_u32(cp) else { return };
                    if glyphs.contains_key(&ch) {
                        return;
                    }
                    if let Some(gid) = face.glyph_index(ch) {
                        let advance =
                            face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale;
                        glyphs.insert(
                            ch,
                            GlyphMetrics {
                                gid: gid.0,
                                advance,
                            },
                        );
                    }
                });
            }
        }

        let postscript_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME && n.is_unicode())
            .and_then(|n| n.to_string())
            .unwrap_or_else(|| "Embedded".to_string());

        let bbox = face.global_bounding_box();

        Ok(Self {
            postscript_name,
            ascent: face.ascender() as f32 * scale,
            descent: face.descender() as f32 * scale,
            cap_height: face.capital_height().unwrap_or(face.ascender()) as f32 * scale,
            bbox: [
                bbox.x_min as f32 * scale,
                bbox.y_min as f32 * scale,
                bbox.x_max as f32 * scale,
                bbox.y_max as f32 * scale,
            ],
            glyph_count: face.number_of_glyphs(),
            glyphs,
            default_advance,
            data,
        })
    }

    /// Read and parse a font file.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_bytes(fs::read(path)?)
    }

    /// Glyph id and 1000-unit advance for a character, if mapped.
    pub fn glyph(&self, c: char) -> Option<(u16, f32)> {
        self.glyphs.get(&c).map(|g| (g.gid, g.advance))
    }

    /// Width of `text` at `size` points. Unmapped characters count as
    /// the `.notdef` advance.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        let units: f32 = text
            .chars()
            .map(|c| {
                self.glyphs
                    .get(&c)
                    .map(|g| g.advance)
                    .unwrap_or(self.default_advance)
            })
            .sum();
        units * size / 1000.0
    }

    /// Advance of the `.notdef` glyph, used for unmapped characters.
    pub fn default_advance(&self) -> f32 {
        self.default_advance
    }

    /// Encode `text` as big-endian glyph ids for an Identity-H font.
    /// Unmapped characters encode as `.notdef`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(text.len() * 2);
        for c in text.chars() {
            let gid = self.glyphs.get(&c).map(|g| g.gid).unwrap_or(0);
            bytes.extend_from_slice(&gid.to_be_bytes());
        }
        bytes
    }
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("postscript_name", &self.postscript_name)
            .field("glyph_count", &self.glyph_count)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Where glyphs come from for this render.
#[derive(Debug)]
enum FontSource {
    /// Embedded TrueType fonts, one per style (entries may share a font
    /// when a variant was missing)
    Embedded([Arc<LoadedFont>; 3]),
    /// Built-in Helvetica family, WinAnsi-encoded, Latin only
    Builtin,
}

/// The initialization-time font capability handed to the layout engine.
///
/// Built once per render from a [`FontPaths`] probe; immutable afterward.
#[derive(Debug)]
pub struct FontCatalog {
    source: FontSource,
    fallback: bool,
}

/// Per-character width factor of the built-in fallback. The fallback is
/// already visually degraded by policy, so an approximation is enough
/// for wrapping.
const BUILTIN_CHAR_WIDTH: f32 = 0.6;

impl FontCatalog {
    /// Probe the default candidate paths.
    pub fn resolve() -> Self {
        Self::resolve_with(&FontPaths::default())
    }

    /// Probe the given candidate paths.
    ///
    /// Never fails: a missing or unparseable candidate falls through to
    /// the next one, and an empty result falls back to the built-in
    /// Latin-only family.
    pub fn resolve_with(paths: &FontPaths) -> Self {
        match load_first(paths.for_style(FontStyle::Regular)) {
            Some(regular) => {
                let regular = Arc::new(regular);
                let bold = load_first(paths.for_style(FontStyle::Bold))
                    .map(Arc::new)
                    .unwrap_or_else(|| Arc::clone(&regular));
                let italic = load_first(paths.for_style(FontStyle::Italic))
                    .map(Arc::new)
                    .unwrap_or_else(|| Arc::clone(&regular));
                log::debug!(
                    "resolved font family '{}' ({} glyphs)",
                    regular.postscript_name,
                    regular.glyph_count
                );
                Self {
                    source: FontSource::Embedded([regular, bold, italic]),
                    fallback: false,
                }
            }
            None => {
                log::warn!(
                    "no Unicode font found; falling back to built-in Helvetica (Latin only)"
                );
                Self {
                    source: FontSource::Builtin,
                    fallback: true,
                }
            }
        }
    }

    /// A catalog that always uses the built-in fallback.
    pub fn builtin() -> Self {
        Self {
            source: FontSource::Builtin,
            fallback: true,
        }
    }

    /// Whether the Latin-only fallback is active.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// The embedded font for a style, if fonts were resolved.
    pub fn font(&self, style: FontStyle) -> Option<&Arc<LoadedFont>> {
        match &self.source {
            FontSource::Embedded(fonts) => Some(&fonts[style.index()]),
            FontSource::Builtin => None,
        }
    }

    /// Width of `text` at `size` points in the given style.
    pub fn measure(&self, style: FontStyle, text: &str, size: f32) -> f32 {
        match self.font(style) {
            Some(font) => font.measure(text, size),
            None => text.chars().count() as f32 * size * BUILTIN_CHAR_WIDTH,
        }
    }

    /// Ascent as a fraction of the font size, used to place baselines.
    pub fn ascent_ratio(&self, style: FontStyle) -> f32 {
        match self.font(style) {
            Some(font) => font.ascent / 1000.0,
            None => 0.75,
        }
    }

    /// Encode `text` for drawing in the given style: glyph ids for
    /// embedded fonts, WinAnsi bytes for the built-in fallback.
    pub(crate) fn encode(&self, style: FontStyle, text: &str) -> Vec<u8> {
        match self.font(style) {
            Some(font) => font.encode(text),
            None => to_winansi_bytes(text),
        }
    }
}

fn load_first(candidates: &[PathBuf]) -> Option<LoadedFont> {
    for path in candidates {
        if !path.exists() {
            continue;
        }
        match LoadedFont::from_file(path) {
            Ok(font) => return Some(font),
            Err(e) => {
                log::warn!("skipping font candidate {}: {}", path.display(), e);
            }
        }
    }
    None
}

/// Encode text for the built-in WinAnsi-encoded fallback fonts.
/// Characters outside the encoding become `?`.
pub(crate) fn to_winansi_bytes(text: &str) -> Vec<u8> {
    text.chars().map(winansi_byte).collect()
}

fn winansi_byte(c: char) -> u8 {
    match c {
        '\u{20}'..='\u{7e}' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u8,
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => b'?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_paths_fall_back_to_builtin() {
        let catalog = FontCatalog::resolve_with(&FontPaths::none());
        assert!(catalog.is_fallback());
        assert!(catalog.font(FontStyle::Regular).is_none());
    }

    #[test]
    fn test_unparseable_candidate_falls_through() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a font").unwrap();

        let paths = FontPaths {
            regular: vec![file.path().to_path_buf()],
            bold: Vec::new(),
            italic: Vec::new(),
        };
        let catalog = FontCatalog::resolve_with(&paths);
        assert!(catalog.is_fallback());
    }

    #[test]
    fn test_builtin_measure_is_flat_approximation() {
        let catalog = FontCatalog::builtin();
        let w = catalog.measure(FontStyle::Regular, "abcd", 10.0);
        assert!((w - 4.0 * 10.0 * BUILTIN_CHAR_WIDTH).abs() < f32::EPSILON);
        // Bold is not measured differently in the fallback.
        let wb = catalog.measure(FontStyle::Bold, "abcd", 10.0);
        assert_eq!(w, wb);
    }

    #[test]
    fn test_winansi_encoding() {
        assert_eq!(to_winansi_bytes("Abc"), vec![0x41, 0x62, 0x63]);
        // Bullet and dashes map into the 0x80..0x9f window.
        assert_eq!(to_winansi_bytes("\u{2022}"), vec![0x95]);
        assert_eq!(to_winansi_bytes("\u{2014}"), vec![0x97]);
        // Cyrillic is outside WinAnsi and degrades to '?'.
        assert_eq!(to_winansi_bytes("\u{0434}\u{0430}"), vec![b'?', b'?']);
    }

    #[test]
    fn test_builtin_base_names() {
        assert_eq!(FontStyle::Regular.builtin_base(), "Helvetica");
        assert_eq!(FontStyle::Bold.builtin_base(), "Helvetica-Bold");
        assert_eq!(FontStyle::Italic.builtin_base(), "Helvetica-Oblique");
    }
}
