//! Colors, font sizes, and page geometry.

use serde::{Deserialize, Serialize};

/// Points per millimetre. Page geometry mirrors the millimetre-based
/// layout of the report format, converted to PDF points.
pub(crate) const MM: f32 = 72.0 / 25.4;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red component
    pub r: u8,
    /// Green component
    pub g: u8,
    /// Blue component
    pub b: u8,
}

impl Color {
    /// Create a color from 8-bit components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to the `0.0..=1.0` range PDF operators take.
    pub fn to_unit_rgb(self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

/// Colors and font sizes applied during layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Headings and the document title
    pub accent: Color,
    /// Body text
    pub body: Color,
    /// The generation timestamp line
    pub muted: Color,
    /// Link text
    pub link: Color,
    /// Table header row background
    pub table_header: Color,
    /// Table cell borders and horizontal rules
    pub table_border: Color,

    /// Document title size in points
    pub title_size: f32,
    /// Timestamp line size in points
    pub timestamp_size: f32,
    /// Level-1 heading size in points
    pub h1_size: f32,
    /// Level-2 heading size in points
    pub h2_size: f32,
    /// Body and list text size in points
    pub body_size: f32,
    /// Table cell text size in points
    pub table_size: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::new(41, 98, 255),
            body: Color::new(33, 33, 33),
            muted: Color::new(128, 128, 128),
            link: Color::new(0, 102, 204),
            table_header: Color::new(240, 240, 240),
            table_border: Color::new(200, 200, 200),

            title_size: 18.0,
            timestamp_size: 9.0,
            h1_size: 16.0,
            h2_size: 12.0,
            body_size: 11.0,
            table_size: 10.0,
        }
    }
}

/// Page size presets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PageSize {
    /// 210 × 297 mm
    A4,
    /// 8.5 × 11 in
    Letter,
    /// Explicit dimensions in points
    Custom {
        /// Page width in points
        width: f32,
        /// Page height in points
        height: f32,
    },
}

impl PageSize {
    /// Page dimensions in points as `(width, height)`.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Custom { width, height } => (width, height),
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::A4
    }
}

/// Resolved page geometry: dimensions plus content-area margins.
///
/// The bottom margin is larger than the others; it is the auto-page-break
/// threshold, so content never renders into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Left margin in points
    pub margin_left: f32,
    /// Right margin in points
    pub margin_right: f32,
    /// Top margin in points
    pub margin_top: f32,
    /// Bottom margin in points (page-break threshold)
    pub margin_bottom: f32,
}

impl PageMetrics {
    /// Standard margins for a page size: 10 mm sides and top, 15 mm
    /// bottom.
    pub fn for_size(size: PageSize) -> Self {
        let (width, height) = size.dimensions();
        Self {
            width,
            height,
            margin_left: 10.0 * MM,
            margin_right: 10.0 * MM,
            margin_top: 10.0 * MM,
            margin_bottom: 15.0 * MM,
        }
    }

    /// Usable width between the side margins.
    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// X coordinate of the right content edge.
    pub fn content_right(&self) -> f32 {
        self.width - self.margin_right
    }

    /// Y coordinate of the top content edge (PDF origin is bottom-left).
    pub fn top_y(&self) -> f32 {
        self.height - self.margin_top
    }

    /// Y coordinate below which nothing is drawn.
    pub fn bottom_y(&self) -> f32 {
        self.margin_bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_to_unit_rgb() {
        let (r, g, b) = Color::new(255, 0, 102).to_unit_rgb();
        assert!((r - 1.0).abs() < f32::EPSILON);
        assert!(g.abs() < f32::EPSILON);
        assert!((b - 0.4).abs() < 0.01);
    }

    #[test]
    fn test_page_sizes() {
        let (w, h) = PageSize::A4.dimensions();
        assert!(w < h);
        let (w, h) = PageSize::Custom {
            width: 100.0,
            height: 50.0,
        }
        .dimensions();
        assert_eq!((w, h), (100.0, 50.0));
    }

    #[test]
    fn test_page_metrics() {
        let m = PageMetrics::for_size(PageSize::A4);
        assert!(m.content_width() > 0.0);
        assert!(m.top_y() > m.bottom_y());
        // Break threshold sits above the physical page bottom.
        assert!(m.margin_bottom > m.margin_top);
    }
}
