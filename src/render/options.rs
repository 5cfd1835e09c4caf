//! Rendering options and configuration.

use super::fonts::FontPaths;
use super::theme::{PageSize, Theme};
use chrono::{DateTime, Utc};

/// Options for rendering a document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Page size preset
    pub page_size: PageSize,

    /// Colors and font sizes
    pub theme: Theme,

    /// Timestamp shown in the document header; `None` uses the current
    /// time. Injecting a fixed value makes output byte-reproducible.
    pub timestamp: Option<DateTime<Utc>>,

    /// Font file candidates probed at initialization
    pub font_paths: FontPaths,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.page_size = size;
        self
    }

    /// Set the theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Inject a fixed generation timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the font candidate paths.
    pub fn with_font_paths(mut self, paths: FontPaths) -> Self {
        self.font_paths = paths;
        self
    }

    /// Skip font probing entirely and use the built-in Latin-only
    /// fallback.
    pub fn ascii_only(mut self) -> Self {
        self.font_paths = FontPaths::none();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            theme: Theme::default(),
            timestamp: None,
            font_paths: FontPaths::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_options_builder() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let options = RenderOptions::new()
            .with_page_size(PageSize::Letter)
            .with_timestamp(ts)
            .ascii_only();

        assert_eq!(options.page_size, PageSize::Letter);
        assert_eq!(options.timestamp, Some(ts));
        assert!(options.font_paths.regular.is_empty());
    }
}
