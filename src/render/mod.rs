//! Rendering module: fonts, layout, and PDF assembly.

mod fonts;
mod layout;
mod options;
mod pdf;
mod result;
mod theme;

pub use fonts::{FontCatalog, FontPaths, FontStyle, LoadedFont};
pub use options::RenderOptions;
pub use pdf::PdfRenderer;
pub use result::{RenderResult, RenderStats};
pub use theme::{Color, PageMetrics, PageSize, Theme};
