//! Error types for the mdpress library.

use std::io;
use thiserror::Error;

/// Result type alias for mdpress operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while producing a document.
///
/// Malformed markdown and missing fonts never surface here: the parser is
/// lenient by design and the font resolver degrades to a built-in fallback.
/// These variants cover the remaining genuinely exceptional cases.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading a font file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A font file was found but could not be parsed.
    #[error("Font parsing error: {0}")]
    FontParse(String),

    /// Error serializing a parsed document to JSON.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error during PDF generation.
    #[error("Rendering error: {0}")]
    Render(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::FontParse("bad magic".to_string());
        assert_eq!(err.to_string(), "Font parsing error: bad magic");

        let err = Error::Render("page overflow".to_string());
        assert_eq!(err.to_string(), "Rendering error: page overflow");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
