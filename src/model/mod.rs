//! Document model types for markdown rendering.
//!
//! This module defines the intermediate representation that bridges
//! markdown parsing and PDF layout: block-level nodes, inline spans, and
//! the document wrapper handed to the layout engine.

mod block;
mod document;
mod span;

pub use block::{Block, HeadingLevel};
pub use document::{Document, DEFAULT_TITLE};
pub use span::Span;
