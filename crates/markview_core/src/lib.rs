//! Core library for markdown rendering and analysis.
//!
//! This crate turns raw markdown text into an HTML fragment and provides
//! the lightweight text passes used alongside a preview: an outline of the
//! headings, document statistics and full-text search.
//!
//! Every operation is a pure function of its input. [`MarkdownRenderer`]
//! bundles render options with a code highlighter and can be shared between
//! threads.
//!
//! # Modules
//!
//! - [`parser`] - Block and inline parsing into a [`document::Document`] tree
//! - [`document`] - The parsed document model
//! - [`render`] - Document to HTML conversion with GitHub-style features
//! - [`toc`] - Table of contents extraction
//! - [`stats`] - Document statistics calculation
//! - [`search`] - Case-insensitive text search with context snippets

pub mod document;
pub mod parser;
pub mod render;
pub mod search;
pub mod stats;
pub mod toc;

// Re-export commonly used types at crate root
pub use document::{Block, Document, Inline};
pub use parser::{parse, ParseOptions};
pub use render::{
    to_html, CodeHighlighter, MarkdownRenderer, RenderError, RenderOptions, RenderResult,
    TextRenderer,
};
pub use search::{search, SearchResult};
pub use stats::{calculate_document_stats, DocumentStats};
pub use toc::{extract_outline, slugify, TocItem};
