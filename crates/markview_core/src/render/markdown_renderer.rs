//! Markdown document renderer implementation.
//!
//! This module provides the [`MarkdownRenderer`] which bundles render
//! options with a code highlighter and exposes every engine operation.

use super::highlight::CodeHighlighter;
use super::traits::{RenderError, TextRenderer};
use super::{render_with, RenderOptions, RenderResult};
use crate::search::{search, SearchResult};
use crate::stats::{calculate_document_stats, DocumentStats};
use crate::toc::{extract_outline, TocItem};

/// Markdown document renderer.
///
/// Converts markdown content to HTML with support for GitHub Flavored Markdown,
/// syntax highlighting, and optional line mapping for scroll synchronization.
/// A renderer holds no per-call state and can be shared between threads.
pub struct MarkdownRenderer {
    options: RenderOptions,
    highlighter: Box<dyn CodeHighlighter>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl MarkdownRenderer {
    /// Create a new markdown renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        let highlighter = options.highlighter();
        Self {
            options,
            highlighter,
        }
    }

    /// Create a renderer that highlights code with a custom strategy,
    /// ignoring `options.highlight_theme`.
    pub fn with_highlighter(
        options: RenderOptions,
        highlighter: impl CodeHighlighter + 'static,
    ) -> Self {
        Self {
            options,
            highlighter: Box::new(highlighter),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn render(&self, content: &str) -> RenderResult {
        render_with(content, &self.options, self.highlighter.as_ref())
    }

    pub fn render_bytes(&self, content: &[u8]) -> Result<RenderResult, RenderError> {
        let content = std::str::from_utf8(content)?;
        Ok(self.render(content))
    }

    pub fn outline(&self, content: &str) -> Vec<TocItem> {
        extract_outline(content)
    }

    pub fn stats(&self, content: &str) -> DocumentStats {
        calculate_document_stats(content)
    }

    pub fn search(&self, content: &str, query: &str) -> Vec<SearchResult> {
        search(content, query)
    }
}

impl TextRenderer for MarkdownRenderer {
    fn render_text(&self, content: &str) -> RenderResult {
        self.render(content)
    }

    fn calculate_text_stats(&self, content: &str) -> DocumentStats {
        calculate_document_stats(content)
    }
}
