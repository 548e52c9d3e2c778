//! Renderer traits for text documents.
//!
//! This module defines the [`TextRenderer`] trait that provides a common
//! interface for collaborators which only need rendering and statistics.

use super::RenderResult;
use crate::stats::DocumentStats;

/// Error type for rendering operations.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Invalid UTF-8 encoding in content.
    #[error("Invalid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

/// Trait for text-based document renderers.
///
/// Text renderers process UTF-8 content and produce HTML output.
/// They support line mapping for scroll synchronization.
pub trait TextRenderer: Send + Sync {
    /// Render text content to HTML.
    fn render_text(&self, content: &str) -> RenderResult;

    /// Render raw bytes, which must be valid UTF-8.
    fn render_bytes(&self, content: &[u8]) -> Result<RenderResult, RenderError> {
        let content = std::str::from_utf8(content)?;
        Ok(self.render_text(content))
    }

    /// Calculate statistics from text content.
    fn calculate_text_stats(&self, content: &str) -> DocumentStats;
}
