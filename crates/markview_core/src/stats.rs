//! Document statistics calculation for markdown content.
//!
//! Provides word, character, line and paragraph counts over the raw text.

use serde::{Deserialize, Serialize};

/// Document statistics for display in the preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Whitespace-delimited tokens, markdown syntax included
    pub words: usize,
    /// Unicode scalar values, whitespace and newlines included
    pub characters: usize,
    /// Segments between `\n` separators; an empty document has one line
    pub lines: usize,
    /// Runs of consecutive non-blank lines
    pub paragraphs: usize,
}

/// Calculate document statistics from markdown content.
///
/// # Arguments
///
/// * `content` - The raw markdown text
///
/// # Returns
///
/// A `DocumentStats` struct containing various statistics about the document.
///
/// # Example
///
/// ```
/// use markview_core::stats::calculate_document_stats;
///
/// let stats = calculate_document_stats("a b\n\nc");
/// assert_eq!(stats.words, 3);
/// assert_eq!(stats.lines, 3);
/// assert_eq!(stats.paragraphs, 2);
/// ```
pub fn calculate_document_stats(content: &str) -> DocumentStats {
    let mut stats = DocumentStats {
        characters: content.chars().count(),
        ..Default::default()
    };

    let mut in_paragraph = false;
    for line in content.split('\n') {
        stats.lines += 1;
        stats.words += line.split_whitespace().count();

        let blank = line.trim().is_empty();
        if !blank && !in_paragraph {
            stats.paragraphs += 1;
        }
        in_paragraph = !blank;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_stats() {
        let content = "Hello world!\n\nThis is a test.";
        let stats = calculate_document_stats(content);

        assert_eq!(stats.lines, 3);
        assert_eq!(stats.words, 6);
        assert_eq!(stats.paragraphs, 2);
        assert_eq!(stats.characters, content.chars().count());
    }

    #[test]
    fn test_empty_content() {
        let stats = calculate_document_stats("");
        assert_eq!(stats.words, 0);
        assert_eq!(stats.characters, 0);
        assert_eq!(stats.lines, 1);
        assert_eq!(stats.paragraphs, 0);
    }

    #[test]
    fn test_small_document() {
        let stats = calculate_document_stats("a b\n\nc");
        assert_eq!(
            stats,
            DocumentStats {
                words: 3,
                characters: 6,
                lines: 3,
                paragraphs: 2,
            }
        );
    }

    #[test]
    fn test_trailing_newline_adds_a_line() {
        let stats = calculate_document_stats("one\n");
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.paragraphs, 1);
    }

    #[test]
    fn test_whitespace_only_lines_separate_paragraphs() {
        let stats = calculate_document_stats("a\n  \t\nb\nc\n\n\nd");
        assert_eq!(stats.paragraphs, 3);
    }

    #[test]
    fn test_markdown_syntax_counts_as_words() {
        let stats = calculate_document_stats("# Heading\n\n- item");
        assert_eq!(stats.words, 4);
    }

    #[test]
    fn test_multibyte_characters() {
        let stats = calculate_document_stats("héllo 世界");
        assert_eq!(stats.characters, 8);
        assert_eq!(stats.words, 2);
    }

    #[test]
    fn test_serialize() {
        let stats = calculate_document_stats("a");
        assert_eq!(
            serde_json::to_string(&stats).unwrap(),
            r#"{"words":1,"characters":1,"lines":1,"paragraphs":1}"#
        );
    }
}
