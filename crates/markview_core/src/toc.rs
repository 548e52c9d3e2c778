//! Table of contents extraction for markdown documents.
//!
//! This module provides functionality to:
//! - Parse ATX heading lines
//! - Build a flat outline in document order
//! - Generate URL-safe slugs from heading text

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

static HEADING_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());

/// Anything that is not a letter, a decimal digit, `_`, a space or a hyphen.
static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{Nd}_ -]+").unwrap());

/// Converts heading text to a URL-safe slug following GitHub's convention.
///
/// GitHub's algorithm:
/// 1. Convert to lowercase
/// 2. Replace spaces with hyphens
/// 3. Remove all characters except letters, decimal digits, hyphens, and underscores
/// 4. Collapse multiple consecutive hyphens into one
///
/// # Example
///
/// ```
/// use markview_core::toc::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("API Reference (v2)"), "api-reference-v2");
/// ```
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    // Numerals such as `²` or `Ⅳ` are not decimal digits and are dropped.
    NON_SLUG
        .replace_all(&lower, "")
        .split([' ', '-'])
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// A heading entry of the document outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocItem {
    /// Heading level, `1..=6`.
    pub level: u8,
    /// Heading text with surrounding whitespace removed.
    pub title: String,
    /// Anchor id, the slug of `title`.
    pub id: String,
}

impl FromStr for TocItem {
    type Err = ();

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let caps = HEADING_LINE.captures(line).ok_or(())?;
        let level = caps.get(1).map(|m| m.as_str().len()).ok_or(())?;
        let title = caps.get(2).map(|m| m.as_str().trim()).ok_or(())?;
        Ok(Self {
            level: level as u8,
            title: title.to_string(),
            id: slugify(title),
        })
    }
}

/// Extracts the outline of `content` from its ATX heading lines.
///
/// This is a line based scan of the raw text, independent of rendering:
/// every line that looks like `# Title` is reported, in document order,
/// without deduplicating ids.
///
/// # Example
///
/// ```
/// use markview_core::toc::extract_outline;
///
/// let outline = extract_outline("# Hello World\n\ntext\n## Next");
/// assert_eq!(outline[0].id, "hello-world");
/// assert_eq!(outline[1].level, 2);
/// ```
pub fn extract_outline(content: &str) -> Vec<TocItem> {
    content
        .split('\n')
        .filter_map(|line| line.parse::<TocItem>().ok())
        .collect()
}
