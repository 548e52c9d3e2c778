//! Markdown to HTML rendering with GitHub-style features.
//!
//! This module provides markdown-to-HTML conversion with support for:
//! - GitHub Flavored Markdown (tables, strikethrough, task lists, autolinks)
//! - Footnotes collected into a trailing section
//! - Syntax highlighted code blocks through a pluggable [`CodeHighlighter`]
//! - Typographic punctuation and heading IDs for anchor links
//! - Source line mapping for scroll synchronization

mod highlight;
mod html;
mod markdown_renderer;
mod traits;
mod typographer;

use crate::document::{Block, Document};
use crate::parser::{parse, ParseOptions};
use serde::{Deserialize, Serialize};

pub use highlight::{CodeHighlighter, PlainText, SyntectHighlighter, DEFAULT_THEME};
pub use html::escape_html;
pub use markdown_renderer::MarkdownRenderer;
pub use traits::{RenderError, TextRenderer};

/// Options for rendering markdown to HTML.
///
/// Every extension is enabled by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct RenderOptions {
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable task list items ([x] and [ ])
    pub tasklists: bool,
    /// Link bare URLs, `www.` addresses and emails
    pub autolinks: bool,
    /// Enable footnote references and definitions
    pub footnotes: bool,
    /// Render soft line breaks as `<br />`
    pub hard_wraps: bool,
    /// Replace dashes, ellipses and straight quotes with typographic entities
    pub typographer: bool,
    /// Emit raw HTML as is instead of omitting it
    pub unsafe_html: bool,
    /// Add slug `id`s to headings
    pub heading_ids: bool,
    /// Report the source line of each rendered top-level block
    pub line_map: bool,
    /// syntect theme used for fenced code, `None` disables highlighting
    pub highlight_theme: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            tasklists: true,
            autolinks: true,
            footnotes: true,
            hard_wraps: true,
            typographer: true,
            unsafe_html: true,
            heading_ids: true,
            line_map: false,
            highlight_theme: Some(DEFAULT_THEME.to_string()),
        }
    }
}

impl RenderOptions {
    /// Plain CommonMark: every extension and substitution disabled.
    pub fn commonmark() -> Self {
        Self {
            tables: false,
            strikethrough: false,
            tasklists: false,
            autolinks: false,
            footnotes: false,
            hard_wraps: false,
            typographer: false,
            unsafe_html: true,
            heading_ids: false,
            line_map: false,
            highlight_theme: None,
        }
    }

    /// The parser extensions these options turn on.
    pub fn to_parse_options(&self) -> ParseOptions {
        ParseOptions {
            tables: self.tables,
            strikethrough: self.strikethrough,
            tasklists: self.tasklists,
            autolinks: self.autolinks,
            footnotes: self.footnotes,
        }
    }

    /// The highlighter selected by `highlight_theme`.
    pub fn highlighter(&self) -> Box<dyn CodeHighlighter> {
        match &self.highlight_theme {
            Some(theme) => Box::new(SyntectHighlighter::new(theme.as_str())),
            None => Box::new(PlainText),
        }
    }
}

/// Result of rendering markdown to HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered HTML content
    pub html: String,
    /// Source line number (1-indexed) of each rendered top-level element,
    /// empty unless [`RenderOptions::line_map`] is set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_map: Vec<usize>,
}

/// Render markdown content to HTML.
///
/// # Example
///
/// ```
/// use markview_core::render::{to_html, RenderOptions};
///
/// let result = to_html("# Hello\n\nWorld", &RenderOptions::default());
/// assert!(result.html.contains("<h1 id=\"hello\">"));
/// ```
pub fn to_html(markdown_content: &str, options: &RenderOptions) -> RenderResult {
    let highlighter = options.highlighter();
    render_with(markdown_content, options, highlighter.as_ref())
}

pub(crate) fn render_with(
    markdown_content: &str,
    options: &RenderOptions,
    highlighter: &dyn CodeHighlighter,
) -> RenderResult {
    let document = parse(markdown_content, &options.to_parse_options());
    let html = render_document(&document, options, highlighter);

    let line_map = if options.line_map {
        document
            .blocks
            .iter()
            .zip(&document.block_lines)
            .filter(|(block, _)| !matches!(block, Block::FootnoteDefinition { .. }))
            .map(|(_, line)| *line)
            .collect()
    } else {
        Vec::new()
    };

    tracing::debug!(
        blocks = document.blocks.len(),
        html_len = html.len(),
        line_map_length = line_map.len(),
        "Rendered markdown"
    );

    RenderResult { html, line_map }
}

/// Serializes an already parsed document.
pub fn render_document(
    document: &Document,
    options: &RenderOptions,
    highlighter: &dyn CodeHighlighter,
) -> String {
    html::HtmlWriter::new(options, highlighter).render(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(input: &str) -> String {
        to_html(input, &RenderOptions::default()).html
    }

    fn render_plain(input: &str) -> String {
        to_html(input, &RenderOptions::commonmark()).html
    }

    #[test]
    fn test_basic_render() {
        assert_eq!(
            render("# Hello World\n\nThis is **bold** and *em*."),
            "<h1 id=\"hello-world\">Hello World</h1>\n<p>This is <strong>bold</strong> and <em>em</em>.</p>\n"
        );
    }

    #[test]
    fn test_heading_ids_can_be_disabled() {
        assert_eq!(render_plain("## Title"), "<h2>Title</h2>\n");
    }

    #[test]
    fn test_soft_breaks() {
        assert_eq!(render("a\nb"), "<p>a<br />\nb</p>\n");
        assert_eq!(render_plain("a\nb"), "<p>a\nb</p>\n");
    }

    #[test]
    fn test_tight_and_loose_lists() {
        assert_eq!(
            render("- one\n- two"),
            "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n"
        );
        assert_eq!(
            render("1. one\n\n2. two"),
            "<ol>\n<li>\n<p>one</p>\n</li>\n<li>\n<p>two</p>\n</li>\n</ol>\n"
        );
        assert_eq!(render("3. three"), "<ol start=\"3\">\n<li>three</li>\n</ol>\n");
    }

    #[test]
    fn test_nested_tight_list() {
        assert_eq!(
            render("- a\n  - b"),
            "<ul>\n<li>a\n<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_task_list() {
        assert_eq!(
            render("- [x] done\n- [ ] todo"),
            "<ul>\n<li class=\"task-list-item\"><input type=\"checkbox\" disabled=\"\" checked=\"\" /> done</li>\n\
             <li class=\"task-list-item\"><input type=\"checkbox\" disabled=\"\" /> todo</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(
            render("| a | b |\n|:-:|---|\n| 1 | 2 |"),
            "<table>\n<thead>\n<tr>\n<th style=\"text-align:center\">a</th>\n<th>b</th>\n</tr>\n</thead>\n\
             <tbody>\n<tr>\n<td style=\"text-align:center\">1</td>\n<td>2</td>\n</tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_table_without_body() {
        assert_eq!(
            render("| a |\n| - |"),
            "<table>\n<thead>\n<tr>\n<th>a</th>\n</tr>\n</thead>\n</table>\n"
        );
    }

    #[test]
    fn test_code_block_plain() {
        assert_eq!(
            render_plain("```rust\nlet x = a < b;\n```"),
            "<pre><code class=\"language-rust\">let x = a &lt; b;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_code_block_highlighted() {
        let html = render("```rust\nfn main() {}\n```");
        assert!(html.starts_with("<pre><code class=\"language-rust\"><span style="));
        assert!(html.ends_with("</code></pre>\n"));
    }

    #[test]
    fn test_code_is_not_smartened() {
        assert_eq!(render("`a -- \"b\"`"), "<p><code>a -- &quot;b&quot;</code></p>\n");
    }

    #[test]
    fn test_typographer() {
        assert_eq!(
            render("\"Wait\" -- it's..."),
            "<p>&ldquo;Wait&rdquo; &ndash; it&rsquo;s&hellip;</p>\n"
        );
    }

    #[test]
    fn test_links_and_images() {
        assert_eq!(
            render("[a b](/x y \"T\") ![alt](/i.png)"),
            "<p>[a b](/x y &ldquo;T&rdquo;) <img src=\"/i.png\" alt=\"alt\" /></p>\n"
        );
        assert_eq!(
            render("[docs](</x y> \"T\")"),
            "<p><a href=\"/x%20y\" title=\"T\">docs</a></p>\n"
        );
    }

    #[test]
    fn test_autolink_text_is_untouched() {
        assert_eq!(
            render("see https://example.com/a--b"),
            "<p>see <a href=\"https://example.com/a--b\">https://example.com/a--b</a></p>\n"
        );
    }

    #[test]
    fn test_raw_html() {
        let input = "<div>\nraw\n</div>\n\ntext <b>bold</b>";
        assert_eq!(
            render(input),
            "<div>\nraw\n</div>\n<p>text <b>bold</b></p>\n"
        );
        let options = RenderOptions {
            unsafe_html: false,
            ..Default::default()
        };
        assert_eq!(
            to_html(input, &options).html,
            "<!-- raw HTML omitted -->\n<p>text <!-- raw HTML omitted -->bold<!-- raw HTML omitted --></p>\n"
        );
    }

    #[test]
    fn test_unsafe_links_dropped_without_raw_html() {
        let options = RenderOptions {
            unsafe_html: false,
            ..Default::default()
        };
        assert_eq!(
            to_html("[x](javascript:alert)", &options).html,
            "<p><a href=\"\">x</a></p>\n"
        );
    }

    #[test]
    fn test_footnotes() {
        let html = render("Claim[^a] and again[^a].\n\n[^a]: Source.");
        assert_eq!(
            html,
            "<p>Claim<sup id=\"fnref:1\"><a href=\"#fn:1\" class=\"footnote-ref\" role=\"doc-noteref\">1</a></sup> \
             and again<sup><a href=\"#fn:1\" class=\"footnote-ref\" role=\"doc-noteref\">1</a></sup>.</p>\n\
             <div class=\"footnotes\" role=\"doc-endnotes\">\n<hr />\n<ol>\n<li id=\"fn:1\">\n\
             <p>Source.&#160;<a href=\"#fnref:1\" class=\"footnote-backref\" role=\"doc-backlink\">&#x21a9;&#xfe0e;</a></p>\n\
             </li>\n</ol>\n</div>\n"
        );
    }

    #[test]
    fn test_unreferenced_footnote_is_dropped() {
        assert_eq!(render("text\n\n[^x]: unused"), "<p>text</p>\n");
    }

    #[test]
    fn test_line_map() {
        let options = RenderOptions {
            line_map: true,
            ..Default::default()
        };
        let result = to_html("# a\n\npara\n\n[^n]: note\n\n- item", &options);
        assert_eq!(result.line_map, vec![1, 3, 7]);
        assert!(to_html("# a", &RenderOptions::default()).line_map.is_empty());
    }

    #[test]
    fn test_options_from_toml_style_names() {
        let options: RenderOptions =
            serde_json::from_str(r#"{"hard-wraps": false, "highlight-theme": null}"#).unwrap();
        assert!(!options.hard_wraps);
        assert_eq!(options.highlight_theme, None);
        assert!(options.tables);
    }

    #[test]
    fn test_parse_options_follow_extensions() {
        assert_eq!(RenderOptions::default().to_parse_options(), ParseOptions::default());
        let plain = RenderOptions::commonmark().to_parse_options();
        assert!(!plain.tables && !plain.footnotes && !plain.autolinks);
    }
}
