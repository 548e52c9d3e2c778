//! HTML serialization of a parsed [`Document`].

use super::highlight::CodeHighlighter;
use super::typographer;
use super::RenderOptions;
use crate::document::{decode_entity, plain_text, Alignment, Block, Document, Inline, ListItem, ListKind};
use crate::toc::slugify;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::collections::HashMap;

/// Characters percent-encoded in link and image destinations. `%` is left
/// alone so already encoded sequences survive.
const URL_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'\\')
    .add(b'^')
    .add(b'{')
    .add(b'|')
    .add(b'}');

const RAW_HTML_OMITTED: &str = "<!-- raw HTML omitted -->";

/// Escapes `&`, `<`, `>` and `"`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        push_escaped_char(out, c);
    }
}

pub(super) fn push_escaped_char(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        c => out.push(c),
    }
}

fn encode_url(url: &str) -> String {
    escape_html(&utf8_percent_encode(url, URL_ENCODE_SET).to_string())
}

/// Script-capable destinations dropped when raw HTML is disabled.
fn is_dangerous_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("data:") {
        return ![
            "data:image/png",
            "data:image/gif",
            "data:image/jpeg",
            "data:image/webp",
        ]
        .iter()
        .any(|prefix| lower.starts_with(prefix));
    }
    ["javascript:", "vbscript:", "file:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

/// Whether a link was produced from a bare address, whose text must not be
/// touched by the typographer.
fn is_autolink(url: &str, content: &[Inline]) -> bool {
    match content {
        [Inline::Text(text)] => {
            url == text
                || url.strip_prefix("mailto:") == Some(text.as_str())
                || url.strip_prefix("http://") == Some(text.as_str())
        }
        _ => false,
    }
}

/// Collects every footnote definition reachable from `blocks`, first one wins.
fn collect_footnotes<'a>(blocks: &'a [Block], definitions: &mut HashMap<&'a str, &'a [Block]>) {
    for block in blocks {
        match block {
            Block::FootnoteDefinition { label, blocks } => {
                definitions.entry(label.as_str()).or_insert(blocks.as_slice());
                collect_footnotes(blocks, definitions);
            }
            Block::BlockQuote(blocks) => collect_footnotes(blocks, definitions),
            Block::List { items, .. } => {
                for item in items {
                    collect_footnotes(&item.blocks, definitions);
                }
            }
            _ => {}
        }
    }
}

pub(super) struct HtmlWriter<'a> {
    options: &'a RenderOptions,
    highlighter: &'a dyn CodeHighlighter,
    out: String,
    footnotes: HashMap<&'a str, &'a [Block]>,
    /// Referenced footnote labels, numbered by position.
    footnote_order: Vec<&'a str>,
    /// Checkbox of a task item waiting for its first paragraph.
    pending_task: Option<bool>,
    /// Last character rendered in the current block, for quote direction.
    last_char: Option<char>,
}

impl<'a> HtmlWriter<'a> {
    pub(super) fn new(options: &'a RenderOptions, highlighter: &'a dyn CodeHighlighter) -> Self {
        Self {
            options,
            highlighter,
            out: String::new(),
            footnotes: HashMap::new(),
            footnote_order: Vec::new(),
            pending_task: None,
            last_char: None,
        }
    }

    pub(super) fn render(mut self, document: &'a Document) -> String {
        collect_footnotes(&document.blocks, &mut self.footnotes);
        for block in &document.blocks {
            self.write_block(block);
        }
        self.write_footnotes();
        self.out
    }

    fn write_block(&mut self, block: &'a Block) {
        self.last_char = None;
        match block {
            Block::Heading { level, content } => {
                if self.options.heading_ids {
                    // Repeated headings share an id, as they do in `toc::extract_outline`.
                    let id = slugify(&plain_text(content));
                    self.out.push_str(&format!("<h{level} id=\""));
                    push_escaped(&mut self.out, &id);
                    self.out.push_str("\">");
                } else {
                    self.out.push_str(&format!("<h{level}>"));
                }
                self.write_inlines(content);
                self.out.push_str(&format!("</h{level}>\n"));
            }
            Block::Paragraph(inlines) => {
                self.out.push_str("<p>");
                self.write_pending_task();
                self.write_inlines(inlines);
                self.out.push_str("</p>\n");
            }
            Block::List { kind, tight, items } => {
                let close = match kind {
                    ListKind::Bullet => {
                        self.out.push_str("<ul>\n");
                        "</ul>\n"
                    }
                    ListKind::Ordered { start: 1 } => {
                        self.out.push_str("<ol>\n");
                        "</ol>\n"
                    }
                    ListKind::Ordered { start } => {
                        self.out.push_str(&format!("<ol start=\"{start}\">\n"));
                        "</ol>\n"
                    }
                };
                for item in items {
                    self.write_item(item, *tight);
                }
                self.out.push_str(close);
            }
            Block::BlockQuote(blocks) => {
                self.out.push_str("<blockquote>\n");
                for block in blocks {
                    self.write_block(block);
                }
                self.out.push_str("</blockquote>\n");
            }
            Block::CodeBlock { info, literal } => self.write_code_block(info.as_deref(), literal),
            Block::Table {
                alignments,
                header,
                rows,
            } => {
                self.out.push_str("<table>\n<thead>\n<tr>\n");
                for (cell, align) in header.iter().zip(alignments) {
                    self.write_cell("th", cell, *align);
                }
                self.out.push_str("</tr>\n</thead>\n");
                if !rows.is_empty() {
                    self.out.push_str("<tbody>\n");
                    for row in rows {
                        self.out.push_str("<tr>\n");
                        for (cell, align) in row.iter().zip(alignments) {
                            self.write_cell("td", cell, *align);
                        }
                        self.out.push_str("</tr>\n");
                    }
                    self.out.push_str("</tbody>\n");
                }
                self.out.push_str("</table>\n");
            }
            Block::ThematicBreak => self.out.push_str("<hr />\n"),
            // Rendered together at the end of the document.
            Block::FootnoteDefinition { .. } => {}
            Block::HtmlBlock(raw) => {
                if self.options.unsafe_html {
                    self.out.push_str(raw);
                } else {
                    self.out.push_str(RAW_HTML_OMITTED);
                    self.out.push('\n');
                }
            }
        }
    }

    fn write_item(&mut self, item: &'a ListItem, tight: bool) {
        match item.task {
            Some(checked) => {
                self.out.push_str("<li class=\"task-list-item\">");
                if matches!(item.blocks.first(), Some(Block::Paragraph(_))) {
                    self.pending_task = Some(checked);
                } else {
                    self.write_checkbox(checked);
                }
            }
            None => self.out.push_str("<li>"),
        }

        for (idx, block) in item.blocks.iter().enumerate() {
            match block {
                Block::Paragraph(inlines) if tight => {
                    self.last_char = None;
                    self.write_pending_task();
                    self.write_inlines(inlines);
                    if idx + 1 < item.blocks.len() {
                        self.out.push('\n');
                    }
                }
                _ => {
                    if !self.out.ends_with('\n') {
                        self.out.push('\n');
                    }
                    self.write_block(block);
                }
            }
        }

        self.out.push_str("</li>\n");
    }

    fn write_checkbox(&mut self, checked: bool) {
        if checked {
            self.out
                .push_str("<input type=\"checkbox\" disabled=\"\" checked=\"\" /> ");
        } else {
            self.out.push_str("<input type=\"checkbox\" disabled=\"\" /> ");
        }
    }

    fn write_pending_task(&mut self) {
        if let Some(checked) = self.pending_task.take() {
            self.write_checkbox(checked);
        }
    }

    fn write_code_block(&mut self, lang: Option<&str>, literal: &str) {
        match lang {
            Some(lang) => {
                self.out.push_str("<pre><code class=\"language-");
                push_escaped(&mut self.out, lang);
                self.out.push_str("\">");
            }
            None => self.out.push_str("<pre><code>"),
        }
        match self.highlighter.highlight(lang, literal) {
            Some(highlighted) => self.out.push_str(&highlighted),
            None => push_escaped(&mut self.out, literal),
        }
        self.out.push_str("</code></pre>\n");
    }

    fn write_cell(&mut self, tag: &str, cell: &'a [Inline], align: Alignment) {
        self.last_char = None;
        match align.as_css() {
            Some(css) => self.out.push_str(&format!("<{tag} style=\"text-align:{css}\">")),
            None => self.out.push_str(&format!("<{tag}>")),
        }
        self.write_inlines(cell);
        self.out.push_str(&format!("</{tag}>\n"));
    }

    fn write_inlines(&mut self, inlines: &'a [Inline]) {
        for inline in inlines {
            self.write_inline(inline);
        }
    }

    fn write_inline(&mut self, inline: &'a Inline) {
        match inline {
            Inline::Text(text) => self.write_text(text),
            Inline::Emphasis(children) => self.write_wrapped("em", children),
            Inline::Strong(children) => self.write_wrapped("strong", children),
            Inline::Strikethrough(children) => self.write_wrapped("del", children),
            Inline::Code(code) => {
                self.out.push_str("<code>");
                push_escaped(&mut self.out, code);
                self.out.push_str("</code>");
                self.last_char = code.chars().last().or(self.last_char);
            }
            Inline::Link {
                url,
                title,
                content,
            } => {
                self.out.push_str("<a href=\"");
                self.push_url(url);
                self.out.push('"');
                self.push_title(title.as_deref());
                self.out.push('>');
                match content.as_slice() {
                    [Inline::Text(text)] if is_autolink(url, content) => {
                        push_escaped(&mut self.out, text);
                        self.last_char = text.chars().last();
                    }
                    _ => self.write_inlines(content),
                }
                self.out.push_str("</a>");
            }
            Inline::Image { url, title, alt } => {
                self.out.push_str("<img src=\"");
                self.push_url(url);
                self.out.push_str("\" alt=\"");
                push_escaped(&mut self.out, alt);
                self.out.push('"');
                self.push_title(title.as_deref());
                self.out.push_str(" />");
            }
            Inline::FootnoteRef(label) => self.write_footnote_ref(label),
            Inline::LineBreak => {
                self.out.push_str("<br />\n");
                self.last_char = Some('\n');
            }
            Inline::SoftBreak => {
                if self.options.hard_wraps {
                    self.out.push_str("<br />\n");
                } else {
                    self.out.push('\n');
                }
                self.last_char = Some('\n');
            }
            Inline::Html(raw) => {
                if self.options.unsafe_html {
                    self.out.push_str(raw);
                } else {
                    self.out.push_str(RAW_HTML_OMITTED);
                }
            }
            Inline::Entity(raw) => {
                self.out.push_str(raw);
                self.last_char = decode_entity(raw).or(self.last_char);
            }
        }
    }

    fn write_wrapped(&mut self, tag: &str, children: &'a [Inline]) {
        self.out.push_str(&format!("<{tag}>"));
        self.write_inlines(children);
        self.out.push_str(&format!("</{tag}>"));
    }

    fn write_text(&mut self, text: &str) {
        if self.options.typographer {
            let smart = typographer::smarten(text, self.last_char);
            self.out.push_str(&smart);
        } else {
            push_escaped(&mut self.out, text);
        }
        if let Some(last) = text.chars().last() {
            self.last_char = Some(last);
        }
    }

    fn push_url(&mut self, url: &str) {
        if !self.options.unsafe_html && is_dangerous_url(url) {
            tracing::debug!(url, "Dropping unsafe link destination");
            return;
        }
        self.out.push_str(&encode_url(url));
    }

    fn push_title(&mut self, title: Option<&str>) {
        if let Some(title) = title {
            self.out.push_str(" title=\"");
            push_escaped(&mut self.out, title);
            self.out.push('"');
        }
    }

    fn write_footnote_ref(&mut self, label: &'a str) {
        if !self.footnotes.contains_key(label) {
            self.out.push_str("[^");
            push_escaped(&mut self.out, label);
            self.out.push(']');
            return;
        }

        let existing = self.footnote_order.iter().position(|known| *known == label);
        let number = match existing {
            Some(idx) => {
                self.out.push_str("<sup>");
                idx + 1
            }
            None => {
                self.footnote_order.push(label);
                let number = self.footnote_order.len();
                self.out.push_str(&format!("<sup id=\"fnref:{number}\">"));
                number
            }
        };
        self.out.push_str(&format!(
            "<a href=\"#fn:{number}\" class=\"footnote-ref\" role=\"doc-noteref\">{number}</a></sup>"
        ));
        self.last_char = Some('0');
    }

    fn write_footnotes(&mut self) {
        if self.footnote_order.is_empty() {
            return;
        }
        self.out
            .push_str("<div class=\"footnotes\" role=\"doc-endnotes\">\n<hr />\n<ol>\n");

        // Footnote bodies may reference footnotes that were not seen yet.
        let mut idx = 0;
        while idx < self.footnote_order.len() {
            let number = idx + 1;
            let label = self.footnote_order[idx];
            let blocks = self.footnotes.get(label).copied().unwrap_or_default();
            let body = self.render_detached(blocks);
            let backref = format!(
                "&#160;<a href=\"#fnref:{number}\" class=\"footnote-backref\" role=\"doc-backlink\">&#x21a9;&#xfe0e;</a>"
            );

            self.out.push_str(&format!("<li id=\"fn:{number}\">\n"));
            match body.rfind("</p>") {
                Some(pos) => {
                    self.out.push_str(&body[..pos]);
                    self.out.push_str(&backref);
                    self.out.push_str(&body[pos..]);
                }
                None => {
                    self.out.push_str(&body);
                    self.out.push_str(&backref);
                    self.out.push('\n');
                }
            }
            self.out.push_str("</li>\n");
            idx += 1;
        }

        self.out.push_str("</ol>\n</div>\n");
    }

    /// Renders `blocks` into a separate buffer.
    fn render_detached(&mut self, blocks: &'a [Block]) -> String {
        let saved = std::mem::take(&mut self.out);
        for block in blocks {
            self.write_block(block);
        }
        std::mem::replace(&mut self.out, saved)
    }
}
