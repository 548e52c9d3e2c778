//! Document tree produced by the parser and consumed by the renderer.
//!
//! The tree is a plain owned structure: every [`Block`] and [`Inline`] is owned
//! by its parent container, so a [`Document`] can be moved across threads and
//! dropped without any bookkeeping.

use serde::{Deserialize, Serialize};

/// A parsed markdown document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Top-level blocks in source order.
    pub blocks: Vec<Block>,
    /// 1-indexed source line of each top-level block, parallel to `blocks`.
    pub block_lines: Vec<usize>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Column alignment declared by a table delimiter row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    /// CSS `text-align` value, `None` when the column is unaligned.
    pub fn as_css(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Left => Some("left"),
            Self::Center => Some("center"),
            Self::Right => Some("right"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    /// Ordered list with its first number.
    Ordered { start: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// `Some(checked)` for GFM task list items.
    pub task: Option<bool>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        /// Always within `1..=6`.
        level: u8,
        content: Vec<Inline>,
    },
    Paragraph(Vec<Inline>),
    List {
        kind: ListKind,
        /// Tight lists render item paragraphs without `<p>` wrappers.
        tight: bool,
        items: Vec<ListItem>,
    },
    BlockQuote(Vec<Block>),
    CodeBlock {
        /// Language hint, the first word of the fence info string.
        info: Option<String>,
        literal: String,
    },
    Table {
        alignments: Vec<Alignment>,
        header: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    ThematicBreak,
    FootnoteDefinition {
        label: String,
        blocks: Vec<Block>,
    },
    /// Raw HTML block, emitted verbatim.
    HtmlBlock(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Code(String),
    Link {
        url: String,
        title: Option<String>,
        content: Vec<Inline>,
    },
    Image {
        url: String,
        title: Option<String>,
        alt: String,
    },
    FootnoteRef(String),
    /// Hard line break.
    LineBreak,
    SoftBreak,
    /// Raw inline HTML, emitted verbatim.
    Html(String),
    /// Character reference such as `&copy;` or `&#35;`, kept verbatim.
    Entity(String),
}

/// Concatenates the textual content of `inlines`, dropping all markup.
///
/// Used for heading anchors and image alt text.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_plain_text(&mut out, inlines);
    out
}

fn push_plain_text(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Text(text) | Inline::Code(text) => out.push_str(text),
            Inline::Emphasis(children)
            | Inline::Strong(children)
            | Inline::Strikethrough(children) => push_plain_text(out, children),
            Inline::Link { content, .. } => push_plain_text(out, content),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::FootnoteRef(_) | Inline::Html(_) => {}
            Inline::LineBreak | Inline::SoftBreak => out.push(' '),
            Inline::Entity(raw) => match decode_entity(raw) {
                Some(c) => out.push(c),
                None => out.push_str(raw),
            },
        }
    }
}

/// Decodes numeric references and the handful of named ones that commonly
/// show up in headings.
pub(crate) fn decode_entity(raw: &str) -> Option<char> {
    let body = raw.strip_prefix('&')?.strip_suffix(';')?;
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code).filter(|c| *c != '\0');
    }
    let c = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        _ => return None,
    };
    Some(c)
}
