//! Raw HTML recognition shared by the block and inline passes.

use once_cell::sync::Lazy;
use regex::Regex;

static OPEN_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^<[A-Za-z][A-Za-z0-9-]*(?:\s+[A-Za-z_:][A-Za-z0-9_.:-]*(?:\s*=\s*(?:[^\s"'=<>`]+|'[^']*'|"[^"]*"))?)*\s*/?>"#,
    )
    .unwrap()
});

static CLOSING_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^</[A-Za-z][A-Za-z0-9-]*\s*>").unwrap());

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<!--(?s:.*?)-->").unwrap());

static DECLARATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<![A-Za-z][^>]*>").unwrap());

static PROCESSING_INSTRUCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<\?(?s:.*?)\?>").unwrap());

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

const RAW_TAGS: &[&str] = &["script", "pre", "style", "textarea"];

/// Last offsets of the terminators that open-ended constructs scan for.
///
/// A comment, declaration or processing instruction cannot close when its
/// terminator does not occur later in the text, so those are skipped rather
/// than scanned to the end of the input.
#[derive(Debug, Clone, Copy)]
pub(super) struct HtmlTerminators {
    comment: Option<usize>,
    declaration: Option<usize>,
    instruction: Option<usize>,
}

impl HtmlTerminators {
    pub(super) fn new(text: &str) -> Self {
        Self {
            comment: text.rfind("-->"),
            declaration: text.rfind('>'),
            instruction: text.rfind("?>"),
        }
    }
}

/// Returns the byte length of the raw HTML construct starting at `pos`, if any.
pub(super) fn match_inline_html(
    text: &str,
    pos: usize,
    terminators: &HtmlTerminators,
) -> Option<usize> {
    let rest = &text[pos..];
    let reaches = |last: Option<usize>, min: usize| last.is_some_and(|end| end >= pos + min);

    let mut candidates: Vec<&Regex> = vec![&*OPEN_TAG, &*CLOSING_TAG];
    if reaches(terminators.comment, 4) {
        candidates.push(&*COMMENT);
    }
    if reaches(terminators.declaration, 3) {
        candidates.push(&*DECLARATION);
    }
    if reaches(terminators.instruction, 2) {
        candidates.push(&*PROCESSING_INSTRUCTION);
    }
    candidates
        .into_iter()
        .find_map(|re| re.find(rest).map(|m| m.end()))
}

/// How an HTML block that started on a line is terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HtmlBlockKind {
    /// `<script>`, `<pre>`, `<style>`, `<textarea>`: ends at the matching close tag.
    Raw(&'static str),
    /// Ends at the line containing the terminator.
    Until(&'static str),
    /// A known block-level tag, ends at a blank line.
    Block,
    /// Any other complete tag alone on its line, ends at a blank line.
    ///
    /// Cannot interrupt a paragraph.
    Tag,
}

impl HtmlBlockKind {
    pub(super) fn can_interrupt_paragraph(&self) -> bool {
        !matches!(self, Self::Tag)
    }

    pub(super) fn ends_at_blank_line(&self) -> bool {
        matches!(self, Self::Block | Self::Tag)
    }

    /// Whether `line` closes a block of this kind.
    pub(super) fn is_end(&self, line: &str) -> bool {
        match self {
            Self::Raw(tag) => line
                .to_ascii_lowercase()
                .contains(&format!("</{tag}>")),
            Self::Until(terminator) => line.contains(terminator),
            Self::Block | Self::Tag => false,
        }
    }
}

/// Detects the start of an HTML block on an already de-indented line.
pub(super) fn html_block_start(line: &str) -> Option<HtmlBlockKind> {
    if !line.starts_with('<') {
        return None;
    }

    let lower = line.to_ascii_lowercase();

    for &tag in RAW_TAGS {
        if let Some(rest) = lower.strip_prefix('<').and_then(|s| s.strip_prefix(tag)) {
            if rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_whitespace() || c == '>') {
                return Some(HtmlBlockKind::Raw(tag));
            }
        }
    }

    if lower.starts_with("<!--") {
        return Some(HtmlBlockKind::Until("-->"));
    }
    if lower.starts_with("<?") {
        return Some(HtmlBlockKind::Until("?>"));
    }
    if lower.starts_with("<![cdata[") {
        return Some(HtmlBlockKind::Until("]]>"));
    }
    if lower.starts_with("<!") && lower[2..].starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Some(HtmlBlockKind::Until(">"));
    }

    let name_start = if lower.starts_with("</") { 2 } else { 1 };
    let name: String = lower[name_start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if BLOCK_TAGS.contains(&name.as_str()) {
        let rest = &lower[name_start + name.len()..];
        if rest.is_empty()
            || rest.starts_with(|c: char| c.is_ascii_whitespace() || c == '>')
            || rest.starts_with("/>")
        {
            return Some(HtmlBlockKind::Block);
        }
    }

    let tag_len = OPEN_TAG
        .find(line)
        .or_else(|| CLOSING_TAG.find(line))
        .map(|m| m.end())?;
    if line[tag_len..].trim().is_empty() {
        Some(HtmlBlockKind::Tag)
    } else {
        None
    }
}
