//! Inline pass: emphasis, code spans, links, images, footnote references,
//! raw HTML, entities and line breaks.
//!
//! Text is scanned left to right into a flat list of pieces where emphasis
//! delimiter runs stay unresolved. Links are matched eagerly as soon as their
//! closing bracket is found, then emphasis is resolved over the flat list.
//!
//! Bracket pairs and backtick runs are indexed once per text so that no
//! construct rescans the rest of the input.

use super::autolink;
use super::html::{match_inline_html, HtmlTerminators};
use super::link::{normalize_label, parse_inline_tail, LinkDefinition, MAX_LABEL_CHARS};
use super::{ParseOptions, MAX_NESTING};
use crate::document::{plain_text, Inline};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static URI_AUTOLINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<([A-Za-z][A-Za-z0-9+.-]{1,31}:[^\s<>]*)>").unwrap());

static EMAIL_AUTOLINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^<([A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*)>",
    )
    .unwrap()
});

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^&(?:#[xX][0-9A-Fa-f]{1,6}|#[0-9]{1,7}|[A-Za-z][A-Za-z0-9]{1,31});").unwrap()
});

/// Bytes that may start an inline construct.
const SPECIAL: &[u8] = b"\\`*_~![<&\n";

/// Lookup tables gathered by the block pass.
pub(super) struct InlineContext<'a> {
    pub options: &'a ParseOptions,
    pub definitions: &'a HashMap<String, LinkDefinition>,
    pub footnote_labels: &'a HashSet<String>,
}

/// Parses the inline content of a single block.
pub(super) fn parse_inlines(text: &str, ctx: &InlineContext<'_>) -> Vec<Inline> {
    let (inlines, _) = InlineParser::new(text, ctx, 0, false).parse();
    if ctx.options.autolinks {
        autolink::linkify(inlines)
    } else {
        inlines
    }
}

#[derive(Debug, Clone, Copy)]
struct DelimRun {
    ch: u8,
    count: usize,
    /// Length of the run before any delimiters were consumed.
    orig: usize,
    can_open: bool,
    can_close: bool,
}

impl DelimRun {
    fn can_pair_with(&self, closer: &DelimRun) -> bool {
        if self.ch != closer.ch || !self.can_open || self.count == 0 {
            return false;
        }
        if self.ch == b'~' {
            return self.count == closer.count;
        }
        // Rule of three for runs that can both open and close.
        let both_flanking = self.can_close || closer.can_open;
        !(both_flanking
            && (self.orig + closer.orig) % 3 == 0
            && !(self.orig % 3 == 0 && closer.orig % 3 == 0))
    }
}

#[derive(Debug)]
enum Piece {
    /// A finished inline and the height of its subtree.
    Node(Inline, usize),
    Delim(DelimRun),
}

impl Piece {
    fn height(&self) -> usize {
        match self {
            Self::Node(_, height) => *height,
            Self::Delim(_) => 0,
        }
    }
}

/// Start offsets of backtick runs, grouped by run length.
struct BacktickRuns(HashMap<usize, Vec<usize>>);

impl BacktickRuns {
    fn new(text: &str) -> Self {
        let mut runs: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut i = 0;
        while let Some(offset) = text.as_bytes()[i..].iter().position(|b| *b == b'`') {
            let start = i + offset;
            let len = run_length(text, start, b'`');
            runs.entry(len).or_default().push(start);
            i = start + len;
        }
        Self(runs)
    }

    /// Start of the first run of exactly `len` backticks at or after `from`.
    fn find(&self, from: usize, len: usize) -> Option<usize> {
        let starts = self.0.get(&len)?;
        starts.get(starts.partition_point(|start| *start < from)).copied()
    }
}

struct InlineParser<'t, 'c> {
    text: &'t str,
    pos: usize,
    ctx: &'c InlineContext<'c>,
    /// Number of enclosing link labels.
    depth: usize,
    /// Links cannot nest.
    in_link: bool,
    backticks: BacktickRuns,
    /// Byte index of the `]` matching each `[`.
    brackets: HashMap<usize, usize>,
    html: HtmlTerminators,
    pending: String,
    pieces: Vec<Piece>,
}

impl<'t, 'c> InlineParser<'t, 'c> {
    fn new(text: &'t str, ctx: &'c InlineContext<'c>, depth: usize, in_link: bool) -> Self {
        let backticks = BacktickRuns::new(text);
        let brackets = match_brackets(text, &backticks);
        Self {
            text,
            pos: 0,
            ctx,
            depth,
            in_link,
            backticks,
            brackets,
            html: HtmlTerminators::new(text),
            pending: String::new(),
            pieces: Vec::new(),
        }
    }

    /// Parses the whole text, returning the inlines and the height of the
    /// tallest one.
    fn parse(mut self) -> (Vec<Inline>, usize) {
        let text = self.text;
        while self.pos < text.len() {
            let rest = &text[self.pos..];
            let plain = rest
                .bytes()
                .position(|b| SPECIAL.contains(&b))
                .unwrap_or(rest.len());
            if plain > 0 {
                self.pending.push_str(&rest[..plain]);
                self.pos += plain;
                continue;
            }

            match rest.as_bytes()[0] {
                b'\\' => self.backslash(),
                b'`' => self.code_span(),
                b'*' | b'_' => self.delimiter_run(),
                b'~' if self.ctx.options.strikethrough => self.delimiter_run(),
                b'!' if rest[1..].starts_with('[') => {
                    if !self.link_or_image(self.pos + 1, true) {
                        self.literal(1);
                    }
                }
                b'[' => {
                    let matched = self.footnote_ref()
                        || (!self.in_link && self.link_or_image(self.pos, false));
                    if !matched {
                        self.literal(1);
                    }
                }
                b'<' => {
                    let matched =
                        (!self.in_link && self.angle_autolink()) || self.inline_html();
                    if !matched {
                        self.literal(1);
                    }
                }
                b'&' => {
                    if !self.entity() {
                        self.literal(1);
                    }
                }
                b'\n' => self.line_ending(),
                _ => self.literal(1),
            }
        }
        self.flush_text();
        resolve_emphasis(self.pieces, self.depth)
    }

    fn literal(&mut self, len: usize) {
        let text = self.text;
        self.pending.push_str(&text[self.pos..self.pos + len]);
        self.pos += len;
    }

    fn flush_text(&mut self) {
        if !self.pending.is_empty() {
            let text = std::mem::take(&mut self.pending);
            self.pieces.push(Piece::Node(Inline::Text(text), 0));
        }
    }

    fn push_node(&mut self, node: Inline) {
        self.push_nested(node, 0);
    }

    fn push_nested(&mut self, node: Inline, height: usize) {
        self.flush_text();
        self.pieces.push(Piece::Node(node, height));
    }

    fn skip_spaces(&mut self) {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() && matches!(bytes[self.pos], b' ' | b'\t') {
            self.pos += 1;
        }
    }

    fn backslash(&mut self) {
        let text = self.text;
        match text[self.pos + 1..].chars().next() {
            Some('\n') => {
                self.push_node(Inline::LineBreak);
                self.pos += 2;
                self.skip_spaces();
            }
            Some(c) if c.is_ascii_punctuation() => {
                self.pending.push(c);
                self.pos += 2;
            }
            _ => self.literal(1),
        }
    }

    fn line_ending(&mut self) {
        let kept = self.pending.trim_end_matches(' ').len();
        let trailing = self.pending.len() - kept;
        self.pending.truncate(kept);
        let node = if trailing >= 2 {
            Inline::LineBreak
        } else {
            Inline::SoftBreak
        };
        self.push_node(node);
        self.pos += 1;
        self.skip_spaces();
    }

    fn code_span(&mut self) {
        let text = self.text;
        let start = self.pos;
        let open = run_length(text, start, b'`');
        match self.backticks.find(start + open, open) {
            Some(close) => {
                let content = normalize_code_span(&text[start + open..close]);
                self.push_node(Inline::Code(content));
                self.pos = close + open;
            }
            None => self.literal(open),
        }
    }

    fn delimiter_run(&mut self) {
        let text = self.text;
        let ch = text.as_bytes()[self.pos];
        let count = run_length(text, self.pos, ch);

        if ch == b'~' && count > 2 {
            self.literal(count);
            return;
        }

        let before = text[..self.pos].chars().next_back();
        let after = text[self.pos + count..].chars().next();
        let (left, right) = flanking(before, after);
        let (can_open, can_close) = if ch == b'_' {
            (
                left && (!right || before.map_or(false, is_punctuation)),
                right && (!left || after.map_or(false, is_punctuation)),
            )
        } else {
            (left, right)
        };

        self.flush_text();
        self.pieces.push(Piece::Delim(DelimRun {
            ch,
            count,
            orig: count,
            can_open,
            can_close,
        }));
        self.pos += count;
    }

    fn footnote_ref(&mut self) -> bool {
        if !self.ctx.options.footnotes {
            return false;
        }
        let text = self.text;
        let Some(rest) = text[self.pos..].strip_prefix("[^") else {
            return false;
        };
        let Some(close) = rest.find(|c: char| c == ']' || c == '[' || c.is_whitespace()) else {
            return false;
        };
        let label = &rest[..close];
        if label.is_empty() || !rest[close..].starts_with(']') {
            return false;
        }
        let key = normalize_label(label);
        if !self.ctx.footnote_labels.contains(&key) {
            return false;
        }
        self.push_node(Inline::FootnoteRef(key));
        self.pos += 2 + close + 1;
        true
    }

    /// Tries to parse a link (or image) whose `[` is at byte `open`.
    fn link_or_image(&mut self, open: usize, image: bool) -> bool {
        if self.depth >= MAX_NESTING {
            return false;
        }
        let text = self.text;
        let Some(&label_end) = self.brackets.get(&open) else {
            return false;
        };
        let label_text = &text[open + 1..label_end];
        let after = label_end + 1;

        let inline_target = if text[after..].starts_with('(') {
            parse_inline_tail(&text[after..]).map(|(url, title, used)| (url, title, after + used))
        } else {
            None
        };
        let Some((url, title, end)) = inline_target.or_else(|| self.reference(label_text, after))
        else {
            return false;
        };

        let (content, height) =
            InlineParser::new(label_text, self.ctx, self.depth + 1, !image || self.in_link)
                .parse();
        if image {
            let alt = plain_text(&content);
            self.push_node(Inline::Image { url, title, alt });
        } else {
            let link = Inline::Link {
                url,
                title,
                content,
            };
            self.push_nested(link, height + 1);
        }
        self.pos = end;
        true
    }

    /// Resolves a full, collapsed or shortcut reference following `[label_text]`.
    fn reference(&self, label_text: &str, after: usize) -> Option<(String, Option<String>, usize)> {
        let text = self.text;
        if let Some(rest) = text[after..].strip_prefix('[') {
            if let Some(close) = rest.find(']') {
                let label = &rest[..close];
                let key = if label.trim().is_empty() {
                    label_text
                } else {
                    label
                };
                if let Some(definition) = self.lookup(key) {
                    let end = after + 1 + close + 1;
                    return Some((definition.url.clone(), definition.title.clone(), end));
                }
            }
        }
        self.lookup(label_text)
            .map(|definition| (definition.url.clone(), definition.title.clone(), after))
    }

    fn lookup(&self, label: &str) -> Option<&LinkDefinition> {
        if label.len() > 4 * MAX_LABEL_CHARS || label.chars().count() > MAX_LABEL_CHARS {
            return None;
        }
        if label.trim().is_empty() {
            return None;
        }
        self.ctx.definitions.get(&normalize_label(label))
    }

    fn angle_autolink(&mut self) -> bool {
        let text = self.text;
        let rest = &text[self.pos..];
        let (url, addr) = if let Some(m) = URI_AUTOLINK.captures(rest).and_then(|c| c.get(1)) {
            (m.as_str().to_string(), m)
        } else if let Some(m) = EMAIL_AUTOLINK.captures(rest).and_then(|c| c.get(1)) {
            (format!("mailto:{}", m.as_str()), m)
        } else {
            return false;
        };
        self.push_node(Inline::Link {
            url,
            title: None,
            content: vec![Inline::Text(addr.as_str().to_string())],
        });
        // Skip the closing `>`.
        self.pos += addr.end() + 1;
        true
    }

    fn inline_html(&mut self) -> bool {
        let text = self.text;
        match match_inline_html(text, self.pos, &self.html) {
            Some(len) => {
                let raw = text[self.pos..self.pos + len].to_string();
                self.push_node(Inline::Html(raw));
                self.pos += len;
                true
            }
            None => false,
        }
    }

    fn entity(&mut self) -> bool {
        let text = self.text;
        match ENTITY.find(&text[self.pos..]) {
            Some(m) => {
                self.push_node(Inline::Entity(m.as_str().to_string()));
                self.pos += m.end();
                true
            }
            None => false,
        }
    }
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_whitespace() && !c.is_control())
}

/// Left- and right-flanking status of a delimiter run surrounded by `before` and `after`.
fn flanking(before: Option<char>, after: Option<char>) -> (bool, bool) {
    let before_space = before.map_or(true, char::is_whitespace);
    let after_space = after.map_or(true, char::is_whitespace);
    let before_punct = before.map_or(false, is_punctuation);
    let after_punct = after.map_or(false, is_punctuation);
    let left = !after_space && (!after_punct || before_space || before_punct);
    let right = !before_space && (!before_punct || after_space || after_punct);
    (left, right)
}

fn run_length(text: &str, from: usize, byte: u8) -> usize {
    text.as_bytes()[from..]
        .iter()
        .take_while(|b| **b == byte)
        .count()
}

fn normalize_code_span(raw: &str) -> String {
    let content = raw.replace('\n', " ");
    let strip = content.len() >= 2
        && content.starts_with(' ')
        && content.ends_with(' ')
        && !content.trim().is_empty();
    if strip {
        content[1..content.len() - 1].to_string()
    } else {
        content
    }
}

/// Pairs each `[` with its `]`, skipping escapes and code spans.
fn match_brackets(text: &str, backticks: &BacktickRuns) -> HashMap<usize, usize> {
    let bytes = text.as_bytes();
    let mut open = Vec::new();
    let mut pairs = HashMap::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'`' => {
                let run = run_length(text, i, b'`');
                i = match backticks.find(i + run, run) {
                    Some(close) => close + run,
                    None => i + run,
                };
                continue;
            }
            b'[' => open.push(i),
            b']' => {
                if let Some(start) = open.pop() {
                    pairs.insert(start, i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    pairs
}

/// An unmatched delimiter run that may still open emphasis.
struct Opener {
    /// Index of the run in the output pieces.
    index: usize,
    /// Height of the tallest piece after the run.
    height: usize,
}

/// Slot of the lowest opener worth searching for a closer of this kind.
///
/// Whether a closer can pair depends only on its character, whether it can
/// also open, and its original length modulo three.
fn bottom_slot(closer: &DelimRun) -> usize {
    let ch = match closer.ch {
        b'*' => 0,
        b'_' => 1,
        _ => 2,
    };
    ch * 6 + usize::from(closer.can_open) * 3 + closer.orig % 3
}

/// Pairs delimiter runs into emphasis nodes and flattens what is left.
///
/// Returns the inlines and the height of the tallest one. Pairs that would
/// nest deeper than [`MAX_NESTING`] below `depth` stay literal.
fn resolve_emphasis(pieces: Vec<Piece>, depth: usize) -> (Vec<Inline>, usize) {
    let mut out: Vec<Piece> = Vec::with_capacity(pieces.len());
    let mut openers: Vec<Opener> = Vec::new();
    let mut bottoms = [0usize; 18];

    for piece in pieces {
        let mut closer = match piece {
            Piece::Delim(run) => run,
            node => {
                raise_height(&mut openers, node.height());
                out.push(node);
                continue;
            }
        };

        while closer.can_close && closer.count > 0 {
            let slot = bottom_slot(&closer);
            let mut inner_height = 0;
            let mut found = None;
            for k in (bottoms[slot]..openers.len()).rev() {
                inner_height = inner_height.max(openers[k].height);
                if let Piece::Delim(opener) = &out[openers[k].index] {
                    if opener.can_pair_with(&closer) {
                        found = Some(k);
                        break;
                    }
                }
            }
            let k = match found {
                Some(k) if depth + inner_height < MAX_NESTING => k,
                _ => {
                    bottoms[slot] = openers.len();
                    break;
                }
            };

            // Openers between the pair can no longer match.
            openers.truncate(k + 1);
            let opener_index = openers[k].index;
            let opener_count = match &out[opener_index] {
                Piece::Delim(opener) => opener.count,
                Piece::Node(..) => 0,
            };
            let used = if closer.ch == b'~' {
                closer.count
            } else if opener_count >= 2 && closer.count >= 2 {
                2
            } else {
                1
            };

            let children = flatten(out.drain(opener_index + 1..));
            let node = match (closer.ch, used) {
                (b'~', _) => Inline::Strikethrough(children),
                (_, 2) => Inline::Strong(children),
                _ => Inline::Emphasis(children),
            };
            closer.count -= used;
            if consume(&mut out[opener_index], used) {
                out.pop();
                openers.pop();
            } else {
                openers[k].height = 0;
            }
            for bottom in bottoms.iter_mut() {
                *bottom = (*bottom).min(openers.len());
            }
            raise_height(&mut openers, inner_height + 1);
            out.push(Piece::Node(node, inner_height + 1));
        }

        if closer.count > 0 {
            out.push(Piece::Delim(closer));
            if closer.can_open {
                openers.push(Opener {
                    index: out.len() - 1,
                    height: 0,
                });
            }
        }
    }

    let height = out.iter().map(Piece::height).max().unwrap_or(0);
    (flatten(out.into_iter()), height)
}

/// Records a piece of `height` pushed after the innermost opener.
fn raise_height(openers: &mut [Opener], height: usize) {
    if let Some(top) = openers.last_mut() {
        top.height = top.height.max(height);
    }
}

/// Takes `used` delimiters from a run, returning whether it is exhausted.
fn consume(piece: &mut Piece, used: usize) -> bool {
    match piece {
        Piece::Delim(run) => {
            run.count -= used;
            run.count == 0
        }
        Piece::Node(..) => false,
    }
}

/// Turns pieces into inlines, leaving unmatched delimiters as text.
fn flatten(pieces: impl Iterator<Item = Piece>) -> Vec<Inline> {
    let mut out = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Node(Inline::Text(text), _) => push_text(&mut out, &text),
            Piece::Node(node, _) => out.push(node),
            Piece::Delim(run) if run.count > 0 => {
                let literal = char::from(run.ch).to_string().repeat(run.count);
                push_text(&mut out, &literal);
            }
            Piece::Delim(_) => {}
        }
    }
    out
}

fn push_text(out: &mut Vec<Inline>, text: &str) {
    if let Some(Inline::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Inline::Text(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn parse_with(input: &str, definitions: &[(&str, &str)], footnotes: &[&str]) -> Vec<Inline> {
        let options = ParseOptions::default();
        let definitions = definitions
            .iter()
            .map(|(label, url)| {
                (
                    normalize_label(label),
                    LinkDefinition {
                        url: url.to_string(),
                        title: None,
                    },
                )
            })
            .collect();
        let footnote_labels = footnotes.iter().map(|s| s.to_string()).collect();
        let ctx = InlineContext {
            options: &options,
            definitions: &definitions,
            footnote_labels: &footnote_labels,
        };
        parse_inlines(input, &ctx)
    }

    fn parse(input: &str) -> Vec<Inline> {
        parse_with(input, &[], &[])
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(parse("hello world"), vec![text("hello world")]);
    }

    #[test]
    fn test_emphasis_and_strong() {
        assert_eq!(
            parse("*a* **b** _c_ __d__"),
            vec![
                Inline::Emphasis(vec![text("a")]),
                text(" "),
                Inline::Strong(vec![text("b")]),
                text(" "),
                Inline::Emphasis(vec![text("c")]),
                text(" "),
                Inline::Strong(vec![text("d")]),
            ]
        );
    }

    #[test]
    fn test_nested_emphasis() {
        assert_eq!(
            parse("***both***"),
            vec![Inline::Emphasis(vec![Inline::Strong(vec![text("both")])])]
        );
        assert_eq!(
            parse("**bold *and em***"),
            vec![Inline::Strong(vec![
                text("bold "),
                Inline::Emphasis(vec![text("and em")])
            ])]
        );
    }

    #[test]
    fn test_unmatched_delimiters_stay_literal() {
        assert_eq!(parse("2 * 3 * 4"), vec![text("2 * 3 * 4")]);
        assert_eq!(parse("**open"), vec![text("**open")]);
        assert_eq!(parse("snake_case_name"), vec![text("snake_case_name")]);
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(
            parse("~~gone~~ ~~~no~~~"),
            vec![Inline::Strikethrough(vec![text("gone")]), text(" ~~~no~~~")]
        );
    }

    #[test]
    fn test_code_span() {
        assert_eq!(
            parse("use `a *b*` and `` x`y ``"),
            vec![
                text("use "),
                Inline::Code("a *b*".into()),
                text(" and "),
                Inline::Code("x`y".into()),
            ]
        );
        assert_eq!(parse("`unclosed"), vec![text("`unclosed")]);
    }

    #[test]
    fn test_backslash_escapes() {
        assert_eq!(parse(r"\*not em\*"), vec![text("*not em*")]);
        assert_eq!(parse(r"a\b"), vec![text(r"a\b")]);
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(
            parse("a  \nb\nc\\\nd"),
            vec![
                text("a"),
                Inline::LineBreak,
                text("b"),
                Inline::SoftBreak,
                text("c"),
                Inline::LineBreak,
                text("d"),
            ]
        );
    }

    #[test]
    fn test_inline_link() {
        assert_eq!(
            parse(r#"see [the *docs*](/docs "Docs")."#),
            vec![
                text("see "),
                Inline::Link {
                    url: "/docs".into(),
                    title: Some("Docs".into()),
                    content: vec![text("the "), Inline::Emphasis(vec![text("docs")])],
                },
                text("."),
            ]
        );
    }

    #[test]
    fn test_reference_links() {
        let defs = [("home", "https://example.com")];
        let link = |label: &str| Inline::Link {
            url: "https://example.com".into(),
            title: None,
            content: vec![text(label)],
        };
        assert_eq!(parse_with("[Home]", &defs, &[]), vec![link("Home")]);
        assert_eq!(parse_with("[Home][]", &defs, &[]), vec![link("Home")]);
        assert_eq!(parse_with("[site][home]", &defs, &[]), vec![link("site")]);
        assert_eq!(parse_with("[missing]", &defs, &[]), vec![text("[missing]")]);

        let long = "x".repeat(MAX_LABEL_CHARS + 1);
        let defs = [(long.as_str(), "/long")];
        let input = format!("[{long}]");
        assert_eq!(parse_with(&input, &defs, &[]), vec![text(&input)]);
    }

    #[test]
    fn test_image() {
        assert_eq!(
            parse("![a *logo*](logo.png)"),
            vec![Inline::Image {
                url: "logo.png".into(),
                title: None,
                alt: "a logo".into(),
            }]
        );
        assert_eq!(parse("!not an image"), vec![text("!not an image")]);
    }

    #[test]
    fn test_links_do_not_nest() {
        assert_eq!(
            parse("[[inner](/a)](/b)"),
            vec![Inline::Link {
                url: "/b".into(),
                title: None,
                content: vec![text("[inner](/a)")],
            }]
        );
    }

    #[test]
    fn test_label_brackets_skip_code_and_escapes() {
        let link = |content| Inline::Link {
            url: "/u".into(),
            title: None,
            content,
        };
        assert_eq!(
            parse("[a `]` b](/u)"),
            vec![link(vec![text("a "), Inline::Code("]".into()), text(" b")])]
        );
        assert_eq!(parse(r"[a \] b](/u)"), vec![link(vec![text("a ] b")])]);
    }

    fn height(inlines: &[Inline]) -> usize {
        inlines
            .iter()
            .map(|inline| match inline {
                Inline::Emphasis(children)
                | Inline::Strong(children)
                | Inline::Strikethrough(children)
                | Inline::Link {
                    content: children, ..
                } => 1 + height(children),
                _ => 0,
            })
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_emphasis_nesting_limit() {
        let input = format!("{}a{}", "*".repeat(100), "*".repeat(100));
        let inlines = parse(&input);
        assert_eq!(height(&inlines), MAX_NESTING);
        assert_eq!(inlines.len(), 3);
        assert_eq!(inlines[0], text(&"*".repeat(36)));
        assert_eq!(inlines[2], text(&"*".repeat(36)));
    }

    #[test]
    fn test_nested_link_labels_stop_at_limit() {
        let input = format!("{}a{}", "![".repeat(200), "](x)".repeat(200));
        let inlines = parse(&input);
        assert!(matches!(&inlines[0], Inline::Image { url, .. } if url == "x"));

        let input = format!("[{}a{}](/u)", "*[".repeat(100), "]*".repeat(100));
        assert!(height(&parse(&input)) <= MAX_NESTING);
    }

    #[test]
    fn test_footnote_reference() {
        assert_eq!(
            parse_with("text[^Note] and [^missing]", &[], &["note"]),
            vec![
                text("text"),
                Inline::FootnoteRef("note".into()),
                text(" and [^missing]"),
            ]
        );
    }

    #[test]
    fn test_angle_autolinks() {
        assert_eq!(
            parse("<https://example.com> <me@example.com>"),
            vec![
                Inline::Link {
                    url: "https://example.com".into(),
                    title: None,
                    content: vec![text("https://example.com")],
                },
                text(" "),
                Inline::Link {
                    url: "mailto:me@example.com".into(),
                    title: None,
                    content: vec![text("me@example.com")],
                },
            ]
        );
    }

    #[test]
    fn test_inline_html_and_entities() {
        assert_eq!(
            parse("<kbd>Ctrl</kbd> &copy; & x"),
            vec![
                Inline::Html("<kbd>".into()),
                text("Ctrl"),
                Inline::Html("</kbd>".into()),
                text(" "),
                Inline::Entity("&copy;".into()),
                text(" & x"),
            ]
        );
        assert_eq!(parse("a < b"), vec![text("a < b")]);
    }
}
