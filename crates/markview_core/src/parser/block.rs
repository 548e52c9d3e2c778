//! Block structure pass.
//!
//! Splits source lines into raw blocks whose inline text is left unparsed.
//! Link reference definitions and footnote labels are collected along the
//! way so that the inline pass can resolve references that appear before
//! their definitions.

use super::html::{html_block_start, HtmlBlockKind};
use super::link::{normalize_label, parse_destination, parse_title, unescape, LinkDefinition};
use super::{ParseOptions, MAX_NESTING};
use crate::document::{Alignment, ListKind};
use std::collections::{HashMap, HashSet};
use std::ops::Deref;

const TAB_STOP: usize = 4;
const CODE_INDENT: usize = 4;

/// A block whose inline content has not been parsed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum RawBlock {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph(String),
    List {
        kind: ListKind,
        tight: bool,
        items: Vec<RawItem>,
    },
    BlockQuote(Vec<RawBlock>),
    CodeBlock {
        info: Option<String>,
        literal: String,
    },
    Table {
        alignments: Vec<Alignment>,
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    ThematicBreak,
    FootnoteDefinition {
        label: String,
        blocks: Vec<RawBlock>,
    },
    HtmlBlock(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RawItem {
    pub task: Option<bool>,
    pub blocks: Vec<RawBlock>,
}

/// Source lines of one container.
pub(super) struct Lines<'l> {
    lines: &'l [String],
    /// Longest backtick and tilde closing run on any line at or after each index.
    closing_runs: Vec<[usize; 2]>,
}

impl<'l> Lines<'l> {
    fn new(lines: &'l [String]) -> Self {
        let mut closing_runs = vec![[0; 2]; lines.len() + 1];
        for (idx, line) in lines.iter().enumerate().rev() {
            let mut runs = closing_runs[idx + 1];
            if let Some((marker, run)) = closing_run(line) {
                let slot = &mut runs[Fence::slot(marker)];
                *slot = (*slot).max(run);
            }
            closing_runs[idx] = runs;
        }
        Self {
            lines,
            closing_runs,
        }
    }

    fn longest_closing_run(&self, marker: char, from: usize) -> usize {
        self.closing_runs
            .get(from)
            .map_or(0, |runs| runs[Fence::slot(marker)])
    }
}

impl Deref for Lines<'_> {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        self.lines
    }
}

pub(super) struct BlockParser<'a> {
    options: &'a ParseOptions,
    pub definitions: HashMap<String, LinkDefinition>,
    pub footnote_labels: HashSet<String>,
    /// Number of enclosing container blocks.
    depth: usize,
}

impl<'a> BlockParser<'a> {
    pub fn new(options: &'a ParseOptions) -> Self {
        Self {
            options,
            definitions: HashMap::new(),
            footnote_labels: HashSet::new(),
            depth: 0,
        }
    }

    /// Parses `lines` into blocks, each paired with the 0-indexed line it starts on.
    pub fn parse_lines(&mut self, lines: &[String]) -> Vec<(usize, RawBlock)> {
        let lines = Lines::new(lines);
        let mut blocks = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            if is_blank(&lines[i]) {
                i += 1;
                continue;
            }
            let start = i;
            let (maybe_block, next) = self.parse_block(&lines, i);
            if let Some(block) = maybe_block {
                blocks.push((start, block));
            }
            // Every branch consumes at least the starting line.
            i = next.max(start + 1);
        }
        blocks
    }

    /// Parses the content of a container block one level deeper.
    fn parse_children(&mut self, lines: &[String]) -> Vec<(usize, RawBlock)> {
        self.depth += 1;
        if !self.can_nest() {
            tracing::trace!(depth = self.depth, "Nesting limit reached, reading markers as text");
        }
        let blocks = self.parse_lines(lines);
        self.depth -= 1;
        blocks
    }

    fn parse_nested(&mut self, lines: &[String]) -> Vec<RawBlock> {
        self.parse_children(lines)
            .into_iter()
            .map(|(_, block)| block)
            .collect()
    }

    /// Past the nesting limit, container markers are read as text.
    fn can_nest(&self) -> bool {
        self.depth < MAX_NESTING
    }

    fn parse_block(&mut self, lines: &Lines<'_>, i: usize) -> (Option<RawBlock>, usize) {
        let line = lines[i].as_str();

        if indent_width(line) >= CODE_INDENT {
            let (block, next) = parse_indented_code(lines, i);
            return (Some(block), next);
        }

        if let Some(fence) = Fence::open(line) {
            match fence.find_close(lines, i + 1) {
                Some(close) => return (Some(fence.into_block(&lines[i + 1..close])), close + 1),
                None => {
                    tracing::trace!(line = i + 1, "Unterminated code fence, reading it as text");
                    return self.parse_paragraph(lines, i);
                }
            }
        }

        if is_thematic_break(line) {
            return (Some(RawBlock::ThematicBreak), i + 1);
        }

        if let Some((level, text)) = atx_heading(line) {
            return (Some(RawBlock::Heading { level, text }), i + 1);
        }

        if self.can_nest() {
            if strip_blockquote_marker(line).is_some() {
                let (block, next) = self.parse_blockquote(lines, i);
                return (Some(block), next);
            }
            if let Some(marker) = ListMarker::parse(line) {
                let (block, next) = self.parse_list(lines, i, marker);
                return (Some(block), next);
            }
        }

        if self.options.footnotes && self.can_nest() {
            if let Some((label, rest)) = footnote_definition_start(line) {
                let (block, next) = self.parse_footnote_definition(lines, i, label, rest);
                return (Some(block), next);
            }
        }

        if let Some(kind) = html_block_start(line.trim_start()) {
            let (block, next) = parse_html_block(lines, i, kind);
            return (Some(block), next);
        }

        if self.options.tables {
            if let Some((block, next)) = self.parse_table(lines, i) {
                return (Some(block), next);
            }
        }

        if let Some((label, definition, next)) = link_reference_definition(lines, i) {
            self.definitions.entry(label).or_insert(definition);
            return (None, next);
        }

        self.parse_paragraph(lines, i)
    }

    fn parse_paragraph(&mut self, lines: &Lines<'_>, start: usize) -> (Option<RawBlock>, usize) {
        let mut text_lines = vec![lines[start].trim_start()];
        let mut i = start + 1;
        while i < lines.len() {
            let line = lines[i].as_str();
            if is_blank(line) {
                break;
            }
            if let Some(level) = setext_underline(line) {
                let text = text_lines.join("\n").trim_end().to_string();
                return (Some(RawBlock::Heading { level, text }), i + 1);
            }
            if self.interrupts_paragraph(lines, i) {
                break;
            }
            text_lines.push(line.trim_start());
            i += 1;
        }
        let text = text_lines.join("\n").trim_end().to_string();
        (Some(RawBlock::Paragraph(text)), i)
    }

    /// Whether line `i` starts a block that ends an open paragraph.
    fn interrupts_paragraph(&self, lines: &Lines<'_>, i: usize) -> bool {
        let line = lines[i].as_str();
        if indent_width(line) >= CODE_INDENT {
            return false;
        }
        if let Some(fence) = Fence::open(line) {
            if fence.find_close(lines, i + 1).is_some() {
                return true;
            }
        }
        if is_thematic_break(line) || atx_heading(line).is_some() {
            return true;
        }
        let html_interrupts = html_block_start(line.trim_start())
            .map(|kind| kind.can_interrupt_paragraph())
            .unwrap_or(false);
        if html_interrupts {
            return true;
        }
        if !self.can_nest() {
            return false;
        }
        if strip_blockquote_marker(line).is_some() {
            return true;
        }
        if let Some(marker) = ListMarker::parse(line) {
            let starts_at_one = match marker.kind {
                ListKind::Bullet => true,
                ListKind::Ordered { start } => start == 1,
            };
            if !marker.empty && starts_at_one {
                return true;
            }
        }
        self.options.footnotes && footnote_definition_start(line).is_some()
    }

    fn parse_blockquote(&mut self, lines: &Lines<'_>, start: usize) -> (RawBlock, usize) {
        let mut inner = ContainerLines::default();
        let mut i = start;
        while i < lines.len() {
            let line = lines[i].as_str();
            if let Some(rest) = strip_blockquote_marker(line) {
                inner.push(rest);
                i += 1;
                continue;
            }
            if !is_blank(line) && inner.accepts_lazy_line() && !self.interrupts_paragraph(lines, i)
            {
                inner.push(line.trim_start().to_string());
                i += 1;
                continue;
            }
            break;
        }
        (RawBlock::BlockQuote(self.parse_nested(&inner.lines)), i)
    }

    fn parse_list(
        &mut self,
        lines: &Lines<'_>,
        start: usize,
        first: ListMarker,
    ) -> (RawBlock, usize) {
        let kind = first.kind;
        let mut items = Vec::new();
        let mut tight = true;
        let mut marker = first;
        let mut i = start;

        loop {
            let mut collected = ContainerLines::default();
            collected.push(marker.content.clone());
            let mut j = i + 1;
            while j < lines.len() {
                let line = lines[j].as_str();
                if is_blank(line) {
                    // An item that starts empty may begin with at most one blank line.
                    if collected.lines.len() == 1 && marker.empty {
                        break;
                    }
                    collected.push(String::new());
                    j += 1;
                    continue;
                }
                if indent_width(line) >= marker.content_indent {
                    collected.push(strip_indent(line, marker.content_indent));
                    j += 1;
                    continue;
                }
                if !collected.ends_in_blank()
                    && collected.accepts_lazy_line()
                    && ListMarker::parse(line).is_none()
                    && !self.interrupts_paragraph(lines, j)
                {
                    collected.push(line.trim_start().to_string());
                    j += 1;
                    continue;
                }
                break;
            }

            let trailing_blanks = collected.trim_trailing_blanks();
            let mut item_lines = collected.lines;

            let task = if self.options.tasklists {
                take_task_marker(&mut item_lines[0])
            } else {
                None
            };

            let children = self.parse_children(&item_lines);
            let has_inner_gap = children
                .iter()
                .skip(1)
                .any(|(line_idx, _)| *line_idx > 0 && is_blank(&item_lines[*line_idx - 1]));
            if has_inner_gap {
                tight = false;
            }
            items.push(RawItem {
                task,
                blocks: children.into_iter().map(|(_, block)| block).collect(),
            });

            let next_marker = lines
                .get(j)
                .filter(|line| !is_thematic_break(line))
                .and_then(|line| ListMarker::parse(line))
                .filter(|next| next.same_list_as(&marker));
            match next_marker {
                Some(next) => {
                    if trailing_blanks > 0 {
                        tight = false;
                    }
                    marker = next;
                    i = j;
                }
                None => {
                    let list = RawBlock::List { kind, tight, items };
                    return (list, j);
                }
            }
        }
    }

    fn parse_footnote_definition(
        &mut self,
        lines: &Lines<'_>,
        start: usize,
        label: String,
        first_line: String,
    ) -> (RawBlock, usize) {
        let mut inner = ContainerLines::default();
        inner.push(first_line);
        let mut i = start + 1;
        while i < lines.len() {
            let line = lines[i].as_str();
            if is_blank(line) {
                inner.push(String::new());
                i += 1;
                continue;
            }
            if indent_width(line) >= CODE_INDENT {
                inner.push(strip_indent(line, CODE_INDENT));
                i += 1;
                continue;
            }
            if !inner.ends_in_blank()
                && inner.accepts_lazy_line()
                && !self.interrupts_paragraph(lines, i)
            {
                inner.push(line.trim_start().to_string());
                i += 1;
                continue;
            }
            break;
        }
        inner.trim_trailing_blanks();

        let label = normalize_label(&label);
        self.footnote_labels.insert(label.clone());
        let blocks = self.parse_nested(&inner.lines);
        (RawBlock::FootnoteDefinition { label, blocks }, i)
    }

    fn parse_table(&self, lines: &Lines<'_>, start: usize) -> Option<(RawBlock, usize)> {
        let header_line = lines[start].as_str();
        let delimiter_line = lines.get(start + 1)?.as_str();
        if indent_width(delimiter_line) >= CODE_INDENT {
            return None;
        }
        if !header_line.contains('|') && !delimiter_line.contains('|') {
            return None;
        }

        let alignments = parse_delimiter_row(delimiter_line)?;
        let header = split_table_row(header_line);
        if header.len() != alignments.len() {
            tracing::trace!(
                line = start + 1,
                header_cells = header.len(),
                delimiter_cells = alignments.len(),
                "Table delimiter row does not match the header"
            );
            return None;
        }

        let mut rows = Vec::new();
        let mut i = start + 2;
        while i < lines.len() {
            let line = lines[i].as_str();
            if is_blank(line) || self.interrupts_paragraph(lines, i) {
                break;
            }
            let mut cells = split_table_row(line);
            cells.resize(alignments.len(), String::new());
            rows.push(cells);
            i += 1;
        }

        Some((
            RawBlock::Table {
                alignments,
                header,
                rows,
            },
            i,
        ))
    }
}

/// Splits text into lines on `\n`, dropping a trailing `\r`, with leading
/// tabs expanded.
pub(super) fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| detab_leading(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Expands tabs inside the leading whitespace of `line` to spaces.
fn detab_leading(line: &str) -> String {
    let content_start = line.len() - line.trim_start_matches([' ', '\t']).len();
    if !line[..content_start].contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + TAB_STOP);
    let mut column = 0;
    for c in line[..content_start].chars() {
        if c == '\t' {
            let width = TAB_STOP - column % TAB_STOP;
            out.extend(std::iter::repeat(' ').take(width));
            column += width;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out.push_str(&line[content_start..]);
    out
}

/// Columns of leading whitespace.
fn indent_width(line: &str) -> usize {
    let mut column = 0;
    for c in line.chars() {
        match c {
            ' ' => column += 1,
            '\t' => column += TAB_STOP - column % TAB_STOP,
            _ => break,
        }
    }
    column
}

/// Removes up to `columns` columns of leading whitespace.
fn strip_indent(line: &str, columns: usize) -> String {
    let line = detab_leading(line);
    let strip = line
        .bytes()
        .take(columns)
        .take_while(|b| *b == b' ')
        .count();
    line[strip..].to_string()
}

fn parse_indented_code(lines: &[String], start: usize) -> (RawBlock, usize) {
    let mut end = start;
    let mut i = start;
    while i < lines.len() {
        let line = lines[i].as_str();
        if is_blank(line) {
            i += 1;
            continue;
        }
        if indent_width(line) < CODE_INDENT {
            break;
        }
        i += 1;
        end = i;
    }
    let mut literal = String::new();
    for line in &lines[start..end] {
        literal.push_str(&strip_indent(line, CODE_INDENT));
        literal.push('\n');
    }
    (
        RawBlock::CodeBlock {
            info: None,
            literal,
        },
        end,
    )
}

#[derive(Debug)]
struct Fence {
    marker: char,
    len: usize,
    indent: usize,
    info: Option<String>,
}

impl Fence {
    fn slot(marker: char) -> usize {
        usize::from(marker == '~')
    }

    fn open(line: &str) -> Option<Self> {
        let indent = indent_width(line);
        if indent >= CODE_INDENT {
            return None;
        }
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = trimmed.chars().take_while(|c| *c == marker).count();
        if len < 3 {
            return None;
        }
        let info = trimmed[len..].trim();
        if marker == '`' && info.contains('`') {
            return None;
        }
        let info = info
            .split_whitespace()
            .next()
            .map(unescape)
            .filter(|s| !s.is_empty());
        Some(Self {
            marker,
            len,
            indent,
            info,
        })
    }

    fn is_close(&self, line: &str) -> bool {
        if indent_width(line) >= CODE_INDENT {
            return false;
        }
        let trimmed = line.trim();
        let run = trimmed.chars().take_while(|c| *c == self.marker).count();
        run >= self.len && run == trimmed.chars().count()
    }

    fn find_close(&self, lines: &Lines<'_>, from: usize) -> Option<usize> {
        if lines.longest_closing_run(self.marker, from) < self.len {
            return None;
        }
        (from..lines.len()).find(|&idx| self.is_close(&lines[idx]))
    }

    fn into_block(self, content: &[String]) -> RawBlock {
        let mut literal = String::new();
        for line in content {
            literal.push_str(&strip_indent(line, self.indent));
            literal.push('\n');
        }
        RawBlock::CodeBlock {
            info: self.info,
            literal,
        }
    }
}

fn is_thematic_break(line: &str) -> bool {
    if indent_width(line) >= CODE_INDENT {
        return false;
    }
    let mut marker = None;
    let mut count = 0;
    for c in line.chars() {
        match c {
            ' ' | '\t' => {}
            '*' | '-' | '_' => {
                if *marker.get_or_insert(c) != c {
                    return false;
                }
                count += 1;
            }
            _ => return false,
        }
    }
    count >= 3
}

fn atx_heading(line: &str) -> Option<(u8, String)> {
    if indent_width(line) >= CODE_INDENT {
        return None;
    }
    let trimmed = line.trim_start();
    let level = trimmed.bytes().take_while(|b| *b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    let mut text = rest.trim();
    let without_closing = text.trim_end_matches('#');
    if without_closing.is_empty() {
        text = "";
    } else if without_closing.ends_with([' ', '\t']) {
        text = without_closing.trim_end();
    }
    Some((level as u8, text.to_string()))
}

fn setext_underline(line: &str) -> Option<u8> {
    if indent_width(line) >= CODE_INDENT {
        return None;
    }
    let trimmed = line.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c == '=') {
        Some(1)
    } else if !trimmed.is_empty() && trimmed.chars().all(|c| c == '-') {
        Some(2)
    } else {
        None
    }
}

/// Returns the line content after a `>` marker, if present.
fn strip_blockquote_marker(line: &str) -> Option<String> {
    if indent_width(line) >= CODE_INDENT {
        return None;
    }
    let rest = line.trim_start().strip_prefix('>')?;
    let rest = rest
        .strip_prefix(' ')
        .or_else(|| rest.strip_prefix('\t'))
        .unwrap_or(rest);
    Some(detab_leading(rest))
}

/// The marker and run length of a line that could close a fence.
fn closing_run(line: &str) -> Option<(char, usize)> {
    if indent_width(line) >= CODE_INDENT {
        return None;
    }
    let trimmed = line.trim();
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run = trimmed.len();
    (run >= 3 && trimmed.bytes().all(|b| char::from(b) == marker)).then_some((marker, run))
}

/// Lines collected for a container block.
#[derive(Debug, Default)]
struct ContainerLines {
    lines: Vec<String>,
    /// The fence the collected lines end inside of, if any.
    open_fence: Option<Fence>,
}

impl ContainerLines {
    fn push(&mut self, line: String) {
        match self.open_fence.as_ref().map(|fence| fence.is_close(&line)) {
            Some(true) => self.open_fence = None,
            Some(false) => {}
            None => self.open_fence = Fence::open(&line),
        }
        self.lines.push(line);
    }

    fn ends_in_blank(&self) -> bool {
        self.lines.last().map_or(true, |line| is_blank(line))
    }

    /// Whether the collected lines end inside a paragraph, so that a
    /// following unprefixed line continues it lazily.
    fn accepts_lazy_line(&self) -> bool {
        let Some(last) = self.lines.last() else {
            return false;
        };
        if is_blank(last) || indent_width(last) >= CODE_INDENT {
            return false;
        }
        if atx_heading(last).is_some() || is_thematic_break(last) || Fence::open(last).is_some() {
            return false;
        }
        // Inside an unclosed fence, lines are code.
        self.open_fence.is_none()
    }

    /// Drops trailing blank lines, keeping the first line, and returns how many were dropped.
    fn trim_trailing_blanks(&mut self) -> usize {
        let mut dropped = 0;
        while self.lines.len() > 1 && self.lines.last().map_or(false, |line| is_blank(line)) {
            self.lines.pop();
            dropped += 1;
        }
        dropped
    }
}

#[derive(Debug, Clone)]
struct ListMarker {
    kind: ListKind,
    /// `-`, `*` or `+` for bullets, `.` or `)` for ordered lists.
    delimiter: char,
    content_indent: usize,
    /// First-line content after the marker.
    content: String,
    empty: bool,
}

impl ListMarker {
    fn parse(line: &str) -> Option<Self> {
        let indent = indent_width(line);
        if indent >= CODE_INDENT {
            return None;
        }
        let trimmed = line.trim_start();

        let (kind, delimiter, marker_width) = match trimmed.chars().next()? {
            c @ ('-' | '*' | '+') => (ListKind::Bullet, c, 1),
            c if c.is_ascii_digit() => {
                let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
                if digits > 9 {
                    return None;
                }
                let delimiter = trimmed[digits..].chars().next().filter(|c| *c == '.' || *c == ')')?;
                let start = trimmed[..digits].parse().ok()?;
                (ListKind::Ordered { start }, delimiter, digits + 1)
            }
            _ => return None,
        };

        let after = &trimmed[marker_width..];
        if after.trim().is_empty() {
            return Some(Self {
                kind,
                delimiter,
                content_indent: indent + marker_width + 1,
                content: String::new(),
                empty: true,
            });
        }
        if !after.starts_with([' ', '\t']) {
            return None;
        }

        let marker_end = indent + marker_width;
        let mut column = marker_end;
        let mut consumed = 0;
        for c in after.chars() {
            match c {
                ' ' => column += 1,
                '\t' => column += TAB_STOP - column % TAB_STOP,
                _ => break,
            }
            consumed += 1;
        }
        let spaces = column - marker_end;
        let rest = &after[consumed..];

        let (content_indent, content) = if spaces > CODE_INDENT {
            // Indented code inside the item: the marker is followed by a single space.
            (marker_end + 1, format!("{}{rest}", " ".repeat(spaces - 1)))
        } else {
            (marker_end + spaces, rest.to_string())
        };

        Some(Self {
            kind,
            delimiter,
            content_indent,
            content,
            empty: false,
        })
    }

    fn same_list_as(&self, other: &Self) -> bool {
        let same_kind = matches!(
            (self.kind, other.kind),
            (ListKind::Bullet, ListKind::Bullet) | (ListKind::Ordered { .. }, ListKind::Ordered { .. })
        );
        same_kind && self.delimiter == other.delimiter
    }
}

/// Strips a leading `[ ]`/`[x]` task marker, returning its checked state.
fn take_task_marker(first_line: &mut String) -> Option<bool> {
    let checked = match first_line.get(..3)? {
        "[ ]" => false,
        "[x]" | "[X]" => true,
        _ => return None,
    };
    let rest = &first_line[3..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    *first_line = rest.trim_start().to_string();
    Some(checked)
}

fn footnote_definition_start(line: &str) -> Option<(String, String)> {
    if indent_width(line) >= CODE_INDENT {
        return None;
    }
    let rest = line.trim_start().strip_prefix("[^")?;
    let close = rest.find("]:")?;
    let label = &rest[..close];
    if label.is_empty() || label.contains(char::is_whitespace) || label.contains(['[', ']']) {
        return None;
    }
    let content = rest[close + 2..].trim_start().to_string();
    Some((label.to_string(), content))
}

fn parse_html_block(lines: &[String], start: usize, kind: HtmlBlockKind) -> (RawBlock, usize) {
    let mut end = start;
    if kind.ends_at_blank_line() {
        while end < lines.len() && !is_blank(&lines[end]) {
            end += 1;
        }
    } else {
        while end < lines.len() {
            let done = kind.is_end(&lines[end]);
            end += 1;
            if done {
                break;
            }
        }
    }
    let mut raw = lines[start..end].join("\n");
    raw.push('\n');
    (RawBlock::HtmlBlock(raw), end)
}

/// Splits a table row into trimmed cells, honouring `\|` escapes.
fn split_table_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = match trimmed.strip_suffix('|') {
        Some(stripped) if !stripped.ends_with('\\') => stripped,
        _ => trimmed,
    };

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                cell.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut cell).trim().to_string()),
            c => cell.push(c),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

fn parse_delimiter_row(line: &str) -> Option<Vec<Alignment>> {
    split_table_row(line)
        .iter()
        .map(|cell| {
            let left = cell.starts_with(':');
            let right = cell.ends_with(':') && cell.len() > 1;
            let dashes = cell.trim_start_matches(':').trim_end_matches(':');
            if dashes.is_empty() || !dashes.chars().all(|c| c == '-') {
                return None;
            }
            Some(match (left, right) {
                (true, true) => Alignment::Center,
                (true, false) => Alignment::Left,
                (false, true) => Alignment::Right,
                (false, false) => Alignment::None,
            })
        })
        .collect()
}

/// Parses a `[label]: destination "title"` definition starting at line `start`.
///
/// Returns the normalized label, the definition and the next line index.
fn link_reference_definition(
    lines: &[String],
    start: usize,
) -> Option<(String, LinkDefinition, usize)> {
    let line = lines[start].as_str();
    if indent_width(line) >= CODE_INDENT {
        return None;
    }
    let rest = line.trim_start().strip_prefix('[')?;
    if rest.starts_with('^') {
        return None;
    }

    let mut escaped = false;
    let mut label_end = None;
    for (idx, c) in rest.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' => return None,
            ']' => {
                label_end = Some(idx);
                break;
            }
            _ => {}
        }
    }
    let label_end = label_end?;
    let label = &rest[..label_end];
    if label.trim().is_empty() {
        return None;
    }
    let after_label = rest[label_end + 1..].strip_prefix(':')?;

    let mut next = start + 1;
    let mut destination_text = after_label.trim_start();
    if destination_text.is_empty() {
        destination_text = lines.get(next)?.trim_start();
        next += 1;
    }

    let (url, used) = parse_destination(destination_text)?;
    let remainder = &destination_text[used..];

    let title = if remainder.trim().is_empty() {
        // The title may sit alone on the following line.
        match lines.get(next).map(|l| l.trim()) {
            Some(candidate) => match parse_title(candidate) {
                Some((title, used)) if used == candidate.len() => {
                    next += 1;
                    Some(title)
                }
                _ => None,
            },
            None => None,
        }
    } else {
        if !remainder.starts_with([' ', '\t']) {
            return None;
        }
        let candidate = remainder.trim();
        let (title, used) = parse_title(candidate)?;
        if used != candidate.len() {
            return None;
        }
        Some(title)
    };

    Some((normalize_label(label), LinkDefinition { url, title }, next))
}
