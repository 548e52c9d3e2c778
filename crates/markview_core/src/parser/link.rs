//! Link destinations, titles and reference labels.

/// A `[label]: destination "title"` definition collected by the block pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinkDefinition {
    pub url: String,
    pub title: Option<String>,
}

/// Case-folds a label and collapses inner whitespace so `[Foo  Bar]` and
/// `[foo bar]` refer to the same definition.
pub(crate) fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Removes backslash escapes in front of ASCII punctuation.
pub(crate) fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_punctuation() {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Link labels longer than this never match a definition.
pub(super) const MAX_LABEL_CHARS: usize = 999;

/// Unbalanced parentheses a bare destination may open.
const MAX_PAREN_DEPTH: usize = 32;

/// Parses a link destination at the start of `text`.
///
/// Returns the unescaped destination and the number of bytes consumed.
pub(crate) fn parse_destination(text: &str) -> Option<(String, usize)> {
    if let Some(rest) = text.strip_prefix('<') {
        let mut escaped = false;
        for (idx, c) in rest.char_indices() {
            match c {
                '\n' | '<' if !escaped => return None,
                '>' if !escaped => return Some((unescape(&rest[..idx]), idx + 2)),
                '\\' if !escaped => {
                    escaped = true;
                    continue;
                }
                _ => {}
            }
            escaped = false;
        }
        return None;
    }

    let mut depth = 0usize;
    let mut escaped = false;
    let mut end = text.len();
    for (idx, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '(' if depth == MAX_PAREN_DEPTH => return None,
            '(' => depth += 1,
            ')' if depth == 0 => {
                end = idx;
                break;
            }
            ')' => depth -= 1,
            c if c.is_whitespace() || c.is_control() => {
                end = idx;
                break;
            }
            _ => {}
        }
    }

    if end == 0 || depth != 0 {
        return None;
    }
    Some((unescape(&text[..end]), end))
}

/// Parses a `"title"`, `'title'` or `(title)` at the start of `text`.
///
/// Returns the unescaped title and the number of bytes consumed.
pub(crate) fn parse_title(text: &str) -> Option<(String, usize)> {
    let open = text.chars().next()?;
    let close = match open {
        '"' => '"',
        '\'' => '\'',
        '(' => ')',
        _ => return None,
    };
    let mut escaped = false;
    for (idx, c) in text[1..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c == close {
            return Some((unescape(&text[1..idx + 1]), idx + 2));
        } else if open == '(' && c == '(' {
            return None;
        }
    }
    None
}

/// Parses the `(destination "title")` tail of an inline link or image.
///
/// `text` must start with `(`. Returns `(url, title, consumed)`.
pub(crate) fn parse_inline_tail(text: &str) -> Option<(String, Option<String>, usize)> {
    let mut pos = 1;
    pos += leading_whitespace(&text[pos..]);

    if text[pos..].starts_with(')') {
        return Some((String::new(), None, pos + 1));
    }

    let (url, used) = parse_destination(&text[pos..])?;
    pos += used;

    let gap = leading_whitespace(&text[pos..]);
    pos += gap;

    let mut title = None;
    if gap > 0 {
        if let Some((parsed, used)) = parse_title(&text[pos..]) {
            title = Some(parsed);
            pos += used;
            pos += leading_whitespace(&text[pos..]);
        }
    }

    if text[pos..].starts_with(')') {
        Some((url, title, pos + 1))
    } else {
        None
    }
}

fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}
