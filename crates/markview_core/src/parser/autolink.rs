//! Bare URL, `www.` and email autolinks found in plain text.

use crate::document::Inline;
use once_cell::sync::Lazy;
use regex::Regex;

static EXTENDED_AUTOLINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:https?://|ftp://|www\.)[^\s<]+|[a-z0-9._+-]+@[a-z0-9_-]+(?:\.[a-z0-9_-]+)+",
    )
    .unwrap()
});

/// Rewrites text nodes outside of links, turning recognised addresses into links.
pub(super) fn linkify(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out = Vec::with_capacity(inlines.len());
    for inline in inlines {
        match inline {
            Inline::Text(text) => split_text(&text, &mut out),
            Inline::Emphasis(children) => out.push(Inline::Emphasis(linkify(children))),
            Inline::Strong(children) => out.push(Inline::Strong(linkify(children))),
            Inline::Strikethrough(children) => out.push(Inline::Strikethrough(linkify(children))),
            other => out.push(other),
        }
    }
    out
}

fn split_text(text: &str, out: &mut Vec<Inline>) {
    let mut last = 0;
    for m in EXTENDED_AUTOLINK.find_iter(text) {
        if m.start() < last || !at_boundary(text, m.start()) {
            continue;
        }
        let candidate = trim_trailing(m.as_str());
        let Some(url) = link_target(candidate) else {
            continue;
        };
        if m.start() > last {
            out.push(Inline::Text(text[last..m.start()].to_string()));
        }
        out.push(Inline::Link {
            url,
            title: None,
            content: vec![Inline::Text(candidate.to_string())],
        });
        last = m.start() + candidate.len();
    }
    if last < text.len() {
        out.push(Inline::Text(text[last..].to_string()));
    }
}

/// An autolink must start the text or follow whitespace or an opening delimiter.
fn at_boundary(text: &str, start: usize) -> bool {
    match text[..start].chars().next_back() {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, '*' | '_' | '~' | '(' | '"' | '\''),
    }
}

/// Drops trailing punctuation, unbalanced closing parentheses and entity-like
/// suffixes from a candidate.
fn trim_trailing(candidate: &str) -> &str {
    let mut end = candidate;
    loop {
        let before = end.len();
        end = end.trim_end_matches(['?', '!', '.', ',', ':', '*', '_', '~', '\'', '"']);

        if end.ends_with(')') {
            let open = end.matches('(').count();
            let close = end.matches(')').count();
            if close > open {
                end = &end[..end.len() - 1];
            }
        }

        if end.ends_with(';') {
            if let Some(amp) = end.rfind('&') {
                let name = &end[amp + 1..end.len() - 1];
                if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric()) {
                    end = &end[..amp];
                }
            }
        }

        if end.len() == before {
            return end;
        }
    }
}

/// Returns the link destination for a trimmed candidate, `None` when it is not
/// a usable address.
fn link_target(candidate: &str) -> Option<String> {
    let lower = candidate.to_ascii_lowercase();

    if let Some(domain) = lower.strip_prefix("www.") {
        return valid_domain(domain).then(|| format!("http://{candidate}"));
    }

    let scheme_rest = ["http://", "https://", "ftp://"]
        .iter()
        .find_map(|scheme| lower.strip_prefix(scheme));
    if let Some(rest) = scheme_rest {
        return valid_domain(rest).then(|| candidate.to_string());
    }

    let (_, domain) = candidate.split_once('@')?;
    if domain.ends_with(['-', '_']) || !domain.contains('.') {
        return None;
    }
    Some(format!("mailto:{candidate}"))
}

fn valid_domain(rest: &str) -> bool {
    let domain = rest.split(['/', '?', '#']).next().unwrap_or_default();
    !domain.is_empty()
        && domain
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ':'))
}
