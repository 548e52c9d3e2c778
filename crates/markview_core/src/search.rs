//! Case-insensitive full-text search over raw markdown.

use serde::{Deserialize, Serialize};

/// Characters of context kept on each side of a match.
const CONTEXT_CHARS: usize = 30;

const ELLIPSIS: &str = "...";

/// A single match of a search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// 1-indexed line number.
    pub line: usize,
    /// 1-indexed byte column of the match.
    pub column: usize,
    /// The match with surrounding context, `...` marking clipped sides.
    pub text: String,
    /// Byte offset of the match within its line.
    pub match_start: usize,
    /// Byte offset just past the match within its line.
    pub match_end: usize,
}

/// Finds every non-overlapping, case-insensitive occurrence of `query`.
///
/// Results are ordered by line, then by column. An empty query matches
/// nothing.
///
/// # Example
///
/// ```
/// use markview_core::search::search;
///
/// let hits = search("cat\ncatcat", "CAT");
/// let positions: Vec<_> = hits.iter().map(|hit| (hit.line, hit.column)).collect();
/// assert_eq!(positions, vec![(1, 1), (2, 1), (2, 4)]);
/// ```
pub fn search(content: &str, query: &str) -> Vec<SearchResult> {
    if query.is_empty() {
        return Vec::new();
    }

    let needle: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
    let mut results = Vec::new();

    for (idx, line) in content.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut from = 0;
        while let Some((match_start, match_end)) = find_from(line, from, &needle) {
            results.push(SearchResult {
                line: idx + 1,
                column: match_start + 1,
                text: context(line, match_start, match_end),
                match_start,
                match_end,
            });
            from = match_end;
        }
    }

    tracing::trace!(query, matches = results.len(), "Searched document");

    results
}

/// Byte range of the first match at or after `from`.
fn find_from(line: &str, from: usize, needle: &[char]) -> Option<(usize, usize)> {
    line[from..].char_indices().find_map(|(offset, _)| {
        let start = from + offset;
        matched_len(&line[start..], needle).map(|len| (start, start + len))
    })
}

/// Byte length of the prefix of `text` whose lowercase form equals `needle`.
///
/// Comparing the lowercase mapping char by char keeps offsets relative to
/// the original text even when lowercasing changes the byte length.
fn matched_len(text: &str, needle: &[char]) -> Option<usize> {
    let mut matched = 0;
    for (offset, c) in text.char_indices() {
        if matched == needle.len() {
            return Some(offset);
        }
        for lower in c.to_lowercase() {
            if needle.get(matched) != Some(&lower) {
                return None;
            }
            matched += 1;
        }
    }
    (matched == needle.len()).then_some(text.len())
}

fn context(line: &str, match_start: usize, match_end: usize) -> String {
    let start = line[..match_start]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    let end = line[match_end..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map(|(idx, _)| match_end + idx)
        .unwrap_or(line.len());

    let mut text = String::with_capacity(end - start + 2 * ELLIPSIS.len());
    if start > 0 {
        text.push_str(ELLIPSIS);
    }
    text.push_str(&line[start..end]);
    if end < line.len() {
        text.push_str(ELLIPSIS);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(results: &[SearchResult]) -> Vec<(usize, usize, usize, usize)> {
        results
            .iter()
            .map(|r| (r.line, r.column, r.match_start, r.match_end))
            .collect()
    }

    #[test]
    fn test_matches_on_each_line() {
        let results = search("cat\ncatcat", "cat");
        assert_eq!(
            positions(&results),
            vec![(1, 1, 0, 3), (2, 1, 0, 3), (2, 4, 3, 6)]
        );
        assert_eq!(results[0].text, "cat");
        assert_eq!(results[2].text, "catcat");
    }

    #[test]
    fn test_empty_query() {
        assert!(search("anything", "").is_empty());
        assert!(search("", "").is_empty());
    }

    #[test]
    fn test_no_match() {
        assert!(search("dog\nbird", "cat").is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let results = search("Hello HELLO hello", "hElLo");
        assert_eq!(results.len(), 3);
        assert_eq!(results[1].column, 7);
    }

    #[test]
    fn test_non_overlapping() {
        let results = search("aaaa", "aa");
        assert_eq!(positions(&results), vec![(1, 1, 0, 2), (1, 3, 2, 4)]);
    }

    #[test]
    fn test_multibyte_offsets_refer_to_original_line() {
        let results = search("ÉCOLE école", "école");
        assert_eq!(positions(&results), vec![(1, 1, 0, 6), (1, 8, 7, 13)]);
        assert_eq!(&"ÉCOLE école"[7..13], "école");
    }

    #[test]
    fn test_context_is_clipped() {
        let line = format!("{}needle{}", "x".repeat(40), "y".repeat(40));
        let results = search(&line, "needle");
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].text,
            format!("...{}needle{}...", "x".repeat(30), "y".repeat(30))
        );
        assert_eq!(results[0].match_start, 40);
    }

    #[test]
    fn test_context_within_line_bounds() {
        let results = search("short needle line", "needle");
        assert_eq!(results[0].text, "short needle line");
    }

    #[test]
    fn test_crlf_lines() {
        let results = search("one\r\ntwo one\r\n", "one");
        assert_eq!(positions(&results), vec![(1, 1, 0, 3), (2, 5, 4, 7)]);
        assert_eq!(results[1].text, "two one");
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let results = search("cat", "cat");
        assert_eq!(
            serde_json::to_string(&results[0]).unwrap(),
            r#"{"line":1,"column":1,"text":"cat","matchStart":0,"matchEnd":3}"#
        );
    }
}
