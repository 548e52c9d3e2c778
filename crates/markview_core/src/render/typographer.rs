//! Typographic substitutions for rendered text: dashes, ellipses, guillemets
//! and curly quotes.

use super::html::push_escaped_char;

/// Escapes `text` for HTML, replacing typographic sequences with entities.
///
/// `prev` is the character rendered right before `text`, used to decide
/// whether a quote opens or closes.
pub(super) fn smarten(text: &str, prev: Option<char>) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut prev = prev;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let (replacement, consumed) = match c {
            '-' if next == Some('-') => {
                if chars.get(i + 2) == Some(&'-') {
                    ("&mdash;", 3)
                } else {
                    ("&ndash;", 2)
                }
            }
            '.' if next == Some('.') && chars.get(i + 2) == Some(&'.') => ("&hellip;", 3),
            '<' if next == Some('<') => ("&laquo;", 2),
            '>' if next == Some('>') => ("&raquo;", 2),
            '"' if opens_quote(prev, next) => ("&ldquo;", 1),
            '"' => ("&rdquo;", 1),
            '\'' if opens_quote(prev, next) => ("&lsquo;", 1),
            '\'' => ("&rsquo;", 1),
            _ => {
                push_escaped_char(&mut out, c);
                prev = Some(c);
                i += 1;
                continue;
            }
        };
        out.push_str(replacement);
        prev = Some(chars[i + consumed - 1]);
        i += consumed;
    }

    out
}

fn opens_quote(prev: Option<char>, next: Option<char>) -> bool {
    let after_boundary = prev.map_or(true, |p| {
        p.is_whitespace() || matches!(p, '(' | '[' | '{' | '-' | '\u{2014}' | '\u{2013}')
    });
    let before_text = next.map_or(false, |n| !n.is_whitespace());
    after_boundary && before_text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashes_and_ellipsis() {
        assert_eq!(smarten("a -- b --- c...", None), "a &ndash; b &mdash; c&hellip;");
    }

    #[test]
    fn test_guillemets() {
        assert_eq!(smarten("<<quoted>>", None), "&laquo;quoted&raquo;");
    }

    #[test]
    fn test_quotes() {
        assert_eq!(
            smarten("\"Hi,\" she said. 'Yes' isn't it", None),
            "&ldquo;Hi,&rdquo; she said. &lsquo;Yes&rsquo; isn&rsquo;t it"
        );
    }

    #[test]
    fn test_quote_after_previous_node() {
        // A closing quote directly after emphasized text.
        assert_eq!(smarten("\" end", Some('d')), "&rdquo; end");
        assert_eq!(smarten("\"start", Some(' ')), "&ldquo;start");
    }

    #[test]
    fn test_plain_text_is_escaped() {
        assert_eq!(smarten("a < b & c", None), "a &lt; b &amp; c");
    }
}
