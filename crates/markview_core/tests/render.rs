use markview_core::{
    calculate_document_stats, extract_outline, search, to_html, DocumentStats, MarkdownRenderer,
    RenderError, RenderOptions, TocItem,
};

fn render(input: &str) -> String {
    to_html(input, &RenderOptions::default()).html
}

fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

#[test]
fn strong_emphasis() {
    assert!(render("**bold**").contains("<strong>bold</strong>"));
}

#[test]
fn paragraph_words_survive_rendering() {
    let input = "Intro paragraph with **strong** words and _emphasis_\n\
                 spread over two lines.\n\n\
                 > quoted paragraph text\n\n\
                 - list item one\n- list item two\n\n\
                 A [link text](https://example.com) and `code span` here.";
    let text = strip_tags(&render(input));
    let words: Vec<&str> = input
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty() && *word != "https" && *word != "example" && *word != "com")
        .collect();
    for word in words {
        assert!(text.contains(word), "missing {word:?} in {text:?}");
    }
}

#[test]
fn misaligned_table_degrades_to_paragraph() {
    let html = render("| a | b |\n| - |\n| 1 | 2 |");
    assert!(!html.contains("<table>"));
    assert!(html.starts_with("<p>"));
    assert!(html.contains("| a | b |"));
}

#[test]
fn unterminated_fence_is_text() {
    let html = to_html("```\ncode", &RenderOptions::commonmark()).html;
    assert!(html.starts_with("<p>"));
    assert!(html.contains("```"));
    assert!(html.contains("code"));
}

#[test]
fn unresolved_reference_is_literal() {
    assert_eq!(
        to_html("[missing][nowhere]", &RenderOptions::commonmark()).html,
        "<p>[missing][nowhere]</p>\n"
    );
}

#[test]
fn unknown_language_is_not_highlighted() {
    assert_eq!(
        render("```no-such-language\n<x>\n```"),
        "<pre><code class=\"language-no-such-language\">&lt;x&gt;\n</code></pre>\n"
    );
}

#[test]
fn invalid_utf8_is_rejected() {
    let renderer = MarkdownRenderer::default();
    assert!(matches!(
        renderer.render_bytes(&[b'#', b' ', 0xff, 0xfe]),
        Err(RenderError::Encoding(_))
    ));
    assert_eq!(
        renderer.render_bytes(b"plain").unwrap().html,
        "<p>plain</p>\n"
    );
}

#[test]
fn outline_examples() {
    assert_eq!(
        extract_outline("# Hello World\n\n## A & B!!"),
        vec![
            TocItem {
                level: 1,
                title: "Hello World".into(),
                id: "hello-world".into(),
            },
            TocItem {
                level: 2,
                title: "A & B!!".into(),
                id: "a-b".into(),
            },
        ]
    );
}

#[test]
fn outline_is_idempotent() {
    let input = "# One\n\ntext\n\n## Two\n### Two";
    assert_eq!(extract_outline(input), extract_outline(input));
}

#[test]
fn heading_ids_match_outline() {
    let input = "# Hello World\n\n## A & B!!";
    let html = render(input);
    for item in extract_outline(input) {
        assert!(html.contains(&format!("<h{} id=\"{}\">", item.level, item.id)));
    }
}

#[test]
fn repeated_headings_share_an_id() {
    let input = "## Setup\n\ntext\n\n## Setup";
    let html = render(input);
    assert_eq!(html.matches("<h2 id=\"setup\">").count(), 2);
    let ids: Vec<String> = extract_outline(input).into_iter().map(|item| item.id).collect();
    assert_eq!(ids, vec!["setup", "setup"]);
}

#[test]
fn stats_example() {
    assert_eq!(
        calculate_document_stats("a b\n\nc"),
        DocumentStats {
            words: 3,
            characters: 6,
            lines: 3,
            paragraphs: 2,
        }
    );
}

#[test]
fn search_example() {
    let hits = search("cat\ncatcat", "cat");
    let positions: Vec<(usize, usize)> = hits.iter().map(|hit| (hit.line, hit.column)).collect();
    assert_eq!(positions, vec![(1, 1), (2, 1), (2, 4)]);
}

#[test]
fn empty_query_finds_nothing() {
    assert!(search("cat\ncatcat", "").is_empty());
}

#[test]
fn renderer_facade_matches_free_functions() {
    let input = "# Title\n\nSome *text* about cats.\n";
    let renderer = MarkdownRenderer::new(RenderOptions::default());
    assert_eq!(renderer.render(input), to_html(input, &RenderOptions::default()));
    assert_eq!(renderer.outline(input), extract_outline(input));
    assert_eq!(renderer.stats(input), calculate_document_stats(input));
    assert_eq!(renderer.search(input, "CAT"), search(input, "cat"));
}
