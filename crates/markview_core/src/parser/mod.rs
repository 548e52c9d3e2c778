//! Markdown parser producing a [`Document`].
//!
//! Parsing happens in two passes. The block pass splits the source into raw
//! blocks and collects link reference definitions and footnote labels, then
//! every block's inline text is parsed with those tables available.

mod autolink;
mod block;
mod html;
mod inline;
mod link;

use self::block::{BlockParser, RawBlock, RawItem};
use self::inline::{parse_inlines, InlineContext};
use crate::document::{Block, Document, ListItem};

/// Deepest nesting of containers, and separately of inline spans, that is
/// parsed as structure. Markers past it are read as literal text.
const MAX_NESTING: usize = 32;

/// Syntax extensions recognised on top of CommonMark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub autolinks: bool,
    pub footnotes: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            tasklists: true,
            autolinks: true,
            footnotes: true,
        }
    }
}

/// Parses `text` into a document tree.
///
/// Parsing never fails: anything that is not recognised as markdown syntax
/// ends up as literal text.
pub fn parse(text: &str, options: &ParseOptions) -> Document {
    let lines = block::split_lines(text);
    let mut block_parser = BlockParser::new(options);
    let raw_blocks = block_parser.parse_lines(&lines);

    let ctx = InlineContext {
        options,
        definitions: &block_parser.definitions,
        footnote_labels: &block_parser.footnote_labels,
    };

    let (block_lines, blocks) = raw_blocks
        .into_iter()
        .map(|(line, raw)| (line + 1, build_block(raw, &ctx)))
        .unzip();

    Document {
        blocks,
        block_lines,
    }
}

fn build_blocks(raw_blocks: Vec<RawBlock>, ctx: &InlineContext<'_>) -> Vec<Block> {
    raw_blocks
        .into_iter()
        .map(|raw| build_block(raw, ctx))
        .collect()
}

fn build_block(raw: RawBlock, ctx: &InlineContext<'_>) -> Block {
    match raw {
        RawBlock::Heading { level, text } => Block::Heading {
            level,
            content: parse_inlines(&text, ctx),
        },
        RawBlock::Paragraph(text) => Block::Paragraph(parse_inlines(&text, ctx)),
        RawBlock::List { kind, tight, items } => Block::List {
            kind,
            tight,
            items: items
                .into_iter()
                .map(|RawItem { task, blocks }| ListItem {
                    task,
                    blocks: build_blocks(blocks, ctx),
                })
                .collect(),
        },
        RawBlock::BlockQuote(blocks) => Block::BlockQuote(build_blocks(blocks, ctx)),
        RawBlock::CodeBlock { info, literal } => Block::CodeBlock { info, literal },
        RawBlock::Table {
            alignments,
            header,
            rows,
        } => Block::Table {
            alignments,
            header: header.iter().map(|cell| parse_inlines(cell, ctx)).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| parse_inlines(cell, ctx)).collect())
                .collect(),
        },
        RawBlock::ThematicBreak => Block::ThematicBreak,
        RawBlock::FootnoteDefinition { label, blocks } => Block::FootnoteDefinition {
            label,
            blocks: build_blocks(blocks, ctx),
        },
        RawBlock::HtmlBlock(raw) => Block::HtmlBlock(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Inline, ListKind};

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn test_empty_document() {
        let doc = parse("", &ParseOptions::default());
        assert!(doc.is_empty());
        assert!(doc.block_lines.is_empty());
    }

    #[test]
    fn test_reference_defined_after_use() {
        let doc = parse(
            "See [docs].\n\n[docs]: https://example.com/docs",
            &ParseOptions::default(),
        );
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph(vec![
                text("See "),
                Inline::Link {
                    url: "https://example.com/docs".into(),
                    title: None,
                    content: vec![text("docs")],
                },
                text("."),
            ])]
        );
    }

    #[test]
    fn test_footnote_reference_and_definition() {
        let doc = parse("Claim[^1].\n\n[^1]: Source.", &ParseOptions::default());
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(
            doc.blocks[0],
            Block::Paragraph(vec![
                text("Claim"),
                Inline::FootnoteRef("1".into()),
                text("."),
            ])
        );
        assert!(matches!(doc.blocks[1], Block::FootnoteDefinition { .. }));
    }

    #[test]
    fn test_disabled_extensions_stay_literal() {
        let options = ParseOptions {
            tables: false,
            strikethrough: false,
            tasklists: false,
            autolinks: false,
            footnotes: false,
        };
        let doc = parse(
            "~~a~~ www.example.com\n\n- [ ] task\n\n| a |\n| - |",
            &options,
        );
        assert_eq!(
            doc.blocks[0],
            Block::Paragraph(vec![text("~~a~~ www.example.com")])
        );
        match &doc.blocks[1] {
            Block::List { kind, items, .. } => {
                assert_eq!(*kind, ListKind::Bullet);
                assert_eq!(items[0].task, None);
            }
            other => panic!("expected list, got {other:?}"),
        }
        assert!(matches!(doc.blocks[2], Block::Paragraph(_)));
    }

    #[test]
    fn test_block_lines_are_one_indexed() {
        let doc = parse("# Title\n\nText\n\n```\ncode\n```", &ParseOptions::default());
        assert_eq!(doc.block_lines, vec![1, 3, 5]);
    }

    #[test]
    fn test_crlf_input() {
        let doc = parse("# Title\r\n\r\nbody\r\n", &ParseOptions::default());
        assert_eq!(
            doc.blocks,
            vec![
                Block::Heading {
                    level: 1,
                    content: vec![text("Title")],
                },
                Block::Paragraph(vec![text("body")]),
            ]
        );
    }
}
