use super::{println_json, read_input};
use anyhow::Result;
use clap::Parser;
use markview_core::{MarkdownRenderer, RenderOptions};
use std::io::Write;
use std::path::PathBuf;

/// Render markdown to HTML.
#[derive(Parser, Debug, Clone)]
pub struct Render {
    /// Markdown file to render, stdin if omitted.
    #[clap(index = 1)]
    input: Option<PathBuf>,

    /// Print the result as JSON, including the line map when enabled.
    #[clap(long)]
    json: bool,

    /// Record the source line of each top-level block.
    #[clap(long)]
    line_map: bool,

    /// Only the CommonMark core, every extension disabled.
    #[clap(long)]
    commonmark: bool,

    /// Omit raw HTML and drop dangerous link targets.
    #[clap(long)]
    safe: bool,

    /// syntect theme for fenced code blocks.
    #[clap(long, conflicts_with = "no_highlight")]
    theme: Option<String>,

    /// Disable syntax highlighting of fenced code blocks.
    #[clap(long)]
    no_highlight: bool,
}

impl Render {
    pub fn run(self, configured: RenderOptions) -> Result<()> {
        let renderer = MarkdownRenderer::new(self.render_options(configured));
        let result = renderer.render_bytes(&read_input(self.input.as_deref())?)?;

        if self.json {
            println_json(&result)?;
        } else {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(result.html.as_bytes())?;
        }

        Ok(())
    }

    fn render_options(&self, configured: RenderOptions) -> RenderOptions {
        let mut options = if self.commonmark {
            RenderOptions {
                line_map: configured.line_map,
                ..RenderOptions::commonmark()
            }
        } else {
            configured
        };
        if self.line_map {
            options.line_map = true;
        }
        if self.safe {
            options.unsafe_html = false;
        }
        if self.no_highlight {
            options.highlight_theme = None;
        } else if let Some(theme) = &self.theme {
            options.highlight_theme = Some(theme.clone());
        }
        options
    }
}
