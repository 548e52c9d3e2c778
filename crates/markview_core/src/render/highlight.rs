//! Syntax highlighting for fenced code blocks.

use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Theme used when none is configured.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Strategy for turning the content of a code block into HTML.
pub trait CodeHighlighter: Send + Sync {
    /// Returns the highlighted HTML for `code`.
    ///
    /// `None` means the block is rendered as escaped plain text.
    fn highlight(&self, lang: Option<&str>, code: &str) -> Option<String>;
}

/// Never highlights, every code block is rendered as escaped text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl CodeHighlighter for PlainText {
    fn highlight(&self, _lang: Option<&str>, _code: &str) -> Option<String> {
        None
    }
}

/// Highlights code with syntect's bundled syntaxes, emitting inline styles.
#[derive(Debug, Clone)]
pub struct SyntectHighlighter {
    theme: String,
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}

impl SyntectHighlighter {
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
        }
    }

    /// Name of the theme code is coloured with.
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Names of the themes that can be passed to [`SyntectHighlighter::new`].
    pub fn available_themes() -> impl Iterator<Item = &'static str> {
        THEME_SET.themes.keys().map(String::as_str)
    }
}

impl CodeHighlighter for SyntectHighlighter {
    fn highlight(&self, lang: Option<&str>, code: &str) -> Option<String> {
        let lang = lang?;
        let syntax = SYNTAX_SET.find_syntax_by_token(lang)?;
        let Some(theme) = THEME_SET.themes.get(&self.theme) else {
            tracing::debug!(theme = %self.theme, "Unknown highlight theme, rendering plain code");
            return None;
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut html = String::with_capacity(code.len() * 2);
        for line in LinesWithEndings::from(code) {
            let highlighted = highlighter
                .highlight_line(line, &SYNTAX_SET)
                .and_then(|regions| styled_line_to_highlighted_html(&regions, IncludeBackground::No));
            match highlighted {
                Ok(line_html) => html.push_str(&line_html),
                Err(err) => {
                    tracing::debug!(?err, lang, "Failed to highlight code block");
                    return None;
                }
            }
        }
        Some(html)
    }
}
