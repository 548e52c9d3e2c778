use super::{println_json, read_input_text};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Print word, character, line and paragraph counts.
#[derive(Parser, Debug, Clone)]
pub struct Stats {
    /// Markdown file, stdin if omitted.
    #[clap(index = 1)]
    input: Option<PathBuf>,
}

impl Stats {
    pub fn run(self) -> Result<()> {
        let content = read_input_text(self.input.as_deref())?;
        println_json(&markview_core::calculate_document_stats(&content))
    }
}
