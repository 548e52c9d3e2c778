use super::{println_json, read_input_text};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Print the heading outline of a markdown document.
#[derive(Parser, Debug, Clone)]
pub struct Outline {
    /// Markdown file, stdin if omitted.
    #[clap(index = 1)]
    input: Option<PathBuf>,
}

impl Outline {
    pub fn run(self) -> Result<()> {
        let content = read_input_text(self.input.as_deref())?;
        println_json(&markview_core::extract_outline(&content))
    }
}
