use super::{println_json, read_input_text};
use anyhow::Result;
use clap::Parser;
use markview_core::search;
use std::path::PathBuf;

/// Search a markdown document for a query, ignoring case.
#[derive(Parser, Debug, Clone)]
pub struct Search {
    /// Text to look for.
    #[clap(index = 1)]
    query: String,

    /// Markdown file, stdin if omitted.
    #[clap(index = 2)]
    input: Option<PathBuf>,

    /// Print only the number of matches.
    #[clap(long)]
    count: bool,
}

impl Search {
    pub fn run(self) -> Result<()> {
        let content = read_input_text(self.input.as_deref())?;
        let results = search(&content, &self.query);
        if self.count {
            println!("{}", results.len());
            Ok(())
        } else {
            println_json(&results)
        }
    }
}
