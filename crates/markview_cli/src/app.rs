use crate::command;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub enum RunCmd {
    /// Render markdown to an HTML fragment.
    #[clap(name = "render")]
    Render(command::render::Render),
    /// Print the heading outline as JSON.
    #[clap(name = "outline")]
    Outline(command::outline::Outline),
    /// Print the document statistics as JSON.
    #[clap(name = "stats")]
    Stats(command::stats::Stats),
    /// Search the document, case-insensitively.
    #[clap(name = "search")]
    Search(command::search::Search),
}

/// Global CLI arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Enable the logging system, writing to the given file.
    #[clap(long, global = true)]
    pub log: Option<PathBuf>,

    /// Specify the path of the config file.
    #[clap(long, global = true)]
    pub config_file: Option<PathBuf>,
}

impl RunCmd {
    pub fn run(self, args: Args) -> Result<()> {
        let (config, config_err) = markview_config::load_config(args.config_file.as_deref());

        let _guard = command::init_logging(args.log, &config.log)?;

        if let Some(err) = config_err {
            tracing::error!(?err, "Failed to load config, falling back to defaults");
            eprintln!("warning: {err}");
        }

        match self {
            Self::Render(render) => render.run(config.render),
            Self::Outline(outline) => outline.run(),
            Self::Stats(stats) => stats.run(),
            Self::Search(search) => search.run(),
        }
    }
}
