use clap::Parser;
use markview_cli::{Args, RunCmd};

#[derive(Parser, Debug)]
#[clap(name = "markview", version, about = "Markdown rendering and analysis")]
pub struct Markview {
    #[clap(flatten)]
    pub args: Args,

    #[clap(subcommand)]
    pub cmd: RunCmd,
}

fn main() {
    let markview = Markview::parse();

    if let Err(e) = markview.cmd.run(markview.args) {
        eprintln!("error: {e:?}");
        std::process::exit(1);
    }
}
