use clap::Parser;
use tv_grab::cli::{init_logger, run, GrabberArgs};
use tv_grab::norway::Norway;

/// Grab TV listings for Norway in XMLTV format.
#[derive(Parser)]
#[command(version)]
struct Opts {
    #[command(flatten)]
    args: GrabberArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_logger(opts.args.quiet);
    run::<Norway>(&opts.args).await
}
